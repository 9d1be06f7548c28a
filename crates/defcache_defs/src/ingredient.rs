//! Ingredients: the predicate every item definition carries.

use crate::item::{ItemId, ItemStack, TagId};
use crate::tags::TagSet;
use serde::{Deserialize, Serialize};

/// Accepts item stacks by item type or tag membership.
///
/// JSON forms: `{"item": "ns:id"}`, `{"tag": "ns:tag"}`, or an array of
/// ingredients meaning "any of".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ingredient {
    /// Exactly one item type.
    Item {
        /// Accepted item.
        item: ItemId,
    },
    /// Every item in a tag.
    Tag {
        /// Accepted tag.
        tag: TagId,
    },
    /// Any of the nested ingredients.
    AnyOf(Vec<Ingredient>),
}

impl Ingredient {
    /// Creates an ingredient accepting one item.
    pub fn item(item: ItemId) -> Self {
        Self::Item { item }
    }

    /// Creates an ingredient accepting a tag.
    pub fn tag(tag: TagId) -> Self {
        Self::Tag { tag }
    }

    /// Returns true if `stack` is accepted. Empty stacks never are.
    pub fn test(&self, stack: &ItemStack, tags: &TagSet) -> bool {
        !stack.is_empty() && self.accepts(&stack.item, tags)
    }

    fn accepts(&self, item: &ItemId, tags: &TagSet) -> bool {
        match self {
            Self::Item { item: accepted } => accepted == item,
            Self::Tag { tag } => tags.contains(tag, item),
            Self::AnyOf(options) => options.iter().any(|o| o.accepts(item, tags)),
        }
    }

    /// Lists every item type this ingredient can accept under `tags`.
    ///
    /// This is the key extractor for item-keyed indexes, so it must list
    /// every item for which [`Ingredient::test`] can return true.
    pub fn items(&self, tags: &TagSet) -> Vec<ItemId> {
        let mut out = Vec::new();
        self.collect_items(tags, &mut out);
        out
    }

    fn collect_items(&self, tags: &TagSet, out: &mut Vec<ItemId>) {
        match self {
            Self::Item { item } => out.push(item.clone()),
            Self::Tag { tag } => out.extend(tags.items(tag).iter().cloned()),
            Self::AnyOf(options) => {
                for option in options {
                    option.collect_items(tags, out);
                }
            }
        }
    }

    /// Returns every tag this ingredient refers to.
    pub fn referenced_tags(&self) -> Vec<&TagId> {
        match self {
            Self::Item { .. } => Vec::new(),
            Self::Tag { tag } => vec![tag],
            Self::AnyOf(options) => options.iter().flat_map(Ingredient::referenced_tags).collect(),
        }
    }
}
