//! The trait every item-keyed definition kind implements.

use crate::ingredient::Ingredient;
use crate::item::{ItemId, ItemStack};
use crate::tags::TagSet;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A data-driven definition that applies to item stacks.
///
/// Implementors are plain data parsed from JSON. Their id is not part of
/// the file body; the loader assigns it from the file name.
pub trait ItemDefinition: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Kind name used for logs, registry names and sync packets.
    const KIND: &'static str;

    /// Folder under the data root holding this kind's files.
    const FOLDER: &'static str;

    /// Returns the definition id.
    fn id(&self) -> &str;

    /// Assigns the definition id.
    fn set_id(&mut self, id: String);

    /// Returns the ingredient deciding which stacks this applies to.
    fn ingredient(&self) -> &Ingredient;

    /// Checks values the JSON schema cannot express.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Full predicate: does this definition apply to `stack`?
    fn matches(&self, stack: &ItemStack, tags: &TagSet) -> bool {
        self.ingredient().test(stack, tags)
    }

    /// Key extractor: every item type [`matches`](Self::matches) may accept.
    fn valid_items(&self, tags: &TagSet) -> Vec<ItemId> {
        self.ingredient().items(tags)
    }
}
