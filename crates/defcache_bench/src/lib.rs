//! Shared fixtures for defcache benchmarks.

#![warn(missing_docs)]

use defcache_defs::{Fuel, Ingredient, ItemId, TagFile, TagId};

/// Item id number `i`.
pub fn item_id(i: usize) -> ItemId {
    ItemId::new("bench", &format!("item_{i}")).expect("bench ids are valid")
}

/// `count` fuels over `items` distinct items.
///
/// Every fourth fuel accepts a tag of eight items instead of one item, and
/// every fuel overlaps with its neighbour so buckets hold several entries.
pub fn fuels(count: usize, items: usize) -> Vec<Fuel> {
    (0..count)
        .map(|i| {
            let ingredient = if i % 4 == 0 {
                Ingredient::tag(tag_id(i % tag_count(items)))
            } else {
                Ingredient::AnyOf(vec![
                    Ingredient::item(item_id(i % items)),
                    Ingredient::item(item_id((i + 1) % items)),
                ])
            };
            Fuel::new(format!("bench:fuel_{i}"), ingredient, 100 + i as u32, 500.0)
        })
        .collect()
}

/// Tags grouping `items` into runs of eight.
pub fn tags(items: usize) -> Vec<(TagId, TagFile)> {
    (0..tag_count(items))
        .map(|t| {
            let values = (t * 8..(t * 8 + 8).min(items))
                .map(|i| item_id(i).to_string())
                .collect();
            (tag_id(t), TagFile { values })
        })
        .collect()
}

fn tag_count(items: usize) -> usize {
    items.div_ceil(8).max(1)
}

fn tag_id(t: usize) -> TagId {
    TagId::new("bench", &format!("group_{t}")).expect("bench ids are valid")
}
