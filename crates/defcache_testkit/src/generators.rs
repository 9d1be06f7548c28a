//! Property-based test generators using proptest.
//!
//! Ids are drawn from small pools so generated definitions collide on
//! items and tags often enough to exercise multi-record buckets.

use defcache_defs::{Fertilizer, Fuel, HeatingRecipe, Ingredient, ItemId, ItemStack, TagFile, TagId};
use proptest::prelude::*;

/// Item names the generators draw from.
pub const ITEM_POOL: &[&str] = &[
    "minecraft:coal",
    "minecraft:charcoal",
    "minecraft:stick",
    "minecraft:bone_meal",
    "tfc:oak_log",
    "tfc:birch_log",
    "tfc:peat",
    "tfc:powder/saltpeter",
    "tfc:powder/sylvite",
    "tfc:ore/native_copper",
];

/// Tag names the generators draw from. Only some get defined.
pub const TAG_POOL: &[&str] = &[
    "tfc:logs",
    "tfc:coals",
    "tfc:fertilizers",
    "tfc:ores",
    "tfc:unused",
];

fn pooled(pool: &'static [&'static str]) -> impl Strategy<Value = ItemId> {
    prop::sample::select(pool).prop_map(|raw| ItemId::parse(raw).expect("pool ids are valid"))
}

/// Strategy for item ids from [`ITEM_POOL`].
pub fn item_id_strategy() -> impl Strategy<Value = ItemId> {
    pooled(ITEM_POOL)
}

/// Strategy for tag ids from [`TAG_POOL`].
pub fn tag_id_strategy() -> impl Strategy<Value = TagId> {
    pooled(TAG_POOL)
}

/// Strategy for arbitrary well-formed resource ids.
pub fn resource_id_strategy() -> impl Strategy<Value = ItemId> {
    (
        prop::string::string_regex("[a-z][a-z0-9_]{0,7}").expect("Invalid regex"),
        prop::string::string_regex("[a-z][a-z0-9_]{0,7}(/[a-z0-9_]{1,6})?").expect("Invalid regex"),
    )
        .prop_map(|(namespace, path)| {
            ItemId::new(&namespace, &path).expect("generated ids are valid")
        })
}

/// Strategy for stacks of pool items, sometimes empty.
pub fn item_stack_strategy() -> impl Strategy<Value = ItemStack> {
    (item_id_strategy(), 0u32..4).prop_map(|(item, count)| ItemStack::new(item, count))
}

/// Strategy for acyclic tag files over the pools.
///
/// Each defined tag lists pool items and may include tags defined before
/// it in [`TAG_POOL`] order, so nesting never forms a cycle.
pub fn tag_files_strategy() -> impl Strategy<Value = Vec<(TagId, TagFile)>> {
    let per_tag = (
        any::<bool>(),
        prop::collection::vec(prop::sample::select(ITEM_POOL), 0..4),
        prop::collection::vec(any::<prop::sample::Index>(), 0..2),
    );
    prop::collection::vec(per_tag, TAG_POOL.len()).prop_map(|tags| {
        let mut defined: Vec<&str> = Vec::new();
        let mut files = Vec::new();
        for (position, (keep, items, nested)) in tags.into_iter().enumerate() {
            let name = TAG_POOL[position];
            if !keep {
                continue;
            }
            let mut values: Vec<String> = items.into_iter().map(str::to_string).collect();
            if !defined.is_empty() {
                values.extend(
                    nested
                        .iter()
                        .map(|i| format!("#{}", defined[i.index(defined.len())])),
                );
            }
            defined.push(name);
            files.push((
                TagId::parse(name).expect("pool ids are valid"),
                TagFile { values },
            ));
        }
        files
    })
}

/// Strategy for ingredients over the pools, nested at most two levels.
pub fn ingredient_strategy() -> impl Strategy<Value = Ingredient> {
    let leaf = prop_oneof![
        3 => item_id_strategy().prop_map(Ingredient::item),
        1 => tag_id_strategy().prop_map(Ingredient::tag),
    ];
    leaf.prop_recursive(2, 8, 3, |inner| {
        prop::collection::vec(inner, 1..4).prop_map(Ingredient::AnyOf)
    })
}

/// Strategy for valid fuels with positional ids.
pub fn fuels_strategy(max: usize) -> impl Strategy<Value = Vec<Fuel>> {
    prop::collection::vec((ingredient_strategy(), 1u32..4000, 0.0f32..2000.0), 0..max).prop_map(
        |fuels| {
            fuels
                .into_iter()
                .enumerate()
                .map(|(i, (ingredient, duration, temperature))| {
                    Fuel::new(format!("test:fuel_{i}"), ingredient, duration, temperature)
                })
                .collect()
        },
    )
}

/// Strategy for valid fertilizers with positional ids.
pub fn fertilizers_strategy(max: usize) -> impl Strategy<Value = Vec<Fertilizer>> {
    prop::collection::vec((ingredient_strategy(), 0.0f32..1.0, 0.0f32..1.0, 0.0f32..1.0), 0..max)
        .prop_map(|fertilizers| {
            fertilizers
                .into_iter()
                .enumerate()
                .map(|(i, (ingredient, n, p, k))| {
                    Fertilizer::new(format!("test:fertilizer_{i}"), ingredient, n, p, k)
                })
                .collect()
        })
}

/// Strategy for valid heating recipes with positional ids.
pub fn heating_strategy(max: usize) -> impl Strategy<Value = Vec<HeatingRecipe>> {
    prop::collection::vec(
        (ingredient_strategy(), prop::option::of(item_id_strategy()), 0.0f32..1600.0),
        0..max,
    )
    .prop_map(|recipes| {
        recipes
            .into_iter()
            .enumerate()
            .map(|(i, (ingredient, result, temperature))| {
                HeatingRecipe::new(
                    format!("test:heating_{i}"),
                    ingredient,
                    result.map(ItemStack::of),
                    None,
                    temperature,
                )
            })
            .collect()
    })
}

/// Strategy for plain records: `(id, keys)` with small key alphabets.
///
/// Keys may repeat within one record and some records have none.
pub fn keyed_records_strategy(max: usize) -> impl Strategy<Value = Vec<(usize, Vec<u8>)>> {
    prop::collection::vec(prop::collection::vec(0u8..8, 0..4), 0..max)
        .prop_map(|keys| keys.into_iter().enumerate().collect())
}
