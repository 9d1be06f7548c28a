//! Lookup command implementation.

use defcache_defs::{Definitions, ItemDefinition, ItemId, ItemStack};
use serde::Serialize;
use std::sync::Arc;

/// Definitions that apply to one item stack.
#[derive(Debug, Serialize)]
pub struct LookupResult {
    /// Queried item.
    pub item: String,
    /// Queried count.
    pub count: u32,
    /// Matching fuels, first one wins.
    pub fuel: Vec<serde_json::Value>,
    /// Matching fertilizers, first one wins.
    pub fertilizer: Vec<serde_json::Value>,
    /// Matching heating recipes, first one wins.
    pub heating: Vec<serde_json::Value>,
}

/// Runs the lookup command.
pub fn run(
    definitions: &Definitions,
    item: &str,
    count: u32,
    all: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = lookup(definitions, item, count, all)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            println!("{} x{}", result.item, result.count);
            print_matches("fuel", &result.fuel);
            print_matches("fertilizer", &result.fertilizer);
            print_matches("heating", &result.heating);
        }
    }

    Ok(())
}

/// Finds the definitions of every kind that apply to `item`.
///
/// Only the winning definition per kind is returned unless `all` is set.
pub fn lookup(
    definitions: &Definitions,
    item: &str,
    count: u32,
    all: bool,
) -> Result<LookupResult, Box<dyn std::error::Error>> {
    let stack = ItemStack::new(ItemId::parse(item)?, count);

    Ok(LookupResult {
        item: stack.item.to_string(),
        count,
        fuel: describe(candidates(all, &stack, |s| definitions.fuels().get_all(s))?)?,
        fertilizer: describe(candidates(all, &stack, |s| definitions.fertilizers().get_all(s))?)?,
        heating: describe(candidates(all, &stack, |s| {
            definitions.heating_recipes().get_all(s)
        })?)?,
    })
}

fn candidates<D, F>(
    all: bool,
    stack: &ItemStack,
    get_all: F,
) -> Result<Vec<Arc<D>>, Box<dyn std::error::Error>>
where
    F: Fn(&ItemStack) -> defcache_defs::DefsResult<Vec<Arc<D>>>,
{
    let mut found = get_all(stack)?;
    if !all {
        found.truncate(1);
    }
    Ok(found)
}

fn describe<D: ItemDefinition>(
    found: Vec<Arc<D>>,
) -> Result<Vec<serde_json::Value>, Box<dyn std::error::Error>> {
    found
        .iter()
        .map(|definition| {
            let mut value = serde_json::to_value(definition.as_ref())?;
            if let Some(object) = value.as_object_mut() {
                object.insert("id".to_string(), definition.id().into());
            }
            Ok::<_, Box<dyn std::error::Error>>(value)
        })
        .collect()
}

fn print_matches(kind: &str, found: &[serde_json::Value]) {
    if found.is_empty() {
        println!("  {:<11} -", kind);
        return;
    }
    for value in found {
        let id = value.get("id").and_then(|id| id.as_str()).unwrap_or("?");
        println!("  {:<11} {}  {}", kind, id, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defcache_defs::{Fertilizer, Fuel, Ingredient};
    use defcache_testkit::{item, DataDir};

    fn fixture() -> (DataDir, Definitions) {
        let dir = DataDir::new();
        dir.write_definition(
            "a_coal",
            &Fuel::new("", Ingredient::item(item("coal")), 2200, 1415.0),
        );
        dir.write_definition("b_coal", &Fuel::new("", Ingredient::item(item("coal")), 100, 10.0));
        dir.write_definition(
            "bone_meal",
            &Fertilizer::new("", Ingredient::item(item("bone_meal")), 0.0, 0.1, 0.0),
        );
        let definitions = dir.open();
        (dir, definitions)
    }

    #[test]
    fn reports_first_match_per_kind() {
        let (_dir, definitions) = fixture();
        let result = lookup(&definitions, "coal", 1, false).unwrap();

        assert_eq!(result.item, "minecraft:coal");
        assert_eq!(result.fuel.len(), 1);
        assert_eq!(result.fuel[0]["id"], "minecraft:a_coal");
        assert_eq!(result.fuel[0]["duration"], 2200);
        assert!(result.fertilizer.is_empty());
        assert!(result.heating.is_empty());
    }

    #[test]
    fn all_lists_every_candidate_in_order() {
        let (_dir, definitions) = fixture();
        let result = lookup(&definitions, "minecraft:coal", 1, true).unwrap();
        let ids: Vec<_> = result.fuel.iter().map(|v| v["id"].clone()).collect();
        assert_eq!(ids, vec!["minecraft:a_coal", "minecraft:b_coal"]);
    }

    #[test]
    fn empty_stack_matches_nothing_and_bad_ids_fail() {
        let (_dir, definitions) = fixture();
        assert!(lookup(&definitions, "coal", 0, true).unwrap().fuel.is_empty());
        assert!(lookup(&definitions, "Not An Id", 1, false).is_err());
    }
}
