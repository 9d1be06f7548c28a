//! Inspect command implementation.

use defcache_defs::{DataManager, Definitions, ItemDefinition};
use serde::Serialize;
use std::path::Path;

/// Data directory inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Data directory path.
    pub path: String,
    /// Number of item tags.
    pub tags: usize,
    /// Per-kind statistics.
    pub kinds: Vec<KindStats>,
}

/// Statistics for one definition kind.
#[derive(Debug, Serialize)]
pub struct KindStats {
    /// Kind name.
    pub kind: String,
    /// Loaded definitions.
    pub definitions: usize,
    /// Distinct item types in the index.
    pub keys: usize,
    /// Most definitions sharing one item type.
    pub largest_bucket: usize,
    /// Ids of definitions no item can reach (if requested).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unreachable: Option<Vec<String>>,
}

/// Runs the inspect command.
pub fn run(
    path: &Path,
    definitions: &Definitions,
    show_unreachable: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = inspect(path, definitions, show_unreachable)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Collects statistics for every kind.
pub fn inspect(
    path: &Path,
    definitions: &Definitions,
    show_unreachable: bool,
) -> Result<InspectResult, Box<dyn std::error::Error>> {
    Ok(InspectResult {
        path: path.display().to_string(),
        tags: definitions.tags().snapshot().len(),
        kinds: vec![
            kind_stats(definitions.fuels(), show_unreachable)?,
            kind_stats(definitions.fertilizers(), show_unreachable)?,
            kind_stats(definitions.heating_recipes(), show_unreachable)?,
        ],
    })
}

fn kind_stats<D: ItemDefinition>(
    manager: &DataManager<D>,
    show_unreachable: bool,
) -> Result<KindStats, Box<dyn std::error::Error>> {
    let summary = manager.summary()?;
    let unreachable = if show_unreachable {
        Some(
            manager
                .unreachable()?
                .iter()
                .map(|d| d.id().to_string())
                .collect(),
        )
    } else {
        None
    };

    Ok(KindStats {
        kind: D::KIND.to_string(),
        definitions: summary.records,
        keys: summary.keys,
        largest_bucket: summary.largest_bucket,
        unreachable,
    })
}

fn print_text_output(result: &InspectResult) {
    println!("defcache Data Inspection");
    println!("========================");
    println!();
    println!("Path: {}", result.path);
    println!("Tags: {}", result.tags);
    println!();
    println!("Definitions:");
    for kind in &result.kinds {
        println!(
            "  {:<12} {:>5} definitions, {:>5} item keys, largest bucket {}",
            kind.kind, kind.definitions, kind.keys, kind.largest_bucket
        );
        if let Some(unreachable) = &kind.unreachable {
            for id in unreachable {
                println!("    unreachable: {}", id);
            }
        }
    }
}
