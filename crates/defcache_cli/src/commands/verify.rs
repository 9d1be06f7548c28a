//! Verify command implementation.

use defcache_defs::{Definitions, Issue};
use std::path::Path;

/// Runs the verify command.
///
/// Fails if any definition is unreachable or refers to a missing tag.
pub fn run(path: &Path, definitions: &Definitions) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying data directory at {:?}", path);
    println!();

    let issues = definitions.verify()?;
    for issue in &issues {
        match issue {
            Issue::Unreachable { kind, id } => {
                println!("  [{}] {}: accepts no item and can never be found", kind, id);
            }
            Issue::UnresolvedTag { kind, id, tag } => {
                println!("  [{}] {}: refers to unknown tag {}", kind, id, tag);
            }
        }
    }

    if issues.is_empty() {
        println!("No issues found.");
        Ok(())
    } else {
        println!();
        Err(format!("{} issue(s) found", issues.len()).into())
    }
}
