//! CLI command implementations.

pub mod inspect;
pub mod lookup;
pub mod verify;

use defcache_defs::{Definitions, LoaderConfig};
use std::path::Path;
use tracing::debug;

/// Loads a data directory, failing if it does not exist.
pub fn open(
    path: &Path,
    namespace: Option<&str>,
    strict: bool,
) -> Result<Definitions, Box<dyn std::error::Error>> {
    if !path.is_dir() {
        return Err(format!("No data directory found at {:?}", path).into());
    }
    let mut config = LoaderConfig::new().strict(strict);
    if let Some(namespace) = namespace {
        config = config.namespace(namespace);
    }
    debug!(?path, ?config, "opening data directory");
    Ok(Definitions::open(path, &config)?)
}
