//! Data directory loading.

use crate::error::{DefsError, DefsResult};
use crate::item::DEFAULT_NAMESPACE;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Configuration for loading definitions from a data directory.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Namespace given to ids derived from file names.
    pub namespace: String,

    /// Whether one malformed file fails the whole load.
    ///
    /// When false, malformed files are logged and skipped.
    pub strict: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            strict: false,
        }
    }
}

impl LoaderConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the id namespace.
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Sets strict mode.
    #[must_use]
    pub const fn strict(mut self, value: bool) -> Self {
        self.strict = value;
        self
    }
}

/// Reads every `*.json` file directly under `dir`, sorted by path.
///
/// Returns `(file stem, parsed value)` pairs. A missing directory yields
/// nothing.
pub fn read_json_dir<T>(dir: &Path, config: &LoaderConfig) -> DefsResult<Vec<(String, T)>>
where
    T: DeserializeOwned,
{
    if !dir.is_dir() {
        debug!(?dir, "data folder missing; nothing to load");
        return Ok(Vec::new());
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    paths.retain(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"));
    paths.sort();

    let mut loaded = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            warn!(?path, "skipping file with non UTF-8 name");
            continue;
        };
        match parse_file::<T>(&path) {
            Ok(value) => loaded.push((stem, value)),
            Err(err) if !config.strict => {
                warn!(?path, error = %err, "skipping malformed data file");
            }
            Err(err) => return Err(err),
        }
    }
    debug!(?dir, files = loaded.len(), "loaded data folder");
    Ok(loaded)
}

fn parse_file<T: DeserializeOwned>(path: &Path) -> DefsResult<T> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|source| DefsError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Entry {
        value: u32,
    }

    #[test]
    fn default_config() {
        let config = LoaderConfig::default();
        assert_eq!(config.namespace, "minecraft");
        assert!(!config.strict);
    }

    #[test]
    fn missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let loaded: Vec<(String, Entry)> =
            read_json_dir(&dir.path().join("nope"), &LoaderConfig::new()).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn reads_sorted_json_files_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.json"), r#"{"value": 2}"#).unwrap();
        fs::write(dir.path().join("a.json"), r#"{"value": 1}"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let loaded: Vec<(String, Entry)> = read_json_dir(dir.path(), &LoaderConfig::new()).unwrap();
        assert_eq!(
            loaded,
            vec![
                ("a".to_string(), Entry { value: 1 }),
                ("b".to_string(), Entry { value: 2 })
            ]
        );
    }

    #[test]
    fn malformed_file_skipped_unless_strict() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("good.json"), r#"{"value": 1}"#).unwrap();
        fs::write(dir.path().join("bad.json"), r#"{"value": "#).unwrap();

        let loaded: Vec<(String, Entry)> = read_json_dir(dir.path(), &LoaderConfig::new()).unwrap();
        assert_eq!(loaded.len(), 1);

        let strict = LoaderConfig::new().strict(true);
        let err = read_json_dir::<Entry>(dir.path(), &strict).unwrap_err();
        assert!(matches!(err, DefsError::Json { .. }));
    }
}
