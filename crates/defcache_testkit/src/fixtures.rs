//! Test fixtures.
//!
//! Provides sources that count how often an index reads them and
//! temporary data directories laid out the way the loaders expect.

use defcache_core::{CacheError, CacheResult};
use defcache_defs::{
    Definitions, ItemDefinition, ItemId, ItemStack, LoaderConfig, TAG_FOLDER,
};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Parses an item id, panicking on malformed input.
pub fn item(raw: &str) -> ItemId {
    ItemId::parse(raw).expect("valid item id")
}

/// A stack of one `raw` item.
pub fn stack(raw: &str) -> ItemStack {
    ItemStack::of(item(raw))
}

/// A swappable record source that counts reads.
///
/// Clones share state, so one clone can be handed to an index while the
/// test keeps another to swap records or inspect the call count.
#[derive(Debug)]
pub struct CountingSource<R> {
    records: Arc<Mutex<Vec<R>>>,
    calls: Arc<AtomicUsize>,
    offline: Arc<AtomicBool>,
}

impl<R> Clone for CountingSource<R> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            calls: Arc::clone(&self.calls),
            offline: Arc::clone(&self.offline),
        }
    }
}

impl<R: Clone + Send + 'static> CountingSource<R> {
    /// Creates a source serving `records`.
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            calls: Arc::new(AtomicUsize::new(0)),
            offline: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replaces the served records. Does not notify anyone.
    pub fn set(&self, records: Vec<R>) {
        *self.records.lock() = records;
    }

    /// While offline, every read fails with `ProducerUnavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of reads so far, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns an accessor suitable for `IndirectIndex::new`.
    pub fn accessor(&self) -> impl Fn() -> CacheResult<Vec<R>> + Send + Sync + 'static
    where
        R: Sync,
    {
        let source = self.clone();
        move || {
            source.calls.fetch_add(1, Ordering::SeqCst);
            if source.offline.load(Ordering::SeqCst) {
                return Err(CacheError::producer_unavailable("counting source", "offline"));
            }
            Ok(source.records.lock().clone())
        }
    }
}

/// A temporary data directory with automatic cleanup.
pub struct DataDir {
    dir: TempDir,
}

impl DataDir {
    /// Creates an empty data directory.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Returns the data root.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `body` to `relative` under the root, creating folders.
    pub fn write_raw(&self, relative: impl AsRef<Path>, body: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create data folder");
        }
        fs::write(&path, body).expect("Failed to write data file");
        path
    }

    /// Writes an item tag file. Values are item ids or `#`-prefixed tags.
    pub fn write_tag(&self, stem: &str, values: &[&str]) -> PathBuf {
        let body = serde_json::json!({ "values": values }).to_string();
        self.write_raw(Path::new(TAG_FOLDER).join(format!("{stem}.json")), &body)
    }

    /// Writes a definition to its kind's folder.
    pub fn write_definition<D: ItemDefinition>(&self, stem: &str, definition: &D) -> PathBuf {
        let body =
            serde_json::to_string_pretty(definition).expect("Failed to serialize definition");
        self.write_raw(Path::new(D::FOLDER).join(format!("{stem}.json")), &body)
    }

    /// Removes a file previously written under the root.
    pub fn remove(&self, relative: impl AsRef<Path>) {
        fs::remove_file(self.dir.path().join(relative)).expect("Failed to remove data file");
    }

    /// Loads the directory with the default loader configuration.
    pub fn open(&self) -> Definitions {
        self.open_with(&LoaderConfig::default())
    }

    /// Loads the directory with `config`.
    pub fn open_with(&self, config: &LoaderConfig) -> Definitions {
        Definitions::open(self.path(), config).expect("Failed to load data directory")
    }
}

impl Default for DataDir {
    fn default() -> Self {
        Self::new()
    }
}
