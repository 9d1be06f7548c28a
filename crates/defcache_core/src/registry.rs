//! Reloadable definition registry.
//!
//! A `Registry` is the simplest possible producer: it owns the current
//! collection of definitions of one kind, hands out snapshots of it, and
//! broadcasts an invalidation every time the collection is replaced.

use crate::broadcast::{InvalidationBroadcaster, InvalidationCause};
use crate::config::IndexConfig;
use crate::error::{CacheError, CacheResult};
use crate::index::IndirectIndex;
use parking_lot::RwLock;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Owner of the authoritative collection of one definition kind.
///
/// Values are stored as `Arc<D>` in load order. Replacing them never
/// mutates a previously returned snapshot.
pub struct Registry<D> {
    name: String,
    values: RwLock<Option<Arc<[Arc<D>]>>>,
    broadcaster: Arc<InvalidationBroadcaster>,
    /// Number of completed replacements.
    generation: AtomicU64,
}

impl<D> Registry<D>
where
    D: Send + Sync + 'static,
{
    /// Creates an unloaded registry.
    pub fn new(name: impl Into<String>, broadcaster: &Arc<InvalidationBroadcaster>) -> Self {
        Self {
            name: name.into(),
            values: RwLock::new(None),
            broadcaster: Arc::clone(broadcaster),
            generation: AtomicU64::new(0),
        }
    }

    /// Replaces every value, then notifies the broadcaster.
    ///
    /// The new values are visible before any subscriber runs.
    pub fn replace<I>(&self, values: I, cause: InvalidationCause)
    where
        I: IntoIterator<Item = D>,
    {
        let values: Vec<Arc<D>> = values.into_iter().map(Arc::new).collect();
        let count = values.len();
        *self.values.write() = Some(Arc::from(values));
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        info!(registry = %self.name, count, generation, %cause, "registry replaced");
        self.broadcaster.notify(cause);
    }

    /// Drops every value and returns to the unloaded state.
    pub fn unload(&self) {
        *self.values.write() = None;
        info!(registry = %self.name, "registry unloaded");
        self.broadcaster.notify(InvalidationCause::WorldLoad);
    }

    /// Returns a snapshot of the current values.
    pub fn values(&self) -> CacheResult<Arc<[Arc<D>]>> {
        self.values
            .read()
            .clone()
            .ok_or_else(|| CacheError::registry_not_loaded(&self.name))
    }

    /// Returns true once values have been loaded.
    pub fn is_loaded(&self) -> bool {
        self.values.read().is_some()
    }

    /// Returns the number of loaded values (0 when unloaded).
    pub fn len(&self) -> usize {
        self.values.read().as_ref().map_or(0, |v| v.len())
    }

    /// Returns true if no values are loaded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns how many times the values have been replaced.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Returns the registry name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the broadcaster this registry notifies.
    pub fn broadcaster(&self) -> &Arc<InvalidationBroadcaster> {
        &self.broadcaster
    }

    /// Returns a source accessor suitable for [`IndirectIndex::new`].
    pub fn source(
        self: &Arc<Self>,
    ) -> impl Fn() -> CacheResult<Vec<Arc<D>>> + Send + Sync + 'static {
        let registry = Arc::clone(self);
        move || registry.values().map(|values| values.to_vec())
    }

    /// Creates an index over this registry on the same broadcaster.
    pub fn index<K, E, KI>(
        self: &Arc<Self>,
        config: IndexConfig,
        extractor: E,
    ) -> IndirectIndex<K, Arc<D>>
    where
        K: Eq + Hash + Send + Sync + 'static,
        E: Fn(&Arc<D>) -> KI + Send + Sync + 'static,
        KI: IntoIterator<Item = K>,
    {
        IndirectIndex::new(&self.broadcaster, config, extractor, self.source())
    }
}

impl<D> fmt::Debug for Registry<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("name", &self.name)
            .field("loaded", &self.values.read().is_some())
            .field("generation", &self.generation.load(Ordering::Acquire))
            .finish()
    }
}
