//! Cache statistics.
//!
//! Counters for monitoring how often indexes are queried, invalidated and
//! rebuilt, and how the invalidation broadcaster is behaving.
//!
//! # Usage
//!
//! ```rust,ignore
//! let fuels = IndirectIndex::new(&broadcaster, config, extractor, source);
//!
//! fuels.get_all(&item)?;
//!
//! let snap = fuels.stats();
//! println!("Lookups: {}", snap.lookups);
//! println!("Rebuilds: {}", snap.rebuilds);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters kept by a single index.
///
/// All counters are atomic and can be read while queries are in progress.
#[derive(Debug, Default)]
pub struct IndexStats {
    /// Total number of `get_all` calls, including those made through
    /// `find_first` and `find_all`. `summary` is not counted.
    lookups: AtomicU64,
    /// Total number of lookups answered without rebuilding.
    hits: AtomicU64,
    /// Total number of completed rebuilds (including pushed reloads).
    rebuilds: AtomicU64,
    /// Total number of invalidations received.
    invalidations: AtomicU64,
    /// Total number of failed source accessor calls.
    source_failures: AtomicU64,
}

impl IndexStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_lookup(&self, hit: bool) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_rebuild(&self) {
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_source_failure(&self) {
        self.source_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the total number of lookups.
    pub fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }

    /// Returns the number of lookups served from a valid map.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Returns the total number of rebuilds.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds.load(Ordering::Relaxed)
    }

    /// Returns the total number of invalidations.
    pub fn invalidations(&self) -> u64 {
        self.invalidations.load(Ordering::Relaxed)
    }

    /// Returns the total number of source failures.
    pub fn source_failures(&self) -> u64 {
        self.source_failures.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all counters.
    pub fn snapshot(&self) -> IndexStatsSnapshot {
        IndexStatsSnapshot {
            lookups: self.lookups(),
            hits: self.hits(),
            rebuilds: self.rebuilds(),
            invalidations: self.invalidations(),
            source_failures: self.source_failures(),
        }
    }
}

/// A point-in-time copy of [`IndexStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexStatsSnapshot {
    /// Total number of lookups.
    pub lookups: u64,
    /// Lookups served without a rebuild.
    pub hits: u64,
    /// Completed rebuilds.
    pub rebuilds: u64,
    /// Invalidations received.
    pub invalidations: u64,
    /// Failed source accessor calls.
    pub source_failures: u64,
}

/// Counters kept by the invalidation broadcaster.
#[derive(Debug, Default)]
pub struct BroadcastStats {
    notifications: AtomicU64,
    callbacks_invoked: AtomicU64,
    callbacks_failed: AtomicU64,
}

impl BroadcastStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_notification(&self) {
        self.notifications.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_callback(&self, failed: bool) {
        self.callbacks_invoked.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.callbacks_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Returns a snapshot of all counters.
    pub fn snapshot(&self) -> BroadcastStatsSnapshot {
        BroadcastStatsSnapshot {
            notifications: self.notifications.load(Ordering::Relaxed),
            callbacks_invoked: self.callbacks_invoked.load(Ordering::Relaxed),
            callbacks_failed: self.callbacks_failed.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`BroadcastStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BroadcastStatsSnapshot {
    /// Number of `notify_all` calls.
    pub notifications: u64,
    /// Number of callback invocations.
    pub callbacks_invoked: u64,
    /// Number of callback invocations that panicked.
    pub callbacks_failed: u64,
}
