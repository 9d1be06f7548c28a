//! Invalidation broadcaster shared by every cache.
//!
//! Reload triggers (data reload, resource reload, network resync, world
//! load) only know that *something* changed. Caches only know how to mark
//! themselves stale. The broadcaster connects the two without either side
//! knowing about the other:
//!
//! - Caches subscribe a zero-argument callback once, at construction.
//! - Any reload path calls [`InvalidationBroadcaster::notify_all`] after
//!   its new data is visible.
//! - Every callback runs synchronously, in registration order, on the
//!   calling thread.
//!
//! A panicking callback is caught and logged; the remaining callbacks still
//! run.
//!
//! # Usage
//!
//! ```rust
//! use defcache_core::{InvalidationBroadcaster, InvalidationCause};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let broadcaster = InvalidationBroadcaster::shared();
//! let hits = Arc::new(AtomicUsize::new(0));
//!
//! let counter = Arc::clone(&hits);
//! broadcaster.subscribe(move || {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! broadcaster.notify(InvalidationCause::DataReload);
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! ```

use crate::stats::{BroadcastStats, BroadcastStatsSnapshot};
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error};

/// A registered invalidation callback.
pub type InvalidationCallback = Arc<dyn Fn() + Send + Sync>;

/// Why a broadcast was sent. Used for logging only; callbacks get no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidationCause {
    /// Data-driven definitions were reloaded.
    DataReload,
    /// Resources (e.g. tags) were reloaded.
    ResourceReload,
    /// A network resync replaced local definitions.
    NetworkSync,
    /// A world or session was (re)loaded.
    WorldLoad,
    /// Explicit request from host code.
    Manual,
}

impl fmt::Display for InvalidationCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DataReload => "data_reload",
            Self::ResourceReload => "resource_reload",
            Self::NetworkSync => "network_sync",
            Self::WorldLoad => "world_load",
            Self::Manual => "manual",
        };
        f.write_str(name)
    }
}

/// Handle returned by [`InvalidationBroadcaster::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    /// Returns the raw subscription id.
    pub fn id(&self) -> u64 {
        self.0
    }
}

struct Subscriber {
    id: u64,
    callback: InvalidationCallback,
}

/// Publish/subscribe hub for "invalidate me" callbacks.
///
/// The broadcaster is an ordinary value: the host creates one (usually as
/// an `Arc`) and hands it to every index and producer that needs it.
pub struct InvalidationBroadcaster {
    /// Subscribers in registration order.
    subscribers: RwLock<Vec<Subscriber>>,
    /// Next subscription id to hand out.
    next_id: AtomicU64,
    /// Counters.
    stats: BroadcastStats,
}

impl InvalidationBroadcaster {
    /// Creates a new broadcaster with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            stats: BroadcastStats::new(),
        }
    }

    /// Creates a new broadcaster wrapped in an `Arc`.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Registers a callback to run on every notification.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.write().push(Subscriber {
            id,
            callback: Arc::new(callback),
        });
        SubscriptionHandle(id)
    }

    /// Removes a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != handle.0);
        subscribers.len() != before
    }

    /// Logs the cause and notifies every subscriber.
    pub fn notify(&self, cause: InvalidationCause) {
        debug!(%cause, subscribers = self.subscriber_count(), "broadcasting invalidation");
        self.notify_all();
    }

    /// Invokes every registered callback in registration order.
    ///
    /// The subscriber list is snapshotted first, so a callback may
    /// subscribe or unsubscribe without deadlocking; such changes take
    /// effect from the next notification.
    pub fn notify_all(&self) {
        self.stats.record_notification();

        let snapshot: Vec<(u64, InvalidationCallback)> = self
            .subscribers
            .read()
            .iter()
            .map(|s| (s.id, Arc::clone(&s.callback)))
            .collect();

        for (id, callback) in snapshot {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| callback()));
            if let Err(payload) = outcome {
                error!(
                    subscription = id,
                    panic = %panic_message(payload.as_ref()),
                    "invalidation subscriber panicked; continuing with remaining subscribers"
                );
                self.stats.record_callback(true);
            } else {
                self.stats.record_callback(false);
            }
        }
    }

    /// Returns the number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Returns a snapshot of the broadcaster counters.
    pub fn stats(&self) -> BroadcastStatsSnapshot {
        self.stats.snapshot()
    }
}

impl Default for InvalidationBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InvalidationBroadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvalidationBroadcaster")
            .field("subscribers", &self.subscriber_count())
            .field("stats", &self.stats())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
