//! # defcache core
//!
//! Reloadable, indirectly-indexed lookup caches.
//!
//! This crate provides:
//! - [`InvalidationBroadcaster`] - shared "something reloaded" signal
//! - [`IndirectIndex`] - key → candidate records, rebuilt lazily when stale
//! - [`Registry`] - a reloadable producer of definitions
//! - Configuration, statistics and error types
//!
//! ## Example
//!
//! ```rust
//! use defcache_core::{IndexConfig, InvalidationBroadcaster, InvalidationCause, Registry};
//! use std::sync::Arc;
//!
//! struct Fuel {
//!     items: Vec<&'static str>,
//!     burn_ticks: u32,
//! }
//!
//! let broadcaster = InvalidationBroadcaster::shared();
//! let fuels = Arc::new(Registry::new("fuels", &broadcaster));
//! let index = fuels.index(IndexConfig::named("fuels"), |f: &Arc<Fuel>| f.items.clone());
//!
//! fuels.replace(
//!     vec![Fuel { items: vec!["coal"], burn_ticks: 1600 }],
//!     InvalidationCause::DataReload,
//! );
//!
//! let fuel = index.find_first(&"coal", |_| true).unwrap().unwrap();
//! assert_eq!(fuel.burn_ticks, 1600);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod broadcast;
mod config;
mod error;
mod index;
mod registry;
mod stats;

pub use broadcast::{
    InvalidationBroadcaster, InvalidationCallback, InvalidationCause, SubscriptionHandle,
};
pub use config::IndexConfig;
pub use error::{CacheError, CacheResult};
pub use index::{Bucket, IndexSummary, IndirectIndex};
pub use registry::Registry;
pub use stats::{BroadcastStats, BroadcastStatsSnapshot, IndexStats, IndexStatsSnapshot};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
