//! # defcache testkit
//!
//! Test utilities for defcache.
//!
//! This crate provides:
//! - Call-counting sources and on-disk data directory fixtures
//! - Property-based test generators using proptest
//! - Stress helpers that reload while many threads read
//!
//! ## Usage
//!
//! ```rust,ignore
//! use defcache_defs::{Fuel, Ingredient};
//! use defcache_testkit::prelude::*;
//!
//! #[test]
//! fn loads_fixture() {
//!     let dir = DataDir::new();
//!     dir.write_definition(
//!         "coal",
//!         &Fuel::new("", Ingredient::item(item("minecraft:coal")), 1600, 1350.0),
//!     );
//!     let definitions = dir.open();
//!     // ... lookups
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
