//! # defcache defs
//!
//! Data-driven item definitions served through [`defcache_core`] indexes.
//!
//! Each kind ([`Fuel`], [`Fertilizer`], [`HeatingRecipe`]) is loaded from
//! JSON files, stored in a reloadable registry and looked up by item type
//! through an [`defcache_core::IndirectIndex`] keyed by [`ItemId`]. Item
//! tags feed the key extractor, so reloading tags invalidates every kind.
//!
//! ## Example
//!
//! ```rust
//! use defcache_core::{InvalidationBroadcaster, InvalidationCause};
//! use defcache_defs::{Definitions, Fuel, Ingredient, ItemId, ItemStack};
//!
//! let definitions = Definitions::new(&InvalidationBroadcaster::shared());
//! let coal = ItemId::parse("minecraft:coal").unwrap();
//!
//! definitions
//!     .fuels()
//!     .replace(
//!         vec![Fuel::new("tfc:coal", Ingredient::item(coal.clone()), 2200, 1415.0)],
//!         InvalidationCause::DataReload,
//!     )
//!     .unwrap();
//!
//! let fuel = definitions.fuel(&ItemStack::of(coal)).unwrap().unwrap();
//! assert_eq!(fuel.duration(), 2200);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod definition;
mod definitions;
mod error;
mod fertilizer;
mod fuel;
mod heating;
mod ingredient;
mod item;
mod loader;
mod manager;
mod sync;
mod tags;

pub use definition::ItemDefinition;
pub use definitions::{Definitions, Issue, LoadReport};
pub use error::{DefsError, DefsResult};
pub use fertilizer::Fertilizer;
pub use fuel::Fuel;
pub use heating::HeatingRecipe;
pub use ingredient::Ingredient;
pub use item::{FluidStack, ItemId, ItemStack, ResourceId, TagId, DEFAULT_NAMESPACE};
pub use loader::{read_json_dir, LoaderConfig};
pub use manager::DataManager;
pub use sync::{decode_packet, encode_packet};
pub use tags::{TagFile, TagRegistry, TagSet, TAG_FOLDER};
