//! Indirect indexes over reloadable record collections.
//!
//! An index never owns the records it serves. It holds a key extractor and
//! a source accessor, and rebuilds its map from the source whenever it has
//! been invalidated since the last build.
//!
//! # Types
//!
//! - [`IndirectIndex`]: key → candidate records, lazily rebuilt
//! - [`Bucket`]: shared read-only view of one key's records
//!
//! # Warning
//!
//! The index only narrows. Callers must still run the full predicate over
//! each candidate, e.g. via [`IndirectIndex::find_first`].

mod bucket;
mod indirect;

pub use bucket::Bucket;
pub use indirect::{IndexSummary, IndirectIndex};
