//! Read-only view over the records stored under one key.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// The records an index holds for one key, in source order.
///
/// A `Bucket` is a cheap handle: cloning it bumps a reference count. It
/// stays valid after the index rebuilds, but then describes the old
/// collection, so callers should not keep one across an invalidation.
pub struct Bucket<R> {
    records: Arc<[R]>,
}

impl<R> Bucket<R> {
    /// Creates an empty bucket.
    pub fn empty() -> Self {
        Self {
            records: Arc::from(Vec::new()),
        }
    }

    /// Returns the records as a slice.
    pub fn as_slice(&self) -> &[R] {
        &self.records
    }
}

impl<R: Clone> Bucket<R> {
    /// Copies the record handles into a `Vec`.
    pub fn to_vec(&self) -> Vec<R> {
        self.records.to_vec()
    }
}

impl<R> From<Vec<R>> for Bucket<R> {
    fn from(records: Vec<R>) -> Self {
        Self {
            records: Arc::from(records),
        }
    }
}

impl<R> Clone for Bucket<R> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<R> Default for Bucket<R> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<R> Deref for Bucket<R> {
    type Target = [R];

    fn deref(&self) -> &[R] {
        &self.records
    }
}

impl<'a, R> IntoIterator for &'a Bucket<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl<R: PartialEq> PartialEq for Bucket<R> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<R: Eq> Eq for Bucket<R> {}

impl<R: fmt::Debug> fmt::Debug for Bucket<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.records.iter()).finish()
    }
}
