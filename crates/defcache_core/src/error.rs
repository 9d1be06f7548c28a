//! Error types for defcache core.

use thiserror::Error;

/// Result type for core operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors that can occur in defcache core operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The source accessor could not supply a record collection.
    ///
    /// The index that observed this error stays stale, so a later query
    /// retries the rebuild.
    #[error("producer '{producer}' unavailable: {reason}")]
    ProducerUnavailable {
        /// Name of the producer (or the index that queried it).
        producer: String,
        /// Why the producer could not answer.
        reason: String,
    },

    /// A registry was read before its first load.
    #[error("registry '{registry}' has not been loaded")]
    RegistryNotLoaded {
        /// Name of the registry.
        registry: String,
    },
}

impl CacheError {
    /// Creates a producer unavailable error.
    pub fn producer_unavailable(producer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ProducerUnavailable {
            producer: producer.into(),
            reason: reason.into(),
        }
    }

    /// Creates a registry not loaded error.
    pub fn registry_not_loaded(registry: impl Into<String>) -> Self {
        Self::RegistryNotLoaded {
            registry: registry.into(),
        }
    }
}
