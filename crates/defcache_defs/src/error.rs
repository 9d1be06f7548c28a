//! Error types for definition loading and lookup.

use defcache_core::CacheError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for definition operations.
pub type DefsResult<T> = Result<T, DefsError>;

/// Errors that can occur while loading, syncing or querying definitions.
#[derive(Debug, Error)]
pub enum DefsError {
    /// Cache or registry error.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A data file is not valid JSON for its kind.
    #[error("invalid JSON in {path:?}: {source}")]
    Json {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying parser error.
        #[source]
        source: serde_json::Error,
    },

    /// Sync packet could not be encoded.
    #[error("sync packet encoding failed: {message}")]
    EncodingFailed {
        /// Description of the encoding error.
        message: String,
    },

    /// Sync packet could not be decoded.
    #[error("sync packet decoding failed: {message}")]
    DecodingFailed {
        /// Description of the decoding error.
        message: String,
    },

    /// A definition parsed but its values are unusable.
    #[error("invalid definition {id}: {message}")]
    InvalidDefinition {
        /// Definition id.
        id: String,
        /// What is wrong with it.
        message: String,
    },

    /// A resource id is malformed.
    #[error("invalid resource id: {id:?}")]
    InvalidResourceId {
        /// The offending id.
        id: String,
    },

    /// A tag references a tag that does not exist.
    #[error("unknown tag: {tag}")]
    UnknownTag {
        /// The missing tag.
        tag: String,
    },

    /// Tags reference each other in a cycle.
    #[error("tag cycle through {tag}")]
    TagCycle {
        /// A tag on the cycle.
        tag: String,
    },

    /// A sync packet was meant for another definition kind.
    #[error("sync packet kind mismatch: expected {expected}, got {actual}")]
    KindMismatch {
        /// Kind of the receiving manager.
        expected: String,
        /// Kind found in the packet.
        actual: String,
    },
}

impl DefsError {
    /// Creates an invalid definition error.
    pub fn invalid_definition(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid resource id error.
    pub fn invalid_resource_id(id: impl Into<String>) -> Self {
        Self::InvalidResourceId { id: id.into() }
    }

    /// Creates an encoding failed error.
    pub fn encoding_failed(message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            message: message.into(),
        }
    }

    /// Creates a decoding failed error.
    pub fn decoding_failed(message: impl Into<String>) -> Self {
        Self::DecodingFailed {
            message: message.into(),
        }
    }
}
