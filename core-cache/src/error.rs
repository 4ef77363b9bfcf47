//! Error types for the offline cache.

use thiserror::Error;

/// Errors surfaced by cache persistence and the cache accessor.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The underlying blob storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] bridge_traits::error::BridgeError),

    /// A persisted blob could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
