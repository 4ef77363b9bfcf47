//! Error types for the data layer.

use thiserror::Error;

/// Errors surfaced by the data service.
#[derive(Error, Debug)]
pub enum DataError {
    /// The operation requires a signed-in user.
    #[error("Not signed in")]
    NotSignedIn,

    /// Obtaining or refreshing the session failed.
    #[error("Auth error: {0}")]
    Auth(#[from] core_auth::AuthError),

    /// The local cache could not be read or written.
    #[error("Cache error: {0}")]
    Cache(#[from] core_cache::CacheError),

    /// The backend rejected or failed a collection request.
    #[error("Remote error: {0}")]
    Remote(String),

    /// A bulk sync failed; the message aggregates each failed collection.
    #[error("Sync failed: {message}")]
    Sync { message: String },

    /// The referenced row does not exist.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// Folder names must contain at least one non-whitespace character.
    #[error("Folder name cannot be empty")]
    EmptyFolderName,
}

/// Result type alias for data operations.
pub type Result<T> = std::result::Result<T, DataError>;
