//! Error types for the Supabase provider

use thiserror::Error;

/// Supabase provider errors
#[derive(Error, Debug)]
pub enum SupabaseError {
    /// API request returned an error status
    #[error("Supabase API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// The bearer token was rejected
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Failed to parse an API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] bridge_traits::error::BridgeError),
}

/// Result type for Supabase operations
pub type Result<T> = std::result::Result<T, SupabaseError>;

impl From<SupabaseError> for core_data::DataError {
    fn from(error: SupabaseError) -> Self {
        core_data::DataError::Remote(error.to_string())
    }
}
