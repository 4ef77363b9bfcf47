//! Error types for authentication operations.

use thiserror::Error;

/// Errors surfaced by the auth client and session manager.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The email/password pair was rejected by the backend.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The account exists but its email address has not been confirmed.
    #[error("Email address not confirmed")]
    EmailNotConfirmed,

    /// The backend rejected the request for another reason.
    #[error("Authentication failed ({status}): {message}")]
    AuthenticationFailed { status: u16, message: String },

    /// The stored session can no longer be refreshed.
    #[error("Session expired, sign in again")]
    SessionExpired,

    /// The operation requires a signed-in user.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The platform secure store could not be reached.
    #[error("Secure storage unavailable: {0}")]
    SecureStorageUnavailable(String),

    /// A session payload could not be serialized or parsed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The auth endpoint could not be reached.
    #[error("Network error: {0}")]
    Network(#[from] bridge_traits::error::BridgeError),
}

impl AuthError {
    /// True when retrying the same operation later can succeed without the
    /// user re-entering credentials.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AuthError::Network(_) | AuthError::SecureStorageUnavailable(_)
        )
    }
}

/// Result type alias for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;
