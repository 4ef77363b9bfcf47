use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Access and refresh tokens for an authenticated session.
///
/// # Security
///
/// Tokens are stored securely and never logged. The `Debug` implementation
/// redacts token values.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    /// Bearer token sent with every authenticated API request
    pub access_token: String,
    /// Token used to obtain a new access token
    pub refresh_token: String,
    /// When the access token expires (UTC)
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

impl SessionTokens {
    /// Create a token set expiring `expires_in` seconds from now.
    pub fn new(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: chrono::Utc::now() + chrono::Duration::seconds(expires_in),
        }
    }

    /// Check if the access token is expired or expires within the buffer.
    ///
    /// The buffer lets callers refresh shortly before actual expiry so that
    /// in-flight requests never carry a token that dies mid-request.
    pub fn is_expired_with_buffer(&self, buffer_seconds: i64) -> bool {
        let now = chrono::Utc::now();
        now >= self.expires_at - chrono::Duration::seconds(buffer_seconds)
    }

    /// Check if the access token is expired with the default 60 second buffer.
    pub fn is_expired(&self) -> bool {
        self.is_expired_with_buffer(60)
    }
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// An authenticated session: the user identity plus its tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Backend-assigned user identifier
    pub user_id: Uuid,
    /// The email the account was registered with
    pub email: String,
    /// Current token set
    pub tokens: SessionTokens,
}

/// Authentication state observed by the application.
///
/// # State Transitions
///
/// ```text
/// SignedOut -> Authenticating -> SignedIn
///     ^              |              |
///     +--------------+--------------+
/// ```
///
/// `Authenticating` covers both an interactive sign-in and the startup
/// session restore; either resolves to `SignedIn` or back to `SignedOut`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AuthState {
    /// No user is signed in
    #[default]
    SignedOut,
    /// A sign-in or session restore is in flight
    Authenticating,
    /// A user is signed in
    SignedIn {
        /// The authenticated user
        user_id: Uuid,
    },
}

impl AuthState {
    /// Check if a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::SignedIn { .. })
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthState::SignedOut => write!(f, "Signed Out"),
            AuthState::Authenticating => write!(f, "Authenticating..."),
            AuthState::SignedIn { .. } => write!(f, "Signed In"),
        }
    }
}

/// Result of a sign-up attempt.
///
/// Backends configured to require email confirmation return no session from
/// the sign-up call; the user must confirm and then sign in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The account was created and a session issued immediately.
    SignedIn(Session),
    /// The account was created but awaits email confirmation.
    ConfirmationPending {
        /// The address the confirmation mail was sent to.
        email: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn tokens(expires_at: chrono::DateTime<Utc>) -> SessionTokens {
        SessionTokens {
            access_token: "secret_access".to_string(),
            refresh_token: "secret_refresh".to_string(),
            expires_at,
        }
    }

    #[test]
    fn test_fresh_token_is_not_expired() {
        assert!(!tokens(Utc::now() + Duration::hours(1)).is_expired());
    }

    #[test]
    fn test_token_within_buffer_counts_as_expired() {
        assert!(tokens(Utc::now() + Duration::seconds(30)).is_expired());
    }

    #[test]
    fn test_past_token_is_expired() {
        assert!(tokens(Utc::now() - Duration::hours(1)).is_expired());
    }

    #[test]
    fn test_custom_buffer_is_respected() {
        let t = tokens(Utc::now() + Duration::minutes(10));
        assert!(!t.is_expired_with_buffer(60));
        assert!(t.is_expired_with_buffer(900));
    }

    #[test]
    fn test_debug_redacts_token_values() {
        let t = tokens(Utc::now());
        let debug = format!("{:?}", t);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret_access"));
        assert!(!debug.contains("secret_refresh"));
    }

    #[test]
    fn test_session_debug_redacts_through_tokens() {
        let session = Session {
            user_id: Uuid::new_v4(),
            email: "singer@example.com".to_string(),
            tokens: tokens(Utc::now()),
        };
        let debug = format!("{:?}", session);
        assert!(!debug.contains("secret_access"));
    }

    #[test]
    fn test_auth_state_default_is_signed_out() {
        assert_eq!(AuthState::default(), AuthState::SignedOut);
        assert!(!AuthState::SignedOut.is_authenticated());
        assert!(!AuthState::Authenticating.is_authenticated());
        assert!(AuthState::SignedIn {
            user_id: Uuid::new_v4()
        }
        .is_authenticated());
    }

    #[test]
    fn test_session_round_trips_through_json() {
        let session = Session {
            user_id: Uuid::new_v4(),
            email: "singer@example.com".to_string(),
            tokens: tokens(Utc::now() + Duration::hours(1)),
        };
        let json = serde_json::to_string(&session).unwrap();
        let parsed: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(session, parsed);
    }
}
