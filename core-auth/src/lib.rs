//! # Authentication Module
//!
//! Email/password authentication and session management for the songbook
//! core.
//!
//! ## Overview
//!
//! - [`gotrue`] - thin client for the backend's GoTrue-compatible auth REST
//!   endpoints (sign-up, password grant, token refresh, logout)
//! - [`session_store`] - secure persistence of the session through the
//!   platform `SecureStore` bridge
//! - [`manager`] - the [`SessionManager`] state machine the application
//!   observes: `SignedOut -> Authenticating -> SignedIn`
//!
//! Tokens never appear in logs; `Debug` implementations redact them.

pub mod error;
pub mod gotrue;
pub mod manager;
pub mod session_store;
pub mod types;

pub use error::{AuthError, Result};
pub use gotrue::PasswordAuthClient;
pub use manager::SessionManager;
pub use session_store::SessionStore;
pub use types::{AuthState, Session, SessionTokens, SignUpOutcome};
