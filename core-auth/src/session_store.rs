//! Secure Session Storage
//!
//! Persists the authenticated session using the platform-specific secure
//! storage mechanism (Keychain, Keystore, DPAPI, Secret Service).
//!
//! ## Security
//!
//! - Token values are never logged or included in error messages
//! - Corrupted payloads are deleted rather than surfaced
//! - The session is erased on sign-out

use crate::error::{AuthError, Result};
use crate::types::Session;
use bridge_traits::storage::SecureStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Key under which the session JSON lives in the secure store.
const SESSION_KEY: &str = "songbook.session";

/// Secure persistence for the authenticated session.
#[derive(Clone)]
pub struct SessionStore {
    secure_store: Arc<dyn SecureStore>,
}

impl SessionStore {
    pub fn new(secure_store: Arc<dyn SecureStore>) -> Self {
        Self { secure_store }
    }

    /// Serialize and store the session, overwriting any previous one.
    pub async fn store_session(&self, session: &Session) -> Result<()> {
        let json = serde_json::to_vec(session)?;

        self.secure_store
            .set_secret(SESSION_KEY, &json)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to store session in secure storage");
                AuthError::SecureStorageUnavailable(e.to_string())
            })?;

        info!(user_id = %session.user_id, "Session stored securely");
        Ok(())
    }

    /// Retrieve the stored session.
    ///
    /// Returns `Ok(None)` when no session is stored. A payload that can no
    /// longer be parsed is deleted and treated as absent, so a corrupted
    /// secure store entry never blocks startup.
    pub async fn load_session(&self) -> Result<Option<Session>> {
        let data = self
            .secure_store
            .get_secret(SESSION_KEY)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to read session from secure storage");
                AuthError::SecureStorageUnavailable(e.to_string())
            })?;

        let Some(data) = data else {
            debug!("No stored session");
            return Ok(None);
        };

        match serde_json::from_slice::<Session>(&data) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(error = %e, "Stored session is corrupted, deleting it");
                if let Err(delete_err) = self.secure_store.delete_secret(SESSION_KEY).await {
                    warn!(error = %delete_err, "Failed to delete corrupted session");
                }
                Ok(None)
            }
        }
    }

    /// Delete the stored session. Deleting a missing session is not an error.
    pub async fn delete_session(&self) -> Result<()> {
        self.secure_store
            .delete_secret(SESSION_KEY)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to delete session from secure storage");
                AuthError::SecureStorageUnavailable(e.to_string())
            })?;

        info!("Session deleted");
        Ok(())
    }
}
