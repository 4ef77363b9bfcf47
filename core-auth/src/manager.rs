//! # Session Manager
//!
//! The auth state machine the application observes. Wraps the GoTrue client
//! and the secure session store, keeps the current [`Session`] in memory,
//! publishes [`AuthState`] through a `tokio::sync::watch` channel and emits
//! [`AuthEvent`]s on the shared event bus.
//!
//! ## Lifecycle
//!
//! 1. `restore()` at startup: re-validates any persisted session, refreshing
//!    it when stale, and lands in `SignedIn` or `SignedOut`.
//! 2. `sign_in` / `sign_up` / `sign_out` drive interactive transitions.
//! 3. `access_token()` hands out a valid bearer token for API calls,
//!    refreshing transparently when the current one is near expiry.

use crate::error::{AuthError, Result};
use crate::gotrue::PasswordAuthClient;
use crate::session_store::SessionStore;
use crate::types::{AuthState, Session, SignUpOutcome};
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Seconds before access token expiry at which a refresh is triggered.
const TOKEN_REFRESH_BUFFER_SECS: i64 = 300;

/// Orchestrates authentication state for the whole core.
pub struct SessionManager {
    auth_client: PasswordAuthClient,
    session_store: SessionStore,
    event_bus: EventBus,
    state_tx: watch::Sender<AuthState>,
    current: Arc<RwLock<Option<Session>>>,
    /// Serializes token refreshes so concurrent callers share one refresh.
    refresh_lock: Arc<Mutex<()>>,
}

impl SessionManager {
    pub fn new(
        auth_client: PasswordAuthClient,
        session_store: SessionStore,
        event_bus: EventBus,
    ) -> Self {
        let (state_tx, _) = watch::channel(AuthState::SignedOut);
        Self {
            auth_client,
            session_store,
            event_bus,
            state_tx,
            current: Arc::new(RwLock::new(None)),
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Current auth state snapshot.
    pub fn state(&self) -> AuthState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to auth state changes.
    ///
    /// The receiver immediately holds the current state and is notified on
    /// every transition.
    pub fn subscribe_state(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    /// The current session, if a user is signed in.
    pub async fn current_session(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    /// The signed-in user's identifier, if any.
    pub async fn current_user_id(&self) -> Option<Uuid> {
        self.current.read().await.as_ref().map(|s| s.user_id)
    }

    /// Re-validate any persisted session at startup.
    ///
    /// Transitions through `Authenticating` and resolves to `SignedIn` when a
    /// stored session is usable, refreshing it first when stale. A refresh
    /// rejected by the backend erases the stored session; a refresh that
    /// merely failed to reach the backend keeps the stored session so cached
    /// data stays reachable offline.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<AuthState> {
        self.set_state(AuthState::Authenticating);
        self.emit(AuthEvent::Authenticating);

        let stored = match self.session_store.load_session().await {
            Ok(stored) => stored,
            Err(e) => return Err(self.fail_signed_out(e)),
        };

        let Some(session) = stored else {
            debug!("No stored session, starting signed out");
            self.set_state(AuthState::SignedOut);
            return Ok(AuthState::SignedOut);
        };

        if !session.tokens.is_expired_with_buffer(TOKEN_REFRESH_BUFFER_SECS) {
            info!(user_id = %session.user_id, "Restored stored session");
            return Ok(self.install_session(session).await);
        }

        info!(user_id = %session.user_id, "Stored session is stale, refreshing");
        match self.auth_client.refresh(&session.tokens.refresh_token).await {
            Ok(refreshed) => {
                if let Err(e) = self.session_store.store_session(&refreshed).await {
                    return Err(self.fail_signed_out(e));
                }
                self.emit(AuthEvent::SessionRefreshed {
                    user_id: refreshed.user_id.to_string(),
                    expires_at: refreshed.tokens.expires_at.timestamp(),
                });
                Ok(self.install_session(refreshed).await)
            }
            Err(AuthError::SessionExpired) => {
                warn!("Stored session can no longer be refreshed, signing out");
                if let Err(e) = self.session_store.delete_session().await {
                    return Err(self.fail_signed_out(e));
                }
                self.set_state(AuthState::SignedOut);
                self.emit(AuthEvent::SignedOut {
                    user_id: Some(session.user_id.to_string()),
                });
                Ok(AuthState::SignedOut)
            }
            Err(e) if e.is_recoverable() => {
                // Offline start: keep the stale session so the user still
                // sees their cached collections.
                warn!(error = %e, "Refresh unreachable, keeping stale session");
                Ok(self.install_session(session).await)
            }
            Err(e) => Err(self.fail_signed_out(e)),
        }
    }

    /// Sign in with email and password.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Uuid> {
        self.set_state(AuthState::Authenticating);
        self.emit(AuthEvent::Authenticating);

        let session = match self.auth_client.sign_in(email, password).await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Sign-in failed");
                self.set_state(AuthState::SignedOut);
                self.emit(AuthEvent::AuthError {
                    message: e.to_string(),
                    recoverable: e.is_recoverable(),
                });
                return Err(e);
            }
        };

        if let Err(e) = self.session_store.store_session(&session).await {
            warn!(error = %e, "Failed to persist session after sign-in");
            return Err(self.fail_signed_out(e));
        }
        let user_id = session.user_id;
        self.install_session(session).await;

        info!(user_id = %user_id, "Sign-in completed");
        Ok(user_id)
    }

    /// Register a new account.
    ///
    /// When the backend issues a session immediately the user ends up signed
    /// in; otherwise the state stays `SignedOut` until the email is
    /// confirmed and the user signs in.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        self.set_state(AuthState::Authenticating);
        self.emit(AuthEvent::Authenticating);

        let outcome = match self.auth_client.sign_up(email, password).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Sign-up failed");
                self.set_state(AuthState::SignedOut);
                self.emit(AuthEvent::AuthError {
                    message: e.to_string(),
                    recoverable: e.is_recoverable(),
                });
                return Err(e);
            }
        };

        match &outcome {
            SignUpOutcome::SignedIn(session) => {
                if let Err(e) = self.session_store.store_session(session).await {
                    warn!(error = %e, "Failed to persist session after sign-up");
                    return Err(self.fail_signed_out(e));
                }
                self.install_session(session.clone()).await;
                info!(user_id = %session.user_id, "Sign-up completed with immediate session");
            }
            SignUpOutcome::ConfirmationPending { email } => {
                self.set_state(AuthState::SignedOut);
                self.emit(AuthEvent::ConfirmationPending {
                    email: email.clone(),
                });
                info!("Sign-up completed, awaiting email confirmation");
            }
        }

        Ok(outcome)
    }

    /// Sign out the current user.
    ///
    /// The server-side logout is best effort; the local session is erased
    /// and the state flips to `SignedOut` regardless of whether the backend
    /// was reachable.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<()> {
        let session = self.current.write().await.take();

        if let Some(ref session) = session {
            if let Err(e) = self
                .auth_client
                .sign_out(&session.tokens.access_token)
                .await
            {
                warn!(error = %e, "Server-side logout failed, clearing local session anyway");
            }
        }

        self.session_store.delete_session().await?;
        self.set_state(AuthState::SignedOut);
        self.emit(AuthEvent::SignedOut {
            user_id: session.as_ref().map(|s| s.user_id.to_string()),
        });

        info!("Sign-out completed");
        Ok(())
    }

    /// A valid bearer token for API requests, refreshing when near expiry.
    ///
    /// Concurrent callers are serialized so a stale token triggers exactly
    /// one refresh.
    #[instrument(skip(self))]
    pub async fn access_token(&self) -> Result<String> {
        let _guard = self.refresh_lock.lock().await;

        let session = self
            .current
            .read()
            .await
            .clone()
            .ok_or(AuthError::NotAuthenticated)?;

        if !session.tokens.is_expired_with_buffer(TOKEN_REFRESH_BUFFER_SECS) {
            return Ok(session.tokens.access_token);
        }

        info!("Access token near expiry, refreshing");
        match self.auth_client.refresh(&session.tokens.refresh_token).await {
            Ok(refreshed) => {
                self.session_store.store_session(&refreshed).await?;
                let token = refreshed.tokens.access_token.clone();
                self.emit(AuthEvent::SessionRefreshed {
                    user_id: refreshed.user_id.to_string(),
                    expires_at: refreshed.tokens.expires_at.timestamp(),
                });
                *self.current.write().await = Some(refreshed);
                Ok(token)
            }
            Err(AuthError::SessionExpired) => {
                error!("Refresh token rejected, signing out");
                self.current.write().await.take();
                self.session_store.delete_session().await?;
                self.set_state(AuthState::SignedOut);
                self.emit(AuthEvent::SignedOut {
                    user_id: Some(session.user_id.to_string()),
                });
                Err(AuthError::SessionExpired)
            }
            Err(e) => Err(e),
        }
    }

    async fn install_session(&self, session: Session) -> AuthState {
        let state = AuthState::SignedIn {
            user_id: session.user_id,
        };
        let user_id = session.user_id;
        *self.current.write().await = Some(session);
        self.set_state(state.clone());
        self.emit(AuthEvent::SignedIn {
            user_id: user_id.to_string(),
        });
        state
    }

    /// Resolve a failed transition to `SignedOut` before surfacing the error.
    fn fail_signed_out(&self, error: AuthError) -> AuthError {
        self.set_state(AuthState::SignedOut);
        self.emit(AuthEvent::AuthError {
            message: error.to_string(),
            recoverable: error.is_recoverable(),
        });
        error
    }

    fn set_state(&self, state: AuthState) {
        self.state_tx.send_replace(state);
    }

    fn emit(&self, event: AuthEvent) {
        let _ = self.event_bus.emit(CoreEvent::Auth(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SessionTokens;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
    use bridge_traits::storage::SecureStore;
    use bytes::Bytes;
    use chrono::{Duration, Utc};
    use std::collections::HashMap;
    use tokio::sync::Mutex as TokioMutex;

    struct MockSecureStore {
        storage: TokioMutex<HashMap<String, Vec<u8>>>,
        fail_writes: bool,
    }

    impl MockSecureStore {
        fn new() -> Self {
            Self {
                storage: TokioMutex::new(HashMap::new()),
                fail_writes: false,
            }
        }

        /// Reads succeed, writes and deletes fail with a storage error.
        fn read_only() -> Self {
            Self {
                storage: TokioMutex::new(HashMap::new()),
                fail_writes: true,
            }
        }
    }

    #[async_trait::async_trait]
    impl SecureStore for MockSecureStore {
        async fn set_secret(&self, key: &str, value: &[u8]) -> BridgeResult<()> {
            if self.fail_writes {
                return Err(BridgeError::StorageError("keychain locked".to_string()));
            }
            self.storage
                .lock()
                .await
                .insert(key.to_string(), value.to_vec());
            Ok(())
        }

        async fn get_secret(&self, key: &str) -> BridgeResult<Option<Vec<u8>>> {
            Ok(self.storage.lock().await.get(key).cloned())
        }

        async fn delete_secret(&self, key: &str) -> BridgeResult<()> {
            if self.fail_writes {
                return Err(BridgeError::StorageError("keychain locked".to_string()));
            }
            self.storage.lock().await.remove(key);
            Ok(())
        }
    }

    /// Pops canned responses in order; fails transport when exhausted.
    struct MockHttpClient {
        responses: TokioMutex<Vec<HttpResponse>>,
    }

    impl MockHttpClient {
        fn new(responses: Vec<HttpResponse>) -> Self {
            Self {
                responses: TokioMutex::new(responses),
            }
        }

        fn unreachable() -> Self {
            Self::new(Vec::new())
        }
    }

    #[async_trait::async_trait]
    impl HttpClient for MockHttpClient {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            let mut responses = self.responses.lock().await;
            if responses.is_empty() {
                return Err(BridgeError::OperationFailed(
                    "connection refused".to_string(),
                ));
            }
            Ok(responses.remove(0))
        }
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    fn token_body(user_id: Uuid) -> String {
        format!(
            r#"{{
                "access_token": "access-new",
                "refresh_token": "refresh-new",
                "expires_in": 3600,
                "token_type": "bearer",
                "user": {{"id": "{}", "email": "singer@example.com"}}
            }}"#,
            user_id
        )
    }

    fn session(user_id: Uuid, expires_at: chrono::DateTime<Utc>) -> Session {
        Session {
            user_id,
            email: "singer@example.com".to_string(),
            tokens: SessionTokens {
                access_token: "access-old".to_string(),
                refresh_token: "refresh-old".to_string(),
                expires_at,
            },
        }
    }

    fn manager(
        responses: Vec<HttpResponse>,
        secure_store: Arc<MockSecureStore>,
    ) -> (SessionManager, EventBus) {
        let event_bus = EventBus::new(100);
        let auth_client = PasswordAuthClient::new(
            Arc::new(MockHttpClient::new(responses)),
            "https://proj.supabase.co".to_string(),
            "anon-key".to_string(),
        );
        let session_store = SessionStore::new(secure_store);
        (
            SessionManager::new(auth_client, session_store, event_bus.clone()),
            event_bus,
        )
    }

    async fn seed_session(store: &MockSecureStore, session: &Session) {
        let json = serde_json::to_vec(session).unwrap();
        store.set_secret("songbook.session", &json).await.unwrap();
    }

    #[tokio::test]
    async fn test_initial_state_is_signed_out() {
        let (manager, _) = manager(vec![], Arc::new(MockSecureStore::new()));
        assert_eq!(manager.state(), AuthState::SignedOut);
        assert!(manager.current_session().await.is_none());
    }

    #[tokio::test]
    async fn test_restore_without_stored_session_stays_signed_out() {
        let (manager, _) = manager(vec![], Arc::new(MockSecureStore::new()));
        let state = manager.restore().await.unwrap();
        assert_eq!(state, AuthState::SignedOut);
    }

    #[tokio::test]
    async fn test_restore_with_fresh_session_signs_in_without_network() {
        let secure = Arc::new(MockSecureStore::new());
        let user_id = Uuid::new_v4();
        seed_session(&secure, &session(user_id, Utc::now() + Duration::hours(1))).await;

        // MockHttpClient has no responses; any call would fail.
        let (manager, _) = manager(vec![], secure);
        let state = manager.restore().await.unwrap();

        assert_eq!(state, AuthState::SignedIn { user_id });
        assert_eq!(manager.current_user_id().await, Some(user_id));
    }

    #[tokio::test]
    async fn test_restore_refreshes_stale_session() {
        let secure = Arc::new(MockSecureStore::new());
        let user_id = Uuid::new_v4();
        seed_session(&secure, &session(user_id, Utc::now() - Duration::hours(1))).await;

        let (manager, bus) = manager(vec![response(200, &token_body(user_id))], secure.clone());
        let mut events = bus.subscribe();

        let state = manager.restore().await.unwrap();
        assert_eq!(state, AuthState::SignedIn { user_id });

        let stored = secure.get_secret("songbook.session").await.unwrap().unwrap();
        let stored: Session = serde_json::from_slice(&stored).unwrap();
        assert_eq!(stored.tokens.access_token, "access-new");

        // Authenticating, SessionRefreshed, SignedIn in order.
        assert!(matches!(
            events.try_recv().unwrap(),
            CoreEvent::Auth(AuthEvent::Authenticating)
        ));
        assert!(matches!(
            events.try_recv().unwrap(),
            CoreEvent::Auth(AuthEvent::SessionRefreshed { .. })
        ));
        assert!(matches!(
            events.try_recv().unwrap(),
            CoreEvent::Auth(AuthEvent::SignedIn { .. })
        ));
    }

    #[tokio::test]
    async fn test_restore_with_rejected_refresh_erases_session() {
        let secure = Arc::new(MockSecureStore::new());
        let user_id = Uuid::new_v4();
        seed_session(&secure, &session(user_id, Utc::now() - Duration::hours(1))).await;

        let (manager, _) = manager(
            vec![response(401, r#"{"msg": "Invalid Refresh Token"}"#)],
            secure.clone(),
        );

        let state = manager.restore().await.unwrap();
        assert_eq!(state, AuthState::SignedOut);
        assert!(secure.get_secret("songbook.session").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_offline_keeps_stale_session() {
        let secure = Arc::new(MockSecureStore::new());
        let user_id = Uuid::new_v4();
        seed_session(&secure, &session(user_id, Utc::now() - Duration::hours(1))).await;

        let (manager, _) = manager(vec![], secure);
        let state = manager.restore().await.unwrap();

        assert_eq!(state, AuthState::SignedIn { user_id });
    }

    #[tokio::test]
    async fn test_sign_in_success_installs_and_persists_session() {
        let secure = Arc::new(MockSecureStore::new());
        let user_id = Uuid::new_v4();
        let (manager, bus) = manager(vec![response(200, &token_body(user_id))], secure.clone());
        let mut events = bus.subscribe();

        let signed_in = manager.sign_in("singer@example.com", "pw").await.unwrap();
        assert_eq!(signed_in, user_id);
        assert_eq!(manager.state(), AuthState::SignedIn { user_id });
        assert!(secure.get_secret("songbook.session").await.unwrap().is_some());

        assert!(matches!(
            events.try_recv().unwrap(),
            CoreEvent::Auth(AuthEvent::Authenticating)
        ));
        assert!(matches!(
            events.try_recv().unwrap(),
            CoreEvent::Auth(AuthEvent::SignedIn { .. })
        ));
    }

    #[tokio::test]
    async fn test_sign_in_failure_returns_to_signed_out() {
        let (manager, bus) = manager(
            vec![response(
                400,
                r#"{"error_description": "Invalid login credentials"}"#,
            )],
            Arc::new(MockSecureStore::new()),
        );
        let mut events = bus.subscribe();

        let err = manager.sign_in("singer@example.com", "bad").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(manager.state(), AuthState::SignedOut);

        assert!(matches!(
            events.try_recv().unwrap(),
            CoreEvent::Auth(AuthEvent::Authenticating)
        ));
        assert!(matches!(
            events.try_recv().unwrap(),
            CoreEvent::Auth(AuthEvent::AuthError { .. })
        ));
    }

    #[tokio::test]
    async fn test_sign_in_store_failure_resolves_to_signed_out() {
        let secure = Arc::new(MockSecureStore::read_only());
        let user_id = Uuid::new_v4();
        let (manager, bus) = manager(vec![response(200, &token_body(user_id))], secure);
        let mut events = bus.subscribe();

        let err = manager.sign_in("singer@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::SecureStorageUnavailable(_)));
        assert_eq!(manager.state(), AuthState::SignedOut);
        assert!(manager.current_session().await.is_none());

        assert!(matches!(
            events.try_recv().unwrap(),
            CoreEvent::Auth(AuthEvent::Authenticating)
        ));
        assert!(matches!(
            events.try_recv().unwrap(),
            CoreEvent::Auth(AuthEvent::AuthError {
                recoverable: true,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_restore_refresh_store_failure_resolves_to_signed_out() {
        let secure = Arc::new(MockSecureStore::read_only());
        let user_id = Uuid::new_v4();
        let json =
            serde_json::to_vec(&session(user_id, Utc::now() - Duration::hours(1))).unwrap();
        secure
            .storage
            .lock()
            .await
            .insert("songbook.session".to_string(), json);

        let (manager, bus) = manager(vec![response(200, &token_body(user_id))], secure);
        let mut events = bus.subscribe();

        let err = manager.restore().await.unwrap_err();
        assert!(matches!(err, AuthError::SecureStorageUnavailable(_)));
        assert_eq!(manager.state(), AuthState::SignedOut);

        assert!(matches!(
            events.try_recv().unwrap(),
            CoreEvent::Auth(AuthEvent::Authenticating)
        ));
        assert!(matches!(
            events.try_recv().unwrap(),
            CoreEvent::Auth(AuthEvent::AuthError { .. })
        ));
    }

    #[tokio::test]
    async fn test_sign_up_confirmation_pending_stays_signed_out() {
        let body = format!(r#"{{"id": "{}", "email": "new@example.com"}}"#, Uuid::new_v4());
        let (manager, bus) = manager(
            vec![response(200, &body)],
            Arc::new(MockSecureStore::new()),
        );
        let mut events = bus.subscribe();

        let outcome = manager.sign_up("new@example.com", "pw").await.unwrap();
        assert!(matches!(outcome, SignUpOutcome::ConfirmationPending { .. }));
        assert_eq!(manager.state(), AuthState::SignedOut);

        assert!(matches!(
            events.try_recv().unwrap(),
            CoreEvent::Auth(AuthEvent::Authenticating)
        ));
        assert!(matches!(
            events.try_recv().unwrap(),
            CoreEvent::Auth(AuthEvent::ConfirmationPending { .. })
        ));
    }

    #[tokio::test]
    async fn test_sign_out_clears_state_even_when_backend_unreachable() {
        let secure = Arc::new(MockSecureStore::new());
        let user_id = Uuid::new_v4();
        seed_session(&secure, &session(user_id, Utc::now() + Duration::hours(1))).await;

        let (manager, bus) = manager(vec![], secure.clone());
        manager.restore().await.unwrap();
        let mut events = bus.subscribe();

        manager.sign_out().await.unwrap();

        assert_eq!(manager.state(), AuthState::SignedOut);
        assert!(manager.current_session().await.is_none());
        assert!(secure.get_secret("songbook.session").await.unwrap().is_none());
        assert!(matches!(
            events.try_recv().unwrap(),
            CoreEvent::Auth(AuthEvent::SignedOut { user_id: Some(_) })
        ));
    }

    #[tokio::test]
    async fn test_access_token_returns_fresh_token_without_network() {
        let secure = Arc::new(MockSecureStore::new());
        let user_id = Uuid::new_v4();
        seed_session(&secure, &session(user_id, Utc::now() + Duration::hours(1))).await;

        let (manager, _) = manager(vec![], secure);
        manager.restore().await.unwrap();

        let token = manager.access_token().await.unwrap();
        assert_eq!(token, "access-old");
    }

    #[tokio::test]
    async fn test_access_token_refreshes_stale_token() {
        let secure = Arc::new(MockSecureStore::new());
        let user_id = Uuid::new_v4();
        seed_session(&secure, &session(user_id, Utc::now() - Duration::hours(1))).await;

        // Install the stale session directly so the single canned grant is
        // consumed by access_token rather than restore.
        let (manager, _) = manager(vec![response(200, &token_body(user_id))], secure);
        manager
            .install_session(session(user_id, Utc::now() - Duration::hours(1)))
            .await;

        let token = manager.access_token().await.unwrap();
        assert_eq!(token, "access-new");
    }

    #[tokio::test]
    async fn test_access_token_when_signed_out_errors() {
        let (manager, _) = manager(vec![], Arc::new(MockSecureStore::new()));
        let err = manager.access_token().await.unwrap_err();
        assert!(matches!(err, AuthError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_watch_subscribers_observe_transitions() {
        let secure = Arc::new(MockSecureStore::new());
        let user_id = Uuid::new_v4();
        let (manager, _) = manager(vec![response(200, &token_body(user_id))], secure);

        let mut state_rx = manager.subscribe_state();
        assert_eq!(*state_rx.borrow_and_update(), AuthState::SignedOut);

        manager.sign_in("singer@example.com", "pw").await.unwrap();

        state_rx.changed().await.unwrap();
        assert_eq!(*state_rx.borrow_and_update(), AuthState::SignedIn { user_id });
    }
}
