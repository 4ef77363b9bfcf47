//! GoTrue Auth Client
//!
//! Thin client for the backend's GoTrue-compatible authentication REST API.
//! Handles the four calls the session manager needs: sign-up, password
//! grant, token refresh and logout.
//!
//! Every request carries the project `apikey` header; tokenized requests add
//! a `Bearer` header on top. Auth calls are never retried automatically so a
//! slow endpoint cannot turn one credential check into several.

use crate::error::{AuthError, Result};
use crate::types::{Session, SessionTokens, SignUpOutcome};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Path prefix of the auth API.
const AUTH_API_BASE: &str = "/auth/v1";

/// Credentials payload for sign-up and the password grant.
#[derive(Serialize)]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Token grant response. The same shape comes back from the password grant,
/// the refresh grant and a sign-up on backends with confirmation disabled.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: UserPayload,
}

#[derive(Deserialize)]
struct UserPayload {
    id: Uuid,
    email: Option<String>,
}

/// Error body shapes the auth endpoints produce. Older and newer GoTrue
/// versions disagree on the field name, so all are optional.
#[derive(Deserialize, Default)]
struct ErrorPayload {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl ErrorPayload {
    fn message(self) -> Option<String> {
        self.error_description.or(self.msg).or(self.message)
    }
}

/// Client for email/password authentication endpoints.
#[derive(Clone)]
pub struct PasswordAuthClient {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    anon_key: String,
}

impl PasswordAuthClient {
    /// # Arguments
    ///
    /// * `http_client` - Host-provided HTTP client abstraction
    /// * `base_url` - Backend project URL without a trailing slash
    /// * `anon_key` - Public project API key sent with every request
    pub fn new(http_client: Arc<dyn HttpClient>, base_url: String, anon_key: String) -> Self {
        Self {
            http_client,
            base_url,
            anon_key,
        }
    }

    /// Register a new account.
    ///
    /// Depending on backend configuration this either issues a session
    /// immediately or leaves the account pending email confirmation.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        let url = format!("{}{}/signup", self.base_url, AUTH_API_BASE);
        let request = self
            .base_request(HttpMethod::Post, url)
            .json(&CredentialsRequest { email, password })?;

        let response = self.http_client.execute(request).await?;
        if !response.is_success() {
            return Err(self.map_error(response.status, response.body.as_ref()));
        }

        // A session in the response means confirmation is disabled.
        if let Ok(tokens) = response.json::<TokenResponse>() {
            info!("Sign-up issued a session immediately");
            return Ok(SignUpOutcome::SignedIn(session_from(tokens)));
        }

        info!("Sign-up accepted, email confirmation pending");
        Ok(SignUpOutcome::ConfirmationPending {
            email: email.to_string(),
        })
    }

    /// Exchange email and password for a session.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let url = format!(
            "{}{}/token?grant_type=password",
            self.base_url, AUTH_API_BASE
        );
        let request = self
            .base_request(HttpMethod::Post, url)
            .json(&CredentialsRequest { email, password })?;

        let response = self.http_client.execute(request).await?;
        if !response.is_success() {
            return Err(self.map_error(response.status, response.body.as_ref()));
        }

        let tokens: TokenResponse = response
            .json()
            .map_err(|e| AuthError::AuthenticationFailed {
                status: 200,
                message: format!("Unexpected token response: {}", e),
            })?;

        debug!(expires_in = tokens.expires_in, "Password grant succeeded");
        Ok(session_from(tokens))
    }

    /// Obtain a fresh session from a refresh token.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session> {
        let url = format!(
            "{}{}/token?grant_type=refresh_token",
            self.base_url, AUTH_API_BASE
        );
        let request = self
            .base_request(HttpMethod::Post, url)
            .json(&RefreshRequest { refresh_token })?;

        let response = self.http_client.execute(request).await?;
        if !response.is_success() {
            // A rejected refresh token cannot recover without new credentials.
            if response.is_client_error() {
                warn!(status = response.status, "Refresh token rejected");
                return Err(AuthError::SessionExpired);
            }
            return Err(self.map_error(response.status, response.body.as_ref()));
        }

        let tokens: TokenResponse = response
            .json()
            .map_err(|e| AuthError::AuthenticationFailed {
                status: 200,
                message: format!("Unexpected token response: {}", e),
            })?;

        debug!(expires_in = tokens.expires_in, "Session refreshed");
        Ok(session_from(tokens))
    }

    /// Revoke the session server-side. Local cleanup is the caller's job.
    #[instrument(skip_all)]
    pub async fn sign_out(&self, access_token: &str) -> Result<()> {
        let url = format!("{}{}/logout", self.base_url, AUTH_API_BASE);
        let request = self
            .base_request(HttpMethod::Post, url)
            .bearer_token(access_token);

        let response = self.http_client.execute(request).await?;
        // An already-revoked token comes back 401; treat that as signed out.
        if !response.is_success() && response.status != 401 {
            return Err(self.map_error(response.status, response.body.as_ref()));
        }

        debug!("Server-side logout completed");
        Ok(())
    }

    fn base_request(&self, method: HttpMethod, url: String) -> HttpRequest {
        HttpRequest::new(method, url).header("apikey", self.anon_key.clone())
    }

    fn map_error(&self, status: u16, body: &[u8]) -> AuthError {
        let payload: ErrorPayload = serde_json::from_slice(body).unwrap_or_default();
        let message = payload
            .message()
            .unwrap_or_else(|| "no error detail".to_string());

        warn!(status, error = %message, "Auth endpoint returned an error");

        match status {
            400 | 401 if message.to_lowercase().contains("invalid login") => {
                AuthError::InvalidCredentials
            }
            400 | 401 if message.to_lowercase().contains("not confirmed") => {
                AuthError::EmailNotConfirmed
            }
            _ => AuthError::AuthenticationFailed { status, message },
        }
    }
}

fn session_from(response: TokenResponse) -> Session {
    Session {
        user_id: response.user.id,
        email: response.user.email.unwrap_or_default(),
        tokens: SessionTokens::new(
            response.access_token,
            response.refresh_token,
            response.expires_in,
        ),
    }
}
