//! # Core Configuration Module
//!
//! Provides configuration management for the songbook core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! `CoreConfig` instance that holds all bridge implementations and backend
//! settings the core needs. It enforces fail-fast validation so a missing
//! capability is reported at startup rather than at first use.
//!
//! ## Required Dependencies
//!
//! - `HttpClient` - all remote calls go through it
//! - `BlobStore` - snapshot and preferences persistence
//! - `SecureStore` - session credential persistence
//! - backend URL and anon API key
//!
//! ## Optional Dependencies (with defaults)
//!
//! - `Clock` - time source (defaults to `SystemClock`)
//! - cache freshness window (defaults to 24 hours)
//! - event bus buffer size (defaults to 100)
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .backend_url("https://project.supabase.co")
//!     .anon_key("public-anon-key")
//!     .http_client(Arc::new(MyHttpClient))
//!     .blob_store(Arc::new(MyBlobStore))
//!     .secure_store(Arc::new(MySecureStore))
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{BlobStore, Clock, HttpClient, SecureStore, SystemClock};
use std::sync::Arc;
use std::time::Duration;

/// Default freshness window for the local snapshot cache (24 hours).
pub const DEFAULT_CACHE_FRESHNESS: Duration = Duration::from_secs(24 * 60 * 60);

/// Core configuration for the songbook core.
///
/// This struct holds all dependencies and settings required to initialize
/// the core library. Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Base URL of the hosted backend (auth + REST collections)
    pub backend_url: String,

    /// Public (anon) API key sent with every backend request
    pub anon_key: String,

    /// HTTP client bridge
    pub http_client: Arc<dyn HttpClient>,

    /// Persistent blob storage bridge
    pub blob_store: Arc<dyn BlobStore>,

    /// Secure credential storage bridge
    pub secure_store: Arc<dyn SecureStore>,

    /// Time source
    pub clock: Arc<dyn Clock>,

    /// How long a cached snapshot stays fresh
    pub cache_freshness: Duration,

    /// Event bus buffer size
    pub event_buffer_size: usize,
}

impl CoreConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("backend_url", &self.backend_url)
            .field("anon_key", &"[REDACTED]")
            .field("cache_freshness", &self.cache_freshness)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish_non_exhaustive()
    }
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    backend_url: Option<String>,
    anon_key: Option<String>,
    http_client: Option<Arc<dyn HttpClient>>,
    blob_store: Option<Arc<dyn BlobStore>>,
    secure_store: Option<Arc<dyn SecureStore>>,
    clock: Option<Arc<dyn Clock>>,
    cache_freshness: Option<Duration>,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    /// Set the backend base URL (scheme + host, no trailing slash needed).
    pub fn backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = Some(url.into());
        self
    }

    /// Set the public anon API key.
    pub fn anon_key(mut self, key: impl Into<String>) -> Self {
        self.anon_key = Some(key.into());
        self
    }

    /// Inject the HTTP client bridge.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Inject the blob store bridge.
    pub fn blob_store(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.blob_store = Some(store);
        self
    }

    /// Inject the secure store bridge.
    pub fn secure_store(mut self, store: Arc<dyn SecureStore>) -> Self {
        self.secure_store = Some(store);
        self
    }

    /// Inject a custom time source (defaults to `SystemClock`).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Override the cache freshness window (defaults to 24 hours).
    pub fn cache_freshness(mut self, window: Duration) -> Self {
        self.cache_freshness = Some(window);
        self
    }

    /// Override the event bus buffer size (defaults to 100).
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Build the configuration, validating that every required capability is
    /// present.
    ///
    /// # Errors
    ///
    /// Returns `Error::CapabilityMissing` naming the first missing dependency
    /// with an actionable message, or `Error::Config` for invalid settings.
    pub fn build(self) -> Result<CoreConfig> {
        let backend_url = self
            .backend_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::Config("backend_url is required".to_string()))?;

        if !backend_url.starts_with("http://") && !backend_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "backend_url must be an http(s) URL, got: {}",
                backend_url
            )));
        }

        let anon_key = self
            .anon_key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("anon_key is required".to_string()))?;

        let http_client = self.http_client.ok_or_else(|| Error::CapabilityMissing {
            capability: "HttpClient".to_string(),
            message: "No HTTP client implementation provided. \
                      Desktop: use bridge_desktop::ReqwestHttpClient. \
                      Mobile: inject a platform-native adapter."
                .to_string(),
        })?;

        let blob_store = self.blob_store.ok_or_else(|| Error::CapabilityMissing {
            capability: "BlobStore".to_string(),
            message: "No blob store implementation provided. \
                      Desktop: use bridge_desktop::SqliteBlobStore."
                .to_string(),
        })?;

        let secure_store = self.secure_store.ok_or_else(|| Error::CapabilityMissing {
            capability: "SecureStore".to_string(),
            message: "No secure store implementation provided. \
                      Desktop: use bridge_desktop::KeyringSecureStore \
                      (enable the secure-store feature)."
                .to_string(),
        })?;

        Ok(CoreConfig {
            // Normalized so path joining is uniform downstream
            backend_url: backend_url.trim_end_matches('/').to_string(),
            anon_key,
            http_client,
            blob_store,
            secure_store,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            cache_freshness: self.cache_freshness.unwrap_or(DEFAULT_CACHE_FRESHNESS),
            event_buffer_size: self
                .event_buffer_size
                .unwrap_or(crate::events::DEFAULT_EVENT_BUFFER_SIZE),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::{HttpRequest, HttpResponse};
    use bytes::Bytes;

    // Minimal in-test bridge fakes; the real ones live in bridge-desktop.
    struct NullHttpClient;

    #[async_trait::async_trait]
    impl HttpClient for NullHttpClient {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            Err(bridge_traits::BridgeError::NotAvailable(
                "null client".to_string(),
            ))
        }
    }

    struct NullBlobStore;

    #[async_trait::async_trait]
    impl BlobStore for NullBlobStore {
        async fn get_blob(&self, _name: &str) -> BridgeResult<Option<Bytes>> {
            Ok(None)
        }
        async fn put_blob(&self, _name: &str, _data: Bytes) -> BridgeResult<()> {
            Ok(())
        }
        async fn delete_blob(&self, _name: &str) -> BridgeResult<()> {
            Ok(())
        }
        async fn list_blobs(&self) -> BridgeResult<Vec<String>> {
            Ok(vec![])
        }
    }

    struct NullSecureStore;

    #[async_trait::async_trait]
    impl SecureStore for NullSecureStore {
        async fn set_secret(&self, _key: &str, _value: &[u8]) -> BridgeResult<()> {
            Ok(())
        }
        async fn get_secret(&self, _key: &str) -> BridgeResult<Option<Vec<u8>>> {
            Ok(None)
        }
        async fn delete_secret(&self, _key: &str) -> BridgeResult<()> {
            Ok(())
        }
    }

    fn full_builder() -> CoreConfigBuilder {
        CoreConfig::builder()
            .backend_url("https://project.supabase.co/")
            .anon_key("anon-key")
            .http_client(Arc::new(NullHttpClient))
            .blob_store(Arc::new(NullBlobStore))
            .secure_store(Arc::new(NullSecureStore))
    }

    #[test]
    fn test_build_complete_config() {
        let config = full_builder().build().unwrap();
        assert_eq!(config.backend_url, "https://project.supabase.co");
        assert_eq!(config.cache_freshness, DEFAULT_CACHE_FRESHNESS);
        assert_eq!(config.event_buffer_size, 100);
    }

    #[test]
    fn test_missing_backend_url() {
        let result = CoreConfig::builder().anon_key("k").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_backend_url() {
        let result = full_builder().backend_url("ftp://nope").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_http_client() {
        let result = CoreConfig::builder()
            .backend_url("https://project.supabase.co")
            .anon_key("anon-key")
            .blob_store(Arc::new(NullBlobStore))
            .secure_store(Arc::new(NullSecureStore))
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "HttpClient");
            }
            other => panic!("Expected CapabilityMissing, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_custom_freshness_window() {
        let config = full_builder()
            .cache_freshness(Duration::from_secs(60))
            .build()
            .unwrap();
        assert_eq!(config.cache_freshness, Duration::from_secs(60));
    }

    #[test]
    fn test_debug_redacts_anon_key() {
        let config = full_builder().build().unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("anon-key"));
    }
}
