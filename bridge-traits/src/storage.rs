//! Storage Abstractions
//!
//! Provides platform-agnostic traits for named blob persistence and secure
//! credential storage.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Named blob storage trait
///
/// Abstracts the device-local persistent store the cache layer writes its
/// snapshot and preference blobs to:
/// - Desktop: SQLite file in the app data directory
/// - iOS/Android: app-sandboxed database or file storage
/// - Web: IndexedDB
///
/// Blobs are independent units: writing one never touches another. The
/// songbook core uses exactly two well-known blob names, one for the
/// collection snapshot and one for display preferences.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::BlobStore;
///
/// async fn persist(store: &dyn BlobStore, data: &[u8]) -> Result<()> {
///     store.put_blob("songbook.snapshot", data.to_vec().into()).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read a blob by name
    ///
    /// Returns `Ok(None)` if the blob does not exist.
    async fn get_blob(&self, name: &str) -> Result<Option<Bytes>>;

    /// Write a blob, replacing any previous value under that name
    async fn put_blob(&self, name: &str, data: Bytes) -> Result<()>;

    /// Delete a blob
    ///
    /// Deleting a missing blob is not an error.
    async fn delete_blob(&self, name: &str) -> Result<()>;

    /// Check if a blob exists without reading it
    async fn has_blob(&self, name: &str) -> Result<bool> {
        Ok(self.get_blob(name).await?.is_some())
    }

    /// List all stored blob names
    async fn list_blobs(&self) -> Result<Vec<String>>;
}

/// Secure credential storage trait
///
/// Abstracts secure storage mechanisms:
/// - macOS/iOS: Keychain
/// - Android: Keystore (hardware-backed when available)
/// - Windows: DPAPI
/// - Linux: Secret Service / libsecret
///
/// # Security Requirements
///
/// Implementations MUST:
/// - Encrypt data at rest
/// - Use platform-provided secure storage when available
/// - Never log or expose sensitive data
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SecureStore;
///
/// async fn store_session(store: &dyn SecureStore, session_json: &str) -> Result<()> {
///     store.set_secret("session", session_json.as_bytes()).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// Store a secret value
    ///
    /// The previous value under `key` is overwritten if it exists.
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Retrieve a secret value
    ///
    /// Returns `Ok(None)` if the key doesn't exist. Returned data should be
    /// handled securely and never logged.
    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Delete a secret
    async fn delete_secret(&self, key: &str) -> Result<()>;

    /// Check if a secret exists without retrieving it
    async fn has_secret(&self, key: &str) -> Result<bool> {
        Ok(self.get_secret(key).await?.is_some())
    }
}
