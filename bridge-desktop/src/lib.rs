//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! This crate provides production-ready implementations of the bridge traits
//! using desktop-appropriate libraries:
//! - `HttpClient` using `reqwest`
//! - `BlobStore` using a SQLite-backed key-value store
//! - `SecureStore` using the `keyring` crate
//!
//! ## Feature Flags
//!
//! - `secure-store`: Enable OS keychain integration (default)
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, SqliteBlobStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let http_client = ReqwestHttpClient::new();
//!     let blobs = SqliteBlobStore::new(bridge_desktop::default_data_dir()
//!         .join("songbook.db")).await.unwrap();
//!
//!     // Inject into the core configuration
//! }
//! ```

mod blobs;
mod http;

#[cfg(feature = "secure-store")]
mod secure_store;

pub use blobs::SqliteBlobStore;
pub use http::ReqwestHttpClient;

#[cfg(feature = "secure-store")]
pub use secure_store::KeyringSecureStore;

use std::path::PathBuf;

/// Default application data directory for the songbook core.
///
/// Falls back to the current directory when the platform data directory
/// cannot be resolved (e.g., stripped-down containers).
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("songbook-core"))
        .unwrap_or_else(|| PathBuf::from("."))
}
