//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the songbook core and
//! platform-specific implementations. Each trait represents a capability the
//! core requires but that is provided differently per platform (desktop shell,
//! mobile bridge, web view).
//!
//! ## Traits
//!
//! ### Networking & I/O
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations with retry and TLS
//! - [`BlobStore`](storage::BlobStore) - Named persistent blobs for the
//!   snapshot cache and user preferences
//!
//! ### Security
//! - [`SecureStore`](storage::SecureStore) - Session credential persistence
//!   (Keychain/Keystore/Secret Service)
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Platform implementations should convert platform-specific errors to
//! `BridgeError` and provide actionable messages.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds to support safe concurrent
//! usage across async tasks.

pub mod error;
pub mod http;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use storage::{BlobStore, SecureStore};
pub use time::{Clock, SystemClock};
