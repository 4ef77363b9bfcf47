//! # Data Access Module
//!
//! The authenticated data layer tying the remote collections, the offline
//! cache and the auth session together.
//!
//! ## Overview
//!
//! - [`api`] - the [`CollectionsApi`](api::CollectionsApi) trait a backend
//!   connector implements
//! - [`service`] - the [`DataService`](service::DataService) the application
//!   calls: cache-first reads, remote writes with optimistic or
//!   refetch-after-write cache maintenance, and bulk sync
//!
//! Reads never require connectivity. Writes require a signed-in user and a
//! reachable backend; each write keeps the cache consistent with the remote
//! outcome.

pub mod api;
pub mod error;
pub mod service;

pub use api::CollectionsApi;
pub use error::{DataError, Result};
pub use service::DataService;
