//! # Offline Cache Module
//!
//! Local snapshot cache for the songbook core.
//!
//! ## Overview
//!
//! This crate holds the last-known-good mirror of the remote collections
//! (songs, favourites, folders) plus user display preferences:
//!
//! - [`models`] - domain models shared across the workspace
//! - [`SnapshotStore`](store::SnapshotStore) - durable persistence of the
//!   snapshot and preference blobs through the `BlobStore` bridge
//! - [`CacheAccessor`](accessor::CacheAccessor) - the in-memory view the rest
//!   of the application reads, scoped to the active authenticated user
//!
//! The cache is best-effort: it is never authoritative and each collection is
//! overwritten wholesale on every successful remote fetch. Reads work while
//! offline; staleness is computed from the snapshot's last-sync timestamp.

pub mod accessor;
pub mod error;
pub mod models;
pub mod store;

pub use accessor::{CacheAccessor, CacheUpdate, DEFAULT_FRESHNESS_HOURS};
pub use error::{CacheError, Result};
pub use models::{
    Favourite, FavouriteId, Folder, FolderEntry, FolderId, Preferences, Snapshot, Song, SongId,
    Theme, UserId,
};
pub use store::SnapshotStore;
