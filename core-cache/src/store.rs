//! Durable persistence for the cache snapshot and preferences.
//!
//! Both documents are stored as JSON blobs through the platform
//! [`BlobStore`] bridge, one named blob per document.

use crate::error::Result;
use crate::models::{Preferences, Snapshot};
use bridge_traits::storage::BlobStore;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, warn};

/// Blob name for the collections snapshot.
const SNAPSHOT_BLOB: &str = "songbook.snapshot";
/// Blob name for the display preferences.
const PREFERENCES_BLOB: &str = "songbook.preferences";

/// Persists the cache snapshot and preferences as named JSON blobs.
///
/// Loads fail open: a missing or unreadable blob yields the default value so
/// that a corrupted cache never blocks startup. Saves propagate every error
/// because a failed write must not be mistaken for durable state.
#[derive(Clone)]
pub struct SnapshotStore {
    blobs: Arc<dyn BlobStore>,
}

impl SnapshotStore {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }

    /// Load the persisted snapshot, or an empty one when none exists or the
    /// stored blob cannot be parsed.
    pub async fn load_snapshot(&self) -> Snapshot {
        self.load_or_default(SNAPSHOT_BLOB).await
    }

    /// Serialize and persist the snapshot. Errors propagate.
    pub async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        self.save(SNAPSHOT_BLOB, snapshot).await
    }

    /// Remove the persisted snapshot. Missing blobs are not an error.
    pub async fn delete_snapshot(&self) -> Result<()> {
        self.blobs.delete_blob(SNAPSHOT_BLOB).await?;
        Ok(())
    }

    /// Load the persisted preferences, or the defaults.
    pub async fn load_preferences(&self) -> Preferences {
        self.load_or_default(PREFERENCES_BLOB).await
    }

    /// Serialize and persist the preferences. Errors propagate.
    pub async fn save_preferences(&self, preferences: &Preferences) -> Result<()> {
        self.save(PREFERENCES_BLOB, preferences).await
    }

    async fn load_or_default<T>(&self, name: &str) -> T
    where
        T: serde::de::DeserializeOwned + Default,
    {
        let data = match self.blobs.get_blob(name).await {
            Ok(Some(data)) => data,
            Ok(None) => {
                debug!(blob = name, "No persisted blob, using defaults");
                return T::default();
            }
            Err(e) => {
                warn!(blob = name, error = %e, "Failed to read blob, using defaults");
                return T::default();
            }
        };

        match serde_json::from_slice(&data) {
            Ok(value) => value,
            Err(e) => {
                warn!(blob = name, error = %e, "Failed to parse blob, using defaults");
                T::default()
            }
        }
    }

    async fn save<T: serde::Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let data = serde_json::to_vec(value)?;
        self.blobs.put_blob(name, Bytes::from(data)).await?;
        debug!(blob = name, "Persisted blob");
        Ok(())
    }
}
