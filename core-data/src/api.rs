//! Remote collections contract.
//!
//! A backend connector implements [`CollectionsApi`]; the data service only
//! talks to this trait, so tests swap in mocks and the backend technology
//! stays replaceable.

use crate::error::Result;
use async_trait::async_trait;
use core_cache::models::{
    Favourite, FavouriteId, Folder, FolderEntry, FolderId, Song, SongId, UserId,
};

/// The remote collection operations the data service needs.
///
/// Every call carries the caller's bearer token; the backend enforces
/// per-user row access from it. Implementations translate backend failures
/// into [`DataError::Remote`](crate::error::DataError::Remote).
#[async_trait]
pub trait CollectionsApi: Send + Sync {
    /// Fetch the full song book.
    async fn list_songs(&self, token: &str) -> Result<Vec<Song>>;

    /// Fetch all favourites of one user.
    async fn list_favourites(&self, token: &str, user: UserId) -> Result<Vec<Favourite>>;

    /// Create a favourite and return the stored row.
    async fn insert_favourite(&self, token: &str, user: UserId, song: SongId)
        -> Result<Favourite>;

    /// Delete a favourite by row id. Deleting a missing row is not an error.
    async fn delete_favourite(&self, token: &str, id: FavouriteId) -> Result<()>;

    /// Fetch all folders of one user.
    async fn list_folders(&self, token: &str, user: UserId) -> Result<Vec<Folder>>;

    /// Create a folder and return the stored row.
    async fn insert_folder(&self, token: &str, user: UserId, name: &str) -> Result<Folder>;

    /// Rename a folder and return the updated row.
    async fn rename_folder(&self, token: &str, id: FolderId, name: &str) -> Result<Folder>;

    /// Delete a folder. The backend cascades its entries.
    async fn delete_folder(&self, token: &str, id: FolderId) -> Result<()>;

    /// Fetch the entries of one folder.
    async fn list_folder_entries(&self, token: &str, folder: FolderId)
        -> Result<Vec<FolderEntry>>;

    /// Add a song to a folder and return the stored row.
    async fn insert_folder_entry(
        &self,
        token: &str,
        folder: FolderId,
        song: SongId,
    ) -> Result<FolderEntry>;

    /// Remove a song from a folder. Removing a missing entry is not an error.
    async fn delete_folder_entry(&self, token: &str, folder: FolderId, song: SongId)
        -> Result<()>;
}
