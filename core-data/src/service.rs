//! # Data Service
//!
//! The application-facing data accessor. Reads come from the offline cache
//! and never require connectivity; writes go to the backend and keep the
//! cache consistent with the remote outcome:
//!
//! - favourites are updated optimistically and rolled back on failure
//! - folders and folder entries are refetched after every successful write
//! - `sync_all` refreshes every collection in one shot and replaces the
//!   cache wholesale
//!
//! Every remote operation requires a signed-in user and fails fast with
//! [`DataError::NotSignedIn`] otherwise.

use crate::api::CollectionsApi;
use crate::error::{DataError, Result};
use core_auth::SessionManager;
use core_cache::accessor::{CacheAccessor, CacheUpdate};
use core_cache::models::{
    Favourite, FavouriteId, Folder, FolderEntry, FolderId, Song, SongId, UserId,
};
use core_runtime::events::{CoreEvent, DataEvent, EventBus};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Row id used for an optimistic favourite before the backend assigns one.
/// The backend only ever assigns positive ids.
const PROVISIONAL_FAVOURITE_ID: i64 = -1;

/// Cache-first accessor for songs, favourites and folders.
pub struct DataService {
    api: Arc<dyn CollectionsApi>,
    cache: CacheAccessor,
    sessions: Arc<SessionManager>,
    event_bus: EventBus,
}

impl DataService {
    pub fn new(
        api: Arc<dyn CollectionsApi>,
        cache: CacheAccessor,
        sessions: Arc<SessionManager>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            api,
            cache,
            sessions,
            event_bus,
        }
    }

    // ------------------------------------------------------------------
    // Cached reads
    // ------------------------------------------------------------------

    /// All cached songs, ordered by book number.
    pub async fn songs(&self) -> Vec<Song> {
        let mut songs = self.cache.songs().await;
        songs.sort_by_key(|s| s.number);
        songs
    }

    /// One cached song.
    pub async fn song(&self, id: SongId) -> Option<Song> {
        self.cache.song(id).await
    }

    /// Search the cached song book.
    ///
    /// An empty or whitespace query returns everything. A numeric query
    /// matches the book number exactly or as a prefix; any query also
    /// matches as a case-insensitive title substring.
    pub async fn search_songs(&self, query: &str) -> Vec<Song> {
        let mut songs = self.cache.songs().await;
        songs.retain(|s| s.matches(query));
        songs.sort_by_key(|s| s.number);
        songs
    }

    /// The signed-in user's cached favourites.
    pub async fn favourites(&self) -> Vec<Favourite> {
        self.sync_cache_scope().await;
        self.cache.favourites().await
    }

    /// True when the signed-in user has favourited this song.
    pub async fn is_favourite(&self, song: SongId) -> bool {
        self.sync_cache_scope().await;
        self.cache.favourite_for_song(song).await.is_some()
    }

    /// The signed-in user's cached folders.
    pub async fn folders(&self) -> Vec<Folder> {
        self.sync_cache_scope().await;
        self.cache.folders().await
    }

    /// Cached entries of one folder.
    pub async fn folder_entries(&self, folder: FolderId) -> Vec<FolderEntry> {
        self.cache.folder_entries(folder).await
    }

    /// True when the cache has never synced or the last sync is older than
    /// the freshness window.
    pub async fn is_cache_stale(&self) -> bool {
        self.cache.is_expired().await
    }

    /// When the cache was last refreshed from the backend.
    pub async fn last_sync(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.cache.last_sync().await
    }

    // ------------------------------------------------------------------
    // Remote refresh
    // ------------------------------------------------------------------

    /// Fetch the song book and replace the cached copy.
    ///
    /// When the backend is unreachable and the cache holds songs, the cached
    /// copy is returned instead of the error.
    #[instrument(skip(self))]
    pub async fn refresh_songs(&self) -> Result<Vec<Song>> {
        let (token, _user) = self.active_context().await?;

        match self.api.list_songs(&token).await {
            Ok(songs) => {
                self.cache.update(CacheUpdate::songs(songs.clone())).await?;
                Ok(songs)
            }
            Err(e) => self.fall_back(e, self.songs().await).await,
        }
    }

    /// Fetch the user's favourites and replace the cached copy.
    #[instrument(skip(self))]
    pub async fn refresh_favourites(&self) -> Result<Vec<Favourite>> {
        let (token, user) = self.active_context().await?;

        match self.api.list_favourites(&token, user).await {
            Ok(favourites) => {
                self.cache
                    .update(CacheUpdate::favourites(favourites.clone()))
                    .await?;
                Ok(favourites)
            }
            Err(e) => self.fall_back(e, self.cache.favourites().await).await,
        }
    }

    /// Fetch the user's folders and replace the cached copy.
    #[instrument(skip(self))]
    pub async fn refresh_folders(&self) -> Result<Vec<Folder>> {
        let (token, user) = self.active_context().await?;

        match self.api.list_folders(&token, user).await {
            Ok(folders) => {
                self.cache.update(CacheUpdate::folders(folders.clone())).await?;
                Ok(folders)
            }
            Err(e) => self.fall_back(e, self.cache.folders().await).await,
        }
    }

    /// Fetch the entries of one folder and replace the cached copy.
    #[instrument(skip(self))]
    pub async fn refresh_folder_entries(&self, folder: FolderId) -> Result<Vec<FolderEntry>> {
        let (token, _user) = self.active_context().await?;

        match self.api.list_folder_entries(&token, folder).await {
            Ok(entries) => {
                self.cache
                    .replace_folder_entries(folder, entries.clone())
                    .await?;
                Ok(entries)
            }
            Err(e) => self.fall_back(e, self.cache.folder_entries(folder).await).await,
        }
    }

    /// Refresh songs, favourites and folders in one shot.
    ///
    /// All three fetches run concurrently. Only when every fetch succeeds is
    /// the cache replaced, in a single update that advances the sync
    /// watermark once. Any failure aggregates per-collection reasons into
    /// one [`DataError::Sync`].
    #[instrument(skip(self))]
    pub async fn sync_all(&self) -> Result<()> {
        let (token, user) = self.active_context().await?;

        self.emit(DataEvent::SyncStarted {
            user_id: user.to_string(),
        });
        info!(user_id = %user, "Starting full sync");

        let (songs, favourites, folders) = tokio::join!(
            self.api.list_songs(&token),
            self.api.list_favourites(&token, user),
            self.api.list_folders(&token, user),
        );

        let mut failures = Vec::new();
        if let Err(e) = &songs {
            failures.push(format!("songs: {}", e));
        }
        if let Err(e) = &favourites {
            failures.push(format!("favourites: {}", e));
        }
        if let Err(e) = &folders {
            failures.push(format!("folders: {}", e));
        }

        if !failures.is_empty() {
            let message = failures.join("; ");
            warn!(error = %message, "Full sync failed");
            self.emit(DataEvent::SyncFailed {
                message: message.clone(),
            });
            return Err(DataError::Sync { message });
        }

        // All three results are Ok past this point.
        let songs = songs.unwrap_or_default();
        let favourites = favourites.unwrap_or_default();
        let folders = folders.unwrap_or_default();

        let counts = (songs.len(), favourites.len(), folders.len());
        self.cache
            .update(CacheUpdate {
                songs: Some(songs),
                favourites: Some(favourites),
                folders: Some(folders),
                folder_entries: None,
            })
            .await?;

        self.emit(DataEvent::SyncCompleted {
            songs: counts.0,
            favourites: counts.1,
            folders: counts.2,
        });
        info!(
            songs = counts.0,
            favourites = counts.1,
            folders = counts.2,
            "Full sync completed"
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Favourites
    // ------------------------------------------------------------------

    /// Favourite a song.
    ///
    /// Idempotent from the caller's view: favouriting an already-favourited
    /// song returns the existing cached row without a backend call. The
    /// cache is updated optimistically and rolled back if the backend
    /// rejects the write.
    #[instrument(skip(self))]
    pub async fn add_favourite(&self, song: SongId) -> Result<Favourite> {
        let (token, user) = self.active_context().await?;

        if let Some(existing) = self.cache.favourite_for_song(song).await {
            return Ok(existing);
        }

        let provisional = Favourite {
            id: FavouriteId(PROVISIONAL_FAVOURITE_ID),
            user_id: user,
            song_id: song,
            created_at: chrono::Utc::now(),
        };
        self.cache.insert_favourite(provisional.clone()).await?;

        match self.api.insert_favourite(&token, user, song).await {
            Ok(row) => {
                self.cache.remove_favourite(provisional.id).await?;
                self.cache.insert_favourite(row.clone()).await?;
                self.emit(DataEvent::FavouriteAdded { song_id: song.0 });
                Ok(row)
            }
            Err(e) => {
                warn!(error = %e, "Favourite insert rejected, rolling back");
                if let Err(rollback) = self.cache.remove_favourite(provisional.id).await {
                    warn!(error = %rollback, "Failed to roll back optimistic favourite");
                }
                Err(e)
            }
        }
    }

    /// Unfavourite a song.
    ///
    /// The cached row is removed optimistically and restored if the backend
    /// rejects the delete.
    #[instrument(skip(self))]
    pub async fn remove_favourite(&self, song: SongId) -> Result<()> {
        let (token, _user) = self.active_context().await?;

        let existing = self
            .cache
            .favourite_for_song(song)
            .await
            .ok_or(DataError::NotFound {
                entity: "Favourite",
            })?;

        let removed = self.cache.remove_favourite(existing.id).await?;

        match self.api.delete_favourite(&token, existing.id).await {
            Ok(()) => {
                self.emit(DataEvent::FavouriteRemoved { song_id: song.0 });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Favourite delete rejected, restoring cached row");
                if let Some(row) = removed {
                    if let Err(restore) = self.cache.insert_favourite(row).await {
                        warn!(error = %restore, "Failed to restore favourite after rollback");
                    }
                }
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Folders
    // ------------------------------------------------------------------

    /// Create a folder. The folder list is refetched after the write so the
    /// cache reflects exactly what the backend stored.
    #[instrument(skip(self))]
    pub async fn create_folder(&self, name: &str) -> Result<Folder> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DataError::EmptyFolderName);
        }

        let (token, user) = self.active_context().await?;
        let folder = self.api.insert_folder(&token, user, name).await?;
        self.refetch_folders(&token, user).await?;
        self.emit(DataEvent::FoldersChanged);
        Ok(folder)
    }

    /// Rename a folder.
    #[instrument(skip(self))]
    pub async fn rename_folder(&self, id: FolderId, name: &str) -> Result<Folder> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DataError::EmptyFolderName);
        }

        let (token, user) = self.active_context().await?;
        let folder = self.api.rename_folder(&token, id, name).await?;
        self.refetch_folders(&token, user).await?;
        self.emit(DataEvent::FoldersChanged);
        Ok(folder)
    }

    /// Delete a folder and drop its cached entries.
    #[instrument(skip(self))]
    pub async fn delete_folder(&self, id: FolderId) -> Result<()> {
        let (token, user) = self.active_context().await?;
        self.api.delete_folder(&token, id).await?;
        self.cache.replace_folder_entries(id, Vec::new()).await?;
        self.refetch_folders(&token, user).await?;
        self.emit(DataEvent::FoldersChanged);
        Ok(())
    }

    /// Add a song to a folder. The folder's entries are refetched after the
    /// write.
    #[instrument(skip(self))]
    pub async fn add_song_to_folder(&self, folder: FolderId, song: SongId) -> Result<FolderEntry> {
        let (token, _user) = self.active_context().await?;
        let entry = self.api.insert_folder_entry(&token, folder, song).await?;
        self.refetch_folder_entries(&token, folder).await?;
        self.emit(DataEvent::FolderEntriesChanged {
            folder_id: folder.to_string(),
        });
        Ok(entry)
    }

    /// Remove a song from a folder.
    #[instrument(skip(self))]
    pub async fn remove_song_from_folder(&self, folder: FolderId, song: SongId) -> Result<()> {
        let (token, _user) = self.active_context().await?;
        self.api.delete_folder_entry(&token, folder, song).await?;
        self.refetch_folder_entries(&token, folder).await?;
        self.emit(DataEvent::FolderEntriesChanged {
            folder_id: folder.to_string(),
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Cache maintenance
    // ------------------------------------------------------------------

    /// Drop every cached collection. Preferences survive.
    #[instrument(skip(self))]
    pub async fn clear_cache(&self) -> Result<()> {
        self.cache.clear().await?;
        self.emit(DataEvent::CacheCleared);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Resolve the signed-in user and a valid token, aligning the cache's
    /// per-user scope at the same time.
    async fn active_context(&self) -> Result<(String, UserId)> {
        let user = self
            .sessions
            .current_user_id()
            .await
            .ok_or(DataError::NotSignedIn)?;
        let user = UserId(user);
        self.cache.set_active_user(Some(user)).await;

        let token = self.sessions.access_token().await?;
        Ok((token, user))
    }

    /// Keep cache scoping in step with the auth session for cached reads.
    async fn sync_cache_scope(&self) {
        let user = self.sessions.current_user_id().await.map(UserId);
        self.cache.set_active_user(user).await;
    }

    async fn refetch_folders(&self, token: &str, user: UserId) -> Result<()> {
        let folders = self.api.list_folders(token, user).await?;
        self.cache.update(CacheUpdate::folders(folders)).await?;
        Ok(())
    }

    async fn refetch_folder_entries(&self, token: &str, folder: FolderId) -> Result<()> {
        let entries = self.api.list_folder_entries(token, folder).await?;
        self.cache.replace_folder_entries(folder, entries).await?;
        Ok(())
    }

    /// Serve cached data instead of a remote error when possible.
    async fn fall_back<T>(&self, error: DataError, cached: Vec<T>) -> Result<Vec<T>> {
        if cached.is_empty() {
            return Err(error);
        }
        warn!(error = %error, "Remote fetch failed, serving cached data");
        Ok(cached)
    }

    fn emit(&self, event: DataEvent) {
        let _ = self.event_bus.emit(CoreEvent::Data(event));
    }
}
