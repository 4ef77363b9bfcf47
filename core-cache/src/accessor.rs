//! In-memory cache accessor.
//!
//! [`CacheAccessor`] is the single read surface the application uses for
//! collection data. It holds the current [`Snapshot`] behind an async
//! read-write lock, scopes per-user collections to the active user and
//! persists every mutation through the [`SnapshotStore`].

use crate::error::Result;
use crate::models::{
    Favourite, FavouriteId, Folder, FolderEntry, FolderId, Preferences, Snapshot, Song, SongId,
    UserId,
};
use crate::store::SnapshotStore;
use bridge_traits::time::Clock;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

/// Default snapshot freshness window.
pub const DEFAULT_FRESHNESS_HOURS: i64 = 24;

/// A batch of replacement collections from a successful remote fetch.
///
/// Each populated field replaces that collection wholesale; `None` fields are
/// left untouched. Applying any update, even an empty one, advances the
/// snapshot's sync watermark.
#[derive(Debug, Clone, Default)]
pub struct CacheUpdate {
    pub songs: Option<Vec<Song>>,
    pub favourites: Option<Vec<Favourite>>,
    pub folders: Option<Vec<Folder>>,
    pub folder_entries: Option<Vec<FolderEntry>>,
}

impl CacheUpdate {
    pub fn songs(songs: Vec<Song>) -> Self {
        Self {
            songs: Some(songs),
            ..Default::default()
        }
    }

    pub fn favourites(favourites: Vec<Favourite>) -> Self {
        Self {
            favourites: Some(favourites),
            ..Default::default()
        }
    }

    pub fn folders(folders: Vec<Folder>) -> Self {
        Self {
            folders: Some(folders),
            ..Default::default()
        }
    }

    pub fn folder_entries(entries: Vec<FolderEntry>) -> Self {
        Self {
            folder_entries: Some(entries),
            ..Default::default()
        }
    }
}

struct CacheState {
    snapshot: Snapshot,
    active_user: Option<UserId>,
}

/// Offline-capable view over the collection snapshot.
///
/// Songs are shared across users; favourites, folders and folder entries are
/// filtered to the active user and read as empty while signed out. All reads
/// are served from memory, so they work without connectivity.
#[derive(Clone)]
pub struct CacheAccessor {
    store: SnapshotStore,
    clock: Arc<dyn Clock>,
    freshness: Duration,
    state: Arc<RwLock<CacheState>>,
}

impl CacheAccessor {
    /// Load the persisted snapshot and build the accessor around it.
    pub async fn load(store: SnapshotStore, clock: Arc<dyn Clock>, freshness: Duration) -> Self {
        let snapshot = store.load_snapshot().await;
        debug!(
            songs = snapshot.songs.len(),
            favourites = snapshot.favourites.len(),
            folders = snapshot.folders.len(),
            "Loaded cache snapshot"
        );
        Self {
            store,
            clock,
            freshness,
            state: Arc::new(RwLock::new(CacheState {
                snapshot,
                active_user: None,
            })),
        }
    }

    /// Set or clear the user the per-user collections are scoped to.
    pub async fn set_active_user(&self, user: Option<UserId>) {
        self.state.write().await.active_user = user;
    }

    pub async fn active_user(&self) -> Option<UserId> {
        self.state.read().await.active_user
    }

    /// All cached songs. The song book is global, not per-user.
    pub async fn songs(&self) -> Vec<Song> {
        self.state.read().await.snapshot.songs.clone()
    }

    /// Look up a single cached song.
    pub async fn song(&self, id: SongId) -> Option<Song> {
        self.state
            .read()
            .await
            .snapshot
            .songs
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    /// The active user's favourites, empty while signed out.
    pub async fn favourites(&self) -> Vec<Favourite> {
        let state = self.state.read().await;
        match state.active_user {
            Some(user) => state
                .snapshot
                .favourites
                .iter()
                .filter(|f| f.user_id == user)
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    /// The active user's favourite for a song, if one is cached.
    pub async fn favourite_for_song(&self, song_id: SongId) -> Option<Favourite> {
        let state = self.state.read().await;
        let user = state.active_user?;
        state
            .snapshot
            .favourites
            .iter()
            .find(|f| f.user_id == user && f.song_id == song_id)
            .cloned()
    }

    /// The active user's folders, empty while signed out.
    pub async fn folders(&self) -> Vec<Folder> {
        let state = self.state.read().await;
        match state.active_user {
            Some(user) => state
                .snapshot
                .folders
                .iter()
                .filter(|f| f.user_id == user)
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    /// Cached entries of one folder.
    pub async fn folder_entries(&self, folder_id: FolderId) -> Vec<FolderEntry> {
        self.state
            .read()
            .await
            .snapshot
            .folder_entries
            .iter()
            .filter(|e| e.folder_id == folder_id)
            .cloned()
            .collect()
    }

    /// Apply a replacement batch and persist the resulting snapshot.
    ///
    /// Populated collections are overwritten wholesale and the sync watermark
    /// is advanced. Persistence errors propagate; the in-memory snapshot keeps
    /// the new data either way so the session stays usable.
    #[instrument(skip(self, update))]
    pub async fn update(&self, update: CacheUpdate) -> Result<()> {
        let snapshot = {
            let mut state = self.state.write().await;
            if let Some(songs) = update.songs {
                state.snapshot.songs = songs;
            }
            if let Some(favourites) = update.favourites {
                state.snapshot.favourites = favourites;
            }
            if let Some(folders) = update.folders {
                state.snapshot.folders = folders;
            }
            if let Some(entries) = update.folder_entries {
                state.snapshot.folder_entries = entries;
            }
            state.snapshot.last_sync = Some(self.clock.now());
            state.snapshot.clone()
        };

        self.store.save_snapshot(&snapshot).await
    }

    /// Insert a single favourite row and persist.
    ///
    /// Local edit: the sync watermark is not advanced, only wholesale
    /// replacement through [`update`](Self::update) counts as a sync.
    pub async fn insert_favourite(&self, favourite: Favourite) -> Result<()> {
        let snapshot = {
            let mut state = self.state.write().await;
            state.snapshot.favourites.push(favourite);
            state.snapshot.clone()
        };
        self.store.save_snapshot(&snapshot).await
    }

    /// Remove a single favourite row and persist. Returns the removed row so
    /// callers can restore it if a remote write fails.
    pub async fn remove_favourite(&self, id: FavouriteId) -> Result<Option<Favourite>> {
        let (removed, snapshot) = {
            let mut state = self.state.write().await;
            let removed = state
                .snapshot
                .favourites
                .iter()
                .position(|f| f.id == id)
                .map(|i| state.snapshot.favourites.remove(i));
            (removed, state.snapshot.clone())
        };
        self.store.save_snapshot(&snapshot).await?;
        Ok(removed)
    }

    /// Replace the cached entries of one folder and persist.
    ///
    /// Entries of other folders are untouched. Local edit, the sync
    /// watermark is not advanced.
    pub async fn replace_folder_entries(
        &self,
        folder_id: FolderId,
        entries: Vec<FolderEntry>,
    ) -> Result<()> {
        let snapshot = {
            let mut state = self.state.write().await;
            state
                .snapshot
                .folder_entries
                .retain(|e| e.folder_id != folder_id);
            state.snapshot.folder_entries.extend(entries);
            state.snapshot.clone()
        };
        self.store.save_snapshot(&snapshot).await
    }

    /// When any collection was last refreshed from the backend.
    pub async fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.snapshot.last_sync
    }

    /// True when the snapshot has never synced or its watermark is older than
    /// the freshness window.
    pub async fn is_expired(&self) -> bool {
        match self.last_sync().await {
            Some(last_sync) => self.clock.now() - last_sync > self.freshness,
            None => true,
        }
    }

    /// Drop every cached collection and the persisted snapshot.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<()> {
        {
            let mut state = self.state.write().await;
            state.snapshot = Snapshot::default();
        }
        self.store.delete_snapshot().await?;
        info!("Cache cleared");
        Ok(())
    }

    /// Load persisted display preferences.
    pub async fn preferences(&self) -> Preferences {
        self.store.load_preferences().await
    }

    /// Persist display preferences. Preferences survive [`clear`](Self::clear).
    pub async fn set_preferences(&self, preferences: &Preferences) -> Result<()> {
        self.store.save_preferences(preferences).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::storage::BlobStore;
    use bytes::Bytes;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct MemoryBlobStore {
        blobs: Mutex<HashMap<String, Bytes>>,
    }

    #[async_trait]
    impl BlobStore for MemoryBlobStore {
        async fn get_blob(&self, name: &str) -> bridge_traits::error::Result<Option<Bytes>> {
            Ok(self.blobs.lock().unwrap().get(name).cloned())
        }

        async fn put_blob(&self, name: &str, data: Bytes) -> bridge_traits::error::Result<()> {
            self.blobs.lock().unwrap().insert(name.to_string(), data);
            Ok(())
        }

        async fn delete_blob(&self, name: &str) -> bridge_traits::error::Result<()> {
            self.blobs.lock().unwrap().remove(name);
            Ok(())
        }

        async fn list_blobs(&self) -> bridge_traits::error::Result<Vec<String>> {
            Ok(self.blobs.lock().unwrap().keys().cloned().collect())
        }
    }

    /// Test clock that can be advanced manually.
    struct MockClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl MockClock {
        fn new() -> Self {
            Self {
                now: Mutex::new(Utc::now()),
            }
        }

        fn advance(&self, duration: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += duration;
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    fn song(number: u32, title: &str) -> Song {
        Song {
            id: SongId(number as i64),
            number,
            title: title.to_string(),
            lyrics: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn favourite(id: i64, user: UserId, song_id: i64) -> Favourite {
        Favourite {
            id: FavouriteId(id),
            user_id: user,
            song_id: SongId(song_id),
            created_at: Utc::now(),
        }
    }

    async fn accessor_with_clock(clock: Arc<dyn Clock>) -> CacheAccessor {
        let store = SnapshotStore::new(Arc::new(MemoryBlobStore::default()));
        CacheAccessor::load(store, clock, Duration::hours(DEFAULT_FRESHNESS_HOURS)).await
    }

    async fn accessor() -> CacheAccessor {
        accessor_with_clock(Arc::new(MockClock::new())).await
    }

    #[tokio::test]
    async fn test_fresh_cache_is_expired_and_empty() {
        let cache = accessor().await;
        assert!(cache.is_expired().await);
        assert!(cache.songs().await.is_empty());
        assert!(cache.last_sync().await.is_none());
    }

    #[tokio::test]
    async fn test_update_replaces_collection_wholesale() {
        let cache = accessor().await;
        cache
            .update(CacheUpdate::songs(vec![
                song(1, "Amazing Grace"),
                song(2, "How Great Thou Art"),
            ]))
            .await
            .unwrap();

        cache
            .update(CacheUpdate::songs(vec![song(3, "Holy Night")]))
            .await
            .unwrap();

        let songs = cache.songs().await;
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].number, 3);
    }

    #[tokio::test]
    async fn test_update_leaves_absent_fields_untouched() {
        let cache = accessor().await;
        let user = UserId(Uuid::new_v4());
        cache.set_active_user(Some(user)).await;

        cache
            .update(CacheUpdate {
                songs: Some(vec![song(1, "Amazing Grace")]),
                favourites: Some(vec![favourite(10, user, 1)]),
                ..Default::default()
            })
            .await
            .unwrap();

        cache
            .update(CacheUpdate::songs(vec![song(2, "Holy Night")]))
            .await
            .unwrap();

        assert_eq!(cache.favourites().await.len(), 1);
    }

    #[tokio::test]
    async fn test_any_update_bumps_sync_watermark() {
        let clock = Arc::new(MockClock::new());
        let cache = accessor_with_clock(clock.clone()).await;

        cache.update(CacheUpdate::default()).await.unwrap();
        let first = cache.last_sync().await.unwrap();

        clock.advance(Duration::minutes(5));
        cache.update(CacheUpdate::default()).await.unwrap();
        let second = cache.last_sync().await.unwrap();

        assert!(second > first);
    }

    #[tokio::test]
    async fn test_snapshot_expires_after_freshness_window() {
        let clock = Arc::new(MockClock::new());
        let cache = accessor_with_clock(clock.clone()).await;

        cache.update(CacheUpdate::default()).await.unwrap();
        assert!(!cache.is_expired().await);

        clock.advance(Duration::hours(23));
        assert!(!cache.is_expired().await);

        clock.advance(Duration::hours(2));
        assert!(cache.is_expired().await);
    }

    #[tokio::test]
    async fn test_per_user_collections_are_scoped() {
        let cache = accessor().await;
        let alice = UserId(Uuid::new_v4());
        let bob = UserId(Uuid::new_v4());

        cache
            .update(CacheUpdate::favourites(vec![
                favourite(1, alice, 1),
                favourite(2, alice, 2),
                favourite(3, bob, 1),
            ]))
            .await
            .unwrap();

        cache.set_active_user(Some(alice)).await;
        assert_eq!(cache.favourites().await.len(), 2);

        cache.set_active_user(Some(bob)).await;
        assert_eq!(cache.favourites().await.len(), 1);

        cache.set_active_user(None).await;
        assert!(cache.favourites().await.is_empty());
    }

    #[tokio::test]
    async fn test_favourite_lookup_respects_active_user() {
        let cache = accessor().await;
        let alice = UserId(Uuid::new_v4());
        let bob = UserId(Uuid::new_v4());

        cache
            .update(CacheUpdate::favourites(vec![favourite(1, alice, 7)]))
            .await
            .unwrap();

        cache.set_active_user(Some(alice)).await;
        assert!(cache.favourite_for_song(SongId(7)).await.is_some());

        cache.set_active_user(Some(bob)).await;
        assert!(cache.favourite_for_song(SongId(7)).await.is_none());
    }

    #[tokio::test]
    async fn test_local_favourite_edits_do_not_touch_watermark() {
        let cache = accessor().await;
        let user = UserId(Uuid::new_v4());
        cache.set_active_user(Some(user)).await;

        cache.insert_favourite(favourite(1, user, 5)).await.unwrap();
        assert_eq!(cache.favourites().await.len(), 1);
        assert!(cache.last_sync().await.is_none());

        let removed = cache.remove_favourite(FavouriteId(1)).await.unwrap();
        assert!(removed.is_some());
        assert!(cache.favourites().await.is_empty());
    }

    #[tokio::test]
    async fn test_replacing_folder_entries_preserves_other_folders() {
        let cache = accessor().await;
        let folder_a = FolderId::new();
        let folder_b = FolderId::new();
        let entry = |folder_id, song| FolderEntry {
            folder_id,
            song_id: SongId(song),
            created_at: Utc::now(),
        };

        cache
            .update(CacheUpdate::folder_entries(vec![
                entry(folder_a, 1),
                entry(folder_b, 2),
            ]))
            .await
            .unwrap();

        cache
            .replace_folder_entries(folder_a, vec![entry(folder_a, 3), entry(folder_a, 4)])
            .await
            .unwrap();

        assert_eq!(cache.folder_entries(folder_a).await.len(), 2);
        assert_eq!(cache.folder_entries(folder_b).await.len(), 1);

        cache.replace_folder_entries(folder_a, vec![]).await.unwrap();
        assert!(cache.folder_entries(folder_a).await.is_empty());
    }

    #[tokio::test]
    async fn test_removing_missing_favourite_returns_none() {
        let cache = accessor().await;
        assert!(cache.remove_favourite(FavouriteId(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_drops_data_and_watermark() {
        let cache = accessor().await;
        cache
            .update(CacheUpdate::songs(vec![song(1, "Amazing Grace")]))
            .await
            .unwrap();

        cache.clear().await.unwrap();

        assert!(cache.songs().await.is_empty());
        assert!(cache.last_sync().await.is_none());
        assert!(cache.is_expired().await);
    }

    #[tokio::test]
    async fn test_preferences_survive_clear() {
        let cache = accessor().await;
        let prefs = Preferences {
            font_size: 22,
            ..Default::default()
        };
        cache.set_preferences(&prefs).await.unwrap();
        cache.clear().await.unwrap();

        assert_eq!(cache.preferences().await, prefs);
    }

    #[tokio::test]
    async fn test_updated_snapshot_persists_across_reload() {
        let store = SnapshotStore::new(Arc::new(MemoryBlobStore::default()));
        let clock: Arc<dyn Clock> = Arc::new(MockClock::new());
        let freshness = Duration::hours(DEFAULT_FRESHNESS_HOURS);

        let cache = CacheAccessor::load(store.clone(), clock.clone(), freshness).await;
        cache
            .update(CacheUpdate::songs(vec![song(1, "Amazing Grace")]))
            .await
            .unwrap();

        let reloaded = CacheAccessor::load(store, clock, freshness).await;
        assert_eq!(reloaded.songs().await.len(), 1);
        assert!(reloaded.last_sync().await.is_some());
    }
}
