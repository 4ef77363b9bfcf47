//! Domain models for the songbook
//!
//! These types mirror the rows of the remote collections and are shared by the
//! cache, the data services and the backend connector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// ID Types
// =============================================================================

/// Unique identifier for a song (backend-assigned, monotonic)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(pub i64);

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a favourite row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavouriteId(pub i64);

impl fmt::Display for FavouriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(pub Uuid);

impl FolderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for FolderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Domain Models
// =============================================================================

/// A song with its full lyrics text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Unique identifier
    pub id: SongId,
    /// Book number the song is listed under
    pub number: u32,
    /// Song title
    pub title: String,
    /// Full lyrics text, verses separated by blank lines
    pub lyrics: String,
    /// When the row was created
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl Song {
    /// True when `query` matches this song's number or title.
    ///
    /// Numeric queries match the exact number or a decimal prefix of it;
    /// any query also matches as a case-insensitive title substring.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return true;
        }

        if query.chars().all(|c| c.is_ascii_digit()) {
            let number = self.number.to_string();
            if number == query || number.starts_with(query) {
                return true;
            }
        }

        self.title.to_lowercase().contains(&query.to_lowercase())
    }
}

/// A user's bookmark of a song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favourite {
    /// Unique identifier
    pub id: FavouriteId,
    /// Owning user
    pub user_id: UserId,
    /// Bookmarked song
    pub song_id: SongId,
    /// When the bookmark was made
    pub created_at: DateTime<Utc>,
}

/// A user-created grouping of songs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Unique identifier
    pub id: FolderId,
    /// Owning user
    pub user_id: UserId,
    /// Display name
    pub name: String,
    /// When the folder was created
    pub created_at: DateTime<Utc>,
    /// Last rename time
    pub updated_at: DateTime<Utc>,
}

/// Membership of a song in a folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    /// Containing folder
    pub folder_id: FolderId,
    /// Contained song
    pub song_id: SongId,
    /// When the song was added to the folder
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Preferences
// =============================================================================

/// Display theme selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Follow the platform setting
    #[default]
    System,
    Light,
    Dark,
}

/// User display preferences, persisted locally and never synced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Colour theme
    pub theme: Theme,
    /// Lyrics font size in points
    pub font_size: u8,
    /// Whether to refresh collections automatically on launch
    pub auto_sync: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            font_size: 16,
            auto_sync: true,
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// The persisted cache image: every collection plus the sync watermark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Snapshot {
    /// All songs, every user sees the same set
    #[serde(default)]
    pub songs: Vec<Song>,
    /// Favourites across all users that have signed in on this device
    #[serde(default)]
    pub favourites: Vec<Favourite>,
    /// Folders across all users that have signed in on this device
    #[serde(default)]
    pub folders: Vec<Folder>,
    /// Folder memberships
    #[serde(default)]
    pub folder_entries: Vec<FolderEntry>,
    /// When any collection was last refreshed from the backend
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// True when no collection holds any rows.
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
            && self.favourites.is_empty()
            && self.folders.is_empty()
            && self.folder_entries.is_empty()
    }
}
