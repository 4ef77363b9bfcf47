//! Supabase PostgREST row types
//!
//! Data structures for deserializing PostgREST responses. Column names are
//! the snake_case names of the underlying tables, so no renaming is needed.

use chrono::{DateTime, Utc};
use core_cache::models::{
    Favourite, FavouriteId, Folder, FolderEntry, FolderId, Song, SongId, UserId,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Row of the `songs` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongRow {
    pub id: i64,
    pub number: u32,
    pub title: String,
    pub lyrics: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SongRow> for Song {
    fn from(row: SongRow) -> Self {
        Song {
            id: SongId(row.id),
            number: row.number,
            title: row.title,
            lyrics: row.lyrics,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Row of the `favourites` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavouriteRow {
    pub id: i64,
    pub user_id: Uuid,
    pub song_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<FavouriteRow> for Favourite {
    fn from(row: FavouriteRow) -> Self {
        Favourite {
            id: FavouriteId(row.id),
            user_id: UserId(row.user_id),
            song_id: SongId(row.song_id),
            created_at: row.created_at,
        }
    }
}

/// Row of the `folders` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FolderRow> for Folder {
    fn from(row: FolderRow) -> Self {
        Folder {
            id: FolderId(row.id),
            user_id: UserId(row.user_id),
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Row of the `folder_entries` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderEntryRow {
    pub folder_id: Uuid,
    pub song_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<FolderEntryRow> for FolderEntry {
    fn from(row: FolderEntryRow) -> Self {
        FolderEntry {
            folder_id: FolderId(row.folder_id),
            song_id: SongId(row.song_id),
            created_at: row.created_at,
        }
    }
}

// ============================================================================
// Request bodies
// ============================================================================

/// Insert body for the `favourites` table
#[derive(Debug, Serialize)]
pub struct NewFavourite {
    pub user_id: Uuid,
    pub song_id: i64,
}

/// Insert body for the `folders` table
#[derive(Debug, Serialize)]
pub struct NewFolder {
    pub user_id: Uuid,
    pub name: String,
}

/// Patch body for renaming a folder
#[derive(Debug, Serialize)]
pub struct FolderRename {
    pub name: String,
}

/// Insert body for the `folder_entries` table
#[derive(Debug, Serialize)]
pub struct NewFolderEntry {
    pub folder_id: Uuid,
    pub song_id: i64,
}
