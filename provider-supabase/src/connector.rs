//! Supabase PostgREST connector implementation
//!
//! Implements the `CollectionsApi` trait against the REST surface of a
//! Supabase project. Row-level security on the backend enforces per-user
//! visibility; the connector only supplies the filters and credentials.

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, RetryPolicy};
use core_cache::models::{
    Favourite, FavouriteId, Folder, FolderEntry, FolderId, Song, SongId, UserId,
};
use core_data::{CollectionsApi, Result as DataResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, SupabaseError};
use crate::types::{
    FavouriteRow, FolderEntryRow, FolderRename, FolderRow, NewFavourite, NewFolder,
    NewFolderEntry, SongRow,
};

/// PostgREST path prefix on a Supabase project
const REST_API_BASE: &str = "/rest/v1";

/// Request timeout for collection calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const SONGS_TABLE: &str = "songs";
const FAVOURITES_TABLE: &str = "favourites";
const FOLDERS_TABLE: &str = "folders";
const FOLDER_ENTRIES_TABLE: &str = "folder_entries";

/// Supabase PostgREST connector
///
/// Implements `CollectionsApi` for the songs, favourites, folders and
/// folder_entries tables.
///
/// # Features
///
/// - Anon key plus per-request bearer token authentication
/// - Retried reads; mutations are sent exactly once
/// - `Prefer: return=representation` on inserts and updates so the cache
///   can store exactly what the backend persisted
///
/// # Example
///
/// ```ignore
/// use provider_supabase::SupabaseCollections;
/// use core_data::CollectionsApi;
///
/// let api = SupabaseCollections::new(http_client, base_url, anon_key);
/// let songs = api.list_songs(&token).await?;
/// ```
pub struct SupabaseCollections {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// Project base URL, e.g. `https://abc.supabase.co`
    base_url: String,

    /// Project anon key, sent as the `apikey` header
    anon_key: String,
}

impl SupabaseCollections {
    /// Create a new Supabase connector
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `base_url` - Supabase project URL without a trailing slash
    /// * `anon_key` - project anon key
    pub fn new(http_client: Arc<dyn HttpClient>, base_url: String, anon_key: String) -> Self {
        Self {
            http_client,
            base_url,
            anon_key,
        }
    }

    fn table_url(&self, table: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}{}/{}", self.base_url, REST_API_BASE, table)
        } else {
            format!("{}{}/{}?{}", self.base_url, REST_API_BASE, table, query)
        }
    }

    fn base_request(&self, method: HttpMethod, url: String, token: &str) -> HttpRequest {
        HttpRequest::new(method, url)
            .header("apikey", self.anon_key.clone())
            .bearer_token(token)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT)
    }

    fn check_status(response: &bridge_traits::http::HttpResponse) -> Result<()> {
        if response.is_success() {
            return Ok(());
        }

        let message = String::from_utf8_lossy(&response.body).to_string();
        if response.status == 401 || response.status == 403 {
            warn!(status = response.status, "Request rejected by backend");
            return Err(SupabaseError::PermissionDenied(message));
        }

        warn!(status = response.status, "API request failed");
        Err(SupabaseError::ApiError {
            status_code: response.status,
            message,
        })
    }

    /// Fetch rows from one table. Reads are idempotent and retried with the
    /// client's default backoff policy.
    async fn get_rows<T: DeserializeOwned>(
        &self,
        token: &str,
        table: &str,
        query: &str,
    ) -> Result<Vec<T>> {
        let request = self.base_request(HttpMethod::Get, self.table_url(table, query), token);
        let response = self
            .http_client
            .execute_with_retry(request, RetryPolicy::default())
            .await?;
        Self::check_status(&response)?;

        let rows: Vec<T> = serde_json::from_slice(&response.body).map_err(|e| {
            SupabaseError::ParseError(format!("Failed to parse {} response: {}", table, e))
        })?;
        debug!(table, rows = rows.len(), "Fetched rows");
        Ok(rows)
    }

    /// Insert one row and return the stored representation. Mutations are
    /// never retried.
    async fn insert_row<B: Serialize, T: DeserializeOwned>(
        &self,
        token: &str,
        table: &str,
        body: &B,
    ) -> Result<T> {
        let request = self
            .base_request(HttpMethod::Post, self.table_url(table, ""), token)
            .header("Prefer", "return=representation")
            .json(body)?;
        let response = self.http_client.execute(request).await?;
        Self::check_status(&response)?;
        Self::single_row(&response.body, table)
    }

    /// Patch rows matching `query` and return the stored representation.
    async fn patch_row<B: Serialize, T: DeserializeOwned>(
        &self,
        token: &str,
        table: &str,
        query: &str,
        body: &B,
    ) -> Result<T> {
        let request = self
            .base_request(HttpMethod::Patch, self.table_url(table, query), token)
            .header("Prefer", "return=representation")
            .json(body)?;
        let response = self.http_client.execute(request).await?;
        Self::check_status(&response)?;
        Self::single_row(&response.body, table)
    }

    /// Delete rows matching `query`.
    async fn delete_rows(&self, token: &str, table: &str, query: &str) -> Result<()> {
        let request = self.base_request(HttpMethod::Delete, self.table_url(table, query), token);
        let response = self.http_client.execute(request).await?;
        Self::check_status(&response)
    }

    /// PostgREST representations come back as an array even for single-row
    /// writes.
    fn single_row<T: DeserializeOwned>(body: &[u8], table: &str) -> Result<T> {
        let mut rows: Vec<T> = serde_json::from_slice(body).map_err(|e| {
            SupabaseError::ParseError(format!("Failed to parse {} representation: {}", table, e))
        })?;
        match rows.pop() {
            Some(row) => Ok(row),
            None => Err(SupabaseError::ParseError(format!(
                "Empty {} representation",
                table
            ))),
        }
    }

    fn user_filter(user: UserId) -> String {
        format!("user_id=eq.{}", urlencoding::encode(&user.to_string()))
    }
}

#[async_trait]
impl CollectionsApi for SupabaseCollections {
    #[instrument(skip(self, token))]
    async fn list_songs(&self, token: &str) -> DataResult<Vec<Song>> {
        let rows: Vec<SongRow> = self
            .get_rows(token, SONGS_TABLE, "order=number.asc")
            .await?;
        info!(songs = rows.len(), "Listed songs");
        Ok(rows.into_iter().map(Song::from).collect())
    }

    #[instrument(skip(self, token))]
    async fn list_favourites(&self, token: &str, user: UserId) -> DataResult<Vec<Favourite>> {
        let query = format!("{}&order=created_at.asc", Self::user_filter(user));
        let rows: Vec<FavouriteRow> = self.get_rows(token, FAVOURITES_TABLE, &query).await?;
        Ok(rows.into_iter().map(Favourite::from).collect())
    }

    #[instrument(skip(self, token))]
    async fn insert_favourite(
        &self,
        token: &str,
        user: UserId,
        song: SongId,
    ) -> DataResult<Favourite> {
        let body = NewFavourite {
            user_id: user.0,
            song_id: song.0,
        };
        let row: FavouriteRow = self.insert_row(token, FAVOURITES_TABLE, &body).await?;
        Ok(row.into())
    }

    #[instrument(skip(self, token))]
    async fn delete_favourite(&self, token: &str, id: FavouriteId) -> DataResult<()> {
        let query = format!("id=eq.{}", id);
        self.delete_rows(token, FAVOURITES_TABLE, &query).await?;
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn list_folders(&self, token: &str, user: UserId) -> DataResult<Vec<Folder>> {
        let query = format!("{}&order=name.asc", Self::user_filter(user));
        let rows: Vec<FolderRow> = self.get_rows(token, FOLDERS_TABLE, &query).await?;
        Ok(rows.into_iter().map(Folder::from).collect())
    }

    #[instrument(skip(self, token))]
    async fn insert_folder(&self, token: &str, user: UserId, name: &str) -> DataResult<Folder> {
        let body = NewFolder {
            user_id: user.0,
            name: name.to_string(),
        };
        let row: FolderRow = self.insert_row(token, FOLDERS_TABLE, &body).await?;
        Ok(row.into())
    }

    #[instrument(skip(self, token))]
    async fn rename_folder(&self, token: &str, id: FolderId, name: &str) -> DataResult<Folder> {
        let query = format!("id=eq.{}", id);
        let body = FolderRename {
            name: name.to_string(),
        };
        let row: FolderRow = self.patch_row(token, FOLDERS_TABLE, &query, &body).await?;
        Ok(row.into())
    }

    #[instrument(skip(self, token))]
    async fn delete_folder(&self, token: &str, id: FolderId) -> DataResult<()> {
        // folder_entries rows cascade on the backend
        let query = format!("id=eq.{}", id);
        self.delete_rows(token, FOLDERS_TABLE, &query).await?;
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn list_folder_entries(
        &self,
        token: &str,
        folder: FolderId,
    ) -> DataResult<Vec<FolderEntry>> {
        let query = format!("folder_id=eq.{}&order=created_at.asc", folder);
        let rows: Vec<FolderEntryRow> =
            self.get_rows(token, FOLDER_ENTRIES_TABLE, &query).await?;
        Ok(rows.into_iter().map(FolderEntry::from).collect())
    }

    #[instrument(skip(self, token))]
    async fn insert_folder_entry(
        &self,
        token: &str,
        folder: FolderId,
        song: SongId,
    ) -> DataResult<FolderEntry> {
        let body = NewFolderEntry {
            folder_id: folder.0,
            song_id: song.0,
        };
        let row: FolderEntryRow = self.insert_row(token, FOLDER_ENTRIES_TABLE, &body).await?;
        Ok(row.into())
    }

    #[instrument(skip(self, token))]
    async fn delete_folder_entry(
        &self,
        token: &str,
        folder: FolderId,
        song: SongId,
    ) -> DataResult<()> {
        let query = format!("folder_id=eq.{}&song_id=eq.{}", folder, song);
        self.delete_rows(token, FOLDER_ENTRIES_TABLE, &query)
            .await?;
        Ok(())
    }
}
