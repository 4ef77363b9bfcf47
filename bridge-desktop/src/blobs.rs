//! Blob Storage using SQLite

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::BlobStore,
};
use bytes::Bytes;
use sqlx::{sqlite::SqlitePool, Row};
use std::path::PathBuf;
use tracing::debug;

/// SQLite-backed blob store implementation
///
/// Persists named blobs in a single-table SQLite database. Each blob is an
/// independent row, so writing the snapshot blob never touches the
/// preferences blob and vice versa.
pub struct SqliteBlobStore {
    pool: SqlitePool,
}

impl SqliteBlobStore {
    /// Create a new blob store with the given database path
    pub async fn new(db_path: PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        // Convert path to string, replacing backslashes with forward slashes for SQLite URL
        let path_str = db_path.to_string_lossy().replace('\\', "/");
        let db_url = format!("sqlite://{}?mode=rwc", path_str);

        let pool = SqlitePool::connect(&db_url)
            .await
            .map_err(|e| BridgeError::StorageError(format!("Failed to connect to DB: {}", e)))?;

        Self::create_table(&pool).await?;

        debug!(path = ?db_path, "Initialized blob store");

        Ok(Self { pool })
    }

    /// Create an in-memory blob store (for testing)
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .map_err(|e| BridgeError::StorageError(format!("Failed to connect to DB: {}", e)))?;

        Self::create_table(&pool).await?;

        Ok(Self { pool })
    }

    async fn create_table(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS blobs (
                name TEXT PRIMARY KEY,
                data BLOB NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| BridgeError::StorageError(format!("Failed to create table: {}", e)))?;

        Ok(())
    }

    /// Get the current Unix timestamp
    fn now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

#[async_trait]
impl BlobStore for SqliteBlobStore {
    async fn get_blob(&self, name: &str) -> Result<Option<Bytes>> {
        let row = sqlx::query("SELECT data FROM blobs WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BridgeError::StorageError(format!("Failed to read blob: {}", e)))?;

        match row {
            Some(row) => {
                let data: Vec<u8> = row.get(0);
                debug!(name = name, bytes = data.len(), "Read blob");
                Ok(Some(Bytes::from(data)))
            }
            None => Ok(None),
        }
    }

    async fn put_blob(&self, name: &str, data: Bytes) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO blobs (name, data, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(name)
        .bind(data.as_ref())
        .bind(Self::now())
        .execute(&self.pool)
        .await
        .map_err(|e| BridgeError::StorageError(format!("Failed to write blob: {}", e)))?;

        debug!(name = name, bytes = data.len(), "Stored blob");
        Ok(())
    }

    async fn delete_blob(&self, name: &str) -> Result<()> {
        sqlx::query("DELETE FROM blobs WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| BridgeError::StorageError(format!("Failed to delete blob: {}", e)))?;

        debug!(name = name, "Deleted blob");
        Ok(())
    }

    async fn has_blob(&self, name: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM blobs WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BridgeError::StorageError(format!("Failed to check blob: {}", e)))?;

        Ok(row.is_some())
    }

    async fn list_blobs(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT name FROM blobs ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| BridgeError::StorageError(format!("Failed to list blobs: {}", e)))?;

        let names = rows.into_iter().map(|row| row.get(0)).collect();
        Ok(names)
    }
}
