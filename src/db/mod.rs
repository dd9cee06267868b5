//! This module is responsible for reading and writing the SQLite database.
//!
//! The database is a plain key-value table: one row per collection, holding that collection's
//! JSON array.

use crate::store::KeyValue;
use crate::Result;
use anyhow::{bail, Context};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{debug, trace};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS collections (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
)";

/// A `KeyValue` medium stored in a SQLite file.
#[derive(Debug, Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Creates the `collections` table
    pub async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A database already exists at '{}'", path.display());
        }
        debug!("Creating SQLite database at {}", path.display());
        let db = Self {
            pool: connect(path, true).await?,
        };
        db.create_table().await?;
        Ok(db)
    }

    /// - Validates that there is a SQLite file at `path`
    /// - Opens a connection pool
    /// - Creates the `collections` table if it is missing
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("The database file is missing '{}'", path.display());
        }
        debug!("Opening SQLite database at {}", path.display());
        let db = Self {
            pool: connect(path, false).await?,
        };
        db.create_table().await?;
        Ok(db)
    }

    async fn create_table(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .context("Failed to create the collections table")?;
        Ok(())
    }

    /// The keys that currently have a value.
    #[cfg(test)]
    async fn keys(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT key FROM collections ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list the stored keys")?;
        Ok(rows.into_iter().map(|(key,)| key).collect())
    }
}

#[async_trait::async_trait]
impl KeyValue for Db {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        trace!("get_item {key}");
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM collections WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to read '{key}' from the database"))?;
        Ok(row.map(|(value,)| value))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        trace!("set_item {key} ({} bytes)", value.len());
        sqlx::query(
            "INSERT INTO collections (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to write '{key}' to the database"))?;
        Ok(())
    }
}

async fn connect(path: &Path, create: bool) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open SQLite database at {}", path.display()))
}
