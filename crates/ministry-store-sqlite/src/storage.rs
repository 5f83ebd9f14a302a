//! [`SqliteStorage`] — the SQLite implementation of [`Storage`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tracing::debug;

use ministry_core::storage::{Storage, StorageKey};

use crate::{Error, Result, schema::SCHEMA};

// ─── Storage ─────────────────────────────────────────────────────────────────

/// Local persistent storage backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStorage {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStorage {
  /// Open (or create) a database at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let storage = Self { conn };
    storage.init_schema().await?;
    Ok(storage)
  }

  /// Open an in-memory database — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let storage = Self { conn };
    storage.init_schema().await?;
    Ok(storage)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Every key currently stored, sorted.
  pub async fn keys(&self) -> Result<Vec<String>> {
    let keys = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(keys)
  }
}

// ─── Storage impl ────────────────────────────────────────────────────────────

impl Storage for SqliteStorage {
  type Error = Error;

  async fn get(&self, key: StorageKey) -> Result<Option<String>> {
    let key_str = key.as_str();

    let value: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT value FROM kv WHERE key = ?1",
            rusqlite::params![key_str],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;

    Ok(value)
  }

  async fn put(&self, key: StorageKey, value: String) -> Result<()> {
    let key_str = key.as_str();
    let at_str  = Utc::now().to_rfc3339();
    debug!(key = key_str, bytes = value.len(), "sqlite put");

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(key) DO UPDATE SET
             value      = excluded.value,
             updated_at = excluded.updated_at",
          rusqlite::params![key_str, value, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn remove(&self, key: StorageKey) -> Result<()> {
    let key_str = key.as_str();

    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM kv WHERE key = ?1", rusqlite::params![key_str])?;
        Ok(())
      })
      .await?;

    Ok(())
  }
}
