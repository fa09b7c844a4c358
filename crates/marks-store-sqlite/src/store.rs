//! [`SqliteStore`] — the SQLite implementation of [`GradebookStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use marks_core::{gradebook::Gradebook, store::GradebookStore};

use crate::{
  Error, Result,
  encode::{decode_book_lossy, encode_book, encode_dt},
  schema::SCHEMA,
};

/// Key under which the gradebook blob is stored.
pub const GRADEBOOK_KEY: &str = "gradebook";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A gradebook store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
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

  /// Read the raw value for `key`.
  async fn get(&self, key: &'static str) -> Result<Option<String>> {
    let row = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value FROM kv WHERE key = ?1",
              rusqlite::params![key],
              |row| row.get::<_, String>(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(row)
  }

  /// Insert or overwrite `key`.
  async fn put(&self, key: &'static str, value: String) -> Result<()> {
    let at_str = encode_dt(Utc::now());
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(key) DO UPDATE SET
             value = excluded.value,
             updated_at = excluded.updated_at",
          rusqlite::params![key, value, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Overwrite the stored blob verbatim, bypassing serialisation.
  #[cfg(test)]
  pub(crate) async fn put_raw(&self, raw: impl Into<String>) -> Result<()> {
    self.put(GRADEBOOK_KEY, raw.into()).await
  }
}

// ─── GradebookStore impl ─────────────────────────────────────────────────────

impl GradebookStore for SqliteStore {
  type Error = Error;

  async fn load(&self) -> Result<Gradebook> {
    let book = match self.get(GRADEBOOK_KEY).await? {
      Some(raw) => decode_book_lossy(&raw),
      None => {
        tracing::info!("no stored gradebook, starting empty");
        Gradebook::new()
      }
    };
    tracing::info!(records = book.len(), "gradebook loaded");
    Ok(book)
  }

  async fn save(&self, book: &Gradebook) -> Result<()> {
    let raw = encode_book(book)?;
    self.put(GRADEBOOK_KEY, raw).await?;
    tracing::debug!(records = book.len(), "gradebook persisted");
    Ok(())
  }

  async fn raw_blob(&self) -> Result<Option<String>> {
    self.get(GRADEBOOK_KEY).await
  }
}
