//! [`SqliteStateStore`], the SQLite implementation of [`StateStore`].

use std::path::Path;

use redline_core::state::StateStore;
use rusqlite::OptionalExtension as _;
use tracing::debug;

use crate::{
  Error, Result,
  schema::{SCHEMA, SCHEMA_VERSION},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A UI state cache backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStateStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStateStore {
  /// Open (or create) a cache at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory cache, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let found: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?))
      .await?;
    if found > SCHEMA_VERSION {
      return Err(Error::SchemaTooNew {
        found,
        supported: SCHEMA_VERSION,
      });
    }

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
        let mut stmt = conn.prepare("SELECT key FROM ui_state ORDER BY key")?;
        let keys = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(keys)
      })
      .await?;
    Ok(keys)
  }
}

// ─── StateStore impl ─────────────────────────────────────────────────────────

impl StateStore for SqliteStateStore {
  type Error = Error;

  async fn get(&self, key: &str) -> Result<Option<String>> {
    let key = key.to_owned();
    let value = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value FROM ui_state WHERE key = ?1",
              rusqlite::params![key],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(value)
  }

  async fn set(&self, key: &str, value: &str) -> Result<()> {
    let key = key.to_owned();
    let value = value.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO ui_state (key, value) VALUES (?1, ?2)
           ON CONFLICT (key) DO UPDATE SET
             value      = excluded.value,
             updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
          rusqlite::params![key, value],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn clear(&self, keys: &[&str]) -> Result<()> {
    let keys: Vec<String> = keys.iter().map(|k| (*k).to_owned()).collect();
    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut removed = 0;
        {
          let mut stmt = tx.prepare("DELETE FROM ui_state WHERE key = ?1")?;
          for key in &keys {
            removed += stmt.execute(rusqlite::params![key])?;
          }
        }
        tx.commit()?;
        Ok(removed)
      })
      .await?;
    debug!(removed, "cleared ui state keys");
    Ok(())
  }
}
