//! Persistent key/value storage for client state (token, expiry, profile).

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::error::{ApiError, ApiResult};

/// Trait for storage backends holding string values under fixed keys.
pub trait LocalStorage: Send + Sync {
  /// Read a value. Missing keys are `Ok(None)`.
  fn get(&self, key: &str) -> ApiResult<Option<String>>;

  /// Insert or overwrite a value.
  fn set(&self, key: &str, value: &str) -> ApiResult<()>;

  /// Remove a value. Removing a missing key is not an error.
  fn remove(&self, key: &str) -> ApiResult<()>;
}

/// In-process storage. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
  values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }
}

fn poisoned<E: std::fmt::Display>(e: E) -> ApiError {
  ApiError::Storage {
    message: format!("Lock poisoned: {}", e),
  }
}

impl LocalStorage for MemoryStorage {
  fn get(&self, key: &str) -> ApiResult<Option<String>> {
    let values = self.values.lock().map_err(poisoned)?;
    Ok(values.get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> ApiResult<()> {
    let mut values = self.values.lock().map_err(poisoned)?;
    values.insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn remove(&self, key: &str) -> ApiResult<()> {
    let mut values = self.values.lock().map_err(poisoned)?;
    values.remove(key);
    Ok(())
  }
}

/// SQLite-backed storage.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

/// Schema for the key/value table.
const STORAGE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS local_storage (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl SqliteStorage {
  /// Open the storage at the default location.
  pub fn open_default() -> ApiResult<Self> {
    Self::open(&Self::default_path()?)
  }

  /// Open or create the storage database at `path`.
  pub fn open(path: &Path) -> ApiResult<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).map_err(|e| ApiError::Storage {
        message: format!("Failed to create storage directory: {}", e),
      })?;
    }

    let conn = Connection::open(path).map_err(|e| ApiError::Storage {
      message: format!("Failed to open storage at {}: {}", path.display(), e),
    })?;
    debug!(path = %path.display(), "opened local storage");

    Self::with_connection(conn)
  }

  /// Storage living only in memory. Same SQL paths as the file-backed one.
  #[cfg(test)]
  pub fn in_memory() -> ApiResult<Self> {
    Self::with_connection(Connection::open_in_memory()?)
  }

  fn with_connection(conn: Connection) -> ApiResult<Self> {
    conn.execute_batch(STORAGE_SCHEMA).map_err(|e| ApiError::Storage {
      message: format!("Failed to run storage migrations: {}", e),
    })?;
    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  /// Get the default database path.
  pub fn default_path() -> ApiResult<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| ApiError::Storage {
        message: "Could not determine data directory".to_string(),
      })?;

    Ok(data_dir.join("smart-course").join("storage.db"))
  }
}

impl LocalStorage for SqliteStorage {
  fn get(&self, key: &str) -> ApiResult<Option<String>> {
    let conn = self.conn.lock().map_err(poisoned)?;
    let value = conn
      .query_row(
        "SELECT value FROM local_storage WHERE key = ?",
        params![key],
        |row| row.get(0),
      )
      .optional()?;
    Ok(value)
  }

  fn set(&self, key: &str, value: &str) -> ApiResult<()> {
    let conn = self.conn.lock().map_err(poisoned)?;
    conn.execute(
      "INSERT OR REPLACE INTO local_storage (key, value, updated_at)
       VALUES (?, ?, datetime('now'))",
      params![key, value],
    )?;
    Ok(())
  }

  fn remove(&self, key: &str) -> ApiResult<()> {
    let conn = self.conn.lock().map_err(poisoned)?;
    conn.execute("DELETE FROM local_storage WHERE key = ?", params![key])?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn exercise(storage: &dyn LocalStorage) {
    assert_eq!(storage.get("auth_token").unwrap(), None);

    storage.set("auth_token", "abc").unwrap();
    assert_eq!(storage.get("auth_token").unwrap().as_deref(), Some("abc"));

    storage.set("auth_token", "def").unwrap();
    assert_eq!(storage.get("auth_token").unwrap().as_deref(), Some("def"));

    storage.remove("auth_token").unwrap();
    assert_eq!(storage.get("auth_token").unwrap(), None);

    // Removing twice is fine
    storage.remove("auth_token").unwrap();
  }

  #[test]
  fn test_memory_storage() {
    exercise(&MemoryStorage::new());
  }

  #[test]
  fn test_sqlite_storage_in_memory() {
    exercise(&SqliteStorage::in_memory().unwrap());
  }

  #[test]
  fn test_sqlite_storage_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("storage.db");

    {
      let storage = SqliteStorage::open(&path).unwrap();
      storage.set("userData", r#"{"id":1}"#).unwrap();
    }

    let storage = SqliteStorage::open(&path).unwrap();
    assert_eq!(
      storage.get("userData").unwrap().as_deref(),
      Some(r#"{"id":1}"#)
    );
  }
}
