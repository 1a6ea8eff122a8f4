//! SQLite-backed key/value store.
//!
//! A single `kv` table holding JSON values, with in-process change
//! notification: listeners registered through the `KeyValueStore` trait
//! fire after every committed write. This is the production store for
//! the CLI; tests mostly use `MemoryStore`.

use rusqlite::{params, Connection};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::data_dir;
use crate::error::{Result, StorageError};
use crate::host::{ChangeListener, KeyValueStore, StorageChange};

pub struct LocalStore {
    conn: Mutex<Connection>,
    listeners: Mutex<Vec<ChangeListener>>,
}

impl LocalStore {
    /// Open (or create) the store at the default data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(data_dir()?.join("focusgate.db"))
    }

    /// Open (or create) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: PathBuf::from(path),
            source,
        })?;
        Self::init(conn)
    }

    /// In-memory store, for tests.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::OpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )
        .map_err(StorageError::from)?;
        Ok(Self {
            conn: Mutex::new(conn),
            listeners: Mutex::new(Vec::new()),
        })
    }

    fn read(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        let mut stmt = conn
            .prepare("SELECT value FROM kv WHERE key = ?1")
            .map_err(StorageError::from)?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(raw) => {
                let value =
                    serde_json::from_str(&raw).map_err(|e| StorageError::CorruptValue {
                        key: key.to_string(),
                        message: e.to_string(),
                    })?;
                Ok(Some(value))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        self.read(key)
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let old = self.read(key)?;
        {
            let conn = self
                .conn
                .lock()
                .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
            conn.execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value.to_string()],
            )
            .map_err(StorageError::from)?;
        }
        // Snapshot listeners before invoking so a listener can write
        // back into the store without deadlocking.
        let listeners: Vec<ChangeListener> = match self.listeners.lock() {
            Ok(l) => l.clone(),
            Err(_) => Vec::new(),
        };
        let change = StorageChange {
            key: key.to_string(),
            old,
            new: Some(value),
        };
        for listener in listeners {
            listener(&change);
        }
        Ok(())
    }

    fn subscribe(&self, listener: ChangeListener) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(listener);
        }
    }
}
