//! Durable storage for saved sessions
//!
//! Sessions are persisted as a single serialized value under a named slot.
//! `SlotStorage` is the read/write capability the session store is built
//! on; `SqliteStorage` keeps slots in a local SQLite file and
//! `MemoryStorage` keeps them in process memory.

use crate::error::{DormGuideError, Result};
use anyhow::Context;
use chrono::Utc;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Read/write primitives over named slots
///
/// Each write replaces the slot's previous value wholesale.
pub trait SlotStorage: Send + Sync {
    /// Read the value stored under `slot`, `None` if the slot was never written
    fn read(&self, slot: &str) -> Result<Option<String>>;

    /// Replace the value stored under `slot`
    fn write(&self, slot: &str, value: &str) -> Result<()>;
}

/// SQLite-backed slot storage
pub struct SqliteStorage {
    db_path: PathBuf,
}

impl SqliteStorage {
    /// Create a new storage instance
    ///
    /// Initializes the database file in the user's data directory.
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("edu", "unc", "dormguide").ok_or_else(|| {
            DormGuideError::Storage("Could not determine data directory".into())
        })?;

        Self::new_with_path(proj_dirs.data_dir().join("sessions.db"))
    }

    /// Create a new storage instance that uses the specified database path.
    ///
    /// Parent directories are created as needed.
    ///
    /// # Examples
    ///
    /// ```
    /// use dormguide::storage::{SlotStorage, SqliteStorage};
    ///
    /// let dir = std::env::temp_dir().join("dormguide-doc");
    /// let storage = SqliteStorage::new_with_path(dir.join("sessions.db")).unwrap();
    /// storage.write("sessions", "[]").unwrap();
    /// assert_eq!(storage.read("sessions").unwrap().as_deref(), Some("[]"));
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| DormGuideError::Storage(e.to_string()))?;
        }

        let storage = Self { db_path };
        storage.init()?;
        Ok(storage)
    }

    /// Open the configured path, or the default location when none is set
    pub fn open(db_path: Option<&str>) -> Result<Self> {
        match db_path {
            Some(path) => Self::new_with_path(path),
            None => Self::new(),
        }
    }

    /// Location of the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        let conn = self.connect()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS slots (
                name TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create tables")
        .map_err(|e| DormGuideError::Storage(e.to_string()))?;

        Ok(())
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| DormGuideError::Storage(e.to_string()).into())
    }
}

impl SlotStorage for SqliteStorage {
    fn read(&self, slot: &str) -> Result<Option<String>> {
        let conn = self.connect()?;

        let value = conn
            .query_row(
                "SELECT value FROM slots WHERE name = ?",
                params![slot],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .context("Failed to query slot")
            .map_err(|e| DormGuideError::Storage(e.to_string()))?;

        Ok(value)
    }

    fn write(&self, slot: &str, value: &str) -> Result<()> {
        let conn = self.connect()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO slots (name, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(name) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![slot, value, now],
        )
        .context("Failed to write slot")
        .map_err(|e| DormGuideError::Storage(e.to_string()))?;

        Ok(())
    }
}

/// In-process slot storage
///
/// Used when the SQLite file cannot be opened and in tests. Contents are
/// lost at process exit.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create empty in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create in-memory storage with one pre-populated slot
    pub fn with_slot(slot: &str, value: &str) -> Self {
        let storage = Self::new();
        if let Ok(mut slots) = storage.slots.lock() {
            slots.insert(slot.to_string(), value.to_string());
        }
        storage
    }
}

impl SlotStorage for MemoryStorage {
    fn read(&self, slot: &str) -> Result<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| DormGuideError::Storage("Memory storage lock poisoned".to_string()))?;
        Ok(slots.get(slot).cloned())
    }

    fn write(&self, slot: &str, value: &str) -> Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| DormGuideError::Storage("Memory storage lock poisoned".to_string()))?;
        slots.insert(slot.to_string(), value.to_string());
        Ok(())
    }
}

/// Open the configured SQLite storage, falling back to memory
///
/// Storage problems never stop a chat; sessions just won't outlive the
/// process.
pub fn open_or_memory(db_path: Option<&str>) -> Box<dyn SlotStorage> {
    match SqliteStorage::open(db_path) {
        Ok(storage) => {
            tracing::info!("Using session storage at {}", storage.path().display());
            Box::new(storage)
        }
        Err(e) => {
            tracing::warn!("Session storage unavailable, keeping sessions in memory: {}", e);
            Box::new(MemoryStorage::new())
        }
    }
}
