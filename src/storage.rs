use crate::models::Conversation;
use directories::ProjectDirs;
use rusqlite::{Connection, OptionalExtension, params};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Key the conversation list is stored under.
pub const CONVERSATIONS_KEY: &str = "medidesk.conversations";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serialize: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("no data directory available")]
    NoDataDir,
    #[error("stored conversations are unreadable: {0}")]
    Corrupt(String),
}

/// Where the conversation set lives between sessions.
///
/// `load` returns `Ok(None)` when nothing has been saved yet.
pub trait Persistence {
    fn load(&self) -> Result<Option<Vec<Conversation>>, StorageError>;
    fn save(&self, conversations: &[Conversation]) -> Result<(), StorageError>;
}

fn decode(blob: &str) -> Result<Vec<Conversation>, StorageError> {
    serde_json::from_str(blob).map_err(|e| StorageError::Corrupt(e.to_string()))
}

pub fn default_db_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("com", "example", "MediDesk")?;
    Some(proj.data_dir().join("medidesk.sqlite"))
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Key/value blob table in an embedded SQLite database.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if path != Path::new(":memory:") {
            ensure_dir(path)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_default() -> Result<Self, StorageError> {
        let path = default_db_path().ok_or(StorageError::NoDataDir)?;
        Self::open(path)
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(Self { conn })
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let value: Option<String> = stmt.query_row(params![key], |row| row.get(0)).optional()?;
        Ok(value)
    }

    pub fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value=excluded.value,
                updated_at=excluded.updated_at
            "#,
            params![key, value, now],
        )?;
        Ok(())
    }
}

impl Persistence for SqliteStorage {
    fn load(&self) -> Result<Option<Vec<Conversation>>, StorageError> {
        match self.get(CONVERSATIONS_KEY)? {
            Some(blob) => decode(&blob).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, conversations: &[Conversation]) -> Result<(), StorageError> {
        let blob = serde_json::to_string(conversations)?;
        self.put(CONVERSATIONS_KEY, &blob)
    }
}

/// Single in-process slot, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blob: RefCell<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: RefCell::new(Some(blob.into())),
        }
    }

    pub fn blob(&self) -> Option<String> {
        self.blob.borrow().clone()
    }
}

impl Persistence for MemoryStorage {
    fn load(&self) -> Result<Option<Vec<Conversation>>, StorageError> {
        match self.blob.borrow().as_deref() {
            Some(blob) => decode(blob).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, conversations: &[Conversation]) -> Result<(), StorageError> {
        *self.blob.borrow_mut() = Some(serde_json::to_string(conversations)?);
        Ok(())
    }
}
