use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::data::{EditedImage, Location};

/// Errors raised by the record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("could not create database directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("record store is closed")]
    Closed,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The RecordStore manages the SQLite table of saved edits.
///
/// It is opened once at startup, shared by reference between the UI and
/// background save tasks, and closed explicitly when the window goes away.
/// Records are only ever inserted or deleted, never updated.
pub struct RecordStore {
    conn: Mutex<Option<Connection>>,
    db_path: Option<PathBuf>,
}

impl RecordStore {
    /// Open (or create) the database file at `path`.
    /// The parent directory is created if needed. Call [`init`](Self::init)
    /// before using the store.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        log::info!("📁 Record store opened at: {}", path.display());

        Ok(RecordStore {
            conn: Mutex::new(Some(conn)),
            db_path: Some(path.to_path_buf()),
        })
    }

    /// Open a private in-memory store
    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(RecordStore {
            conn: Mutex::new(Some(conn)),
            db_path: None,
        })
    }

    /// Create the schema if it doesn't exist yet. Safe to call on every launch.
    pub fn init(&self) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS edited_images (
                    id              INTEGER PRIMARY KEY AUTOINCREMENT,
                    original_uri    TEXT NOT NULL,
                    edited_uri      TEXT NOT NULL,
                    timestamp       DATETIME NOT NULL
                                    DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
                );
                CREATE INDEX IF NOT EXISTS idx_edited_images_timestamp
                    ON edited_images(timestamp DESC);",
            )?;
            Ok(())
        })?;

        log::debug!("✅ Record schema initialized");
        Ok(())
    }

    /// Append one record. The timestamp is assigned by SQLite.
    /// Returns the new record ID.
    pub fn insert(&self, original: &Location, edited: &Location) -> StoreResult<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO edited_images (original_uri, edited_uri) VALUES (?1, ?2)",
                params![original, edited],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Every record, newest first
    pub fn list_all(&self) -> StoreResult<Vec<EditedImage>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, original_uri, edited_uri, timestamp
                 FROM edited_images
                 ORDER BY timestamp DESC, id DESC",
            )?;

            let rows = stmt.query_map([], |row| {
                Ok(EditedImage {
                    id: row.get(0)?,
                    original: row.get(1)?,
                    edited: row.get(2)?,
                    timestamp: row.get(3)?,
                })
            })?;

            let mut records = Vec::new();
            for record in rows {
                records.push(record?);
            }
            Ok(records)
        })
    }

    /// Remove the record with `id`. Unknown ids are ignored.
    pub fn delete_by_id(&self, id: i64) -> StoreResult<()> {
        let removed = self.with_conn(|conn| {
            Ok(conn.execute("DELETE FROM edited_images WHERE id = ?1", params![id])?)
        })?;

        if removed == 0 {
            log::debug!("No record with id {} to delete", id);
        }
        Ok(())
    }

    /// Number of stored records
    pub fn count(&self) -> StoreResult<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM edited_images", [], |row| row.get(0))?)
        })
    }

    /// End the store's lifecycle. Any later call fails with [`StoreError::Closed`].
    pub fn close(&self) -> StoreResult<()> {
        let Some(conn) = self.conn.lock().take() else {
            return Ok(());
        };

        conn.close().map_err(|(_, err)| StoreError::Sqlite(err))?;
        log::info!("📁 Record store closed");
        Ok(())
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> StoreResult<T>) -> StoreResult<T> {
        let guard = self.conn.lock();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        f(conn)
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("db_path", &self.db_path)
            .field("open", &self.conn.lock().is_some())
            .finish()
    }
}
