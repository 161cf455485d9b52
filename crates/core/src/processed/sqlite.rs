//! SQLite-backed processed-items store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use super::{ProcessedError, ProcessedStore};
use crate::media::MediaType;

/// SQLite-backed processed-items store.
pub struct SqliteProcessedStore {
    conn: Mutex<Connection>,
}

impl SqliteProcessedStore {
    /// Open the store, creating the database file and table if needed.
    pub fn new(path: &Path) -> Result<Self, ProcessedError> {
        let conn = Connection::open(path).map_err(|e| ProcessedError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, ProcessedError> {
        let conn = Connection::open_in_memory().map_err(|e| ProcessedError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), ProcessedError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS processeditems (
                mediaid INTEGER NOT NULL,
                mediatype TEXT NOT NULL,
                medialabel TEXT,
                data TEXT,
                PRIMARY KEY (mediaid, mediatype)
            );
            "#,
        )
        .map_err(|e| ProcessedError::Database(e.to_string()))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, ProcessedError> {
        self.conn
            .lock()
            .map_err(|_| ProcessedError::Database("connection lock poisoned".to_string()))
    }
}

impl ProcessedStore for SqliteProcessedStore {
    fn exists(&self, dbid: i64, media_type: MediaType, label: &str) -> Result<bool, ProcessedError> {
        let conn = self.lock()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM processeditems WHERE mediaid = ? AND mediatype = ? AND medialabel = ?",
                params![dbid, media_type.as_str(), label],
                |_| Ok(true),
            )
            .optional()
            .map_err(|e| ProcessedError::Database(e.to_string()))?;
        Ok(found.unwrap_or(false))
    }

    fn set_data(
        &self,
        dbid: i64,
        media_type: MediaType,
        label: &str,
        data: Option<&Value>,
    ) -> Result<(), ProcessedError> {
        if label.is_empty() {
            return Ok(());
        }
        let data = data.map(Value::to_string);
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO processeditems (mediaid, mediatype, medialabel, data) VALUES (?, ?, ?, ?)",
            params![dbid, media_type.as_str(), label, data],
        )
        .map_err(|e| ProcessedError::Database(e.to_string()))?;
        Ok(())
    }

    fn get_data(&self, dbid: i64, media_type: MediaType, label: &str) -> Result<Option<Value>, ProcessedError> {
        let conn = self.lock()?;
        let data: Option<Option<String>> = conn
            .query_row(
                "SELECT data FROM processeditems WHERE mediaid = ? AND mediatype = ? AND medialabel = ?",
                params![dbid, media_type.as_str(), label],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| ProcessedError::Database(e.to_string()))?;

        match data.flatten() {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| ProcessedError::InvalidData(e.to_string())),
            None => Ok(None),
        }
    }
}
