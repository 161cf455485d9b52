//! Processed-items bookkeeping.
//!
//! Remembers which library items already went through a clean run so that
//! "new only" runs can skip them.

mod sqlite;

pub use sqlite::SqliteProcessedStore;

use serde_json::Value;
use thiserror::Error;

use crate::media::MediaType;

/// Errors from the processed-items store.
#[derive(Debug, Error)]
pub enum ProcessedError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Stored data is not valid JSON: {0}")]
    InvalidData(String),
}

/// Storage for processed library items.
pub trait ProcessedStore: Send + Sync {
    /// Whether the item was processed under this label. A renamed item counts as new.
    fn exists(&self, dbid: i64, media_type: MediaType, label: &str) -> Result<bool, ProcessedError>;

    /// Records the item, replacing any earlier row for the same id and type.
    ///
    /// Items with an empty label are not recorded.
    fn set_data(
        &self,
        dbid: i64,
        media_type: MediaType,
        label: &str,
        data: Option<&Value>,
    ) -> Result<(), ProcessedError>;

    /// Data stored with the item, if any.
    fn get_data(&self, dbid: i64, media_type: MediaType, label: &str) -> Result<Option<Value>, ProcessedError>;
}
