//! Types for the run orchestrator.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::fetcher::FetchError;
use crate::library::LibraryError;
use crate::media::{MediaEntry, MediaType};

/// One element of a run's input.
#[derive(Debug, Clone)]
pub enum RunItem {
    Entry(Box<MediaEntry>),
    /// Items filtered out before the run (already processed); counted for progress only.
    Skipped(usize),
}

impl RunItem {
    pub fn entry(entry: MediaEntry) -> Self {
        RunItem::Entry(Box::new(entry))
    }
}

/// Errors that end the processing of one entry.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// A problem recorded on an entry during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryError {
    pub media_type: MediaType,
    pub dbid: i64,
    pub label: String,
    pub message: String,
}

impl EntryError {
    pub(crate) fn from_entry(entry: &MediaEntry) -> Option<Self> {
        entry.error.as_ref().map(|message| Self {
            media_type: entry.media_type(),
            dbid: entry.dbid,
            label: entry.label.clone(),
            message: message.clone(),
        })
    }
}

/// Result of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// The run stopped early on a cancellation request.
    pub aborted: bool,
    /// Artwork assigned across all entries.
    pub updated_art_count: usize,
    /// Entries that went through processing.
    pub processed: usize,
    /// Entries skipped by exclusion rules or filtered out before the run.
    pub excluded: usize,
    pub errors: Vec<EntryError>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}
