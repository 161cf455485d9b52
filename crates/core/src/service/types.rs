//! Types for the artwork service.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::library::LibraryError;
use crate::media::{MediaError, MediaType};
use crate::processor::RunSummary;

/// Errors from service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("library error: {0}")]
    Library(#[from] LibraryError),

    #[error("invalid library record: {0}")]
    Media(#[from] MediaError),

    /// Only movies, shows, episodes and music videos are queued as recently added.
    #[error("{0} items cannot be queued as recently added")]
    NotQueueable(MediaType),

    #[error("a run is already in progress")]
    Busy,
}

/// What the service is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    #[default]
    Idle,
    /// A run was requested and starts on the next loop pass.
    Signalled,
    Processing,
}

/// A requested run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunSignal {
    AllVideos,
    NewVideos,
    AllMusic,
    NewMusic,
    RecentVideos,
}

impl RunSignal {
    pub fn for_scope(scope: RunScope, only_new: bool) -> Self {
        match (scope, only_new) {
            (RunScope::Videos, false) => RunSignal::AllVideos,
            (RunScope::Videos, true) => RunSignal::NewVideos,
            (RunScope::Music, false) => RunSignal::AllMusic,
            (RunScope::Music, true) => RunSignal::NewMusic,
        }
    }

    /// Media types a full-library run walks, in order.
    pub fn media_types(&self) -> &'static [MediaType] {
        match self {
            RunSignal::AllVideos | RunSignal::NewVideos => &VIDEO_TYPES,
            RunSignal::AllMusic | RunSignal::NewMusic => &MUSIC_TYPES,
            RunSignal::RecentVideos => &[],
        }
    }

    /// Whether items already in the processed store are skipped.
    pub fn only_new(&self) -> bool {
        matches!(self, RunSignal::NewVideos | RunSignal::NewMusic)
    }

    pub fn heading(&self) -> &'static str {
        match self {
            RunSignal::AllVideos => "Processing all videos",
            RunSignal::NewVideos => "Processing new videos",
            RunSignal::AllMusic => "Processing all music",
            RunSignal::NewMusic => "Processing new music",
            RunSignal::RecentVideos => "Processing recently added videos",
        }
    }
}

pub const VIDEO_TYPES: [MediaType; 6] = [
    MediaType::TvShow,
    MediaType::Movie,
    MediaType::Episode,
    MediaType::Season,
    MediaType::MovieSet,
    MediaType::MusicVideo,
];

pub const MUSIC_TYPES: [MediaType; 3] = [MediaType::Artist, MediaType::Album, MediaType::Song];

/// Library section a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunScope {
    Videos,
    Music,
}

/// Point-in-time view of the service.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServiceSnapshot {
    pub status: ServiceStatus,
    pub pending_signal: Option<RunSignal>,
    /// Recently added items waiting for a run.
    pub recent_queued: usize,
    pub last_run: Option<RunSummary>,
}
