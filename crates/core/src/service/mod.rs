//! Background service that owns the run loop.
//!
//! Runs are requested as [`RunSignal`]s (whole library sections, only new
//! items, or the recently-added queue) and executed one at a time by the
//! [`ArtworkService`] loop through the [`ArtworkProcessor`](crate::processor::ArtworkProcessor).

mod config;
mod feed;
mod runner;
mod types;

pub use config::ServiceConfig;
pub use feed::{LibraryPager, RecentFeed, EPISODE_PAGE_SIZE, PAGE_SIZE, SKIP_BATCH};
pub use runner::{ArtworkService, RECENT_TYPES};
pub use types::{
    RunScope, RunSignal, ServiceError, ServiceSnapshot, ServiceStatus, MUSIC_TYPES, VIDEO_TYPES,
};
