//! Library items and the artwork references they carry.
//!
//! A [`MediaEntry`] is built from a library record at the start of a run and
//! owned by the run orchestrator while it is processed. The resolver and fetch
//! engine only borrow it.

mod entry;
mod error;
mod images;
mod types;

pub use entry::{MediaDetails, MediaEntry};
pub use error::MediaError;
pub use images::{
    is_fetchable, quote_image, quote_path, unquote_image, video_thumbnail_path, ImageKind, PENDING_ART,
};
pub use types::{split_art_type, MediaClass, MediaType};
