//! Media entry errors.

use thiserror::Error;

/// Errors raised while building a media entry from a library record.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The record has none of the known id keys, or names an unknown type.
    #[error("unknown media type: {0}")]
    UnknownMediaType(String),

    /// A field the media type requires is absent or has the wrong shape.
    #[error("missing or invalid field '{field}' on {media_type} record")]
    MissingField {
        media_type: &'static str,
        field: &'static str,
    },
}

impl MediaError {
    pub fn missing(media_type: &'static str, field: &'static str) -> Self {
        Self::MissingField { media_type, field }
    }
}
