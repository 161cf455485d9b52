//! Library errors.

use thiserror::Error;

/// Errors from the media library service.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The library rejected the request.
    #[error("Library RPC error {code} in {method}: {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },

    /// The library could not be reached.
    #[error("Library connection failed: {0}")]
    ConnectionFailed(String),

    /// The response did not have the expected shape.
    #[error("Unexpected library response for {method}: {reason}")]
    InvalidResponse { method: String, reason: String },

    #[error("Library item not found: {media_type} {dbid}")]
    NotFound { media_type: String, dbid: i64 },
}

impl LibraryError {
    pub fn invalid(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            method: method.into(),
            reason: reason.into(),
        }
    }
}
