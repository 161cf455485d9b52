//! Error types for the placer module.

use thiserror::Error;

/// Errors that can occur while placing artwork files.
#[derive(Debug, Error)]
pub enum PlacerError {
    /// Failed to create a directory.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("Failed to write file: {path}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to list a directory.
    #[error("Failed to list directory: {path}")]
    ListFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The path cannot be handled by this placer.
    #[error("Unsupported path: {path}")]
    UnsupportedPath { path: String },
}

impl PlacerError {
    /// Creates a write failed error.
    pub fn write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::WriteFailed {
            path: path.into(),
            source,
        }
    }

    /// The path the failed operation targeted.
    pub fn path(&self) -> &str {
        match self {
            Self::DirectoryCreationFailed { path, .. }
            | Self::WriteFailed { path, .. }
            | Self::ListFailed { path, .. }
            | Self::UnsupportedPath { path } => path,
        }
    }
}
