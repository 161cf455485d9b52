//! Trait definitions for the placer module.

use async_trait::async_trait;
use serde::Serialize;

use super::error::PlacerError;

/// Non-recursive listing of a directory, names only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirListing {
    pub dirs: Vec<String>,
    pub files: Vec<String>,
}

/// Filesystem operations the fetch engine needs.
#[async_trait]
pub trait Placer: Send + Sync {
    /// Returns the name of this placer implementation.
    fn name(&self) -> &str;

    /// Whether this placer can write to `path` at all.
    fn supports(&self, _path: &str) -> bool {
        true
    }

    /// Whether a file or directory exists at `path`.
    async fn exists(&self, path: &str) -> bool;

    /// Creates `path` and any missing parents.
    async fn create_dir_all(&self, path: &str) -> Result<(), PlacerError>;

    /// Writes `contents` to `path`, replacing any existing file. Returns bytes written.
    async fn write_file(&self, path: &str, contents: &[u8]) -> Result<u64, PlacerError>;

    /// Lists the immediate children of `path`. A missing directory lists as empty.
    async fn list_dir(&self, path: &str) -> Result<DirListing, PlacerError>;
}
