//! Mock placer for testing.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::placer::{DirListing, Placer, PlacerError};

/// A recorded write for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedWrite {
    pub path: String,
    pub size: usize,
    /// Whether the write succeeded.
    pub success: bool,
}

/// In-memory implementation of the Placer trait.
///
/// Provides controllable behavior for testing:
/// - Seed files and directories
/// - Track writes and listings for assertions
/// - Simulate write failures, once or persistently
///
/// # Example
///
/// ```rust,ignore
/// use artdump_core::testing::MockPlacer;
///
/// let placer = MockPlacer::new();
/// placer.add_file("/movies/Alien/poster.jpg").await;
///
/// // ... run the engine ...
///
/// let writes = placer.recorded_writes().await;
/// assert!(writes[0].success);
/// ```
#[derive(Debug, Default)]
pub struct MockPlacer {
    files: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
    dirs: Arc<RwLock<BTreeSet<String>>>,
    writes: Arc<RwLock<Vec<RecordedWrite>>>,
    listings: Arc<RwLock<Vec<String>>>,
    /// If set, the next write will fail with this error.
    next_error: Arc<RwLock<Option<PlacerError>>>,
    /// Fail every write.
    fail_writes: Arc<RwLock<bool>>,
}

fn trim_sep(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches(['/', '\\'])
    } else {
        path
    }
}

impl MockPlacer {
    /// Create a new empty mock placer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file.
    pub async fn add_file(&self, path: &str) {
        self.files.write().await.insert(path.to_string(), b"existing".to_vec());
    }

    /// Seed a directory.
    pub async fn add_dir(&self, path: &str) {
        self.dirs.write().await.insert(trim_sep(path).to_string());
    }

    /// Contents of a file, if present.
    pub async fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.read().await.get(path).cloned()
    }

    /// All file paths.
    pub async fn file_paths(&self) -> Vec<String> {
        self.files.read().await.keys().cloned().collect()
    }

    /// Get all recorded writes.
    pub async fn recorded_writes(&self) -> Vec<RecordedWrite> {
        self.writes.read().await.clone()
    }

    /// Get the number of writes attempted.
    pub async fn write_count(&self) -> usize {
        self.writes.read().await.len()
    }

    /// Directories that were listed, in order.
    pub async fn recorded_listings(&self) -> Vec<String> {
        self.listings.read().await.clone()
    }

    /// Configure the next write to fail with the given error.
    pub async fn set_next_error(&self, error: PlacerError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every write fail until turned off.
    pub async fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.write().await = fail;
    }

    async fn take_error(&self, path: &str) -> Option<PlacerError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Some(err);
        }
        if *self.fail_writes.read().await {
            return Some(PlacerError::write_failed(
                path,
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only filesystem"),
            ));
        }
        None
    }
}

#[async_trait]
impl Placer for MockPlacer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn exists(&self, path: &str) -> bool {
        if self.files.read().await.contains_key(path) {
            return true;
        }
        let dir = trim_sep(path);
        if self.dirs.read().await.contains(dir) {
            return true;
        }
        let prefix = format!("{}/", dir);
        self.files.read().await.keys().any(|f| f.starts_with(&prefix))
    }

    async fn create_dir_all(&self, path: &str) -> Result<(), PlacerError> {
        self.dirs.write().await.insert(trim_sep(path).to_string());
        Ok(())
    }

    async fn write_file(&self, path: &str, contents: &[u8]) -> Result<u64, PlacerError> {
        if let Some(err) = self.take_error(path).await {
            self.writes.write().await.push(RecordedWrite {
                path: path.to_string(),
                size: contents.len(),
                success: false,
            });
            return Err(err);
        }
        self.files
            .write()
            .await
            .insert(path.to_string(), contents.to_vec());
        self.writes.write().await.push(RecordedWrite {
            path: path.to_string(),
            size: contents.len(),
            success: true,
        });
        Ok(contents.len() as u64)
    }

    async fn list_dir(&self, path: &str) -> Result<DirListing, PlacerError> {
        self.listings.write().await.push(path.to_string());
        let prefix = format!("{}/", trim_sep(path));
        let mut dirs = BTreeSet::new();
        let mut files = BTreeSet::new();
        for file in self.files.read().await.keys() {
            if let Some(rest) = file.strip_prefix(&prefix) {
                match rest.split_once('/') {
                    Some((dir, _)) => dirs.insert(dir.to_string()),
                    None => files.insert(rest.to_string()),
                };
            }
        }
        for dir in self.dirs.read().await.iter() {
            if let Some(rest) = dir.strip_prefix(&prefix) {
                let name = rest.split('/').next().unwrap_or_default();
                if !name.is_empty() {
                    dirs.insert(name.to_string());
                }
            }
        }
        Ok(DirListing {
            dirs: dirs.into_iter().collect(),
            files: files.into_iter().collect(),
        })
    }
}
