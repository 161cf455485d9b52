//! File system placer implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, DirBuilder, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::config::PlacerConfig;
use super::error::PlacerError;
use super::traits::{DirListing, Placer};

/// File system based placer implementation.
///
/// Handles local paths only. Paths with a URL scheme (`smb://`, `nfs://`) are
/// rejected with [`PlacerError::UnsupportedPath`].
pub struct FsPlacer {
    config: PlacerConfig,
}

impl FsPlacer {
    /// Creates a new file system placer with the given configuration.
    pub fn new(config: PlacerConfig) -> Self {
        Self { config }
    }

    /// Creates a placer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(PlacerConfig::default())
    }

    fn is_local(path: &str) -> bool {
        !path.contains("://")
    }

    fn local_path(path: &str) -> Result<PathBuf, PlacerError> {
        if !Self::is_local(path) {
            return Err(PlacerError::UnsupportedPath {
                path: path.to_string(),
            });
        }
        Ok(PathBuf::from(path))
    }

    fn temp_path_for(target: &Path) -> PathBuf {
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        target.with_file_name(format!(".{}.{}.part", name, uuid::Uuid::new_v4().simple()))
    }

    async fn write_direct(target: &Path, contents: &[u8]) -> std::io::Result<()> {
        let mut file = File::create(target).await?;
        file.write_all(contents).await?;
        file.flush().await?;
        Ok(())
    }

    async fn write_atomic(target: &Path, contents: &[u8]) -> std::io::Result<()> {
        let temp = Self::temp_path_for(target);
        if let Err(e) = Self::write_direct(&temp, contents).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e);
        }
        if let Err(e) = fs::rename(&temp, target).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e);
        }
        Ok(())
    }
}

#[async_trait]
impl Placer for FsPlacer {
    fn name(&self) -> &str {
        "filesystem"
    }

    fn supports(&self, path: &str) -> bool {
        Self::is_local(path)
    }

    async fn exists(&self, path: &str) -> bool {
        match Self::local_path(path) {
            Ok(local) => fs::try_exists(&local).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    async fn create_dir_all(&self, path: &str) -> Result<(), PlacerError> {
        let local = Self::local_path(path)?;
        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(self.config.directory_mode);
        builder
            .create(&local)
            .await
            .map_err(|e| PlacerError::DirectoryCreationFailed {
                path: path.to_string(),
                source: e,
            })?;
        debug!(path = %path, "Created directory");
        Ok(())
    }

    async fn write_file(&self, path: &str, contents: &[u8]) -> Result<u64, PlacerError> {
        let local = Self::local_path(path)?;
        let result = if self.config.atomic_writes {
            Self::write_atomic(&local, contents).await
        } else {
            Self::write_direct(&local, contents).await
        };
        result.map_err(|e| {
            warn!(path = %path, error = %e, "Failed to write file");
            PlacerError::write_failed(path, e)
        })?;
        Ok(contents.len() as u64)
    }

    async fn list_dir(&self, path: &str) -> Result<DirListing, PlacerError> {
        let local = Self::local_path(path)?;
        let mut listing = DirListing::default();
        let mut entries = match fs::read_dir(&local).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(listing),
            Err(e) => {
                return Err(PlacerError::ListFailed {
                    path: path.to_string(),
                    source: e,
                })
            }
        };
        let list_err = |e| PlacerError::ListFailed {
            path: path.to_string(),
            source: e,
        };
        while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let file_type = entry.file_type().await.map_err(list_err)?;
            if file_type.is_dir() {
                listing.dirs.push(name);
            } else {
                listing.files.push(name);
            }
        }
        listing.dirs.sort();
        listing.files.sort();
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn path_str(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_supports_local_paths_only() {
        let placer = FsPlacer::with_defaults();
        assert!(placer.supports("/movies/Alien (1979)/poster"));
        assert!(placer.supports("C:\\Movies\\Alien\\poster"));
        assert!(!placer.supports("smb://nas/movies/Alien (1979)/poster"));
        assert!(!placer.supports("nfs://nas/movies/poster"));
    }

    #[tokio::test]
    async fn test_write_creates_file() {
        let temp = TempDir::new().unwrap();
        let placer = FsPlacer::with_defaults();
        let target = temp.path().join("poster.jpg");

        let written = placer.write_file(&path_str(&target), b"image").await.unwrap();

        assert_eq!(written, 5);
        assert_eq!(fs::read(&target).await.unwrap(), b"image");
        assert!(placer.exists(&path_str(&target)).await);
    }

    #[tokio::test]
    async fn test_atomic_write_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let placer = FsPlacer::with_defaults();
        let target = temp.path().join("fanart.png");
        placer.write_file(&path_str(&target), b"one").await.unwrap();
        placer.write_file(&path_str(&target), b"two").await.unwrap();

        let listing = placer.list_dir(&path_str(temp.path())).await.unwrap();
        assert_eq!(listing.files, vec!["fanart.png"]);
        assert_eq!(fs::read(&target).await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_direct_write() {
        let temp = TempDir::new().unwrap();
        let placer = FsPlacer::new(PlacerConfig::default().with_direct_writes());
        let target = temp.path().join("thumb.jpg");
        placer.write_file(&path_str(&target), b"x").await.unwrap();
        assert_eq!(fs::read(&target).await.unwrap(), b"x");
    }

    #[tokio::test]
    async fn test_write_into_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let placer = FsPlacer::with_defaults();
        let target = temp.path().join("missing").join("poster.jpg");

        let err = placer.write_file(&path_str(&target), b"x").await.unwrap_err();
        assert!(matches!(err, PlacerError::WriteFailed { .. }));
    }

    #[tokio::test]
    async fn test_create_dir_all_and_list() {
        let temp = TempDir::new().unwrap();
        let placer = FsPlacer::with_defaults();
        let nested = temp.path().join("Alien (1979)").join("extrafanart");
        placer.create_dir_all(&path_str(&nested)).await.unwrap();
        fs::write(temp.path().join("Alien (1979)").join("poster.jpg"), b"p")
            .await
            .unwrap();

        let listing = placer
            .list_dir(&path_str(&temp.path().join("Alien (1979)")))
            .await
            .unwrap();
        assert_eq!(listing.dirs, vec!["extrafanart"]);
        assert_eq!(listing.files, vec!["poster.jpg"]);
    }

    #[tokio::test]
    async fn test_list_missing_directory_is_empty() {
        let placer = FsPlacer::with_defaults();
        let listing = placer.list_dir("/nonexistent/artdump/dir").await.unwrap();
        assert_eq!(listing, DirListing::default());
    }

    #[tokio::test]
    async fn test_remote_paths_unsupported() {
        let placer = FsPlacer::with_defaults();
        assert!(!placer.exists("smb://nas/share/poster.jpg").await);
        let err = placer.create_dir_all("smb://nas/share").await.unwrap_err();
        assert!(matches!(err, PlacerError::UnsupportedPath { .. }));
        assert_eq!(err.path(), "smb://nas/share");
    }
}
