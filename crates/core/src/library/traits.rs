//! The library service trait.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::ops::Range;
use tracing::debug;

use super::error::LibraryError;
use super::types::{ItemPage, ShowFile, SongFile, Texture};
use crate::media::MediaType;

/// Queries and updates against the media library.
#[async_trait]
pub trait LibraryService: Send + Sync {
    /// Returns the name of this implementation.
    fn name(&self) -> &str;

    /// Lists item records, sorted the way the library presents them.
    /// `range` limits the page; `None` returns everything.
    async fn list_items(&self, media_type: MediaType, range: Option<Range<u64>>) -> Result<ItemPage, LibraryError>;

    /// Full record for one item.
    async fn item_details(&self, media_type: MediaType, dbid: i64) -> Result<Value, LibraryError>;

    /// Writes art for an item. `None` values clear the slot.
    async fn set_art(
        &self,
        media_type: MediaType,
        dbid: i64,
        art: &BTreeMap<String, Option<String>>,
    ) -> Result<(), LibraryError>;

    /// URLs of art the library's scrapers know about for an item.
    async fn available_art(&self, media_type: MediaType, dbid: i64, art_type: &str) -> Result<Vec<String>, LibraryError>;

    /// Artists with exactly this name.
    async fn artists_by_name(&self, name: &str) -> Result<Vec<Value>, LibraryError>;

    async fn songs_for_album(&self, album_id: i64) -> Result<Vec<SongFile>, LibraryError>;

    /// Songs whose folder is exactly `path` (with trailing separator).
    async fn songs_in_path(&self, path: &str) -> Result<Vec<SongFile>, LibraryError>;

    async fn tvshow_files(&self) -> Result<Vec<ShowFile>, LibraryError>;

    /// Texture cache entries, optionally only those for one URL.
    async fn textures(&self, url: Option<&str>) -> Result<Vec<Texture>, LibraryError>;

    async fn remove_texture(&self, texture_id: i64) -> Result<(), LibraryError>;

    /// Value of a host setting, `None` when unset or empty.
    async fn setting_value(&self, setting: &str) -> Result<Option<Value>, LibraryError>;

    /// Base URL of the host's image cache endpoint, `None` when its web server is off.
    async fn image_cache_base(&self) -> Result<Option<String>, LibraryError>;

    /// Drops every cache entry for `url`.
    async fn remove_textures_by_url(&self, url: &str) -> Result<(), LibraryError> {
        for texture in self.textures(Some(url)).await? {
            debug!(texture_id = texture.texture_id, url = %texture.url, "Removing texture from cache");
            self.remove_texture(texture.texture_id).await?;
        }
        Ok(())
    }

    /// A host setting read as a non-empty string.
    async fn setting_string(&self, setting: &str) -> Result<Option<String>, LibraryError> {
        Ok(self
            .setting_value(setting)
            .await?
            .and_then(|v| v.as_str().map(str::to_string))
            .filter(|s| !s.is_empty()))
    }
}
