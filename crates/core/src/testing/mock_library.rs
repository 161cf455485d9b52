//! Mock media library for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::ops::Range;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::library::{ItemPage, LibraryError, LibraryService, ShowFile, SongFile, Texture};
use crate::media::MediaType;
use crate::paths::{dirname, with_trailing_sep};

/// A recorded `set_art` call.
#[derive(Debug, Clone)]
pub struct RecordedArtUpdate {
    pub media_type: MediaType,
    pub dbid: i64,
    pub art: BTreeMap<String, Option<String>>,
}

/// Mock implementation of the LibraryService trait.
///
/// Holds item records, songs, shows, textures and settings in memory.
/// Art updates and texture removals are recorded for assertions, and
/// `set_art` also applies the update to the stored record so later
/// `item_details` calls see it.
#[derive(Debug)]
pub struct MockLibrary {
    items: Arc<RwLock<HashMap<MediaType, Vec<Value>>>>,
    available_art: Arc<RwLock<HashMap<(MediaType, i64, String), Vec<String>>>>,
    artists: Arc<RwLock<Vec<Value>>>,
    songs: Arc<RwLock<Vec<SongFile>>>,
    shows: Arc<RwLock<Vec<ShowFile>>>,
    textures: Arc<RwLock<Vec<Texture>>>,
    settings: Arc<RwLock<HashMap<String, Value>>>,
    image_cache_base: Arc<RwLock<Option<String>>>,
    art_updates: Arc<RwLock<Vec<RecordedArtUpdate>>>,
    removed_textures: Arc<RwLock<Vec<i64>>>,
    calls: Arc<RwLock<Vec<String>>>,
    /// If set, the next call will fail with this error.
    next_error: Arc<RwLock<Option<LibraryError>>>,
    /// If set, every `set_art` fails.
    fail_set_art: Arc<RwLock<bool>>,
}

impl Default for MockLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLibrary {
    /// Create a new empty mock library with its image cache reachable.
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(HashMap::new())),
            available_art: Arc::new(RwLock::new(HashMap::new())),
            artists: Arc::new(RwLock::new(Vec::new())),
            songs: Arc::new(RwLock::new(Vec::new())),
            shows: Arc::new(RwLock::new(Vec::new())),
            textures: Arc::new(RwLock::new(Vec::new())),
            settings: Arc::new(RwLock::new(HashMap::new())),
            image_cache_base: Arc::new(RwLock::new(Some("http://localhost:8080/image/".to_string()))),
            art_updates: Arc::new(RwLock::new(Vec::new())),
            removed_textures: Arc::new(RwLock::new(Vec::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            fail_set_art: Arc::new(RwLock::new(false)),
        }
    }

    /// Add an item record. The record must carry its type's id key.
    pub async fn add_item(&self, media_type: MediaType, record: Value) {
        self.items.write().await.entry(media_type).or_default().push(record);
    }

    pub async fn set_available_art(&self, media_type: MediaType, dbid: i64, art_type: &str, urls: Vec<String>) {
        self.available_art
            .write()
            .await
            .insert((media_type, dbid, art_type.to_string()), urls);
    }

    /// Add an artist record returned by name lookups.
    pub async fn add_artist(&self, record: Value) {
        self.artists.write().await.push(record);
    }

    pub async fn add_song(&self, album_id: i64, file: &str, disc: i32) {
        self.songs.write().await.push(SongFile {
            album_id,
            file: file.to_string(),
            disc,
        });
    }

    pub async fn add_show(&self, tvshow_id: i64, file: &str) {
        self.shows.write().await.push(ShowFile {
            tvshow_id,
            file: file.to_string(),
        });
    }

    pub async fn add_texture(&self, texture_id: i64, url: &str) {
        self.textures.write().await.push(Texture {
            texture_id,
            url: url.to_string(),
        });
    }

    pub async fn set_setting(&self, setting: &str, value: Value) {
        self.settings.write().await.insert(setting.to_string(), value);
    }

    pub async fn set_image_cache_base(&self, base: Option<&str>) {
        *self.image_cache_base.write().await = base.map(str::to_string);
    }

    /// Get all recorded art updates.
    pub async fn recorded_art_updates(&self) -> Vec<RecordedArtUpdate> {
        self.art_updates.read().await.clone()
    }

    /// Get the IDs of removed textures, in removal order.
    pub async fn removed_textures(&self) -> Vec<i64> {
        self.removed_textures.read().await.clone()
    }

    /// Names of the trait methods called, in order.
    pub async fn recorded_calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    /// Number of calls to one trait method.
    pub async fn call_count(&self, method: &str) -> usize {
        self.calls.read().await.iter().filter(|c| *c == method).count()
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: LibraryError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn set_fail_set_art(&self, fail: bool) {
        *self.fail_set_art.write().await = fail;
    }

    async fn begin(&self, method: &str) -> Result<(), LibraryError> {
        self.calls.write().await.push(method.to_string());
        match self.next_error.write().await.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn find_item(&self, media_type: MediaType, dbid: i64) -> Option<Value> {
        let key = media_type.id_key();
        self.items
            .read()
            .await
            .get(&media_type)?
            .iter()
            .find(|record| record.get(&key).and_then(Value::as_i64) == Some(dbid))
            .cloned()
    }
}

#[async_trait]
impl LibraryService for MockLibrary {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_items(&self, media_type: MediaType, range: Option<Range<u64>>) -> Result<ItemPage, LibraryError> {
        self.begin("list_items").await?;
        let items = self.items.read().await.get(&media_type).cloned().unwrap_or_default();
        let total = items.len() as u64;
        let items = match range {
            Some(range) => items
                .into_iter()
                .skip(range.start as usize)
                .take(range.end.saturating_sub(range.start) as usize)
                .collect(),
            None => items,
        };
        Ok(ItemPage { items, total })
    }

    async fn item_details(&self, media_type: MediaType, dbid: i64) -> Result<Value, LibraryError> {
        self.begin("item_details").await?;
        self.find_item(media_type, dbid).await.ok_or(LibraryError::NotFound {
            media_type: media_type.to_string(),
            dbid,
        })
    }

    async fn set_art(
        &self,
        media_type: MediaType,
        dbid: i64,
        art: &BTreeMap<String, Option<String>>,
    ) -> Result<(), LibraryError> {
        self.begin("set_art").await?;
        if *self.fail_set_art.read().await {
            return Err(LibraryError::Rpc {
                method: format!("VideoLibrary.Set{}Details", media_type.method_name()),
                code: -32602,
                message: "Invalid params.".to_string(),
            });
        }
        self.art_updates.write().await.push(RecordedArtUpdate {
            media_type,
            dbid,
            art: art.clone(),
        });

        let key = media_type.id_key();
        let mut items = self.items.write().await;
        let record = items
            .get_mut(&media_type)
            .and_then(|list| {
                list.iter_mut()
                    .find(|record| record.get(&key).and_then(Value::as_i64) == Some(dbid))
            });
        if let Some(Value::Object(record)) = record {
            let stored = record
                .entry("art")
                .or_insert_with(|| Value::Object(Default::default()));
            if let Value::Object(stored) = stored {
                for (art_type, value) in art {
                    match value {
                        Some(url) => {
                            stored.insert(art_type.clone(), Value::String(url.clone()));
                        }
                        None => {
                            stored.remove(art_type);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    async fn available_art(&self, media_type: MediaType, dbid: i64, art_type: &str) -> Result<Vec<String>, LibraryError> {
        self.begin("available_art").await?;
        Ok(self
            .available_art
            .read()
            .await
            .get(&(media_type, dbid, art_type.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn artists_by_name(&self, name: &str) -> Result<Vec<Value>, LibraryError> {
        self.begin("artists_by_name").await?;
        Ok(self
            .artists
            .read()
            .await
            .iter()
            .filter(|a| a.get("artist").and_then(Value::as_str) == Some(name))
            .cloned()
            .collect())
    }

    async fn songs_for_album(&self, album_id: i64) -> Result<Vec<SongFile>, LibraryError> {
        self.begin("songs_for_album").await?;
        Ok(self
            .songs
            .read()
            .await
            .iter()
            .filter(|s| s.album_id == album_id)
            .cloned()
            .collect())
    }

    async fn songs_in_path(&self, path: &str) -> Result<Vec<SongFile>, LibraryError> {
        self.begin("songs_in_path").await?;
        Ok(self
            .songs
            .read()
            .await
            .iter()
            .filter(|s| with_trailing_sep(dirname(&s.file)) == path)
            .cloned()
            .collect())
    }

    async fn tvshow_files(&self) -> Result<Vec<ShowFile>, LibraryError> {
        self.begin("tvshow_files").await?;
        Ok(self.shows.read().await.clone())
    }

    async fn textures(&self, url: Option<&str>) -> Result<Vec<Texture>, LibraryError> {
        self.begin("textures").await?;
        Ok(self
            .textures
            .read()
            .await
            .iter()
            .filter(|t| url.is_none_or(|u| t.url == u))
            .cloned()
            .collect())
    }

    async fn remove_texture(&self, texture_id: i64) -> Result<(), LibraryError> {
        self.begin("remove_texture").await?;
        self.textures.write().await.retain(|t| t.texture_id != texture_id);
        self.removed_textures.write().await.push(texture_id);
        Ok(())
    }

    async fn setting_value(&self, setting: &str) -> Result<Option<Value>, LibraryError> {
        self.begin("setting_value").await?;
        Ok(self.settings.read().await.get(setting).cloned())
    }

    async fn image_cache_base(&self) -> Result<Option<String>, LibraryError> {
        self.begin("image_cache_base").await?;
        Ok(self.image_cache_base.read().await.clone())
    }
}
