//! Per-run enrichment of media entries with data they cannot supply themselves.
//!
//! Library lookups are cached for the lifetime of the [`Enricher`], which is
//! built fresh for each run.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::ProcessingConfig;
use crate::library::{LibraryError, LibraryService, SongFile};
use crate::media::{split_art_type, unquote_image, MediaDetails, MediaEntry, MediaType};
use crate::paths::{common_prefix, dirname, with_trailing_sep};

/// Fills in parent paths, album folders, artist slugs and extra fanart.
pub struct Enricher {
    library: Arc<dyn LibraryService>,
    max_multiple_fanart: u32,
    multiple_fanart_types: Vec<MediaType>,
    show_files: Option<HashMap<i64, String>>,
    album_songs: HashMap<i64, Vec<SongFile>>,
    path_songs: HashMap<String, Vec<SongFile>>,
    artist_counts: HashMap<String, usize>,
}

impl Enricher {
    pub fn new(library: Arc<dyn LibraryService>, processing: &ProcessingConfig) -> Self {
        Self {
            library,
            max_multiple_fanart: processing.max_multiple_fanart,
            multiple_fanart_types: processing.multiple_fanart_types.clone(),
            show_files: None,
            album_songs: HashMap::new(),
            path_songs: HashMap::new(),
            artist_counts: HashMap::new(),
        }
    }

    /// Enriches one entry. Library errors are returned, except while looking
    /// up extra fanart, where they are only logged.
    pub async fn enrich(&mut self, entry: &mut MediaEntry) -> Result<(), LibraryError> {
        match entry.details {
            MediaDetails::Season { tvshow_id, .. } => {
                if let Some(file) = self.show_file(tvshow_id).await? {
                    entry.file = Some(file);
                }
            }
            MediaDetails::Album { album_id, .. } => {
                if let Some((folder, discs)) = self.album_folders(album_id).await? {
                    if !folder.is_empty() {
                        entry.file = Some(folder);
                    }
                    if let MediaDetails::Album { disc_folders, .. } = &mut entry.details {
                        *disc_folders = discs;
                    }
                }
            }
            MediaDetails::Artist { ref name } => {
                let name = name.clone();
                if self.artist_count(&name).await? > 1 {
                    let slug: String = entry
                        .unique_ids
                        .get("mbartist")
                        .map(|id| id.chars().take(4).collect())
                        .unwrap_or_default();
                    debug!(artist = %name, slug = %slug, "Artist name is shared, using slug");
                    entry.slug = Some(slug);
                }
            }
            _ => {}
        }

        if self.max_multiple_fanart > 0 && self.multiple_fanart_types.contains(&entry.media_type()) {
            self.add_multiple_fanart(entry).await;
        }
        Ok(())
    }

    async fn show_file(&mut self, tvshow_id: i64) -> Result<Option<String>, LibraryError> {
        if self.show_files.is_none() {
            let shows = self.library.tvshow_files().await?;
            self.show_files = Some(shows.into_iter().map(|s| (s.tvshow_id, s.file)).collect());
        }
        Ok(self
            .show_files
            .as_ref()
            .and_then(|files| files.get(&tvshow_id))
            .cloned())
    }

    async fn artist_count(&mut self, name: &str) -> Result<usize, LibraryError> {
        if let Some(count) = self.artist_counts.get(name) {
            return Ok(*count);
        }
        let count = self.library.artists_by_name(name).await?.len();
        self.artist_counts.insert(name.to_string(), count);
        Ok(count)
    }

    /// Folder holding the album's songs, plus per-disc folders when they are split.
    ///
    /// `None` when the album has no songs or any of its folders holds songs of
    /// another album too.
    async fn album_folders(&mut self, album_id: i64) -> Result<Option<(String, BTreeMap<i32, String>)>, LibraryError> {
        let songs = match self.album_songs.get(&album_id) {
            Some(songs) => songs.clone(),
            None => {
                let songs = self.library.songs_for_album(album_id).await?;
                self.album_songs.insert(album_id, songs.clone());
                songs
            }
        };
        let folders: BTreeSet<String> = songs.iter().map(|s| dirname(&s.file).to_string()).collect();

        if folders.len() == 1 {
            let folder = folders.into_iter().next().unwrap_or_default();
            if self.shared_folder(&folder).await? {
                return Ok(None);
            }
            return Ok(Some((with_trailing_sep(&folder), BTreeMap::new())));
        }
        if folders.is_empty() {
            return Ok(None);
        }

        let mut discs = BTreeMap::new();
        for folder in &folders {
            if self.shared_folder(folder).await? {
                return Ok(None);
            }
            let disc = songs
                .iter()
                .find(|s| dirname(&s.file) == folder)
                .map(|s| s.disc)
                .unwrap_or(0);
            if disc != 0 {
                discs.insert(disc, with_trailing_sep(folder));
            }
        }
        let prefix = common_prefix(folders.iter().map(String::as_str));
        let common = dirname(&prefix);
        let common = if common.is_empty() {
            String::new()
        } else {
            with_trailing_sep(common)
        };
        if common.is_empty() && discs.is_empty() {
            return Ok(None);
        }
        Ok(Some((common, discs)))
    }

    async fn shared_folder(&mut self, folder: &str) -> Result<bool, LibraryError> {
        let path = with_trailing_sep(folder);
        if !self.path_songs.contains_key(&path) {
            let songs = self.library.songs_in_path(&path).await?;
            self.path_songs.insert(path.clone(), songs);
        }
        let albums: BTreeSet<i64> = self
            .path_songs
            .get(&path)
            .map(|songs| songs.iter().map(|s| s.album_id).collect())
            .unwrap_or_default();
        Ok(albums.len() > 1)
    }

    /// Appends fanart the library knows about as `fanart`, `fanart1`, ... up to the
    /// configured maximum, unless extra fanart is already assigned.
    async fn add_multiple_fanart(&self, entry: &mut MediaEntry) {
        let max_index = entry
            .art
            .keys()
            .map(|k| split_art_type(k))
            .filter(|(base, _)| *base == "fanart")
            .map(|(_, index)| i64::from(index))
            .max()
            .unwrap_or(-1);
        if max_index >= 1 || max_index >= i64::from(self.max_multiple_fanart) {
            return;
        }

        let available = match self
            .library
            .available_art(entry.media_type(), entry.dbid, "fanart")
            .await
        {
            Ok(urls) => urls,
            Err(e) => {
                info!(label = %entry.label, error = %e, "Can't get multiple fanart for item");
                return;
            }
        };
        let existing: BTreeSet<&String> = entry
            .art
            .iter()
            .filter(|(k, _)| split_art_type(k).0 == "fanart")
            .map(|(_, v)| v)
            .collect();
        let mut to_add: Vec<String> = Vec::new();
        for url in available.iter().map(|u| unquote_image(u)) {
            if !existing.contains(&url) && !to_add.contains(&url) {
                to_add.push(url);
            }
        }

        let mut counter = max_index + 1;
        for url in to_add {
            if counter > i64::from(self.max_multiple_fanart) {
                break;
            }
            let key = if counter == 0 {
                "fanart".to_string()
            } else {
                format!("fanart{}", counter)
            };
            debug!(url = %url, art_type = %key, "Adding extra fanart");
            entry.art.insert(key, url);
            counter += 1;
        }
    }
}
