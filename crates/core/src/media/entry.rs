//! The media entry processed by a run.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::error::MediaError;
use super::images::{unquote_image, PENDING_ART};
use super::types::MediaType;
use crate::resolver::clean_name;

/// Attributes only some media types carry. Read-only after construction,
/// apart from what enrichment fills in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaDetails {
    Movie {
        year: Option<i32>,
        set_id: Option<i64>,
    },
    MovieSet,
    TvShow,
    Season {
        tvshow_id: i64,
        show_title: String,
        season: i32,
    },
    Episode {
        tvshow_id: i64,
        show_title: String,
        season: i32,
        episode: i32,
        season_id: Option<i64>,
        /// Episode title without the show prefix the label carries.
        title: String,
    },
    MusicVideo,
    Artist {
        name: String,
    },
    Album {
        album_id: i64,
        title: String,
        artist_id: Option<i64>,
        artist: Option<String>,
        /// Disc number to folder, filled by enrichment for multi-folder albums.
        disc_folders: BTreeMap<i32, String>,
    },
    Song {
        album_id: i64,
        album: String,
        artist_id: Option<i64>,
        artist: Option<String>,
    },
}

/// One library item for the duration of a run.
#[derive(Debug, Clone, Serialize)]
pub struct MediaEntry {
    pub dbid: i64,
    media_type: MediaType,
    pub label: String,
    /// Source file. `None` for items without one (artists, sets without a root).
    pub file: Option<String>,
    /// Current art, keyed by lower-case art type.
    pub art: BTreeMap<String, String>,
    /// Art assigned during this run.
    pub updated_art: BTreeMap<String, String>,
    pub unique_ids: BTreeMap<String, String>,
    pub details: MediaDetails,
    pub error: Option<String>,
    /// The file path contains characters the library could not represent.
    pub borked_filename: bool,
    /// Disambiguation slug, set when another item shares this one's name.
    pub slug: Option<String>,
}

impl MediaEntry {
    /// Builds an entry from a library record.
    ///
    /// `movieset_root` is the central movie set directory, used to give sets a
    /// synthetic file inside it.
    pub fn from_json(record: &Value, movieset_root: Option<&str>) -> Result<Self, MediaError> {
        let (media_type, dbid) = detect_type_and_id(record)?;
        let name = media_type.as_str();
        let mut label = str_field(record, "label")
            .ok_or_else(|| MediaError::missing(name, "label"))?
            .to_string();
        let mut file = str_field(record, "file").map(unquote_archive);

        let details = match media_type {
            MediaType::Movie => MediaDetails::Movie {
                year: movie_year(record),
                set_id: int_field(record, "setid").filter(|id| *id > 0),
            },
            MediaType::MovieSet => {
                if let Some(root) = movieset_root.filter(|r| !r.is_empty()) {
                    file = Some(format!("{}{}.ext", root, clean_name(&label)));
                }
                MediaDetails::MovieSet
            }
            MediaType::TvShow => MediaDetails::TvShow,
            MediaType::Season | MediaType::Episode => {
                let tvshow_id =
                    int_field(record, "tvshowid").ok_or_else(|| MediaError::missing(name, "tvshowid"))?;
                let show_title = str_field(record, "showtitle")
                    .ok_or_else(|| MediaError::missing(name, "showtitle"))?
                    .to_string();
                let season = int_field(record, "season")
                    .ok_or_else(|| MediaError::missing(name, "season"))? as i32;
                let title = label.clone();
                label = format!("{} - {}", show_title, title);
                if media_type == MediaType::Season {
                    MediaDetails::Season {
                        tvshow_id,
                        show_title,
                        season,
                    }
                } else {
                    MediaDetails::Episode {
                        tvshow_id,
                        show_title,
                        season,
                        episode: int_field(record, "episode").unwrap_or(0) as i32,
                        season_id: int_field(record, "seasonid").filter(|id| *id > 0),
                        title,
                    }
                }
            }
            MediaType::MusicVideo => {
                label = music_label(record, &label);
                MediaDetails::MusicVideo
            }
            MediaType::Artist => MediaDetails::Artist {
                name: label.clone(),
            },
            MediaType::Album | MediaType::Song => {
                let album_id =
                    int_field(record, "albumid").ok_or_else(|| MediaError::missing(name, "albumid"))?;
                let artist_id = first_int(record, "albumartistid").or_else(|| first_int(record, "artistid"));
                let artist = first_str(record, "albumartist").or_else(|| first_str(record, "artist"));
                let album_title = if media_type == MediaType::Album {
                    label.clone()
                } else {
                    str_field(record, "album").unwrap_or_default().to_string()
                };
                label = music_label(record, &label);
                if media_type == MediaType::Album {
                    MediaDetails::Album {
                        album_id,
                        title: album_title,
                        artist_id,
                        artist,
                        disc_folders: BTreeMap::new(),
                    }
                } else {
                    MediaDetails::Song {
                        album_id,
                        album: album_title,
                        artist_id,
                        artist,
                    }
                }
            }
        };

        let borked_filename = file.as_deref().is_some_and(|f| f.contains('\u{FFFD}'));

        Ok(Self {
            dbid,
            media_type,
            label,
            file,
            art: own_artwork(record),
            updated_art: BTreeMap::new(),
            unique_ids: unique_ids(record),
            details,
            error: None,
            borked_filename,
            slug: None,
        })
    }

    /// Builds a bare entry. Used where records come from somewhere other than the library.
    pub fn new(dbid: i64, media_type: MediaType, label: impl Into<String>, details: MediaDetails) -> Self {
        Self {
            dbid,
            media_type,
            label: label.into(),
            file: None,
            art: BTreeMap::new(),
            updated_art: BTreeMap::new(),
            unique_ids: BTreeMap::new(),
            details,
            error: None,
            borked_filename: false,
            slug: None,
        }
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// Title used to find the item's central directory: the show for seasons and
    /// episodes, the artist for artists, the label otherwise.
    pub fn directory_title(&self) -> &str {
        match &self.details {
            MediaDetails::Season { show_title, .. } | MediaDetails::Episode { show_title, .. } => show_title,
            MediaDetails::Artist { name } => name,
            _ => &self.label,
        }
    }

    pub fn year(&self) -> Option<i32> {
        match self.details {
            MediaDetails::Movie { year, .. } => year,
            _ => None,
        }
    }

    /// Current art overlaid with art assigned this run.
    pub fn merged_art(&self) -> BTreeMap<String, String> {
        let mut merged = self.art.clone();
        merged.extend(self.updated_art.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

fn detect_type_and_id(record: &Value) -> Result<(MediaType, i64), MediaError> {
    for media_type in MediaType::ID_PROBE_ORDER {
        if let Some(value) = record.get(media_type.id_key()) {
            let id = value
                .as_i64()
                .ok_or_else(|| MediaError::missing(media_type.as_str(), "id"))?;
            return Ok((media_type, id));
        }
    }
    Err(MediaError::UnknownMediaType("record has no id key".to_string()))
}

fn str_field<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}

fn int_field(record: &Value, key: &str) -> Option<i64> {
    record.get(key).and_then(Value::as_i64)
}

fn first_str(record: &Value, key: &str) -> Option<String> {
    record
        .get(key)
        .and_then(Value::as_array)
        .and_then(|list| list.first())
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn first_int(record: &Value, key: &str) -> Option<i64> {
    record
        .get(key)
        .and_then(Value::as_array)
        .and_then(|list| list.first())
        .and_then(Value::as_i64)
}

fn movie_year(record: &Value) -> Option<i32> {
    if let Some(year) = int_field(record, "year").filter(|y| *y > 0) {
        return Some(year as i32);
    }
    str_field(record, "premiered")
        .and_then(|p| p.get(..4))
        .and_then(|y| y.parse().ok())
        .filter(|y| *y > 0)
}

fn music_label(record: &Value, fallback: &str) -> String {
    let title = str_field(record, "title").unwrap_or(fallback);
    match first_str(record, "artist") {
        Some(artist) => format!("{} - {}", artist, title),
        None => title.to_string(),
    }
}

/// Replaces an archive path with the decoded location of the archive itself.
fn unquote_archive(file: &str) -> String {
    match file.strip_prefix("rar://").or_else(|| file.strip_prefix("zip://")) {
        Some(rest) => {
            let archive = rest.split('/').next().unwrap_or_default();
            urlencoding::decode(archive)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| archive.to_string())
        }
        None => file.to_string(),
    }
}

fn own_artwork(record: &Value) -> BTreeMap<String, String> {
    let mut art = BTreeMap::new();
    if let Some(map) = record.get("art").and_then(Value::as_object) {
        for (art_type, value) in map {
            if art_type.contains('.') {
                continue;
            }
            let Some(url) = value.as_str() else { continue };
            let url = unquote_image(url);
            if url == PENDING_ART {
                continue;
            }
            art.insert(art_type.to_lowercase(), url);
        }
    }
    if art
        .get("icon")
        .is_some_and(|icon| !icon.contains('/') && !icon.contains('\\'))
    {
        art.remove("icon");
    }
    art
}

fn unique_ids(record: &Value) -> BTreeMap<String, String> {
    let mut ids: BTreeMap<String, String> = record
        .get("uniqueid")
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().filter(|s| !s.is_empty()).map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default();

    if ids.get("tvdb").is_some_and(|id| id.contains('/')) {
        if let Some(id) = ids.remove("tvdb") {
            ids.insert("tvdbse".to_string(), id);
        }
    }
    if ids.get("unknown").is_some_and(|id| id.starts_with("tt")) && !ids.contains_key("imdb") {
        if let Some(id) = ids.remove("unknown") {
            ids.insert("imdb".to_string(), id);
        }
    }
    if let Some(id) = first_str(record, "musicbrainzartistid").filter(|s| !s.is_empty()) {
        ids.insert("mbartist".to_string(), id);
    } else if let Some(id) = first_str(record, "musicbrainzalbumartistid").filter(|s| !s.is_empty()) {
        ids.insert("mbartist".to_string(), id);
    }
    for (key, id_key) in [
        ("musicbrainzalbumid", "mbalbum"),
        ("musicbrainzreleasegroupid", "mbgroup"),
        ("musicbrainztrackid", "mbtrack"),
    ] {
        if let Some(id) = str_field(record, key).filter(|s| !s.is_empty()) {
            ids.insert(id_key.to_string(), id.to_string());
        }
    }
    ids
}
