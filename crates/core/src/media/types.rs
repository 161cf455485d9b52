//! Media types and art type names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::MediaError;

/// Kind of library item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    #[serde(rename = "set", alias = "movieset")]
    MovieSet,
    TvShow,
    Season,
    Episode,
    MusicVideo,
    Artist,
    Album,
    Song,
}

/// Broad class of a media type; local caching and download levels are set per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaClass {
    Video,
    Music,
}

impl MediaType {
    pub const ALL: [MediaType; 9] = [
        MediaType::Movie,
        MediaType::MovieSet,
        MediaType::TvShow,
        MediaType::Season,
        MediaType::Episode,
        MediaType::MusicVideo,
        MediaType::Artist,
        MediaType::Album,
        MediaType::Song,
    ];

    /// Order in which id keys are checked when detecting the type of a raw record.
    /// Child types come first because child records also carry their parent's id.
    pub const ID_PROBE_ORDER: [MediaType; 9] = [
        MediaType::Episode,
        MediaType::Season,
        MediaType::TvShow,
        MediaType::Movie,
        MediaType::MovieSet,
        MediaType::MusicVideo,
        MediaType::Song,
        MediaType::Album,
        MediaType::Artist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::MovieSet => "set",
            MediaType::TvShow => "tvshow",
            MediaType::Season => "season",
            MediaType::Episode => "episode",
            MediaType::MusicVideo => "musicvideo",
            MediaType::Artist => "artist",
            MediaType::Album => "album",
            MediaType::Song => "song",
        }
    }

    /// Key holding the item's id in library records, e.g. `movieid`.
    pub fn id_key(&self) -> String {
        format!("{}id", self.as_str())
    }

    /// Type name used in library method names, e.g. `GetTVShows`.
    pub fn method_name(&self) -> &'static str {
        match self {
            MediaType::Movie => "Movie",
            MediaType::MovieSet => "MovieSet",
            MediaType::TvShow => "TVShow",
            MediaType::Season => "Season",
            MediaType::Episode => "Episode",
            MediaType::MusicVideo => "MusicVideo",
            MediaType::Artist => "Artist",
            MediaType::Album => "Album",
            MediaType::Song => "Song",
        }
    }

    pub fn class(&self) -> MediaClass {
        match self {
            MediaType::Artist | MediaType::Album | MediaType::Song => MediaClass::Music,
            _ => MediaClass::Video,
        }
    }

    pub fn is_music(&self) -> bool {
        self.class() == MediaClass::Music
    }

    /// Art types the library supports for this media type.
    pub fn default_art_types(&self) -> &'static [&'static str] {
        match self {
            MediaType::TvShow => &[
                "poster", "keyart", "fanart", "banner", "clearlogo", "landscape", "clearart",
                "characterart",
            ],
            MediaType::Movie => &[
                "poster", "keyart", "fanart", "banner", "clearlogo", "landscape", "clearart",
                "discart", "characterart", "animatedposter", "animatedkeyart", "animatedfanart",
            ],
            MediaType::MovieSet => &[
                "poster", "keyart", "fanart", "banner", "clearlogo", "landscape", "clearart",
                "discart",
            ],
            MediaType::Season => &["poster", "fanart", "banner", "landscape"],
            MediaType::Episode => &["fanart"],
            MediaType::MusicVideo => &[
                "poster", "discart", "fanart", "artistthumb", "banner", "clearlogo", "clearart",
                "landscape",
            ],
            MediaType::Artist => &["thumb", "fanart", "banner", "clearlogo", "clearart", "landscape"],
            MediaType::Album => &["thumb", "discart", "back", "spine"],
            MediaType::Song => &["thumb"],
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaType::Movie),
            "set" | "movieset" => Ok(MediaType::MovieSet),
            "tvshow" => Ok(MediaType::TvShow),
            "season" => Ok(MediaType::Season),
            "episode" => Ok(MediaType::Episode),
            "musicvideo" => Ok(MediaType::MusicVideo),
            "artist" => Ok(MediaType::Artist),
            "album" => Ok(MediaType::Album),
            "song" => Ok(MediaType::Song),
            other => Err(MediaError::UnknownMediaType(other.to_string())),
        }
    }
}

/// Splits an art type into its base name and index: `fanart2` -> (`fanart`, 2).
///
/// A missing suffix is index 0, the primary instance of the family.
pub fn split_art_type(art_type: &str) -> (&str, u32) {
    let base = art_type.trim_end_matches(|c: char| c.is_ascii_digit());
    let index = art_type[base.len()..].parse().unwrap_or(0);
    (base, index)
}
