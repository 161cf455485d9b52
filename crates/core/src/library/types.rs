//! Records returned by the library.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One page of item records plus the library's total count.
#[derive(Debug, Clone, Default)]
pub struct ItemPage {
    pub items: Vec<Value>,
    pub total: u64,
}

/// A song's location, used to identify album folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongFile {
    #[serde(rename = "albumid")]
    pub album_id: i64,
    pub file: String,
    #[serde(default)]
    pub disc: i32,
}

/// A TV show's folder, which seasons use as their own location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowFile {
    #[serde(rename = "tvshowid")]
    pub tvshow_id: i64,
    pub file: String,
}

/// An entry in the host's image cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Texture {
    #[serde(rename = "textureid")]
    pub texture_id: i64,
    pub url: String,
}
