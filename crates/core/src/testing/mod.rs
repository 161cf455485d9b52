//! Testing utilities and mock implementations of the collaborator traits.
//!
//! These mocks let the orchestrator, fetch engine and service run end to end
//! without a media library, network or disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use artdump_core::testing::{fixtures, MockLibrary, MockPlacer, MockTransport};
//!
//! let library = MockLibrary::new();
//! let transport = MockTransport::new();
//! let placer = MockPlacer::new();
//!
//! // Configure mock responses
//! library.add_item(MediaType::Movie, fixtures::movie_record(1, "Alien", "/movies/Alien (1979)/Alien.mkv")).await;
//! transport.set_image("https://img.example/alien.jpg", "image/jpeg", b"jpeg").await;
//!
//! // Build an ArtworkProcessor or FetchEngine from them...
//! ```

mod mock_library;
mod mock_placer;
mod mock_transport;
mod recording_progress;

pub use mock_library::{MockLibrary, RecordedArtUpdate};
pub use mock_placer::{MockPlacer, RecordedWrite};
pub use mock_transport::MockTransport;
pub use recording_progress::{ProgressEvent, RecordingProgress};

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};

    use crate::media::MediaEntry;

    /// A movie record as the library returns it, with a remote poster and fanart.
    pub fn movie_record(dbid: i64, title: &str, file: &str) -> Value {
        let slug = title.to_lowercase().replace(' ', "-");
        json!({
            "movieid": dbid,
            "label": title,
            "file": file,
            "year": 1979,
            "art": {
                "poster": format!("https://img.example/{}/poster.jpg", slug),
                "fanart": format!("https://img.example/{}/fanart.jpg", slug),
            },
            "uniqueid": { "imdb": format!("tt{:07}", dbid) },
        })
    }

    pub fn tvshow_record(dbid: i64, title: &str, file: &str) -> Value {
        json!({
            "tvshowid": dbid,
            "label": title,
            "file": file,
            "art": { "poster": format!("https://img.example/show{}/poster.jpg", dbid) },
            "uniqueid": { "tvdb": format!("{}", 70000 + dbid) },
        })
    }

    pub fn season_record(dbid: i64, tvshow_id: i64, show_title: &str, season: i32) -> Value {
        json!({
            "seasonid": dbid,
            "tvshowid": tvshow_id,
            "label": format!("Season {}", season),
            "showtitle": show_title,
            "season": season,
            "art": { "poster": format!("https://img.example/show{}/season{}.jpg", tvshow_id, season) },
        })
    }

    pub fn episode_record(dbid: i64, tvshow_id: i64, show_title: &str, title: &str, file: &str) -> Value {
        json!({
            "episodeid": dbid,
            "tvshowid": tvshow_id,
            "seasonid": 100 + tvshow_id,
            "label": title,
            "showtitle": show_title,
            "season": 1,
            "episode": dbid,
            "file": file,
            "art": { "thumb": format!("https://img.example/ep{}/thumb.jpg", dbid) },
        })
    }

    pub fn artist_record(dbid: i64, name: &str, mbid: &str) -> Value {
        json!({
            "artistid": dbid,
            "label": name,
            "artist": name,
            "musicbrainzartistid": [mbid],
            "art": { "thumb": format!("https://img.example/artist{}/thumb.jpg", dbid) },
        })
    }

    pub fn album_record(dbid: i64, title: &str, artist: &str) -> Value {
        json!({
            "albumid": dbid,
            "label": title,
            "title": title,
            "artist": [artist],
            "artistid": [dbid + 500],
            "art": { "thumb": format!("https://img.example/album{}/thumb.jpg", dbid) },
        })
    }

    pub fn song_record(dbid: i64, album_id: i64, title: &str, file: &str) -> Value {
        json!({
            "songid": dbid,
            "albumid": album_id,
            "label": title,
            "title": title,
            "album": "Album",
            "artist": ["Artist"],
            "file": file,
            "art": {},
        })
    }

    /// Builds an entry from a record, panicking on malformed fixtures.
    pub fn entry(record: &Value) -> MediaEntry {
        MediaEntry::from_json(record, None).expect("fixture record is valid")
    }

    pub fn movie_entry(dbid: i64, title: &str, file: &str) -> MediaEntry {
        entry(&movie_record(dbid, title, file))
    }
}
