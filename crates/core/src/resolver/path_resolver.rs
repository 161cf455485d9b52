//! Maps a media entry and art type to the base path of its artwork file.

use serde::Serialize;
use tracing::debug;

use super::listing::{ListingCache, Lookup};
use super::names::{cleanest_name, find_existing};
use crate::config::ProcessingConfig;
use crate::media::{MediaDetails, MediaEntry, MediaType};
use crate::paths::{movie_path_list, path_sep, split, split_ext, with_trailing_sep};

/// Protocols that cannot be written to.
const BLACKLISTED_PROTOCOLS: &[&str] = &["plugin", "http"];

/// Central artwork roots for a run, each ending with its separator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CentralDirectories {
    pub movies: Option<String>,
    pub tvshows: Option<String>,
    pub artists: Option<String>,
    pub moviesets: Option<String>,
}

impl CentralDirectories {
    /// Normalizes each root to end with its own separator; empty roots become `None`.
    pub fn new(
        movies: Option<String>,
        tvshows: Option<String>,
        artists: Option<String>,
        moviesets: Option<String>,
    ) -> Self {
        let root = |p: Option<String>| p.filter(|p| !p.is_empty()).map(|p| with_trailing_sep(&p));
        Self {
            movies: root(movies),
            tvshows: root(tvshows),
            artists: root(artists),
            moviesets: root(moviesets),
        }
    }

    /// Root used by a media type. Seasons and episodes live under the show's root.
    pub fn for_type(&self, media_type: MediaType) -> Option<&str> {
        match media_type {
            MediaType::Movie => self.movies.as_deref(),
            MediaType::TvShow | MediaType::Season | MediaType::Episode => self.tvshows.as_deref(),
            MediaType::Artist => self.artists.as_deref(),
            MediaType::MovieSet => self.moviesets.as_deref(),
            _ => None,
        }
    }
}

/// Path resolution settings for a run.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    central: CentralDirectories,
    processing: ProcessingConfig,
}

impl PathResolver {
    pub fn new(central: CentralDirectories, processing: &ProcessingConfig) -> Self {
        Self {
            central,
            processing: processing.clone(),
        }
    }

    pub fn central(&self) -> &CentralDirectories {
        &self.central
    }

    /// Whether artwork can be saved for this entry at all.
    pub fn can_save(&self, entry: &MediaEntry, listings: &ListingCache) -> Lookup<bool> {
        if !is_file_grouped(entry) {
            match self.central_dir(entry, listings) {
                Lookup::NeedsListing(path) => return Lookup::NeedsListing(path),
                Lookup::Ready(Some(_)) => return Lookup::Ready(true),
                Lookup::Ready(None) => {}
            }
        }
        let Some(path) = source_path(entry) else {
            return Lookup::Ready(false);
        };
        Lookup::Ready(!is_blacklisted(&path) && !entry.borked_filename)
    }

    /// Base path (no extension) for `art_type` on `entry`, or `None` when there is nowhere to save it.
    pub fn resolve_base_path(&self, entry: &MediaEntry, art_type: &str, listings: &ListingCache) -> Lookup<Option<String>> {
        let path = if is_file_grouped(entry) {
            entry.file.as_deref().map(|f| split_ext(f).0.to_string())
        } else {
            match self.central_dir(entry, listings) {
                Lookup::NeedsListing(path) => return Lookup::NeedsListing(path),
                Lookup::Ready(found) => found,
            }
        };
        let path = match path {
            Some(path) => path,
            None => {
                let Some(source) = source_path(entry) else {
                    return Lookup::Ready(None);
                };
                if is_blacklisted(&source) {
                    return Lookup::Ready(None);
                }
                split_ext(&source).0.to_string()
            }
        };

        let (dir, basename) = split(&path);
        let mut result = with_trailing_sep(dir);
        if dir.is_empty() {
            result.clear();
        }
        if self.processing.basename_prefix(entry.media_type()) && !basename.is_empty() {
            result.push_str(basename);
            result.push('-');
        }
        match entry.details {
            MediaDetails::Season { season, .. } => {
                result.push_str(&format!("season{}-{}", season_token(season), art_type));
            }
            _ => result.push_str(art_type),
        }
        Lookup::Ready(Some(result))
    }

    /// Central directory for the entry, found in or synthesized against the root's listing.
    ///
    /// `Ready(None)` when no root is configured for the entry's type.
    pub fn central_dir(&self, entry: &MediaEntry, listings: &ListingCache) -> Lookup<Option<String>> {
        let Some(base) = self.central.for_type(entry.media_type()) else {
            return Lookup::Ready(None);
        };
        let Some(listing) = listings.get(base) else {
            return Lookup::NeedsListing(base.to_string());
        };
        let sep = path_sep(base);
        let slug = match entry.media_type() {
            MediaType::Artist => entry.slug.as_deref().filter(|s| !s.is_empty()),
            _ => None,
        };
        let year = entry.year();
        let title = entry.directory_title();

        let dir_name = find_existing(&listing.dirs, title, slug, year, false).unwrap_or_else(|| {
            let title = match (entry.media_type(), year) {
                (MediaType::Movie, Some(year)) => format!("{} ({})", title, year),
                _ => title.to_string(),
            };
            cleanest_name(&title, slug)
        });
        let mut result = format!("{}{}{}", base, dir_name, sep);

        if let MediaDetails::Episode { title: episode_title, .. } = &entry.details {
            let Some(show_listing) = listings.get(&result) else {
                return Lookup::NeedsListing(result);
            };
            let file_name = find_existing(&show_listing.files, episode_title, None, None, true)
                .unwrap_or_else(|| cleanest_name(episode_title, None));
            result.push_str(&file_name);
        }
        debug!(media_type = %entry.media_type(), dir = %result, "Central directory resolved");
        Lookup::Ready(Some(result))
    }
}

/// Songs and albums with a known location keep their art next to their files.
fn is_file_grouped(entry: &MediaEntry) -> bool {
    entry.file.is_some() && matches!(entry.media_type(), MediaType::Album | MediaType::Song)
}

/// The file a sidecar path is derived from: the first part of a stacked movie.
fn source_path(entry: &MediaEntry) -> Option<String> {
    let file = entry.file.as_deref()?;
    if entry.media_type() == MediaType::Movie {
        movie_path_list(file).into_iter().next()
    } else {
        Some(file.to_string())
    }
}

fn is_blacklisted(path: &str) -> bool {
    BLACKLISTED_PROTOCOLS.iter().any(|p| path.starts_with(p))
}

fn season_token(season: i32) -> String {
    match season {
        0 => "-specials".to_string(),
        -1 => "-all".to_string(),
        n => format!("{:02}", n),
    }
}
