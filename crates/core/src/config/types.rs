use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::media::{split_art_type, MediaClass, MediaType};
use crate::service::ServiceConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
    #[serde(default)]
    pub central_directories: CentralDirectoriesConfig,
    #[serde(default)]
    pub service: ServiceConfig,
    /// Ordered exclusion rules; an entry matching any of them is skipped.
    #[serde(default)]
    pub exclusions: Vec<ExclusionConfig>,
}

/// Control API server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([127, 0, 0, 1])
}

fn default_port() -> u16 {
    8088
}

/// Media library JSON-RPC endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryConfig {
    #[serde(default = "default_library_url")]
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_library_timeout")]
    pub timeout_secs: u64,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            url: default_library_url(),
            username: None,
            password: None,
            timeout_secs: default_library_timeout(),
        }
    }
}

fn default_library_url() -> String {
    "http://localhost:8080/jsonrpc".to_string()
}

fn default_library_timeout() -> u64 {
    30
}

/// Processed-items database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("artdump.db")
}

/// HTTP transport used for artwork downloads and cache priming
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransportConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Artwork download timeout in seconds (default: 15)
    #[serde(default = "default_transport_timeout")]
    pub timeout_secs: u64,
    /// Timeout for a single cache-priming request in milliseconds (default: 1000)
    #[serde(default = "default_cache_prime_timeout")]
    pub cache_prime_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_transport_timeout(),
            cache_prime_timeout_ms: default_cache_prime_timeout(),
        }
    }
}

fn default_user_agent() -> String {
    format!("artdump/{}", env!("CARGO_PKG_VERSION"))
}

fn default_transport_timeout() -> u64 {
    15
}

fn default_cache_prime_timeout() -> u64 {
    1000
}

/// How much artwork to download for a media class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadLevel {
    #[default]
    All,
    None,
    /// Only the art types listed for the media type in `[download.art_types]`
    Custom,
}

/// Which art types are downloaded
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DownloadConfig {
    #[serde(default)]
    pub video_level: DownloadLevel,
    #[serde(default)]
    pub music_level: DownloadLevel,
    /// Base art types to download per media type when the class level is `custom`
    #[serde(default)]
    pub art_types: BTreeMap<MediaType, Vec<String>>,
}

impl DownloadConfig {
    pub fn level_for(&self, media_type: MediaType) -> DownloadLevel {
        match media_type.class() {
            MediaClass::Video => self.video_level,
            MediaClass::Music => self.music_level,
        }
    }

    /// Whether `art_type` is downloaded for `media_type`. Custom lists match the
    /// base name, so `fanart` also enables `fanart1`, `fanart2`, ...
    pub fn allows(&self, media_type: MediaType, art_type: &str) -> bool {
        match self.level_for(media_type) {
            DownloadLevel::All => true,
            DownloadLevel::None => false,
            DownloadLevel::Custom => {
                let (base, _) = split_art_type(art_type);
                self.art_types
                    .get(&media_type)
                    .is_some_and(|types| types.iter().any(|t| t == base))
            }
        }
    }
}

/// What to do when the target artwork file already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistingFilePolicy {
    /// Leave the file alone and do not assign it
    #[default]
    Ignore,
    Overwrite,
    /// Assign the existing file without downloading
    UseExisting,
}

/// Progress reporting mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressDisplay {
    #[default]
    Full,
    WarningsOnly,
    None,
}

/// Per-run processing options
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProcessingConfig {
    #[serde(default)]
    pub existing_file_policy: ExistingFilePolicy,
    /// Prefix movie artwork with the movie's file name
    #[serde(default)]
    pub movie_basename_prefix: bool,
    /// Prefix music video artwork with the video's file name
    #[serde(default)]
    pub musicvideo_basename_prefix: bool,
    #[serde(default)]
    pub cache_local_video_artwork: bool,
    #[serde(default)]
    pub cache_local_music_artwork: bool,
    /// Whether the host can extract video thumbnails into its cache
    #[serde(default)]
    pub cache_video_thumbnails: bool,
    /// Number of extra fanart slots filled from the library's available art (0 disables)
    #[serde(default)]
    pub max_multiple_fanart: u32,
    #[serde(default = "default_multiple_fanart_types")]
    pub multiple_fanart_types: Vec<MediaType>,
    /// Media types whose thumbnail is switched to a host-generated one
    #[serde(default)]
    pub generate_thumbs: Vec<MediaType>,
    /// Parallel cache-priming requests (default: 4)
    #[serde(default = "default_cache_workers")]
    pub cache_workers: usize,
    #[serde(default)]
    pub progress_display: ProgressDisplay,
    #[serde(default)]
    pub final_notification: bool,
    /// Start a new-items run for videos when the service starts
    #[serde(default = "default_true")]
    pub auto_process_videos: bool,
    #[serde(default)]
    pub auto_process_music: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            existing_file_policy: ExistingFilePolicy::default(),
            movie_basename_prefix: false,
            musicvideo_basename_prefix: false,
            cache_local_video_artwork: false,
            cache_local_music_artwork: false,
            cache_video_thumbnails: false,
            max_multiple_fanart: 0,
            multiple_fanart_types: default_multiple_fanart_types(),
            generate_thumbs: Vec::new(),
            cache_workers: default_cache_workers(),
            progress_display: ProgressDisplay::default(),
            final_notification: false,
            auto_process_videos: default_true(),
            auto_process_music: false,
        }
    }
}

impl ProcessingConfig {
    pub fn basename_prefix(&self, media_type: MediaType) -> bool {
        match media_type {
            MediaType::Episode | MediaType::Song => true,
            MediaType::Movie => self.movie_basename_prefix,
            MediaType::MusicVideo => self.musicvideo_basename_prefix,
            _ => false,
        }
    }

    pub fn cache_local(&self, class: MediaClass) -> bool {
        match class {
            MediaClass::Video => self.cache_local_video_artwork,
            MediaClass::Music => self.cache_local_music_artwork,
        }
    }

    pub fn generates_thumb(&self, media_type: MediaType) -> bool {
        matches!(
            media_type,
            MediaType::Movie | MediaType::Episode | MediaType::MusicVideo
        ) && self.generate_thumbs.contains(&media_type)
    }

    pub fn adds_multiple_fanart(&self, media_type: MediaType) -> bool {
        self.max_multiple_fanart > 0 && self.multiple_fanart_types.contains(&media_type)
    }
}

fn default_multiple_fanart_types() -> Vec<MediaType> {
    MediaType::ALL.to_vec()
}

fn default_cache_workers() -> usize {
    4
}

fn default_true() -> bool {
    true
}

/// Central artwork roots. Artist and movie set roots default to the library's own settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CentralDirectoriesConfig {
    #[serde(default)]
    pub movies: Option<String>,
    #[serde(default)]
    pub tvshows: Option<String>,
    #[serde(default)]
    pub artists: Option<String>,
    #[serde(default)]
    pub moviesets: Option<String>,
}

/// Kind of exclusion rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionKind {
    /// Path lies under this folder
    Folder,
    /// Path starts with this string
    Prefix,
    /// Path matches this regular expression from its start
    Regex,
}

/// One exclusion rule
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExclusionConfig {
    #[serde(rename = "type")]
    pub kind: ExclusionKind,
    pub value: String,
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub library: SanitizedLibraryConfig,
    pub database: DatabaseConfig,
    pub transport: TransportConfig,
    pub download: DownloadConfig,
    pub processing: ProcessingConfig,
    pub central_directories: CentralDirectoriesConfig,
    pub service: ServiceConfig,
    pub exclusions: Vec<ExclusionConfig>,
}

/// Sanitized library config (password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedLibraryConfig {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub password_configured: bool,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            library: SanitizedLibraryConfig {
                url: config.library.url.clone(),
                username: config.library.username.clone(),
                password_configured: config
                    .library
                    .password
                    .as_ref()
                    .is_some_and(|p| !p.is_empty()),
                timeout_secs: config.library.timeout_secs,
            },
            database: config.database.clone(),
            transport: config.transport.clone(),
            download: config.download.clone(),
            processing: config.processing.clone(),
            central_directories: config.central_directories.clone(),
            service: config.service.clone(),
            exclusions: config.exclusions.clone(),
        }
    }
}
