//! Per-run artwork processing.

use chrono::Utc;
use futures::{Stream, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::types::{EntryError, ProcessError, RunItem, RunSummary};
use crate::cache::{CacheCapabilities, CacheReconciler, BIG_RUN_THRESHOLD};
use crate::config::{CentralDirectoriesConfig, Config, ConfigError, DownloadConfig, ProcessingConfig};
use crate::enrich::Enricher;
use crate::exclusion::Exclusions;
use crate::fetcher::FetchEngine;
use crate::library::LibraryService;
use crate::media::{video_thumbnail_path, ImageKind, MediaEntry};
use crate::metrics;
use crate::placer::Placer;
use crate::processed::ProcessedStore;
use crate::progress::{ProgressSink, ProgressTracker};
use crate::resolver::{CentralDirectories, PathResolver};
use crate::transport::ArtworkTransport;

/// Pause after an entry that reached a provider.
pub const THROTTLE_TIME: Duration = Duration::from_millis(150);

/// How long a final summary stays on the progress display.
pub const LINGER_TIME: Duration = Duration::from_secs(8);

const ARTISTS_FOLDER_SETTING: &str = "musiclibrary.artistsfolder";
const MOVIESETS_FOLDER_SETTING: &str = "videolibrary.moviesetsfolder";

/// Run-scoped collaborators, rebuilt for every run.
struct RunState {
    engine: FetchEngine,
    enricher: Enricher,
    cache: CacheReconciler,
    tracker: ProgressTracker,
}

/// Drives runs over library entries.
pub struct ArtworkProcessor {
    library: Arc<dyn LibraryService>,
    transport: Arc<dyn ArtworkTransport>,
    placer: Arc<dyn Placer>,
    processed: Arc<dyn ProcessedStore>,
    progress: Arc<dyn ProgressSink>,
    download: DownloadConfig,
    processing: ProcessingConfig,
    central: CentralDirectoriesConfig,
    exclusions: Exclusions,
    cache_timeout: Duration,
    throttle: Duration,
    linger: Duration,
}

impl ArtworkProcessor {
    pub fn new(
        config: &Config,
        library: Arc<dyn LibraryService>,
        transport: Arc<dyn ArtworkTransport>,
        placer: Arc<dyn Placer>,
        processed: Arc<dyn ProcessedStore>,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            library,
            transport,
            placer,
            processed,
            progress,
            download: config.download.clone(),
            processing: config.processing.clone(),
            central: config.central_directories.clone(),
            exclusions: Exclusions::from_config(&config.exclusions)?,
            cache_timeout: Duration::from_millis(config.transport.cache_prime_timeout_ms),
            throttle: THROTTLE_TIME,
            linger: LINGER_TIME,
        })
    }

    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn with_linger(mut self, linger: Duration) -> Self {
        self.linger = linger;
        self
    }

    pub fn library(&self) -> &Arc<dyn LibraryService> {
        &self.library
    }

    pub fn processed(&self) -> &Arc<dyn ProcessedStore> {
        &self.processed
    }

    /// Central roots for a run. Artist and movie set roots fall back to the
    /// library's own settings when not configured.
    pub async fn central_directories(&self) -> CentralDirectories {
        let artists = match &self.central.artists {
            Some(path) => Some(path.clone()),
            None => self.library_setting(ARTISTS_FOLDER_SETTING).await,
        };
        let moviesets = match &self.central.moviesets {
            Some(path) => Some(path.clone()),
            None => self.library_setting(MOVIESETS_FOLDER_SETTING).await,
        };
        CentralDirectories::new(self.central.movies.clone(), self.central.tvshows.clone(), artists, moviesets)
    }

    async fn library_setting(&self, setting: &str) -> Option<String> {
        match self.library.setting_string(setting).await {
            Ok(value) => value,
            Err(e) => {
                warn!(setting = %setting, error = %e, "Could not read library setting");
                None
            }
        }
    }

    async fn begin_run(&self, expected_count: usize) -> RunState {
        let resolver = PathResolver::new(self.central_directories().await, &self.processing);
        let engine = FetchEngine::new(
            self.transport.clone(),
            self.placer.clone(),
            resolver,
            self.download.clone(),
            self.processing.existing_file_policy,
        );
        let mut cache = CacheReconciler::new(
            self.library.clone(),
            self.transport.clone(),
            CacheCapabilities {
                video_thumbnails: self.processing.cache_video_thumbnails,
            },
            self.processing.cache_workers,
            self.cache_timeout,
        );
        cache.set_big_run(expected_count > BIG_RUN_THRESHOLD);
        RunState {
            engine,
            enricher: Enricher::new(self.library.clone(), &self.processing),
            cache,
            tracker: ProgressTracker::new(
                self.progress.clone(),
                self.processing.progress_display,
                self.processing.final_notification,
            ),
        }
    }

    /// Processes `items` in order until they run out or `cancel` fires.
    ///
    /// The final summary is reported when anything was updated, or always when
    /// `always_notify` is set.
    pub async fn run_once<S>(
        &self,
        heading: &str,
        items: S,
        expected_count: usize,
        always_notify: bool,
        cancel: &CancellationToken,
    ) -> RunSummary
    where
        S: Stream<Item = RunItem> + Send,
    {
        let started = Instant::now();
        info!(heading = %heading, expected = expected_count, "Start processing list");
        let mut run = self.begin_run(expected_count).await;
        run.tracker.start(heading, expected_count);

        let mut summary = RunSummary {
            started_at: Some(Utc::now()),
            ..RunSummary::default()
        };
        let mut items = std::pin::pin!(items);
        while let Some(item) = items.next().await {
            let mut entry = match item {
                RunItem::Skipped(count) => {
                    run.tracker.skip(count);
                    summary.excluded += count;
                    metrics::ENTRIES_PROCESSED
                        .with_label_values(&["excluded"])
                        .inc_by(count as u64);
                    if cancel.is_cancelled() {
                        summary.aborted = true;
                        break;
                    }
                    continue;
                }
                RunItem::Entry(entry) => entry,
            };

            run.tracker.advance(Some(&entry.label));
            if self.exclusions.is_excluded(entry.file.as_deref()) {
                summary.excluded += 1;
                metrics::ENTRIES_PROCESSED.with_label_values(&["excluded"]).inc();
                if cancel.is_cancelled() {
                    summary.aborted = true;
                    break;
                }
                continue;
            }
            if cancel.is_cancelled() {
                summary.aborted = true;
                break;
            }

            let contacted = self.process_entry(&mut run, &mut entry, cancel).await;
            summary.processed += 1;
            summary.updated_art_count += entry.updated_art.len();
            let outcome = match EntryError::from_entry(&entry) {
                Some(error) => {
                    summary.errors.push(error);
                    "error"
                }
                None => "processed",
            };
            metrics::ENTRIES_PROCESSED.with_label_values(&[outcome]).inc();

            if !contacted {
                if cancel.is_cancelled() {
                    summary.aborted = true;
                    break;
                }
            } else {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        summary.aborted = true;
                        break;
                    }
                    _ = tokio::time::sleep(self.throttle) => {}
                }
            }
        }
        info!(
            updated = summary.updated_art_count,
            processed = summary.processed,
            aborted = summary.aborted,
            bytes = run.engine.bytes_downloaded(),
            "Finished processing list"
        );

        if run.tracker.finish(summary.updated_art_count, always_notify) && !self.linger.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(self.linger) => {}
            }
        }

        summary.finished_at = Some(Utc::now());
        let result = if summary.aborted { "aborted" } else { "completed" };
        metrics::RUN_DURATION
            .with_label_values(&[result])
            .observe(started.elapsed().as_secs_f64());
        summary
    }

    /// Processes one entry, recording any problem on it. Returns whether a
    /// provider was contacted (or should be treated as contacted).
    async fn process_entry(
        &self,
        run: &mut RunState,
        entry: &mut MediaEntry,
        cancel: &CancellationToken,
    ) -> bool {
        let result = match run.enricher.enrich(entry).await {
            Ok(()) => self.process_item(run, entry, cancel).await,
            Err(e) => Err(e.into()),
        };
        match result {
            Ok(contacted) => contacted,
            Err(ProcessError::Library(e)) => {
                error!(label = %entry.label, error = %e, "Library request failed");
                entry.error = Some(format!("Library error: {}", e));
                true
            }
            Err(ProcessError::Fetch(e)) => {
                let message = e.to_string();
                error!(label = %entry.label, error = %message, "Artwork file write failed");
                run.tracker.warn(&message);
                entry.error = Some(message);
                true
            }
        }
    }

    async fn process_item(
        &self,
        run: &mut RunState,
        entry: &mut MediaEntry,
        cancel: &CancellationToken,
    ) -> Result<bool, ProcessError> {
        debug!(media_type = %entry.media_type(), label = %entry.label, "Processing item");
        let media_type = entry.media_type();

        if self.processing.generates_thumb(media_type) {
            let current = entry.art.get("thumb").map(String::as_str).unwrap_or_default();
            if ImageKind::classify(current) != ImageKind::GeneratedThumbnail {
                if let Some(thumb) = entry.file.as_deref().and_then(video_thumbnail_path) {
                    debug!(label = %entry.label, "Setting thumbnail to host generated");
                    entry.updated_art.insert("thumb".to_string(), thumb);
                    entry.art.remove("thumb");
                }
            }
        }

        let outcome = run.engine.download_for(entry, cancel).await?;
        if entry.updated_art.is_empty() {
            debug!(label = %entry.label, "No updates to artwork");
        } else {
            self.add_art_to_library(entry).await?;
        }
        if outcome.cancelled {
            // partially handled, so not recorded as processed
            return Ok(outcome.contacted_provider);
        }

        if self.processing.cache_local(media_type.class()) {
            let merged = entry.merged_art();
            let warmed = run.cache.warm(merged.values().map(String::as_str)).await;
            if warmed > 0 {
                debug!(label = %entry.label, warmed, "Primed host image cache");
            }
        }

        match outcome.error {
            Some(failure) => {
                let message = failure.to_string();
                warn!(label = %entry.label, error = %message, "Provider error");
                run.tracker.warn(&message);
                entry.error = Some(message);
            }
            None => {
                if let Err(e) = self.processed.set_data(entry.dbid, media_type, &entry.label, None) {
                    warn!(label = %entry.label, error = %e, "Could not record processed item");
                }
            }
        }

        if entry.borked_filename {
            let message = format!(
                "File path contains characters that could not be read: {}",
                entry.file.as_deref().unwrap_or_default()
            );
            warn!(label = %entry.label, "{}", message);
            if entry.error.is_none() {
                entry.error = Some(message);
            }
        }
        Ok(outcome.contacted_provider)
    }

    async fn add_art_to_library(&self, entry: &MediaEntry) -> Result<(), ProcessError> {
        let art = library_art(&entry.updated_art);
        self.library.set_art(entry.media_type(), entry.dbid, &art).await?;
        for url in art.values().flatten() {
            if ImageKind::classify(url).is_file() {
                self.library.remove_textures_by_url(url).await?;
            }
        }
        Ok(())
    }
}

/// Art as written to the library. Animated art still pointing at a remote URL
/// is cleared, since the host cannot cache it.
pub fn library_art(updated: &BTreeMap<String, String>) -> BTreeMap<String, Option<String>> {
    updated
        .iter()
        .map(|(art_type, url)| {
            let value = if art_type.starts_with("animated") && url.starts_with("http") {
                None
            } else {
                Some(url.clone())
            };
            (art_type.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExclusionConfig, ExclusionKind};
    use crate::library::LibraryError;
    use crate::media::MediaType;
    use crate::processed::SqliteProcessedStore;
    use crate::testing::{fixtures, MockLibrary, MockPlacer, MockTransport, RecordingProgress};
    use futures::stream;

    struct Harness {
        library: Arc<MockLibrary>,
        transport: Arc<MockTransport>,
        placer: Arc<MockPlacer>,
        processed: Arc<SqliteProcessedStore>,
        progress: Arc<RecordingProgress>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                library: Arc::new(MockLibrary::new()),
                transport: Arc::new(MockTransport::new()),
                placer: Arc::new(MockPlacer::new()),
                processed: Arc::new(SqliteProcessedStore::in_memory().unwrap()),
                progress: Arc::new(RecordingProgress::new()),
            }
        }

        fn processor(&self, config: &Config) -> ArtworkProcessor {
            ArtworkProcessor::new(
                config,
                self.library.clone(),
                self.transport.clone(),
                self.placer.clone(),
                self.processed.clone(),
                self.progress.clone(),
            )
            .unwrap()
            .with_throttle(Duration::ZERO)
            .with_linger(Duration::ZERO)
        }

        async fn serve_movie_art(&self, slug: &str) {
            for art_type in ["poster", "fanart"] {
                let url = format!("https://img.example/{}/{}.jpg", slug, art_type);
                self.transport.set_image(&url, "image/jpeg", art_type.as_bytes()).await;
            }
        }
    }

    fn items(entries: Vec<MediaEntry>) -> impl Stream<Item = RunItem> + Send {
        stream::iter(entries.into_iter().map(RunItem::entry))
    }

    #[test]
    fn test_library_art_clears_remote_animated_art() {
        let updated: BTreeMap<String, String> = [
            ("animatedposter", "https://img.example/a.gif"),
            ("animatedfanart", "/movies/A/animatedfanart.gif"),
            ("poster", "/movies/A/poster.jpg"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let art = library_art(&updated);
        assert_eq!(art["animatedposter"], None);
        assert_eq!(art["animatedfanart"].as_deref(), Some("/movies/A/animatedfanart.gif"));
        assert_eq!(art["poster"].as_deref(), Some("/movies/A/poster.jpg"));
    }

    #[tokio::test]
    async fn test_run_updates_library_and_textures() {
        let h = Harness::new();
        h.serve_movie_art("alien").await;
        h.library
            .add_item(MediaType::Movie, fixtures::movie_record(1, "Alien", "/movies/Alien (1979)/Alien.mkv"))
            .await;
        h.library.add_texture(77, "/movies/Alien (1979)/poster.jpg").await;
        let processor = h.processor(&Config::default());

        let entry = fixtures::movie_entry(1, "Alien", "/movies/Alien (1979)/Alien.mkv");
        let summary = processor
            .run_once("Movies", items(vec![entry]), 1, false, &CancellationToken::new())
            .await;

        assert!(!summary.aborted);
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.updated_art_count, 2);
        assert!(summary.errors.is_empty());

        let updates = h.library.recorded_art_updates().await;
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].dbid, 1);
        assert_eq!(
            updates[0].art["poster"].as_deref(),
            Some("/movies/Alien (1979)/poster.jpg")
        );
        assert_eq!(h.library.removed_textures().await, vec![77]);
        assert!(h.processed.exists(1, MediaType::Movie, "Alien").unwrap());
        assert_eq!(h.progress.summaries(), vec![("2 artwork updated".to_string(), false)]);
    }

    #[tokio::test]
    async fn test_excluded_entries_are_never_fetched() {
        let h = Harness::new();
        h.serve_movie_art("alien").await;
        let config = Config {
            exclusions: vec![ExclusionConfig {
                kind: ExclusionKind::Folder,
                value: "/movies/Alien (1979)".to_string(),
            }],
            ..Config::default()
        };
        let processor = h.processor(&config);

        let entry = fixtures::movie_entry(1, "Alien", "/movies/Alien (1979)/Alien.mkv");
        let summary = processor
            .run_once("Movies", items(vec![entry]), 1, false, &CancellationToken::new())
            .await;

        assert_eq!(summary.excluded, 1);
        assert_eq!(summary.processed, 0);
        assert!(h.transport.recorded_requests().await.is_empty());
        assert!(h.progress.summaries().is_empty());
    }

    #[tokio::test]
    async fn test_skipped_batches_count_as_excluded() {
        let h = Harness::new();
        let processor = h.processor(&Config::default());
        let run = stream::iter(vec![RunItem::Skipped(5)]);

        let summary = processor
            .run_once("Movies", run, 5, true, &CancellationToken::new())
            .await;

        assert_eq!(summary.excluded, 5);
        assert_eq!(h.progress.last_update().map(|(p, _)| p), Some(100));
        assert_eq!(h.progress.summaries(), vec![("No artwork updated".to_string(), false)]);
    }

    #[tokio::test]
    async fn test_library_error_is_recorded_on_entry() {
        let h = Harness::new();
        h.serve_movie_art("alien").await;
        h.library.set_fail_set_art(true).await;
        let processor = h.processor(&Config::default());

        let entry = fixtures::movie_entry(1, "Alien", "/movies/Alien (1979)/Alien.mkv");
        let summary = processor
            .run_once("Movies", items(vec![entry]), 1, false, &CancellationToken::new())
            .await;

        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].message.starts_with("Library error: "));
        assert!(!h.processed.exists(1, MediaType::Movie, "Alien").unwrap());
    }

    #[tokio::test]
    async fn test_enrichment_error_is_recorded_on_entry() {
        let h = Harness::new();
        h.library
            .set_next_error(LibraryError::ConnectionFailed("refused".to_string()))
            .await;
        let processor = h.processor(&Config::default());
        let season = fixtures::entry(&fixtures::season_record(5, 2, "Firefly", 1));

        let summary = processor
            .run_once("TV", items(vec![season]), 1, false, &CancellationToken::new())
            .await;

        assert_eq!(summary.errors.len(), 1);
        assert_eq!(
            summary.errors[0].message,
            "Library error: Library connection failed: refused"
        );
    }

    #[tokio::test]
    async fn test_write_faults_stop_downloads_for_the_run() {
        let h = Harness::new();
        h.placer.set_fail_writes(true).await;
        let mut entries = Vec::new();
        for (dbid, title) in [(1, "Alien"), (2, "Aliens"), (3, "Alien 3"), (4, "Prometheus")] {
            let slug = title.to_lowercase().replace(' ', "-");
            h.serve_movie_art(&slug).await;
            entries.push(fixtures::movie_entry(
                dbid,
                title,
                &format!("/movies/{}/movie.mkv", title),
            ));
        }
        let processor = h.processor(&Config::default());

        let summary = processor
            .run_once("Movies", items(entries), 4, false, &CancellationToken::new())
            .await;

        assert_eq!(summary.processed, 4);
        assert_eq!(summary.errors.len(), 3);
        assert!(summary.errors[0].message.starts_with("Could not write artwork file"));
        assert_eq!(h.placer.write_count().await, 3);
        assert_eq!(h.progress.warnings().len(), 3);
        assert!(h.library.recorded_art_updates().await.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_run_aborts_before_processing() {
        let h = Harness::new();
        h.serve_movie_art("alien").await;
        let processor = h.processor(&Config::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let entry = fixtures::movie_entry(1, "Alien", "/movies/Alien (1979)/Alien.mkv");
        let summary = processor.run_once("Movies", items(vec![entry]), 1, false, &cancel).await;

        assert!(summary.aborted);
        assert_eq!(summary.processed, 0);
        assert!(h.transport.recorded_requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_during_throttle_aborts_after_entry() {
        let h = Harness::new();
        h.serve_movie_art("alien").await;
        h.serve_movie_art("aliens").await;
        let processor = ArtworkProcessor::new(
            &Config::default(),
            h.library.clone(),
            h.transport.clone(),
            h.placer.clone(),
            h.processed.clone(),
            h.progress.clone(),
        )
        .unwrap()
        .with_throttle(Duration::from_secs(60))
        .with_linger(Duration::ZERO);
        let cancel = CancellationToken::new();
        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let entries = vec![
            fixtures::movie_entry(1, "Alien", "/movies/Alien (1979)/Alien.mkv"),
            fixtures::movie_entry(2, "Aliens", "/movies/Aliens (1986)/Aliens.mkv"),
        ];
        let summary = processor.run_once("Movies", items(entries), 2, false, &cancel).await;

        assert!(summary.aborted);
        assert_eq!(summary.processed, 1);
        assert!(h.placer.file("/movies/Aliens (1986)/poster.jpg").await.is_none());
    }

    #[tokio::test]
    async fn test_cancel_during_slow_download_aborts_promptly() {
        let h = Harness::new();
        h.serve_movie_art("alien").await;
        h.transport.set_delay(Duration::from_secs(3)).await;
        h.library
            .add_item(MediaType::Movie, fixtures::movie_record(1, "Alien", "/movies/Alien (1979)/Alien.mkv"))
            .await;
        let processor = h.processor(&Config::default());
        let cancel = CancellationToken::new();
        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let entry = fixtures::movie_entry(1, "Alien", "/movies/Alien (1979)/Alien.mkv");
        let started = Instant::now();
        let summary = processor.run_once("Movies", items(vec![entry]), 1, false, &cancel).await;

        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(summary.aborted);
        assert_eq!(summary.updated_art_count, 0);
        assert!(summary.errors.is_empty());
        assert_eq!(h.placer.write_count().await, 0);
        assert!(h.library.recorded_art_updates().await.is_empty());
    }

    #[tokio::test]
    async fn test_generated_thumbnail_replaces_thumb() {
        let h = Harness::new();
        let config = Config {
            processing: ProcessingConfig {
                generate_thumbs: vec![MediaType::Movie],
                ..ProcessingConfig::default()
            },
            ..Config::default()
        };
        let processor = h.processor(&config);
        let mut entry = fixtures::movie_entry(1, "Alien", "/movies/Alien (1979)/Alien.mkv");
        entry.art.clear();
        entry.art.insert("thumb".to_string(), "https://img.example/alien/thumb.jpg".to_string());

        let summary = processor
            .run_once("Movies", items(vec![entry]), 1, false, &CancellationToken::new())
            .await;

        assert_eq!(summary.updated_art_count, 1);
        let updates = h.library.recorded_art_updates().await;
        let thumb = updates[0].art["thumb"].clone().unwrap();
        assert!(thumb.starts_with("image://video@"));
        assert!(h.transport.recorded_requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_local_art_is_primed_into_host_cache() {
        let h = Harness::new();
        h.serve_movie_art("alien").await;
        let config = Config {
            processing: ProcessingConfig {
                cache_local_video_artwork: true,
                ..ProcessingConfig::default()
            },
            ..Config::default()
        };
        let processor = h.processor(&config);

        let entry = fixtures::movie_entry(1, "Alien", "/movies/Alien (1979)/Alien.mkv");
        processor
            .run_once("Movies", items(vec![entry]), 1, false, &CancellationToken::new())
            .await;

        let cache_requests: Vec<String> = h
            .transport
            .recorded_requests()
            .await
            .into_iter()
            .filter(|url| url.starts_with("http://localhost:8080/image/"))
            .collect();
        assert_eq!(cache_requests.len(), 2);
    }

    #[tokio::test]
    async fn test_borked_filename_is_reported() {
        let h = Harness::new();
        let processor = h.processor(&Config::default());
        let mut entry = fixtures::movie_entry(1, "Alien", "/movies/Alien (1979)/Alien.mkv");
        entry.art.clear();
        entry.borked_filename = true;

        let summary = processor
            .run_once("Movies", items(vec![entry]), 1, false, &CancellationToken::new())
            .await;

        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].message.contains("could not be read"));
    }

    #[tokio::test]
    async fn test_central_directories_fall_back_to_library_settings() {
        let h = Harness::new();
        h.library
            .set_setting("musiclibrary.artistsfolder", serde_json::json!("/music/artists/"))
            .await;
        let mut config = Config::default();
        config.central_directories.moviesets = Some("/sets/".to_string());
        let processor = h.processor(&config);

        let central = processor.central_directories().await;
        assert_eq!(central.artists.as_deref(), Some("/music/artists/"));
        assert_eq!(central.moviesets.as_deref(), Some("/sets/"));
        assert_eq!(central.movies, None);
    }
}
