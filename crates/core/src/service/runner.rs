//! Background artwork service.
//!
//! Requests arrive as signals; the loop picks one up per pass and runs it to
//! completion before looking again. Only one run is active at a time.

use futures::stream;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::config::ServiceConfig;
use super::feed::{LibraryPager, RecentFeed};
use super::types::{RunSignal, ServiceError, ServiceSnapshot, ServiceStatus};
use crate::media::{MediaEntry, MediaType};
use crate::processor::{ArtworkProcessor, RunItem, RunSummary};

/// Media types accepted into the recently-added queue.
pub const RECENT_TYPES: [MediaType; 4] = [
    MediaType::Movie,
    MediaType::TvShow,
    MediaType::Episode,
    MediaType::MusicVideo,
];

#[derive(Default)]
struct ServiceState {
    status: ServiceStatus,
    signal: Option<RunSignal>,
    recent: BTreeMap<MediaType, Vec<i64>>,
    run_cancel: Option<CancellationToken>,
    last_run: Option<RunSummary>,
}

impl ServiceState {
    fn settle_status(&mut self) {
        if self.status != ServiceStatus::Processing {
            self.status = if self.signal.is_some() {
                ServiceStatus::Signalled
            } else {
                ServiceStatus::Idle
            };
        }
    }

    fn recent_items(&self) -> Vec<(MediaType, i64)> {
        self.recent
            .iter()
            .flat_map(|(media_type, ids)| ids.iter().map(move |id| (*media_type, *id)))
            .collect()
    }
}

/// Long-running service that turns signals into processing runs.
pub struct ArtworkService {
    processor: Arc<ArtworkProcessor>,
    config: ServiceConfig,
    state: Arc<RwLock<ServiceState>>,
    wake: Arc<Notify>,
}

impl ArtworkService {
    pub fn new(processor: Arc<ArtworkProcessor>, config: ServiceConfig) -> Self {
        Self {
            processor,
            config,
            state: Arc::new(RwLock::new(ServiceState::default())),
            wake: Arc::new(Notify::new()),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub async fn status(&self) -> ServiceStatus {
        self.state.read().await.status
    }

    /// A run is pending or in progress.
    pub async fn is_busy(&self) -> bool {
        self.status().await != ServiceStatus::Idle
    }

    pub async fn snapshot(&self) -> ServiceSnapshot {
        let state = self.state.read().await;
        ServiceSnapshot {
            status: state.status,
            pending_signal: state.signal,
            recent_queued: state.recent.values().map(Vec::len).sum(),
            last_run: state.last_run.clone(),
        }
    }

    /// Requests a run. A pending full-library request is not replaced by a
    /// recently-added one.
    pub async fn signal(&self, signal: RunSignal) {
        let mut state = self.state.write().await;
        let keep_pending = signal == RunSignal::RecentVideos
            && state.signal.is_some_and(|pending| pending != RunSignal::RecentVideos);
        if !keep_pending {
            state.signal = Some(signal);
        }
        state.settle_status();
        drop(state);
        info!(signal = ?signal, "Run requested");
        self.wake.notify_one();
    }

    /// Queues a recently added item and requests a recently-added run.
    pub async fn queue_recent(&self, media_type: MediaType, dbid: i64) -> Result<(), ServiceError> {
        if !RECENT_TYPES.contains(&media_type) {
            return Err(ServiceError::NotQueueable(media_type));
        }
        {
            let mut state = self.state.write().await;
            let ids = state.recent.entry(media_type).or_default();
            if !ids.contains(&dbid) {
                ids.push(dbid);
            }
        }
        self.signal(RunSignal::RecentVideos).await;
        Ok(())
    }

    /// Aborts the active run, or drops a pending request when nothing is running.
    ///
    /// Returns false when there was nothing to cancel.
    pub async fn cancel(&self) -> bool {
        let mut state = self.state.write().await;
        if state.status == ServiceStatus::Processing {
            if let Some(token) = &state.run_cancel {
                info!("Cancelling current run");
                token.cancel();
                return true;
            }
        }
        if state.signal.take().is_some() {
            info!("Dropping pending run request");
            state.settle_status();
            return true;
        }
        false
    }

    /// Runs the service loop until `shutdown` fires. An active run is
    /// cancelled along with it.
    pub async fn run(&self, shutdown: CancellationToken) {
        let poll = Duration::from_millis(self.config.poll_interval_ms);
        let settle = Duration::from_millis(self.config.recent_settle_ms);
        info!("Artwork service started");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = self.wake.notified() => {}
                _ = tokio::time::sleep(poll) => {}
            }

            let pending = self.state.read().await.signal;
            if pending == Some(RunSignal::RecentVideos) && !settle.is_zero() {
                // let a burst of additions land in one run
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(settle) => {}
                }
            }

            let Some((signal, token)) = self.begin_run(&shutdown).await else {
                continue;
            };
            let result = self.execute(signal, &token).await;
            self.finish_run(result).await;
        }
        info!("Artwork service stopped");
    }

    /// Processes a single item right away. Its final summary is always reported.
    pub async fn process_item(&self, media_type: MediaType, dbid: i64) -> Result<RunSummary, ServiceError> {
        let token = {
            let mut state = self.state.write().await;
            if state.status == ServiceStatus::Processing {
                return Err(ServiceError::Busy);
            }
            let token = CancellationToken::new();
            state.status = ServiceStatus::Processing;
            state.run_cancel = Some(token.clone());
            token
        };

        let result = self.process_one(media_type, dbid, &token).await;
        let mut state = self.state.write().await;
        state.status = ServiceStatus::Idle;
        state.run_cancel = None;
        state.settle_status();
        if let Ok(summary) = &result {
            state.last_run = Some(summary.clone());
        }
        result
    }

    async fn process_one(
        &self,
        media_type: MediaType,
        dbid: i64,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, ServiceError> {
        let record = self.processor.library().item_details(media_type, dbid).await?;
        let movieset_root = self.processor.central_directories().await.moviesets;
        let entry = MediaEntry::from_json(&record, movieset_root.as_deref())?;
        let heading = entry.label.clone();
        let items = stream::iter([RunItem::entry(entry)]);
        Ok(self.processor.run_once(&heading, items, 1, true, cancel).await)
    }

    async fn begin_run(&self, shutdown: &CancellationToken) -> Option<(RunSignal, CancellationToken)> {
        let mut state = self.state.write().await;
        if state.status == ServiceStatus::Processing {
            return None;
        }
        let signal = state.signal.take()?;
        let token = shutdown.child_token();
        state.status = ServiceStatus::Processing;
        state.run_cancel = Some(token.clone());
        Some((signal, token))
    }

    async fn finish_run(&self, result: Result<RunSummary, ServiceError>) {
        let mut state = self.state.write().await;
        state.status = ServiceStatus::Idle;
        state.run_cancel = None;
        state.settle_status();
        match result {
            Ok(summary) => state.last_run = Some(summary),
            Err(e) => error!(error = %e, "Run failed"),
        }
    }

    async fn execute(&self, signal: RunSignal, cancel: &CancellationToken) -> Result<RunSummary, ServiceError> {
        info!(signal = ?signal, "{}", signal.heading());
        let movieset_root = self.processor.central_directories().await.moviesets;
        if signal == RunSignal::RecentVideos {
            return Ok(self.process_recent(movieset_root, cancel).await);
        }

        let processed = signal.only_new().then(|| self.processor.processed().clone());
        let (pager, total) = LibraryPager::open(
            self.processor.library().clone(),
            signal.media_types(),
            processed,
            movieset_root,
        )
        .await?;
        Ok(self
            .processor
            .run_once(signal.heading(), pager.into_stream(), total, false, cancel)
            .await)
    }

    /// The queue is cleared only when the run completes; items queued
    /// meanwhile stay for the next run.
    async fn process_recent(&self, movieset_root: Option<String>, cancel: &CancellationToken) -> RunSummary {
        let queued = self.state.read().await.recent_items();
        if queued.is_empty() {
            return RunSummary::default();
        }
        let feed = RecentFeed::new(self.processor.library().clone(), queued.clone(), movieset_root);
        let total = feed.len();
        let summary = self
            .processor
            .run_once(RunSignal::RecentVideos.heading(), feed.into_stream(), total, false, cancel)
            .await;
        if summary.aborted {
            warn!("Recently added run aborted, keeping queue");
        } else {
            let mut state = self.state.write().await;
            for (media_type, dbid) in queued {
                if let Some(ids) = state.recent.get_mut(&media_type) {
                    ids.retain(|id| *id != dbid);
                }
            }
            state.recent.retain(|_, ids| !ids.is_empty());
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::processed::{ProcessedStore, SqliteProcessedStore};
    use crate::testing::{fixtures, MockLibrary, MockPlacer, MockTransport, RecordingProgress};

    struct Harness {
        library: Arc<MockLibrary>,
        transport: Arc<MockTransport>,
        processed: Arc<SqliteProcessedStore>,
        service: Arc<ArtworkService>,
    }

    fn harness() -> Harness {
        let library = Arc::new(MockLibrary::new());
        let transport = Arc::new(MockTransport::new());
        let processed = Arc::new(SqliteProcessedStore::in_memory().unwrap());
        let processor = ArtworkProcessor::new(
            &Config::default(),
            library.clone(),
            transport.clone(),
            Arc::new(MockPlacer::new()),
            processed.clone(),
            Arc::new(RecordingProgress::new()),
        )
        .unwrap()
        .with_throttle(Duration::ZERO)
        .with_linger(Duration::ZERO);
        let config = ServiceConfig {
            enabled: true,
            poll_interval_ms: 10,
            recent_settle_ms: 0,
        };
        Harness {
            library,
            transport,
            processed,
            service: Arc::new(ArtworkService::new(Arc::new(processor), config)),
        }
    }

    async fn add_movie(h: &Harness, dbid: i64, title: &str) {
        let slug = title.to_lowercase().replace(' ', "-");
        for art_type in ["poster", "fanart"] {
            let url = format!("https://img.example/{}/{}.jpg", slug, art_type);
            h.transport.set_image(&url, "image/jpeg", b"img").await;
        }
        h.library
            .add_item(
                MediaType::Movie,
                fixtures::movie_record(dbid, title, &format!("/movies/{}/{}.mkv", title, title)),
            )
            .await;
    }

    async fn wait_idle(service: &ArtworkService) {
        for _ in 0..500 {
            let snapshot = service.snapshot().await;
            if snapshot.status == ServiceStatus::Idle && snapshot.last_run.is_some() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("service did not finish its run");
    }

    #[tokio::test]
    async fn test_signal_and_cancel_pending() {
        let h = harness();
        assert!(!h.service.is_busy().await);
        h.service.signal(RunSignal::AllVideos).await;
        assert_eq!(h.service.status().await, ServiceStatus::Signalled);
        assert!(h.service.is_busy().await);

        assert!(h.service.cancel().await);
        assert_eq!(h.service.status().await, ServiceStatus::Idle);
        assert!(!h.service.cancel().await);
    }

    #[tokio::test]
    async fn test_recent_does_not_replace_full_run() {
        let h = harness();
        h.service.signal(RunSignal::NewVideos).await;
        h.service.queue_recent(MediaType::Movie, 1).await.unwrap();
        h.service.queue_recent(MediaType::Movie, 1).await.unwrap();
        let snapshot = h.service.snapshot().await;
        assert_eq!(snapshot.pending_signal, Some(RunSignal::NewVideos));
        assert_eq!(snapshot.recent_queued, 1);
    }

    #[tokio::test]
    async fn test_queue_recent_rejects_music() {
        let h = harness();
        let err = h.service.queue_recent(MediaType::Album, 3).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotQueueable(MediaType::Album)));
        assert!(!h.service.is_busy().await);
    }

    #[tokio::test]
    async fn test_loop_runs_new_videos() {
        let h = harness();
        add_movie(&h, 1, "Alien").await;
        add_movie(&h, 2, "Aliens").await;
        h.processed.set_data(1, MediaType::Movie, "Alien", None).unwrap();

        let shutdown = CancellationToken::new();
        let service = h.service.clone();
        let handle = tokio::spawn({
            let shutdown = shutdown.clone();
            async move { service.run(shutdown).await }
        });
        h.service.signal(RunSignal::NewVideos).await;
        wait_idle(&h.service).await;
        shutdown.cancel();
        handle.await.unwrap();

        let summary = h.service.snapshot().await.last_run.unwrap();
        assert_eq!(summary.excluded, 1);
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.updated_art_count, 2);
        let updates = h.library.recorded_art_updates().await;
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].dbid, 2);
        assert!(h.processed.exists(2, MediaType::Movie, "Aliens").unwrap());
    }

    #[tokio::test]
    async fn test_loop_processes_recent_queue() {
        let h = harness();
        add_movie(&h, 7, "Heat").await;

        let shutdown = CancellationToken::new();
        let service = h.service.clone();
        let handle = tokio::spawn({
            let shutdown = shutdown.clone();
            async move { service.run(shutdown).await }
        });
        h.service.queue_recent(MediaType::Movie, 7).await.unwrap();
        wait_idle(&h.service).await;
        shutdown.cancel();
        handle.await.unwrap();

        let snapshot = h.service.snapshot().await;
        assert_eq!(snapshot.recent_queued, 0);
        assert_eq!(snapshot.last_run.unwrap().processed, 1);
        assert_eq!(h.library.recorded_art_updates().await[0].dbid, 7);
    }

    #[tokio::test]
    async fn test_process_item_directly() {
        let h = harness();
        add_movie(&h, 3, "Ronin").await;

        let summary = h.service.process_item(MediaType::Movie, 3).await.unwrap();
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.updated_art_count, 2);
        assert_eq!(h.service.status().await, ServiceStatus::Idle);

        let err = h.service.process_item(MediaType::Movie, 99).await.unwrap_err();
        assert!(matches!(err, ServiceError::Library(_)));
    }
}
