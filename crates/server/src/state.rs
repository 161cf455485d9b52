use std::sync::Arc;
use artdump_core::{ArtworkService, Config, ProgressSnapshot, SanitizedConfig, TracingProgress};

/// Shared application state
pub struct AppState {
    config: Config,
    service: Arc<ArtworkService>,
    progress: Arc<TracingProgress>,
}

impl AppState {
    pub fn new(config: Config, service: Arc<ArtworkService>, progress: Arc<TracingProgress>) -> Self {
        Self {
            config,
            service,
            progress,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn service(&self) -> &ArtworkService {
        self.service.as_ref()
    }

    /// Latest progress reported by the active or last run.
    pub fn progress(&self) -> ProgressSnapshot {
        self.progress.snapshot()
    }
}
