pub mod cache;
pub mod config;
pub mod enrich;
pub mod exclusion;
pub mod fetcher;
pub mod library;
pub mod media;
pub mod metrics;
pub mod paths;
pub mod placer;
pub mod processed;
pub mod processor;
pub mod progress;
pub mod resolver;
pub mod service;
pub mod testing;
pub mod transport;

pub use cache::{CacheCapabilities, CacheReconciler};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use enrich::Enricher;
pub use exclusion::Exclusions;
pub use fetcher::{DownloadOutcome, FetchEngine, FetchError, ProviderFailure};
pub use library::{JsonRpcLibrary, LibraryError, LibraryService};
pub use media::{MediaDetails, MediaEntry, MediaError, MediaType};
pub use placer::{FsPlacer, Placer, PlacerConfig, PlacerError};
pub use processed::{ProcessedError, ProcessedStore, SqliteProcessedStore};
pub use processor::{ArtworkProcessor, EntryError, RunItem, RunSummary};
pub use progress::{ProgressSink, ProgressSnapshot, ProgressTracker, TracingProgress};
pub use resolver::{CentralDirectories, PathResolver};
pub use service::{
    ArtworkService, RunScope, RunSignal, ServiceConfig, ServiceError, ServiceSnapshot,
    ServiceStatus,
};
pub use transport::{ArtworkTransport, FetchResponse, GetOptions, ReqwestTransport, TransportError};
