use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use artdump_core::{
    load_config, validate_config, ArtworkProcessor, ArtworkService, Config, FsPlacer,
    JsonRpcLibrary, ReqwestTransport, RunSignal, SqliteProcessedStore, TracingProgress,
};
use artdump_server::api::create_router;
use artdump_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("ARTDUMP_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Library endpoint: {}", config.library.url);
    info!("Database path: {:?}", config.database.path);

    let library = Arc::new(
        JsonRpcLibrary::new(&config.library).context("Failed to create library client")?,
    );
    let transport = Arc::new(
        ReqwestTransport::new(&config.transport).context("Failed to create HTTP transport")?,
    );
    let processed = Arc::new(
        SqliteProcessedStore::new(&config.database.path)
            .context("Failed to open processed item store")?,
    );
    info!("Processed item store initialized");
    let placer = Arc::new(FsPlacer::with_defaults());
    let progress = Arc::new(TracingProgress::new());

    let processor = ArtworkProcessor::new(
        &config,
        library,
        transport,
        placer,
        processed,
        progress.clone(),
    )
    .context("Failed to create artwork processor")?;
    let service = Arc::new(ArtworkService::new(
        Arc::new(processor),
        config.service.clone(),
    ));

    // Start the service loop
    let shutdown = CancellationToken::new();
    let service_handle = if config.service.enabled {
        let runner = Arc::clone(&service);
        let token = shutdown.clone();
        let handle = tokio::spawn(async move { runner.run(token).await });
        if let Some(signal) = startup_signal(&config) {
            info!(?signal, "Requesting startup run");
            service.signal(signal).await;
        }
        info!("Service loop started");
        Some(handle)
    } else {
        info!("Service loop disabled in config");
        None
    };

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), Arc::clone(&service), progress));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Stop the service loop, aborting any active run
    info!("Server shutting down...");
    shutdown.cancel();
    if let Some(handle) = service_handle {
        if let Err(e) = handle.await {
            error!("Service loop ended abnormally: {}", e);
        }
        info!("Service loop stopped");
    }

    Ok(())
}

/// The new-items run requested when the service starts, if any.
///
/// Only one signal can be pending, so videos win when both are enabled.
fn startup_signal(config: &Config) -> Option<RunSignal> {
    if config.processing.auto_process_videos {
        Some(RunSignal::NewVideos)
    } else if config.processing.auto_process_music {
        Some(RunSignal::NewMusic)
    } else {
        None
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
