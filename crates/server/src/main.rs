use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubecast_core::{
    load_config, Acquirer, AcquirerConfig, DeliveryClient, DownloadQueue, FileSettingsStore,
    HistoryStore, IdExtractor, ImageThumbnailProcessor, SettingsStore, SqliteHistoryStore,
    TelegramDelivery, ThumbnailProcessor, ToolRunner, WorkflowExecutor, YtdlpAcquirer,
    YtdlpRunner, YtdlpRunnerConfig,
};

use tubecast_server::api::create_router;
use tubecast_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
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
    let config_path = std::env::var("TUBECAST_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    info!("Configuration loaded successfully");
    info!("Tool binary: {:?}", config.ytdlp.binary);
    info!("Database path: {:?}", config.database.path);

    // Process supervisor, shared by the extractor and the acquirer
    let runner: Arc<dyn ToolRunner> = Arc::new(YtdlpRunner::new(YtdlpRunnerConfig {
        binary: config.ytdlp.binary.clone(),
    }));

    let extractor = Arc::new(IdExtractor::new(Arc::clone(&runner)));

    let thumbnailer: Arc<dyn ThumbnailProcessor> = Arc::new(ImageThumbnailProcessor::new());

    let acquirer: Arc<dyn Acquirer> = Arc::new(YtdlpAcquirer::new(
        Arc::clone(&runner),
        thumbnailer,
        AcquirerConfig {
            scratch_dir: config.ytdlp.scratch_dir.clone(),
            audio_format: config.ytdlp.audio_format.clone(),
            thumbnail_max_dimension: config.thumbnail.max_dimension,
        },
    ));

    // Runtime-mutable delivery settings
    let settings: Arc<dyn SettingsStore> = Arc::new(FileSettingsStore::new(
        config.telegram.settings_path.clone(),
    ));
    info!("Settings store at {:?}", config.telegram.settings_path);

    let delivery: Arc<dyn DeliveryClient> = Arc::new(TelegramDelivery::new(
        Arc::clone(&settings),
        config.telegram.api_base.clone(),
    ));

    // Create SQLite history store
    let history: Arc<dyn HistoryStore> = Arc::new(
        SqliteHistoryStore::new(&config.database.path)
            .context("Failed to create history store")?,
    );
    info!("History store initialized");

    let executor = Arc::new(WorkflowExecutor::new(
        extractor,
        acquirer,
        delivery,
        Arc::clone(&history),
    ));
    let queue = Arc::new(DownloadQueue::new(executor));
    info!("Download queue initialized");

    let state = Arc::new(AppState::new(queue, history, settings));
    let app = create_router(state);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
