use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ulsan_bus::clock::SystemClock;
use ulsan_bus::config::{BusConfig, ConfigError};
use ulsan_bus::feed::FeedError;
use ulsan_bus::platform::Platform;
use ulsan_bus::web::{AppState, create_router};

/// Errors that stop the server before or while it starts serving.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to create feed client: {0}")]
    Feed(#[from] FeedError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run().await {
        error!("{err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = BusConfig::from_env()?;
    info!(stations = config.stations.len(), "loaded configuration");

    let platform = Arc::new(Platform::setup(&config, Arc::new(SystemClock)).await?);
    Arc::clone(&platform).spawn_scheduler(config.scan_interval());

    let app = create_router(AppState::new(platform));

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!("listening on http://{}", config.listen_addr);
    info!("  GET  /health                    - Health check");
    info!("  GET  /api/entities              - All sensors");
    info!("  GET  /api/entities/:entity_id   - One sensor");

    axum::serve(listener, app).await?;
    Ok(())
}
