//! Price server - home price estimation over HTTP
//!
//! Loads the schema/model artifacts at startup and serves predictions,
//! health and metrics. A failed startup load leaves the server running
//! in a degraded state so it can recover on a later request or reload.

use anyhow::Result;
use estimator_lib::{ArtifactStore, LifecycleManager, StructuredLogger};
use price_server::{
    api,
    config::{LogFormat, ServerConfig},
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::load()?;

    // Initialize tracing with env filter and the configured output format
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init(),
    }

    info!("Starting price-server");

    let logger = StructuredLogger::new("price-server");
    logger.log_startup(SERVER_VERSION, &config.bind_addr());

    let store = ArtifactStore::new(config.artifact_config());
    let lifecycle = Arc::new(LifecycleManager::new(
        Arc::new(store),
        config.lifecycle_config(),
    ));

    if let Err(e) = lifecycle.initialize().await {
        warn!(error = %e, "Starting without artifacts; requests will retry loading");
    }

    let app_state = Arc::new(api::AppState::new(lifecycle));

    api::serve(&config.bind_addr(), app_state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    })
    .await?;

    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    Ok(())
}
