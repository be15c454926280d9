//! # AIPMA Gateway - Main Entry Point
//!
//! Serves the AIPMA site's resource API.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (`GATEWAY_CONFIG_PATH`, default `config/gateway.yaml`) and apply
//!    environment overrides such as `MONGO_URL`
//! 2. Initialize logging
//! 3. Connect the document store once; it is shared by every request
//! 4. Seed empty collections with the demonstration set
//! 5. Serve until SIGINT/SIGTERM, drain in-flight requests, shut the store down

use tokio::signal;
use tracing::{error, info, warn};

use aipma_gateway::core::config::DEFAULT_CONFIG_PATH;
use aipma_gateway::observability::init_logging;
use aipma_gateway::{storage, GatewayConfig, GatewayResult, GatewayServer};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // The subscriber may not be up yet when configuration fails
        eprintln!("Gateway failed: {}", e);
        error!("Gateway failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> GatewayResult<()> {
    let config_path =
        std::env::var("GATEWAY_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = GatewayConfig::load_or_default(&config_path).await?;

    init_logging(&config.observability.logging)?;

    info!("🚀 Starting AIPMA gateway");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    info!("🔗 Connecting document store...");
    let store = storage::connect(&config.storage).await?;
    info!(backend = store.backend_name(), "✅ Document store connected");

    let server = GatewayServer::new(&config, store)?;

    info!("🌱 Checking demonstration data...");
    server.seed().await;

    info!("🌐 Gateway ready on {}", server.bind_addr());
    if config.observability.metrics.enabled {
        info!("📊 Metrics available on {}", config.observability.metrics.endpoint_path);
    }

    server.start(shutdown_signal()).await?;

    info!("✅ Gateway shutdown complete");
    Ok(())
}

/// Resolves on SIGINT (Ctrl+C) or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📡 Received SIGINT (Ctrl+C), initiating graceful shutdown...");
        }
        _ = terminate => {
            info!("📡 Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
