//! # HTTP Server Module
//!
//! This module assembles the Axum application and runs it. The application has three fixed
//! routes (`/health`, `/ready` and, when enabled, the metrics endpoint) and sends everything
//! else to the resource handler, which resolves API paths itself.
//!
//! ## Lifecycle
//!
//! 1. The binary builds the document store and hands it to [`GatewayServer::new`]
//! 2. [`GatewayServer::seed`] fills empty collections before the listener opens
//! 3. [`GatewayServer::serve`] runs until the shutdown future resolves, drains in-flight
//!    requests, then shuts the store down
//!
//! ## Rust Concepts Used
//!
//! - `Arc<T>` for sharing server state across async tasks
//! - Tower layers for tracing, CORS, timeouts and body limits

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::get;
use axum::Router as AxumRouter;
use metrics_exporter_prometheus::PrometheusHandle;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};

use super::handlers::{handle_api, health_check, metrics_handler, readiness_check};
use crate::core::config::GatewayConfig;
use crate::core::error::{GatewayError, GatewayResult};
use crate::middleware::{cors_layer, track_requests};
use crate::observability::metrics::{install_recorder, record_seeded};
use crate::routing::ApiRouter;
use crate::storage::{Seeder, SharedStore};

/// Shared server state
#[derive(Clone)]
pub struct ServerState {
    /// Document store, one per process
    pub store: SharedStore,

    /// Demonstration data seeder
    pub seeder: Arc<Seeder>,

    /// API path resolver
    pub router: Arc<ApiRouter>,

    /// Prometheus handle when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    pub fn new(config: &GatewayConfig, store: SharedStore) -> GatewayResult<Self> {
        Ok(Self {
            store,
            seeder: Arc::new(Seeder::new(config.seed.enabled)),
            router: Arc::new(ApiRouter::new(config.server.api_prefix.clone())?),
            metrics: install_recorder(&config.observability.metrics)?,
        })
    }

    /// Run the seed check; failures are logged and never reach the caller
    pub async fn seed_if_needed(&self) {
        match self.seeder.ensure_seeded(self.store.as_ref()).await {
            Ok(0) => {}
            Ok(inserted) => record_seeded(inserted),
            Err(e) => error!(error = %e, "Failed to seed demonstration data"),
        }
    }
}

/// The gateway HTTP server
pub struct GatewayServer {
    state: ServerState,
    app: AxumRouter,
    bind_addr: SocketAddr,
}

impl GatewayServer {
    /// Build the server around an already connected store
    pub fn new(config: &GatewayConfig, store: SharedStore) -> GatewayResult<Self> {
        let state = ServerState::new(config, store)?;
        let app = build_app(config, state.clone());
        Ok(Self {
            state,
            app,
            bind_addr: config.bind_addr()?,
        })
    }

    /// The Axum application, for serving or in-process testing
    pub fn app(&self) -> AxumRouter {
        self.app.clone()
    }

    pub fn state(&self) -> &ServerState {
        &self.state
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Seed empty collections ahead of the first request
    pub async fn seed(&self) {
        self.state.seed_if_needed().await;
    }

    /// Bind the configured address and serve until `shutdown` resolves
    pub async fn start<F>(self, shutdown: F) -> GatewayResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.bind_addr)
            .await
            .map_err(|e| GatewayError::internal(format!("Failed to bind gateway server to {}: {}", self.bind_addr, e)))?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an existing listener, then release the store
    #[instrument(skip_all)]
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> GatewayResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener.local_addr()?;
        info!(
            addr = %local_addr,
            prefix = self.state.router.prefix(),
            backend = self.state.store.backend_name(),
            "Gateway HTTP server listening"
        );

        let served = axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| GatewayError::internal(format!("Gateway server error: {}", e)));

        info!("Listener drained, shutting down document store");
        self.state.store.shutdown().await?;
        served
    }
}

/// Build the Axum application with its middleware stack
pub fn build_app(config: &GatewayConfig, state: ServerState) -> AxumRouter {
    let mut app = AxumRouter::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check));

    if state.metrics.is_some() {
        app = app.route(&config.observability.metrics.endpoint_path, get(metrics_handler));
    }

    // Order matters: the last layer added is the outermost
    let mut app = app
        .fallback(handle_api)
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.server.max_request_size))
        .layer(TimeoutLayer::new(config.server.request_timeout))
        .layer(middleware::from_fn(track_requests))
        .layer(TraceLayer::new_for_http());

    if config.cors.enabled {
        app = app.layer(cors_layer(&config.cors));
        info!(origins = config.cors.allowed_origins.len(), "CORS enabled");
    }

    app
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DocumentStore, MemoryStore};

    fn test_config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.server.bind_address = "127.0.0.1".to_string();
        config.server.http_port = 3999;
        config
    }

    #[tokio::test]
    async fn test_server_creation() {
        let server = GatewayServer::new(&test_config(), Arc::new(MemoryStore::new())).unwrap();
        assert_eq!(server.bind_addr().ip().to_string(), "127.0.0.1");
        assert_eq!(server.state().router.prefix(), "/api");
        assert!(server.state().metrics.is_none());
    }

    #[tokio::test]
    async fn test_startup_seed() {
        let store = Arc::new(MemoryStore::new());
        let server = GatewayServer::new(&test_config(), store.clone()).unwrap();
        server.seed().await;
        assert!(server.state().seeder.is_seeded());
    }

    #[tokio::test]
    async fn test_seed_disabled() {
        let mut config = test_config();
        config.seed.enabled = false;
        let server = GatewayServer::new(&config, Arc::new(MemoryStore::new())).unwrap();
        server.seed().await;
        assert!(!server.state().seeder.is_seeded());
    }

    #[tokio::test]
    async fn test_serve_shuts_store_down() {
        let store = Arc::new(MemoryStore::new());
        let server = GatewayServer::new(&test_config(), store.clone()).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

        server.serve(listener, async {}).await.unwrap();
        assert!(!store.health_check().await.unwrap());
    }
}
