//! # AIPMA Gateway Library
//!
//! Backend and content client for the AIPMA (*Alianza Internacional de Periodismo y Medios
//! Audiovisuales*) website: a small CRUD API over four document collections (news, events,
//! members and contact messages) and the client the site uses to read and write them.
//!
//! ## Module Layout
//!
//! - `core`: errors, configuration and the resource model
//! - `storage`: the document store abstraction, its MongoDB and in-memory backends, seeding
//! - `routing`: path resolution under the API prefix
//! - `gateway`: the Axum server and the resource handlers
//! - `middleware`: request logging and CORS
//! - `observability`: logging setup and Prometheus metrics
//! - `client`: the content client and view state of the site
//!
//! ## Re-exports
//! - `pub use` re-exports the handful of types most callers need, so
//!   `use aipma_gateway::GatewayServer` works without knowing the module tree

/// Core functionality: error types, configuration, resource model
pub mod core;

/// Document store abstraction and backends
pub mod storage;

/// Path resolution for the resource API
pub mod routing;

/// HTTP server and handlers
pub mod gateway;

/// Tower/Axum middleware
pub mod middleware;

/// Logging and metrics
pub mod observability;

/// Content client used by the site front end
pub mod client;

/// Main error type used throughout the crate
pub use core::error::{GatewayError, GatewayResult};

/// Main configuration structure
pub use core::config::GatewayConfig;

/// Resource model
pub use core::types::{Naming, Resource};

/// Server entry points
pub use gateway::server::{GatewayServer, ServerState};

/// Store handle and backends
pub use storage::{DocumentStore, MemoryStore, MongoStore, SharedStore};

/// Client entry points
pub use client::{ContactOutcome, ContentClient, Fetched, SiteContent, ViewState};
