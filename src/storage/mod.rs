//! # Document Storage Module
//!
//! This module abstracts the document database behind the `DocumentStore` trait and provides
//! two backends:
//!
//! - `MongoStore`: MongoDB through the official async driver
//! - `MemoryStore`: a process-local store for development and tests
//!
//! The store is generic over collection names. Restricting callers to the four site
//! collections is the gateway's job (see `core::types::Resource`).
//!
//! ## Lifecycle
//!
//! A store is built once at process start with [`connect`], shared as `Arc<dyn DocumentStore>`
//! through the server state, and released with [`DocumentStore::shutdown`] after the
//! listener has drained.

pub mod memory;
pub mod mongo;
pub mod seed;

pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use seed::Seeder;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::core::config::{StorageBackend, StorageConfig};
use crate::core::error::GatewayResult;
use crate::core::types::{Document, SortSpec};

/// Operations the gateway needs from a document database
///
/// Each call is a single store operation, atomic at the level of one document.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs and metrics
    fn backend_name(&self) -> &'static str;

    /// Number of documents in a collection
    async fn count(&self, collection: &str) -> GatewayResult<u64>;

    /// Insert a batch of documents
    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> GatewayResult<()>;

    /// Insert a single document
    async fn insert_one(&self, collection: &str, document: Document) -> GatewayResult<()>;

    /// All documents of a collection ordered by one field, storage-internal keys removed
    async fn find_all(&self, collection: &str, sort: SortSpec) -> GatewayResult<Vec<Document>>;

    /// Set `changes` on the first document whose `field` equals `value`
    ///
    /// Returns the number of matched documents (0 or 1).
    async fn update_one(
        &self,
        collection: &str,
        field: &str,
        value: &str,
        changes: Document,
    ) -> GatewayResult<u64>;

    /// Remove the first document whose `field` equals `value`
    ///
    /// Returns the number of deleted documents (0 or 1).
    async fn delete_one(&self, collection: &str, field: &str, value: &str) -> GatewayResult<u64>;

    /// Check that the backend is reachable
    async fn health_check(&self) -> GatewayResult<bool>;

    /// Release connections held by the backend
    async fn shutdown(&self) -> GatewayResult<()>;
}

/// Shared handle to the process-wide store
pub type SharedStore = Arc<dyn DocumentStore>;

/// Build the configured store
pub async fn connect(config: &StorageConfig) -> GatewayResult<SharedStore> {
    match &config.backend {
        StorageBackend::Mongo { url, database } => {
            let store = MongoStore::connect(url, database, config.connect_timeout).await?;
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            info!("Using in-memory document store; data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
