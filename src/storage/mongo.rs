//! # MongoDB Document Store
//!
//! `DocumentStore` backed by the official MongoDB async driver. Documents travel as
//! `serde_json` maps at the trait boundary and are converted to BSON here; reads use relaxed
//! extended JSON on the way back so numbers and strings round-trip unchanged.
//!
//! Lookups always filter on the application `id` field. Mongo's own `_id` is projected out of
//! every read.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Bson};
use mongodb::options::{ClientOptions, FindOptions};
use mongodb::{Client, Collection, Database};
use std::time::Duration;
use tracing::{debug, info};

use super::DocumentStore;
use crate::core::error::{GatewayError, GatewayResult};
use crate::core::types::{Document, SortOrder, SortSpec, STORE_KEY_FIELD};

const APP_NAME: &str = "aipma-gateway";

/// MongoDB document store
pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    /// Connect and verify the deployment answers a ping
    pub async fn connect(url: &str, database: &str, timeout: Duration) -> GatewayResult<Self> {
        let mut options = ClientOptions::parse(url)
            .await
            .map_err(|e| GatewayError::store("connect", e.to_string()))?;
        options.app_name = Some(APP_NAME.to_string());
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(options)
            .map_err(|e| GatewayError::store("connect", e.to_string()))?;
        let database = client.database(database);

        database
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| GatewayError::store("ping", e.to_string()))?;

        info!(database = database.name(), "Connected to MongoDB");
        Ok(Self { client, database })
    }

    fn collection(&self, name: &str) -> Collection<bson::Document> {
        self.database.collection(name)
    }
}

fn to_bson(document: Document) -> GatewayResult<bson::Document> {
    bson::to_document(&document).map_err(|e| GatewayError::store("encode", e.to_string()))
}

fn from_bson(document: bson::Document) -> GatewayResult<Document> {
    match Bson::Document(document).into_relaxed_extjson() {
        serde_json::Value::Object(mut map) => {
            map.remove(STORE_KEY_FIELD);
            Ok(map)
        }
        other => Err(GatewayError::store(
            "decode",
            format!("expected a document, got {}", other),
        )),
    }
}

fn field_filter(field: &str, value: &str) -> bson::Document {
    let mut filter = bson::Document::new();
    filter.insert(field, value);
    filter
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    async fn count(&self, collection: &str) -> GatewayResult<u64> {
        self.collection(collection)
            .count_documents(doc! {}, None)
            .await
            .map_err(|e| GatewayError::store("count", e.to_string()))
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> GatewayResult<()> {
        if documents.is_empty() {
            return Ok(());
        }
        let documents = documents
            .into_iter()
            .map(to_bson)
            .collect::<GatewayResult<Vec<_>>>()?;

        let result = self
            .collection(collection)
            .insert_many(documents, None)
            .await
            .map_err(|e| GatewayError::store("insert_many", e.to_string()))?;
        debug!(collection, inserted = result.inserted_ids.len(), "Inserted documents");
        Ok(())
    }

    async fn insert_one(&self, collection: &str, document: Document) -> GatewayResult<()> {
        self.collection(collection)
            .insert_one(to_bson(document)?, None)
            .await
            .map_err(|e| GatewayError::store("insert_one", e.to_string()))?;
        Ok(())
    }

    async fn find_all(&self, collection: &str, sort: SortSpec) -> GatewayResult<Vec<Document>> {
        let direction = match sort.order {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        };
        let mut sort_doc = bson::Document::new();
        sort_doc.insert(sort.field, direction);

        let options = FindOptions::builder()
            .sort(sort_doc)
            .projection(doc! { "_id": 0 })
            .build();

        let cursor = self
            .collection(collection)
            .find(doc! {}, options)
            .await
            .map_err(|e| GatewayError::store("find", e.to_string()))?;
        let documents: Vec<bson::Document> = cursor
            .try_collect()
            .await
            .map_err(|e| GatewayError::store("find", e.to_string()))?;

        documents.into_iter().map(from_bson).collect()
    }

    async fn update_one(
        &self,
        collection: &str,
        field: &str,
        value: &str,
        changes: Document,
    ) -> GatewayResult<u64> {
        let update = doc! { "$set": to_bson(changes)? };
        let result = self
            .collection(collection)
            .update_one(field_filter(field, value), update, None)
            .await
            .map_err(|e| GatewayError::store("update_one", e.to_string()))?;
        Ok(result.matched_count)
    }

    async fn delete_one(&self, collection: &str, field: &str, value: &str) -> GatewayResult<u64> {
        let result = self
            .collection(collection)
            .delete_one(field_filter(field, value), None)
            .await
            .map_err(|e| GatewayError::store("delete_one", e.to_string()))?;
        Ok(result.deleted_count)
    }

    async fn health_check(&self) -> GatewayResult<bool> {
        match self.database.run_command(doc! { "ping": 1 }, None).await {
            Ok(_) => Ok(true),
            Err(e) => {
                debug!(error = %e, "MongoDB ping failed");
                Ok(false)
            }
        }
    }

    async fn shutdown(&self) -> GatewayResult<()> {
        self.client.clone().shutdown().await;
        info!("MongoDB client shut down");
        Ok(())
    }
}
