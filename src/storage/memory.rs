//! # In-Memory Document Store
//!
//! Process-local implementation of `DocumentStore`. Collections live in a `DashMap` keyed by
//! name; each collection is a `Vec` kept in insertion order. Reads sort a snapshot, so a
//! long read never blocks writers to other collections.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use tracing::debug;

use super::DocumentStore;
use crate::core::error::{GatewayError, GatewayResult};
use crate::core::types::{Document, SortOrder, SortSpec, STORE_KEY_FIELD};

/// In-memory document store
#[derive(Default)]
pub struct MemoryStore {
    collections: DashMap<String, Vec<Document>>,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self, operation: &str) -> GatewayResult<()> {
        if self.closed.load(AtomicOrdering::Acquire) {
            return Err(GatewayError::store(operation, "store has been shut down"));
        }
        Ok(())
    }
}

fn matches(document: &Document, field: &str, value: &str) -> bool {
    document.get(field).and_then(Value::as_str) == Some(value)
}

/// Rank of a value's type in sort order: missing and null first, then numbers, strings,
/// objects, arrays, booleans
fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

/// Compare two documents on one field, ascending
pub(crate) fn compare_field(a: &Document, b: &Document, field: &str) -> Ordering {
    let (left, right) = (a.get(field), b.get(field));
    match (left, right) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => type_rank(left).cmp(&type_rank(right)),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn count(&self, collection: &str) -> GatewayResult<u64> {
        self.ensure_open("count")?;
        Ok(self
            .collections
            .get(collection)
            .map(|docs| docs.len() as u64)
            .unwrap_or(0))
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> GatewayResult<()> {
        self.ensure_open("insert_many")?;
        debug!(collection, count = documents.len(), "Inserting documents");
        self.collections
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
        Ok(())
    }

    async fn insert_one(&self, collection: &str, document: Document) -> GatewayResult<()> {
        self.ensure_open("insert_one")?;
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(())
    }

    async fn find_all(&self, collection: &str, sort: SortSpec) -> GatewayResult<Vec<Document>> {
        self.ensure_open("find")?;
        let mut documents = self
            .collections
            .get(collection)
            .map(|docs| docs.value().clone())
            .unwrap_or_default();

        documents.sort_by(|a, b| {
            let ordering = compare_field(a, b, sort.field);
            match sort.order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });

        for document in &mut documents {
            document.remove(STORE_KEY_FIELD);
        }
        Ok(documents)
    }

    async fn update_one(
        &self,
        collection: &str,
        field: &str,
        value: &str,
        changes: Document,
    ) -> GatewayResult<u64> {
        self.ensure_open("update_one")?;
        let Some(mut documents) = self.collections.get_mut(collection) else {
            return Ok(0);
        };

        match documents.iter_mut().find(|doc| matches(doc, field, value)) {
            Some(document) => {
                document.extend(changes);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_one(&self, collection: &str, field: &str, value: &str) -> GatewayResult<u64> {
        self.ensure_open("delete_one")?;
        let Some(mut documents) = self.collections.get_mut(collection) else {
            return Ok(0);
        };

        match documents.iter().position(|doc| matches(doc, field, value)) {
            Some(index) => {
                documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn health_check(&self) -> GatewayResult<bool> {
        Ok(!self.closed.load(AtomicOrdering::Acquire))
    }

    async fn shutdown(&self) -> GatewayResult<()> {
        self.closed.store(true, AtomicOrdering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn test_insert_and_count() {
        let store = MemoryStore::new();
        assert_eq!(store.count("noticias").await.unwrap(), 0);

        store
            .insert_many("noticias", vec![doc(json!({"id": "a"})), doc(json!({"id": "b"}))])
            .await
            .unwrap();
        store.insert_one("noticias", doc(json!({"id": "c"}))).await.unwrap();

        assert_eq!(store.count("noticias").await.unwrap(), 3);
        assert_eq!(store.count("eventos").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_all_sorts_by_field() {
        let store = MemoryStore::new();
        store
            .insert_many(
                "eventos",
                vec![
                    doc(json!({"id": "b", "fecha": "2024-03-20T00:00:00.000Z"})),
                    doc(json!({"id": "a", "fecha": "2024-02-15T00:00:00.000Z"})),
                    doc(json!({"id": "c", "fecha": "2024-04-10T00:00:00.000Z"})),
                ],
            )
            .await
            .unwrap();

        let asc = store.find_all("eventos", SortSpec::asc("fecha")).await.unwrap();
        let ids: Vec<_> = asc.iter().map(|d| d["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let desc = store.find_all("eventos", SortSpec::desc("fecha")).await.unwrap();
        let ids: Vec<_> = desc.iter().map(|d| d["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_missing_sort_field_sorts_first_ascending() {
        let store = MemoryStore::new();
        store
            .insert_many(
                "eventos",
                vec![
                    doc(json!({"id": "dated", "fecha": "2024-01-01T00:00:00.000Z"})),
                    doc(json!({"id": "undated"})),
                ],
            )
            .await
            .unwrap();

        let docs = store.find_all("eventos", SortSpec::asc("fecha")).await.unwrap();
        assert_eq!(docs[0]["id"], json!("undated"));
    }

    #[tokio::test]
    async fn test_numbers_compare_numerically() {
        let a = doc(json!({"capacidad": 100}));
        let b = doc(json!({"capacidad": 20}));
        assert_eq!(compare_field(&a, &b, "capacidad"), Ordering::Greater);
    }

    #[tokio::test]
    async fn test_find_all_strips_store_key() {
        let store = MemoryStore::new();
        store
            .insert_one("miembros", doc(json!({"_id": "internal", "id": "m1"})))
            .await
            .unwrap();

        let docs = store.find_all("miembros", SortSpec::desc("fechaIngreso")).await.unwrap();
        assert!(docs[0].get("_id").is_none());
        assert_eq!(docs[0]["id"], json!("m1"));
    }

    #[tokio::test]
    async fn test_update_one_merges_fields() {
        let store = MemoryStore::new();
        store
            .insert_one("noticias", doc(json!({"id": "n1", "titulo": "Old", "autor": "Ana"})))
            .await
            .unwrap();

        let matched = store
            .update_one("noticias", "id", "n1", doc(json!({"titulo": "New"})))
            .await
            .unwrap();
        assert_eq!(matched, 1);

        let docs = store.find_all("noticias", SortSpec::desc("fecha")).await.unwrap();
        assert_eq!(docs[0]["titulo"], json!("New"));
        assert_eq!(docs[0]["autor"], json!("Ana"));

        let missing = store
            .update_one("noticias", "id", "nope", doc(json!({"titulo": "X"})))
            .await
            .unwrap();
        assert_eq!(missing, 0);
    }

    #[tokio::test]
    async fn test_delete_one_removes_single_match() {
        let store = MemoryStore::new();
        store
            .insert_many(
                "noticias",
                vec![doc(json!({"id": "n1"})), doc(json!({"id": "n2"}))],
            )
            .await
            .unwrap();

        assert_eq!(store.delete_one("noticias", "id", "n1").await.unwrap(), 1);
        assert_eq!(store.delete_one("noticias", "id", "n1").await.unwrap(), 0);
        assert_eq!(store.delete_one("otra", "id", "n2").await.unwrap(), 0);
        assert_eq!(store.count("noticias").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_rejects_further_operations() {
        let store = MemoryStore::new();
        store.shutdown().await.unwrap();

        assert!(!store.health_check().await.unwrap());
        assert!(store.count("noticias").await.is_err());
    }
}
