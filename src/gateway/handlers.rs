//! # Resource Handlers
//!
//! Every request under the API prefix lands in [`handle_api`], which resolves the path, picks
//! one of the four resources and performs exactly one document-store operation (GET also runs
//! the seed check first).
//!
//! | Verb | Path | Result |
//! |---|---|---|
//! | GET | `/{noticias,eventos,miembros}` (or English) | `{ <segment>: [...] }` |
//! | GET | anything else under the prefix | capability listing |
//! | POST | `/{resource}` | `{ success, <singular>: record }`, contact: `{ success, message }` |
//! | PUT | `/{resource}/{id}` | `{ success, message }` |
//! | DELETE | `/{resource}/{id}` | `{ success, message }` |
//!
//! PUT and DELETE check, in order: a path id is present (400), the resource is one of the four
//! (404), then the body (400) and the target document (404). A PUT body may not use `$` or `.`
//! in its keys, and its date fields must parse; they are stored in the same fixed-width UTC form
//! as on create.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::server::ServerState;
use crate::core::error::{GatewayError, GatewayResult};
use crate::core::types::{
    parse_date, timestamp, ContactPayload, Document, EventPayload, MemberPayload, Naming,
    NewsPayload, Resource, ID_FIELD, PROTECTED_FIELDS, UPDATED_AT_FIELD,
};
use crate::observability::metrics::observe_store;
use crate::routing::ApiRoute;

pub const API_RUNNING: &str = "API de AIPMA funcionando correctamente";
pub const ENDPOINT_NOT_FOUND: &str = "Endpoint no encontrado";
pub const ITEM_NOT_FOUND: &str = "Elemento no encontrado";
pub const ID_REQUIRED_FOR_UPDATE: &str = "ID requerido para actualización";
pub const ID_REQUIRED_FOR_DELETE: &str = "ID requerido para eliminación";
pub const CONTACT_SENT: &str = "Mensaje enviado exitosamente";
pub const ITEM_UPDATED: &str = "Elemento actualizado exitosamente";
pub const ITEM_DELETED: &str = "Elemento eliminado exitosamente";

/// Entry point for every request under the API prefix
pub async fn handle_api(
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let Some(route) = state.router.resolve(uri.path()) else {
        return GatewayError::not_found(ENDPOINT_NOT_FOUND).into_response();
    };
    debug!(?route, %method, "Resolved API route");

    let result = match method {
        Method::GET => list_resource(&state, &route).await,
        Method::POST => create_resource(&state, &route, &body).await,
        Method::PUT => update_resource(&state, &route, &body).await,
        Method::DELETE => delete_resource(&state, &route).await,
        other => Err(GatewayError::MethodNotAllowed {
            method: other.to_string(),
        }),
    };

    result.into_response()
}

/// Listing of the public endpoints, served for any GET that names no listable resource
pub fn capabilities(prefix: &str) -> Value {
    let endpoints: Vec<String> = Resource::ALL
        .iter()
        .map(|resource| format!("{}/{}", prefix, resource.segment(Naming::Spanish)))
        .collect();

    json!({
        "message": API_RUNNING,
        "endpoints": endpoints,
    })
}

async fn list_resource(state: &ServerState, route: &ApiRoute<'_>) -> GatewayResult<Json<Value>> {
    state.seed_if_needed().await;

    let listable = match route {
        ApiRoute::Collection { resource } => {
            Resource::from_segment(resource).filter(|(resource, _)| resource.is_listable())
        }
        _ => None,
    };
    let Some((resource, naming)) = listable else {
        return Ok(Json(capabilities(state.router.prefix())));
    };

    let collection = resource.collection();
    let documents = observe_store(
        "find",
        collection,
        state.store.find_all(collection, resource.sort()),
    )
    .await?;
    debug!(collection, count = documents.len(), "Listed documents");

    let items: Vec<Value> = documents.into_iter().map(Value::Object).collect();
    let mut body = Document::new();
    body.insert(resource.segment(naming).to_string(), Value::Array(items));
    Ok(Json(Value::Object(body)))
}

async fn create_resource(
    state: &ServerState,
    route: &ApiRoute<'_>,
    body: &Bytes,
) -> GatewayResult<Json<Value>> {
    let ApiRoute::Collection { resource } = route else {
        return Err(GatewayError::not_found(ENDPOINT_NOT_FOUND));
    };
    let (resource, naming) =
        Resource::from_segment(resource).ok_or_else(|| GatewayError::not_found(ENDPOINT_NOT_FOUND))?;

    let fields = parse_object(body)?;
    let now = Utc::now();

    let record = match resource {
        Resource::News => serialize_record(&decode::<NewsPayload>(fields)?.into_record(now))?,
        Resource::Events => serialize_record(&decode::<EventPayload>(fields)?.into_record(now))?,
        Resource::Members => serialize_record(&decode::<MemberPayload>(fields)?.into_record(now))?,
        Resource::Contact => serialize_record(&decode::<ContactPayload>(fields)?.into_record(now))?,
    };

    let collection = resource.collection();
    observe_store(
        "insert_one",
        collection,
        state.store.insert_one(collection, record.clone()),
    )
    .await?;
    info!(collection, id = ?record.get(ID_FIELD), "Created document");

    if resource == Resource::Contact {
        return Ok(Json(json!({ "success": true, "message": CONTACT_SENT })));
    }

    let mut response = Document::new();
    response.insert("success".to_string(), Value::Bool(true));
    response.insert(resource.singular(naming).to_string(), Value::Object(record));
    Ok(Json(Value::Object(response)))
}

async fn update_resource(
    state: &ServerState,
    route: &ApiRoute<'_>,
    body: &Bytes,
) -> GatewayResult<Json<Value>> {
    let (resource, id) = target(route, ID_REQUIRED_FOR_UPDATE)?;

    let mut changes = parse_object(body)?;
    for field in PROTECTED_FIELDS {
        changes.remove(field);
    }
    check_field_names(&changes)?;
    normalize_dates(resource, &mut changes)?;
    changes.insert(
        UPDATED_AT_FIELD.to_string(),
        Value::String(timestamp::format(&Utc::now())),
    );

    let collection = resource.collection();
    let matched = observe_store(
        "update_one",
        collection,
        state.store.update_one(collection, ID_FIELD, id, changes),
    )
    .await?;

    if matched == 0 {
        return Err(GatewayError::not_found(ITEM_NOT_FOUND));
    }
    info!(collection, id, "Updated document");
    Ok(Json(json!({ "success": true, "message": ITEM_UPDATED })))
}

async fn delete_resource(state: &ServerState, route: &ApiRoute<'_>) -> GatewayResult<Json<Value>> {
    let (resource, id) = target(route, ID_REQUIRED_FOR_DELETE)?;

    let collection = resource.collection();
    let deleted = observe_store(
        "delete_one",
        collection,
        state.store.delete_one(collection, ID_FIELD, id),
    )
    .await?;

    if deleted == 0 {
        return Err(GatewayError::not_found(ITEM_NOT_FOUND));
    }
    info!(collection, id, "Deleted document");
    Ok(Json(json!({ "success": true, "message": ITEM_DELETED })))
}

/// Resource and id addressed by a PUT or DELETE
fn target<'a>(route: &ApiRoute<'a>, missing_id: &str) -> GatewayResult<(Resource, &'a str)> {
    match route {
        ApiRoute::Item { resource, id } => {
            let (resource, _) = Resource::from_segment(resource)
                .ok_or_else(|| GatewayError::not_found(ENDPOINT_NOT_FOUND))?;
            Ok((resource, *id))
        }
        ApiRoute::Root | ApiRoute::Collection { .. } => Err(GatewayError::validation("id", missing_id)),
        ApiRoute::Unmatched => Err(GatewayError::not_found(ENDPOINT_NOT_FOUND)),
    }
}

/// Reject keys the store would read as operators or nested paths
fn check_field_names(changes: &Document) -> GatewayResult<()> {
    match changes
        .keys()
        .find(|key| key.is_empty() || key.starts_with('$') || key.contains('.'))
    {
        Some(key) => Err(GatewayError::validation(
            key.to_string(),
            format!("Nombre de campo inválido: '{}'", key),
        )),
        None => Ok(()),
    }
}

/// Rewrite the resource's date fields as fixed-width timestamps so string order stays
/// chronological
fn normalize_dates(resource: Resource, changes: &mut Document) -> GatewayResult<()> {
    for &field in resource.date_fields() {
        let Some(value) = changes.get_mut(field) else {
            continue;
        };
        let parsed = value
            .as_str()
            .and_then(|raw| parse_date(raw).ok())
            .ok_or_else(|| GatewayError::validation(field, format!("Fecha inválida en '{}'", field)))?;
        *value = Value::String(timestamp::format(&parsed));
    }
    Ok(())
}

/// Parse a request body that must be a JSON object
fn parse_object(body: &Bytes) -> GatewayResult<Document> {
    match serde_json::from_slice::<Value>(body)? {
        Value::Object(fields) => Ok(fields),
        _ => Err(GatewayError::validation(
            "body",
            "El cuerpo debe ser un objeto JSON",
        )),
    }
}

fn decode<T: DeserializeOwned>(fields: Document) -> GatewayResult<T> {
    Ok(serde_json::from_value(Value::Object(fields))?)
}

fn serialize_record<T: Serialize>(record: &T) -> GatewayResult<Document> {
    match serde_json::to_value(record) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(GatewayError::internal("record did not serialize to an object")),
        Err(e) => Err(GatewayError::internal(format!("failed to serialize record: {}", e))),
    }
}

/// Liveness: the process is up and serving
pub async fn health_check() -> impl IntoResponse {
    let health_info = json!({
        "status": "healthy",
        "timestamp": timestamp::format(&Utc::now()),
        "version": env!("CARGO_PKG_VERSION"),
        "service": "aipma-gateway"
    });

    (StatusCode::OK, Json(health_info))
}

/// Readiness: the document store answers
pub async fn readiness_check(State(state): State<ServerState>) -> impl IntoResponse {
    let store_ok = state.store.health_check().await.unwrap_or(false);
    let (status, label, store_label) = if store_ok {
        (StatusCode::OK, "ready", "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready", "unavailable")
    };

    let readiness_info = json!({
        "status": label,
        "timestamp": timestamp::format(&Utc::now()),
        "checks": {
            "store": store_label,
            "backend": state.store.backend_name(),
        }
    });

    (status, Json(readiness_info))
}

/// Prometheus exposition text
pub async fn metrics_handler(State(state): State<ServerState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => GatewayError::not_found(ENDPOINT_NOT_FOUND).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_follow_prefix() {
        let listing = capabilities("/api");
        assert_eq!(listing["message"], json!(API_RUNNING));
        assert_eq!(
            listing["endpoints"],
            json!(["/api/noticias", "/api/eventos", "/api/miembros", "/api/contacto"])
        );

        let custom = capabilities("/v1");
        assert_eq!(custom["endpoints"][0], json!("/v1/noticias"));
    }

    #[test]
    fn test_parse_object_rejects_non_objects() {
        assert!(parse_object(&Bytes::from_static(br#"{"a": 1}"#)).is_ok());

        let array = parse_object(&Bytes::from_static(b"[1, 2]")).unwrap_err();
        assert_eq!(array.status_code(), StatusCode::BAD_REQUEST);

        let malformed = parse_object(&Bytes::from_static(b"{not json")).unwrap_err();
        assert_eq!(malformed.status_code(), StatusCode::BAD_REQUEST);

        let empty = parse_object(&Bytes::new()).unwrap_err();
        assert_eq!(empty.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_target_check_order() {
        let missing_id = target(&ApiRoute::Collection { resource: "usuarios" }, ID_REQUIRED_FOR_DELETE)
            .unwrap_err();
        assert_eq!(missing_id.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(missing_id.public_message(), ID_REQUIRED_FOR_DELETE);

        let unknown = target(&ApiRoute::Item { resource: "usuarios", id: "1" }, ID_REQUIRED_FOR_DELETE)
            .unwrap_err();
        assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);

        // Store collection names are not path segments
        let collection_name = target(&ApiRoute::Item { resource: "mensajes", id: "1" }, ID_REQUIRED_FOR_DELETE)
            .unwrap_err();
        assert_eq!(collection_name.status_code(), StatusCode::NOT_FOUND);

        let (resource, id) =
            target(&ApiRoute::Item { resource: "contacto", id: "m1" }, ID_REQUIRED_FOR_DELETE).unwrap();
        assert_eq!(resource, Resource::Contact);
        assert_eq!(id, "m1");
    }

    fn object(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_dates_are_normalized_to_utc() {
        let mut changes = object(json!({"fecha": "2024-12-01T00:00:00+05:00", "titulo": "x"}));
        normalize_dates(Resource::Events, &mut changes).unwrap();
        assert_eq!(changes["fecha"], json!("2024-11-30T19:00:00.000Z"));
        assert_eq!(changes["titulo"], json!("x"));

        let mut member = object(json!({"fechaIngreso": "2023-05-02"}));
        normalize_dates(Resource::Members, &mut member).unwrap();
        assert_eq!(member["fechaIngreso"], json!("2023-05-02T00:00:00.000Z"));
    }

    #[test]
    fn test_invalid_dates_are_rejected() {
        for bad in [json!("mañana"), json!(20241201), json!(null)] {
            let mut changes = object(json!({ "fecha": bad }));
            let err = normalize_dates(Resource::News, &mut changes).unwrap_err();
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_operator_and_path_keys_are_rejected() {
        assert!(check_field_names(&object(json!({"titulo": "ok"}))).is_ok());
        for key in ["$set", "autor.nombre", ""] {
            let mut changes = Document::new();
            changes.insert(key.to_string(), json!(1));
            let err = check_field_names(&changes).unwrap_err();
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_decode_rejects_wrong_types() {
        let fields = object(json!({"capacidad": "muchos"}));
        let err = decode::<EventPayload>(fields).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
