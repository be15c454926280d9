//! # Content Client Integration Tests
//!
//! Failure paths run against `wiremock`; the happy path runs against a real gateway bound to an
//! ephemeral port.

use aipma_gateway::client::{LoadState, Section, CONTACT_CONFIRMATION, CONTACT_FAILURE};
use aipma_gateway::core::types::ContactPayload;
use aipma_gateway::storage::{DocumentStore, MemoryStore};
use aipma_gateway::{ContentClient, GatewayConfig, GatewayError, GatewayServer, Resource, ViewState};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Start a gateway on 127.0.0.1:0; returns its base URL and the shutdown trigger
async fn spawn_gateway(store: Arc<MemoryStore>) -> (String, oneshot::Sender<()>, tokio::task::JoinHandle<()>) {
    let mut config = GatewayConfig::default();
    config.server.bind_address = "127.0.0.1".to_string();
    let server = GatewayServer::new(&config, store).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        server
            .serve(listener, async {
                let _ = rx.await;
            })
            .await
            .unwrap();
    });

    (format!("http://{}", addr), tx, handle)
}

#[tokio::test]
async fn test_load_against_live_gateway() {
    let store = Arc::new(MemoryStore::new());
    let (base_url, shutdown, handle) = spawn_gateway(store.clone()).await;

    let client = ContentClient::new(&base_url).unwrap();
    let mut view = ViewState::new();
    assert_eq!(view.load_state(), LoadState::Loading);

    view.hydrate(&client).await;
    assert_eq!(view.load_state(), LoadState::Ready);
    assert!(view.content().unwrap().is_complete());
    assert_eq!(view.news().len(), 3);
    assert_eq!(view.events().len(), 3);
    assert_eq!(view.members().len(), 4);

    // Server order is preserved
    assert_eq!(view.events()[0].location, "Online");
    assert_eq!(view.members()[0].name, "Sarah Johnson");

    shutdown.send(()).unwrap();
    handle.await.unwrap();
    assert!(!store.health_check().await.unwrap());
}

#[tokio::test]
async fn test_contact_round_trip_against_live_gateway() {
    let store = Arc::new(MemoryStore::new());
    let (base_url, shutdown, handle) = spawn_gateway(store.clone()).await;

    let client = ContentClient::new(&base_url).unwrap();
    let mut view = ViewState::new();
    view.select(Section::Contacto);

    let form = ContactPayload::new("Lucía", "lucia@example.org", "Quisiera unirme a la alianza");
    let outcome = view.submit_contact(&client, &form).await;
    assert!(outcome.is_sent());
    assert_eq!(outcome.message(), CONTACT_CONFIRMATION);

    let stored = store
        .find_all(Resource::Contact.collection(), Resource::Contact.sort())
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["email"], json!("lucia@example.org"));
    assert_eq!(stored[0]["leido"], json!(false));

    shutdown.send(()).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_one_failed_collection_leaves_the_others() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/noticias"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "noticias": [{
                "id": "n1",
                "titulo": "Primera",
                "fecha": "2024-01-15T00:00:00.000Z",
                "fechaCreacion": "2024-01-15T00:00:00.000Z"
            }]
        })))
        .mount(&mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/eventos"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "Error interno del servidor" })))
        .mount(&mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/miembros"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "miembros": [] })))
        .mount(&mock)
        .await;

    let client = ContentClient::new(&mock.uri()).unwrap();
    let content = client.load().await;

    assert_eq!(content.news.items().len(), 1);
    assert_eq!(content.news.items()[0].title, "Primera");
    assert!(matches!(
        content.events.error(),
        Some(GatewayError::UnexpectedStatus { status: 500, .. })
    ));
    assert!(content.events.items().is_empty());
    assert!(content.members.is_loaded());
    assert!(!content.is_complete());
}

#[tokio::test]
async fn test_missing_collection_key_is_a_failure() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/noticias"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "API de AIPMA funcionando correctamente",
            "endpoints": []
        })))
        .mount(&mock)
        .await;

    let client = ContentClient::new(&mock.uri()).unwrap();
    let news = client.fetch::<aipma_gateway::core::types::NewsItem>(Resource::News).await;
    assert!(!news.is_loaded());
}

#[tokio::test]
async fn test_undecodable_records_are_skipped() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/miembros"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "miembros": [
                {
                    "id": "m1",
                    "nombre": "Elena",
                    "fechaIngreso": "2022-01-15T00:00:00.000Z",
                    "fechaCreacion": "2024-01-01T00:00:00.000Z"
                },
                { "id": "m2", "nombre": "Sin fechas" }
            ]
        })))
        .mount(&mock)
        .await;

    let client = ContentClient::new(&mock.uri()).unwrap();
    let members = client.fetch::<aipma_gateway::core::types::Member>(Resource::Members).await;
    assert!(members.is_loaded());
    assert_eq!(members.items().len(), 1);
    assert_eq!(members.items()[0].name, "Elena");
}

#[tokio::test]
async fn test_unreachable_gateway_fails_every_section() {
    // Bind then drop to get a port nothing listens on
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client =
        ContentClient::with_timeout(&format!("http://127.0.0.1:{}", port), Duration::from_secs(2)).unwrap();

    let mut view = ViewState::new();
    view.hydrate(&client).await;

    assert_eq!(view.load_state(), LoadState::Ready);
    let content = view.content().unwrap();
    assert!(content.news.error().is_some());
    assert!(content.events.error().is_some());
    assert!(content.members.error().is_some());
    assert!(view.news().is_empty());
}

#[tokio::test]
async fn test_contact_failure_paths() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/contacto"))
        .and(body_partial_json(json!({ "nombre": "Falla" })))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "Error interno del servidor" })))
        .mount(&mock)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/contacto"))
        .and(body_partial_json(json!({ "nombre": "Silencio" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
        .mount(&mock)
        .await;

    let client = ContentClient::new(&mock.uri()).unwrap();

    let server_error = client
        .submit_contact(&ContactPayload::new("Falla", "f@x.com", "hola"))
        .await;
    assert!(!server_error.is_sent());
    assert_eq!(server_error.message(), CONTACT_FAILURE);

    let unconfirmed = client
        .submit_contact(&ContactPayload::new("Silencio", "s@x.com", "hola"))
        .await;
    assert_eq!(unconfirmed.message(), "Error al enviar el mensaje");
}

#[tokio::test]
async fn test_contact_is_sent_once() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/contacto"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock)
        .await;

    let client = ContentClient::new(&mock.uri()).unwrap();
    let mut view = ViewState::new();
    let outcome = view
        .submit_contact(&client, &ContactPayload::new("A", "a@b.com", "hola"))
        .await;
    assert!(!outcome.is_sent());
    assert!(view.contact_notice().is_some());

    view.dismiss_contact_notice();
    assert!(view.contact_notice().is_none());
}

#[test]
fn test_navigation_survives_hydration() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client =
        ContentClient::with_timeout(&format!("http://127.0.0.1:{}", port), Duration::from_secs(2)).unwrap();

    let mut view = ViewState::new();
    for section in Section::ALL {
        view.select(section);
        assert_eq!(view.section(), section);
        assert_eq!(view.load_state(), LoadState::Loading);
    }

    view.select(Section::Eventos);
    tokio_test::block_on(view.hydrate(&client));
    assert_eq!(view.section(), Section::Eventos);
    assert_eq!(view.load_state(), LoadState::Ready);
    assert!(view.events().is_empty());
}
