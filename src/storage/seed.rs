//! # Demonstration Data
//!
//! Fills empty site collections with a fixed demonstration set: three news items, three events
//! and four members. The check-then-insert runs while holding a single-writer lock, and a
//! process-wide latch short-circuits every call after the first complete pass, so concurrent
//! cold-start requests insert each set at most once.
//!
//! A collection that already holds at least one document is never touched.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::DocumentStore;
use crate::core::error::{GatewayError, GatewayResult};
use crate::core::types::{date, new_record_id, Document, Event, Member, NewsItem, Resource};

/// Seeds empty collections once per process
#[derive(Debug)]
pub struct Seeder {
    enabled: bool,
    seeded: AtomicBool,
    lock: Mutex<()>,
}

impl Seeder {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            seeded: AtomicBool::new(false),
            lock: Mutex::new(()),
        }
    }

    /// Whether a complete seeding pass has already run
    pub fn is_seeded(&self) -> bool {
        self.seeded.load(Ordering::Acquire)
    }

    /// Insert the demonstration set into every empty listable collection
    ///
    /// Returns the number of documents inserted by this call. The latch is only set after
    /// every collection was checked successfully, so a failed pass is retried by the next
    /// caller.
    pub async fn ensure_seeded(&self, store: &dyn DocumentStore) -> GatewayResult<usize> {
        if !self.enabled || self.is_seeded() {
            return Ok(0);
        }

        let _guard = self.lock.lock().await;
        if self.is_seeded() {
            return Ok(0);
        }

        let now = Utc::now();
        let mut inserted = 0;
        for resource in Resource::LISTABLE {
            let collection = resource.collection();
            let existing = store.count(collection).await?;
            if existing > 0 {
                debug!(collection, existing, "Collection already populated, skipping seed");
                continue;
            }

            let documents = demo_documents(resource, now)?;
            let count = documents.len();
            store.insert_many(collection, documents).await?;
            info!(collection, count, "Inserted demonstration documents");
            inserted += count;
        }

        self.seeded.store(true, Ordering::Release);
        Ok(inserted)
    }
}

fn to_document<T: Serialize>(record: &T) -> GatewayResult<Document> {
    match serde_json::to_value(record) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(_) => Err(GatewayError::internal("demonstration record is not an object")),
        Err(e) => Err(GatewayError::internal(format!("failed to encode demonstration record: {}", e))),
    }
}

/// Demonstration documents for one collection, stamped with `now` as creation time
pub fn demo_documents(resource: Resource, now: DateTime<Utc>) -> GatewayResult<Vec<Document>> {
    match resource {
        Resource::News => demo_news(now).iter().map(to_document).collect(),
        Resource::Events => demo_events(now).iter().map(to_document).collect(),
        Resource::Members => demo_members(now).iter().map(to_document).collect(),
        Resource::Contact => Ok(Vec::new()),
    }
}

fn news(
    title: &str,
    summary: &str,
    body: &str,
    category: &str,
    author: &str,
    publish_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> NewsItem {
    NewsItem {
        id: new_record_id(),
        title: title.to_string(),
        summary: summary.to_string(),
        body: body.to_string(),
        category: category.to_string(),
        author: author.to_string(),
        publish_date,
        created_at: now,
        updated_at: None,
    }
}

fn demo_news(now: DateTime<Utc>) -> Vec<NewsItem> {
    vec![
        news(
            "Nueva Iniciativa Global para la Ética Periodística",
            "AIPMA lanza un programa internacional para fortalecer los estándares éticos en el periodismo mundial.",
            "La Alianza Internacional de Periodismo y Medios Audiovisuales ha anunciado el lanzamiento de una nueva iniciativa global destinada a fortalecer los estándares éticos en el periodismo. Este programa incluirá talleres, certificaciones y recursos para periodistas de todo el mundo, con especial énfasis en la era digital y las nuevas tecnologías de comunicación.",
            "Ética",
            "María González",
            date(2024, 1, 15),
            now,
        ),
        news(
            "Conferencia Internacional sobre Medios Audiovisuales 2024",
            "Se anuncia la fecha y ubicación de la conferencia anual más importante de medios audiovisuales.",
            "La conferencia internacional de medios audiovisuales 2024 se llevará a cabo en Barcelona, España, del 15 al 18 de marzo. Este evento reunirá a más de 500 profesionales de todo el mundo para discutir las últimas tendencias en producción audiovisual, streaming y nuevas tecnologías de media.",
            "Eventos",
            "Carlos Rodríguez",
            date(2024, 1, 10),
            now,
        ),
        news(
            "Impacto de la Inteligencia Artificial en el Periodismo",
            "Análisis profundo sobre cómo la IA está transformando la profesión periodística.",
            "La inteligencia artificial está revolucionando el campo del periodismo, desde la automatización de noticias hasta la verificación de hechos. Este análisis examina tanto las oportunidades como los desafíos que presenta la IA para los profesionales de medios, incluyendo consideraciones éticas y el futuro del trabajo periodístico.",
            "Tecnología",
            "Ana Martínez",
            date(2024, 1, 5),
            now,
        ),
    ]
}

fn event(
    title: &str,
    description: &str,
    when: DateTime<Utc>,
    location: &str,
    kind: &str,
    capacity: u64,
    now: DateTime<Utc>,
) -> Event {
    Event {
        id: new_record_id(),
        title: title.to_string(),
        description: description.to_string(),
        date: when,
        location: location.to_string(),
        kind: kind.to_string(),
        capacity: Some(capacity),
        created_at: now,
        updated_at: None,
    }
}

fn demo_events(now: DateTime<Utc>) -> Vec<Event> {
    vec![
        event(
            "Cumbre Mundial de Periodismo Digital",
            "Un encuentro global para explorar el futuro del periodismo en la era digital, con workshops prácticos y conferencias magistrales de expertos internacionales.",
            date(2024, 3, 20),
            "Madrid, España",
            "conferencia",
            300,
            now,
        ),
        event(
            "Taller de Verificación de Hechos",
            "Seminario intensivo sobre técnicas avanzadas de fact-checking y herramientas digitales para la verificación de información en tiempo real.",
            date(2024, 2, 15),
            "Online",
            "taller",
            100,
            now,
        ),
        event(
            "Simposio de Ética en Medios Audiovisuales",
            "Debate internacional sobre los dilemas éticos en la producción y distribución de contenido audiovisual en plataformas digitales.",
            date(2024, 4, 10),
            "Buenos Aires, Argentina",
            "simposio",
            150,
            now,
        ),
    ]
}

fn member(
    name: &str,
    organization: &str,
    specialty: &str,
    country: &str,
    member_type: &str,
    join_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Member {
    Member {
        id: new_record_id(),
        name: name.to_string(),
        organization: organization.to_string(),
        specialty: specialty.to_string(),
        country: country.to_string(),
        member_type: member_type.to_string(),
        join_date,
        created_at: now,
        updated_at: None,
    }
}

fn demo_members(now: DateTime<Utc>) -> Vec<Member> {
    vec![
        member("Elena Vásquez", "El Periódico Global", "Periodismo Investigativo", "España", "periodista", date(2022, 1, 15), now),
        member("Roberto Silva", "Media Latina Network", "Producción Audiovisual", "México", "productor", date(2021, 9, 10), now),
        member("Sarah Johnson", "International Press Alliance", "Periodismo Digital", "Estados Unidos", "editor", date(2023, 3, 20), now),
        member("Jean-Pierre Martin", "European Media Collective", "Documentales", "Francia", "director", date(2022, 11, 5), now),
    ]
}
