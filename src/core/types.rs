//! # Core Types Module
//!
//! This module defines the resource model served by the gateway: the closed set of
//! resources, the records stored in each collection, and the payloads accepted on create.
//!
//! ## Wire Format
//!
//! Records are persisted with the site's Spanish field names (`titulo`, `fechaCreacion`, ...).
//! Create payloads accept the same names and also the English attribute names as aliases,
//! so `{"title": "..."}` and `{"titulo": "..."}` are equivalent on input. Output is always
//! the persisted form.
//!
//! Timestamps are written as fixed-width RFC 3339 UTC strings with millisecond precision,
//! which keeps lexicographic order equal to chronological order in every store backend.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A stored document: a flat JSON object
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Field holding the application identifier in every collection
pub const ID_FIELD: &str = "id";

/// Field set once when a record is created
pub const CREATED_AT_FIELD: &str = "fechaCreacion";

/// Field stamped on every update
pub const UPDATED_AT_FIELD: &str = "fechaActualizacion";

/// Storage-internal key some backends add to documents
pub const STORE_KEY_FIELD: &str = "_id";

/// Fields a caller can never write through an update
pub const PROTECTED_FIELDS: [&str; 3] = [ID_FIELD, CREATED_AT_FIELD, STORE_KEY_FIELD];

/// Generate a fresh application identifier
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// Sort direction for collection reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Field and direction used to order a collection read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: &'static str,
    pub order: SortOrder,
}

impl SortSpec {
    pub const fn asc(field: &'static str) -> Self {
        Self { field, order: SortOrder::Ascending }
    }

    pub const fn desc(field: &'static str) -> Self {
        Self { field, order: SortOrder::Descending }
    }
}

/// Which vocabulary a request used to name a resource
///
/// The site's own segments are Spanish (`/api/noticias`); English segments
/// (`/api/news`) are accepted as aliases. Response keys echo the caller's choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Naming {
    Spanish,
    English,
}

/// The closed set of resources the gateway serves
///
/// Every path segment is resolved through this enum before any storage call, so no
/// request can reach a collection outside these four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    News,
    Events,
    Members,
    Contact,
}

impl Resource {
    pub const ALL: [Resource; 4] = [Resource::News, Resource::Events, Resource::Members, Resource::Contact];

    /// Resources exposed through GET
    pub const LISTABLE: [Resource; 3] = [Resource::News, Resource::Events, Resource::Members];

    /// Resolve a path segment, remembering which vocabulary it used
    pub fn from_segment(segment: &str) -> Option<(Resource, Naming)> {
        let resolved = match segment {
            "noticias" => (Resource::News, Naming::Spanish),
            "eventos" => (Resource::Events, Naming::Spanish),
            "miembros" => (Resource::Members, Naming::Spanish),
            "contacto" => (Resource::Contact, Naming::Spanish),
            "news" => (Resource::News, Naming::English),
            "events" => (Resource::Events, Naming::English),
            "members" => (Resource::Members, Naming::English),
            "contact" => (Resource::Contact, Naming::English),
            _ => return None,
        };
        Some(resolved)
    }

    /// Name of the backing store collection
    pub fn collection(&self) -> &'static str {
        match self {
            Resource::News => "noticias",
            Resource::Events => "eventos",
            Resource::Members => "miembros",
            Resource::Contact => "mensajes",
        }
    }

    /// Path segment for this resource in the given vocabulary
    pub fn segment(&self, naming: Naming) -> &'static str {
        match (self, naming) {
            (Resource::News, Naming::Spanish) => "noticias",
            (Resource::Events, Naming::Spanish) => "eventos",
            (Resource::Members, Naming::Spanish) => "miembros",
            (Resource::Contact, Naming::Spanish) => "contacto",
            (Resource::News, Naming::English) => "news",
            (Resource::Events, Naming::English) => "events",
            (Resource::Members, Naming::English) => "members",
            (Resource::Contact, Naming::English) => "contact",
        }
    }

    /// Key wrapping a single created record in a POST response
    pub fn singular(&self, naming: Naming) -> &'static str {
        match (self, naming) {
            (Resource::News, Naming::Spanish) => "noticia",
            (Resource::Events, Naming::Spanish) => "evento",
            (Resource::Members, Naming::Spanish) => "miembro",
            (Resource::Contact, Naming::Spanish) => "mensaje",
            (Resource::News, Naming::English) => "newsItem",
            (Resource::Events, Naming::English) => "event",
            (Resource::Members, Naming::English) => "member",
            (Resource::Contact, Naming::English) => "message",
        }
    }

    pub fn is_listable(&self) -> bool {
        !matches!(self, Resource::Contact)
    }

    /// Fields holding caller-supplied dates, stored as fixed-width timestamps
    pub fn date_fields(&self) -> &'static [&'static str] {
        match self {
            Resource::News | Resource::Events | Resource::Contact => &["fecha"],
            Resource::Members => &["fechaIngreso"],
        }
    }

    /// Read order of the collection
    pub fn sort(&self) -> SortSpec {
        match self {
            Resource::News => SortSpec::desc("fecha"),
            Resource::Events => SortSpec::asc("fecha"),
            Resource::Members => SortSpec::desc("fechaIngreso"),
            Resource::Contact => SortSpec::desc("fecha"),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment(Naming::English))
    }
}

/// Fixed-width RFC 3339 timestamps (`2024-01-15T00:00:00.000Z`)
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(value) => super::serialize(value, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            raw.map(|raw| crate::core::types::parse_date(&raw).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

/// Parse a caller-supplied date: full RFC 3339 or a bare `YYYY-MM-DD` (midnight UTC)
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid date: {raw}"))
}

/// Calendar date at midnight UTC, used by the demonstration data
pub fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

/// A news article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    #[serde(rename = "titulo", default)]
    pub title: String,
    #[serde(rename = "resumen", default)]
    pub summary: String,
    #[serde(rename = "contenido", default)]
    pub body: String,
    #[serde(rename = "categoria", default)]
    pub category: String,
    #[serde(rename = "autor", default)]
    pub author: String,
    #[serde(rename = "fecha", with = "timestamp")]
    pub publish_date: DateTime<Utc>,
    #[serde(rename = "fechaCreacion", with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(
        rename = "fechaActualizacion",
        with = "timestamp::option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A scheduled event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "titulo", default)]
    pub title: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "fecha", with = "timestamp")]
    pub date: DateTime<Utc>,
    #[serde(rename = "ubicacion", default)]
    pub location: String,
    #[serde(rename = "tipo", default)]
    pub kind: String,
    #[serde(rename = "capacidad", default)]
    pub capacity: Option<u64>,
    #[serde(rename = "fechaCreacion", with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(
        rename = "fechaActualizacion",
        with = "timestamp::option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A member of the alliance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "organizacion", default)]
    pub organization: String,
    #[serde(rename = "especialidad", default)]
    pub specialty: String,
    #[serde(rename = "pais", default)]
    pub country: String,
    #[serde(rename = "tipo", default)]
    pub member_type: String,
    #[serde(rename = "fechaIngreso", with = "timestamp")]
    pub join_date: DateTime<Utc>,
    #[serde(rename = "fechaCreacion", with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(
        rename = "fechaActualizacion",
        with = "timestamp::option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A message submitted through the contact form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: String,
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "mensaje", default)]
    pub body: String,
    #[serde(rename = "fecha", with = "timestamp")]
    pub submitted_at: DateTime<Utc>,
    #[serde(rename = "leido", default)]
    pub read: bool,
}

/// Fields accepted when creating a news item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsPayload {
    #[serde(rename = "titulo", alias = "title", default)]
    pub title: Option<String>,
    #[serde(rename = "resumen", alias = "summary", default)]
    pub summary: Option<String>,
    #[serde(rename = "contenido", alias = "body", default)]
    pub body: Option<String>,
    #[serde(rename = "categoria", alias = "category", default)]
    pub category: Option<String>,
    #[serde(rename = "autor", alias = "author", default)]
    pub author: Option<String>,
    #[serde(rename = "fecha", alias = "publishDate", with = "timestamp::option", default)]
    pub publish_date: Option<DateTime<Utc>>,
}

impl NewsPayload {
    pub fn into_record(self, now: DateTime<Utc>) -> NewsItem {
        NewsItem {
            id: new_record_id(),
            title: self.title.unwrap_or_default(),
            summary: self.summary.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            publish_date: self.publish_date.unwrap_or(now),
            created_at: now,
            updated_at: None,
        }
    }
}

/// Fields accepted when creating an event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPayload {
    #[serde(rename = "titulo", alias = "title", default)]
    pub title: Option<String>,
    #[serde(rename = "descripcion", alias = "description", default)]
    pub description: Option<String>,
    #[serde(rename = "fecha", alias = "date", with = "timestamp::option", default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(rename = "ubicacion", alias = "location", default)]
    pub location: Option<String>,
    #[serde(rename = "tipo", alias = "type", default)]
    pub kind: Option<String>,
    #[serde(rename = "capacidad", alias = "capacity", default)]
    pub capacity: Option<u64>,
}

impl EventPayload {
    pub fn into_record(self, now: DateTime<Utc>) -> Event {
        Event {
            id: new_record_id(),
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            date: self.date.unwrap_or(now),
            location: self.location.unwrap_or_default(),
            kind: self.kind.unwrap_or_default(),
            capacity: self.capacity,
            created_at: now,
            updated_at: None,
        }
    }
}

/// Fields accepted when registering a member
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberPayload {
    #[serde(rename = "nombre", alias = "name", default)]
    pub name: Option<String>,
    #[serde(rename = "organizacion", alias = "organization", default)]
    pub organization: Option<String>,
    #[serde(rename = "especialidad", alias = "specialty", default)]
    pub specialty: Option<String>,
    #[serde(rename = "pais", alias = "country", default)]
    pub country: Option<String>,
    #[serde(rename = "tipo", alias = "memberType", default)]
    pub member_type: Option<String>,
    #[serde(rename = "fechaIngreso", alias = "joinDate", with = "timestamp::option", default)]
    pub join_date: Option<DateTime<Utc>>,
}

impl MemberPayload {
    pub fn into_record(self, now: DateTime<Utc>) -> Member {
        Member {
            id: new_record_id(),
            name: self.name.unwrap_or_default(),
            organization: self.organization.unwrap_or_default(),
            specialty: self.specialty.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            member_type: self.member_type.unwrap_or_default(),
            join_date: self.join_date.unwrap_or(now),
            created_at: now,
            updated_at: None,
        }
    }
}

/// Contact form submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactPayload {
    #[serde(rename = "nombre", alias = "name", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "mensaje", alias = "message", alias = "body", default)]
    pub message: Option<String>,
}

impl ContactPayload {
    pub fn new(name: impl Into<String>, email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            message: Some(message.into()),
        }
    }

    pub fn into_record(self, now: DateTime<Utc>) -> ContactMessage {
        ContactMessage {
            id: new_record_id(),
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            body: self.message.unwrap_or_default(),
            submitted_at: now,
            read: false,
        }
    }
}
