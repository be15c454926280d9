//! # Content Client
//!
//! HTTP client used by the site front end to hydrate its sections and submit the contact form.
//!
//! Each collection read yields a [`Fetched`] value: `Loaded` with the decoded records or `Failed`
//! with the reason. A failed read never aborts the other two, and callers that only want
//! something to render can use [`Fetched::items`], which is empty on failure.
//!
//! ```rust,ignore
//! let client = ContentClient::new("http://localhost:3000")?;
//! let content = client.load().await;
//! for item in content.news.items() {
//!     println!("{}", item.title);
//! }
//! ```

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::core::error::{GatewayError, GatewayResult};
use crate::core::types::{ContactPayload, Event, Member, Naming, NewsItem, Resource};

/// Confirmation shown after a successful contact submission
pub const CONTACT_CONFIRMATION: &str = "Mensaje enviado exitosamente";

/// Message shown when the contact submission did not go through
pub const CONTACT_FAILURE: &str = "Error al enviar el mensaje";

const DEFAULT_API_PREFIX: &str = "/api";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of reading one collection
#[derive(Debug, Clone)]
pub enum Fetched<T> {
    Loaded(Vec<T>),
    Failed(GatewayError),
}

impl<T> Fetched<T> {
    /// Records to render; empty when the read failed
    pub fn items(&self) -> &[T] {
        match self {
            Fetched::Loaded(items) => items,
            Fetched::Failed(_) => &[],
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Fetched::Loaded(_))
    }

    pub fn error(&self) -> Option<&GatewayError> {
        match self {
            Fetched::Failed(error) => Some(error),
            Fetched::Loaded(_) => None,
        }
    }
}

/// Everything the site shows from the API
#[derive(Debug, Clone)]
pub struct SiteContent {
    pub news: Fetched<NewsItem>,
    pub events: Fetched<Event>,
    pub members: Fetched<Member>,
}

impl SiteContent {
    /// Whether every collection loaded
    pub fn is_complete(&self) -> bool {
        self.news.is_loaded() && self.events.is_loaded() && self.members.is_loaded()
    }
}

/// Outcome of a contact form submission, with the text shown to the visitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactOutcome {
    Sent { message: String },
    Failed { message: String },
}

impl ContactOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, ContactOutcome::Sent { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            ContactOutcome::Sent { message } | ContactOutcome::Failed { message } => message,
        }
    }
}

/// Client for the site's resource API
#[derive(Debug, Clone)]
pub struct ContentClient {
    http: reqwest::Client,
    base_url: Url,
    api_prefix: String,
}

impl ContentClient {
    /// Client for the gateway at `base_url` (scheme, host and port)
    pub fn new(base_url: &str) -> GatewayResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> GatewayResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| GatewayError::config(format!("Invalid base URL {}: {}", base_url, e)))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("aipma-site-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
        })
    }

    /// Use a gateway mounted under a different prefix
    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    fn endpoint(&self, resource: Resource) -> GatewayResult<Url> {
        let path = format!(
            "{}/{}",
            self.api_prefix.trim_end_matches('/'),
            resource.segment(Naming::Spanish)
        );
        self.base_url
            .join(&path)
            .map_err(|e| GatewayError::config(format!("Invalid endpoint {}: {}", path, e)))
    }

    /// Read the three public collections concurrently
    ///
    /// Waits for all three to settle; failures are logged and reported per collection.
    pub async fn load(&self) -> SiteContent {
        let (news, events, members) = tokio::join!(
            self.fetch::<NewsItem>(Resource::News),
            self.fetch::<Event>(Resource::Events),
            self.fetch::<Member>(Resource::Members),
        );
        SiteContent { news, events, members }
    }

    /// Read one collection
    pub async fn fetch<T: DeserializeOwned>(&self, resource: Resource) -> Fetched<T> {
        match self.try_fetch(resource).await {
            Ok(items) => {
                debug!(resource = %resource, count = items.len(), "Loaded collection");
                Fetched::Loaded(items)
            }
            Err(error) => {
                warn!(resource = %resource, error = %error, "Failed to load collection");
                Fetched::Failed(error)
            }
        }
    }

    async fn try_fetch<T: DeserializeOwned>(&self, resource: Resource) -> GatewayResult<Vec<T>> {
        let url = self.endpoint(resource)?;
        let response = self.http.get(url.clone()).send().await?;
        if response.status() != StatusCode::OK {
            return Err(GatewayError::UnexpectedStatus {
                status: response.status().as_u16(),
                path: url.path().to_string(),
            });
        }

        let mut body: Value = response.json().await?;
        let key = resource.segment(Naming::Spanish);
        let raw = match body.get_mut(key).map(Value::take) {
            Some(Value::Array(raw)) => raw,
            _ => {
                return Err(GatewayError::internal(format!(
                    "response from {} has no '{}' array",
                    url.path(),
                    key
                )))
            }
        };

        // A record the client cannot read is dropped rather than failing the whole section
        let total = raw.len();
        let items: Vec<T> = raw
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect();
        if items.len() < total {
            warn!(resource = %resource, skipped = total - items.len(), "Skipped undecodable records");
        }
        Ok(items)
    }

    /// Submit the contact form once; no retry
    pub async fn submit_contact(&self, form: &ContactPayload) -> ContactOutcome {
        match self.try_submit_contact(form).await {
            Ok(()) => ContactOutcome::Sent {
                message: CONTACT_CONFIRMATION.to_string(),
            },
            Err(error) => {
                warn!(error = %error, "Contact submission failed");
                ContactOutcome::Failed {
                    message: CONTACT_FAILURE.to_string(),
                }
            }
        }
    }

    async fn try_submit_contact(&self, form: &ContactPayload) -> GatewayResult<()> {
        let url = self.endpoint(Resource::Contact)?;
        let response = self.http.post(url.clone()).json(form).send().await?;
        if !response.status().is_success() {
            return Err(GatewayError::UnexpectedStatus {
                status: response.status().as_u16(),
                path: url.path().to_string(),
            });
        }

        let body: Value = response.json().await?;
        if body.get("success").and_then(Value::as_bool) == Some(true) {
            Ok(())
        } else {
            Err(GatewayError::internal("contact endpoint did not confirm the submission"))
        }
    }
}
