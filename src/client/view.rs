//! Client-side view state: the selected section and the load state of the content.
//!
//! The two dimensions are independent. A visitor can switch sections while the content is
//! still loading; switching never triggers a refetch.

use std::fmt;

use super::content::{ContactOutcome, ContentClient, SiteContent};
use crate::core::types::{ContactPayload, Event, Member, NewsItem};

/// Navigable sections of the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Section {
    #[default]
    Inicio,
    Nosotros,
    Noticias,
    Eventos,
    Miembros,
    Contacto,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Inicio,
        Section::Nosotros,
        Section::Noticias,
        Section::Eventos,
        Section::Miembros,
        Section::Contacto,
    ];

    /// Anchor id used in the navigation bar
    pub fn id(&self) -> &'static str {
        match self {
            Section::Inicio => "inicio",
            Section::Nosotros => "nosotros",
            Section::Noticias => "noticias",
            Section::Eventos => "eventos",
            Section::Miembros => "miembros",
            Section::Contacto => "contacto",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
}

/// Everything the page renders from
#[derive(Debug, Clone)]
pub struct ViewState {
    section: Section,
    content: Option<SiteContent>,
    contact_notice: Option<ContactOutcome>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            section: Section::default(),
            content: None,
            contact_notice: None,
        }
    }

    pub fn load_state(&self) -> LoadState {
        if self.content.is_some() {
            LoadState::Ready
        } else {
            LoadState::Loading
        }
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn select(&mut self, section: Section) {
        self.section = section;
    }

    /// Leave the loading state with whatever the three reads produced
    pub fn apply(&mut self, content: SiteContent) {
        self.content = Some(content);
    }

    /// Fetch the content and leave the loading state
    pub async fn hydrate(&mut self, client: &ContentClient) {
        let content = client.load().await;
        self.apply(content);
    }

    pub fn content(&self) -> Option<&SiteContent> {
        self.content.as_ref()
    }

    pub fn news(&self) -> &[NewsItem] {
        self.content.as_ref().map(|c| c.news.items()).unwrap_or(&[])
    }

    pub fn events(&self) -> &[Event] {
        self.content.as_ref().map(|c| c.events.items()).unwrap_or(&[])
    }

    pub fn members(&self) -> &[Member] {
        self.content.as_ref().map(|c| c.members.items()).unwrap_or(&[])
    }

    /// Submit the contact form and keep the outcome to show the visitor
    pub async fn submit_contact(&mut self, client: &ContentClient, form: &ContactPayload) -> &ContactOutcome {
        let outcome = client.submit_contact(form).await;
        self.contact_notice.insert(outcome)
    }

    pub fn contact_notice(&self) -> Option<&ContactOutcome> {
        self.contact_notice.as_ref()
    }

    pub fn dismiss_contact_notice(&mut self) {
        self.contact_notice = None;
    }
}
