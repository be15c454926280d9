//! # Content Client Module
//!
//! The front-end side of the site: [`content`] talks to the resource API, [`view`] holds what
//! the page renders.

pub mod content;
pub mod view;

pub use content::{ContactOutcome, ContentClient, Fetched, SiteContent, CONTACT_CONFIRMATION, CONTACT_FAILURE};
pub use view::{LoadState, Section, ViewState};
