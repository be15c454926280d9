//! # Router Module
//!
//! This module resolves request paths under the API prefix using a radix tree. The API has
//! exactly three path shapes:
//!
//! - `/` (the prefix itself): the capability listing
//! - `/:resource`: a collection (`/api/noticias`)
//! - `/:resource/:id`: one document (`/api/noticias/3f2c...`)
//!
//! Anything deeper or outside the prefix does not match. Resolving the `resource` segment into
//! one of the four known resources is a separate step (`core::types::Resource::from_segment`), so
//! the router never decides which collection a request touches.
//!
//! ## Rust Concepts Used
//!
//! - `matchit` crate provides the radix tree implementation
//! - Borrowed `&str` results tie a resolved route to the request path that produced it

use crate::core::error::{GatewayError, GatewayResult};
use matchit::{Match, Router as RadixRouter};

/// Shape of an API path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Root,
    Collection,
    Item,
}

/// A path resolved against the API routes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRoute<'a> {
    /// The prefix itself
    Root,
    /// `/{resource}`
    Collection { resource: &'a str },
    /// `/{resource}/{id}`
    Item { resource: &'a str, id: &'a str },
    /// Under the prefix, but no known shape
    Unmatched,
}

impl<'a> ApiRoute<'a> {
    /// The resource segment, when the path names one
    pub fn resource(&self) -> Option<&'a str> {
        match self {
            ApiRoute::Collection { resource } | ApiRoute::Item { resource, .. } => Some(resource),
            _ => None,
        }
    }
}

/// Radix-tree router over the API path shapes
pub struct ApiRouter {
    prefix: String,
    routes: RadixRouter<RouteKind>,
}

impl ApiRouter {
    /// Create a router for paths under `prefix` (for example `/api`)
    pub fn new(prefix: impl Into<String>) -> GatewayResult<Self> {
        let mut routes = RadixRouter::new();
        for (pattern, kind) in [
            ("/", RouteKind::Root),
            ("/:resource", RouteKind::Collection),
            ("/:resource/:id", RouteKind::Item),
        ] {
            routes
                .insert(pattern, kind)
                .map_err(|e| GatewayError::config(format!("Failed to add route {}: {}", pattern, e)))?;
        }

        Ok(Self {
            prefix: prefix.into(),
            routes,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Path relative to the prefix, or `None` when the path is outside it
    pub fn strip_prefix<'p>(&self, path: &'p str) -> Option<&'p str> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() {
            Some("/")
        } else if rest.starts_with('/') {
            Some(rest)
        } else {
            // `/apifoo` shares the characters but not the segment
            None
        }
    }

    /// Resolve a full request path
    ///
    /// Returns `None` for paths outside the prefix. Trailing slashes are ignored, so
    /// `/api/noticias/` and `/api/noticias//` resolve like `/api/noticias`: an empty id
    /// segment is the same as no id.
    pub fn resolve<'p>(&self, path: &'p str) -> Option<ApiRoute<'p>> {
        let relative = self.strip_prefix(path)?;
        let trimmed = match relative.trim_end_matches('/') {
            "" => "/",
            rest => rest,
        };

        let route = match self.routes.at(trimmed) {
            Ok(Match { value, params }) => match value {
                RouteKind::Root => ApiRoute::Root,
                RouteKind::Collection => match params.get("resource") {
                    Some(resource) => ApiRoute::Collection { resource },
                    None => ApiRoute::Unmatched,
                },
                RouteKind::Item => match (params.get("resource"), params.get("id")) {
                    (Some(resource), Some(id)) => ApiRoute::Item { resource, id },
                    _ => ApiRoute::Unmatched,
                },
            },
            Err(_) => ApiRoute::Unmatched,
        };
        Some(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> ApiRouter {
        ApiRouter::new("/api").unwrap()
    }

    #[test]
    fn test_root_resolution() {
        let router = router();
        assert_eq!(router.resolve("/api"), Some(ApiRoute::Root));
        assert_eq!(router.resolve("/api/"), Some(ApiRoute::Root));
    }

    #[test]
    fn test_collection_resolution() {
        let router = router();
        let route = router.resolve("/api/noticias").unwrap();
        assert_eq!(route, ApiRoute::Collection { resource: "noticias" });
        assert_eq!(route.resource(), Some("noticias"));

        assert_eq!(
            router.resolve("/api/events/"),
            Some(ApiRoute::Collection { resource: "events" })
        );
    }

    #[test]
    fn test_item_resolution() {
        let router = router();
        let route = router.resolve("/api/miembros/abc-123").unwrap();
        assert_eq!(route, ApiRoute::Item { resource: "miembros", id: "abc-123" });
        assert_eq!(route.resource(), Some("miembros"));
    }

    #[test]
    fn test_empty_id_segment_is_no_id() {
        let router = router();
        assert_eq!(
            router.resolve("/api/noticias//"),
            Some(ApiRoute::Collection { resource: "noticias" })
        );
        assert_eq!(router.resolve("/api//"), Some(ApiRoute::Root));
    }

    #[test]
    fn test_deep_paths_are_unmatched() {
        let router = router();
        assert_eq!(router.resolve("/api/noticias/1/extra"), Some(ApiRoute::Unmatched));
    }

    #[test]
    fn test_paths_outside_prefix() {
        let router = router();
        assert_eq!(router.resolve("/health"), None);
        assert_eq!(router.resolve("/apifoo"), None);
        assert_eq!(router.resolve("/"), None);
    }

    #[test]
    fn test_custom_prefix() {
        let router = ApiRouter::new("/v1/site").unwrap();
        assert_eq!(router.prefix(), "/v1/site");
        assert_eq!(
            router.resolve("/v1/site/eventos"),
            Some(ApiRoute::Collection { resource: "eventos" })
        );
        assert_eq!(router.resolve("/api/eventos"), None);
    }
}
