pub mod router;

pub use router::{ApiRoute, ApiRouter, RouteKind};
