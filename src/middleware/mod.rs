pub mod cors;
pub mod request_logging;

pub use cors::cors_layer;
pub use request_logging::track_requests;
