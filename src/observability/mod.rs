// Structured logging and correlation ids
pub mod logging;

// Prometheus metrics
pub mod metrics;

pub use logging::{init_logging, CorrelationId, CORRELATION_ID_HEADER};
pub use metrics::install_recorder;
