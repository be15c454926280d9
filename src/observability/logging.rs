//! # Structured Logging
//!
//! This module installs the global `tracing` subscriber and defines the correlation id carried
//! by every request.
//!
//! ## Key Features
//! - JSON or human-readable output, chosen in configuration
//! - Level from configuration, refined by `RUST_LOG` directives
//! - Correlation ids taken from the `x-correlation-id` header or generated per request

use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};
use uuid::Uuid;

use crate::core::config::{LogFormat, LoggingConfig};
use crate::core::error::{GatewayError, GatewayResult};

/// Header carrying the correlation id in both directions
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Longest caller-supplied correlation id that is accepted as is
const MAX_CORRELATION_ID_LEN: usize = 128;

/// Correlation ID for tracking a request through logs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Generate a new correlation ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Reuse a caller-supplied id when it is printable and of sane length
    pub fn from_header(value: Option<&str>) -> Self {
        match value {
            Some(value)
                if !value.is_empty()
                    && value.len() <= MAX_CORRELATION_ID_LEN
                    && value.chars().all(|c| c.is_ascii_graphic()) =>
            {
                Self(value.to_string())
            }
            _ => Self::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn parse_level(level: &str) -> GatewayResult<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(GatewayError::config(format!("Invalid log level: {}", other))),
    }
}

/// Install the global subscriber
///
/// A second call (tests, embedding applications) keeps the first subscriber.
pub fn init_logging(config: &LoggingConfig) -> GatewayResult<()> {
    let level = parse_level(&config.level)?;
    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    let result = match config.format {
        LogFormat::Json => Registry::default()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init(),
        LogFormat::Text => Registry::default()
            .with(env_filter)
            .with(fmt::layer().with_target(true))
            .try_init(),
    };

    if result.is_err() {
        warn!("Tracing subscriber already initialized, skipping initialization");
        return Ok(());
    }

    info!(level = %level, format = ?config.format, "Structured logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_id_generation() {
        let a = CorrelationId::new();
        let b = CorrelationId::new();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_correlation_id_from_header() {
        assert_eq!(CorrelationId::from_header(Some("req-42")).as_str(), "req-42");

        let generated = CorrelationId::from_header(Some("has space"));
        assert_ne!(generated.as_str(), "has space");

        let too_long = "x".repeat(MAX_CORRELATION_ID_LEN + 1);
        assert_ne!(CorrelationId::from_header(Some(&too_long)).as_str(), too_long);

        assert!(!CorrelationId::from_header(None).as_str().is_empty());
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG").unwrap(), Level::DEBUG);
        assert!(parse_level("verbose").is_err());
    }

    #[test]
    fn test_init_logging_twice_is_harmless() {
        let config = LoggingConfig::default();
        assert!(init_logging(&config).is_ok());
        assert!(init_logging(&config).is_ok());
    }
}
