//! # Error Handling Module
//!
//! This module provides error handling for the AIPMA gateway using the `thiserror` crate.
//! It defines every error that can surface while serving the resource API or talking to it
//! from the content client, and maps each one onto the HTTP status returned to callers.
//!
//! ## Error Taxonomy
//!
//! - `RequestValidation` / `Json`: the request itself is unusable (missing path id, malformed body) → 400
//! - `NotFound`: unknown resource segment or absent target document → 404
//! - `Store`: any document-store failure → 500 with an opaque body
//!
//! Server-side failures never leak their details to the client. The original message is
//! logged with `tracing::error!` and the response only carries a generic text.
//!
//! ## Rust Error Handling Concepts
//!
//! Rust uses `Result<T, E>` instead of exceptions; the `?` operator propagates errors and the
//! `From` impls below let `?` convert library errors into `GatewayError` automatically:
//! ```rust,ignore
//! async fn list(store: &dyn DocumentStore) -> GatewayResult<Vec<Document>> {
//!     let docs = store.find_all(Resource::News.collection(), Resource::News.sort()).await?;
//!     Ok(docs)
//! }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Main result type used throughout the gateway
///
/// Instead of writing `Result<T, GatewayError>` everywhere, we can use `GatewayResult<T>`.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Message returned to clients for every 5xx response
pub const OPAQUE_SERVER_ERROR: &str = "Error interno del servidor";

/// Error types for the AIPMA gateway and content client
///
/// The `#[error("...")]` attribute from `thiserror` implements `Display` with the given text.
#[derive(Debug, Error, Clone)]
pub enum GatewayError {
    /// Configuration-related errors (invalid config, unreadable files, etc.)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Request validation errors (missing path id, body that is not a JSON object, etc.)
    #[error("Request validation failed: {field} - {reason}")]
    RequestValidation { field: String, reason: String },

    /// Unknown resource segment or missing target document
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// The API path exists but does not accept this verb
    #[error("Method not allowed: {method}")]
    MethodNotAllowed { method: String },

    /// Document-store failures (connection, query, write)
    #[error("Store error ({operation}): {message}")]
    Store { operation: String, message: String },

    /// Internal server errors for unexpected failures
    #[error("Internal server error: {message}")]
    Internal { message: String },

    /// I/O errors (file operations, socket binding, etc.)
    #[error("I/O error: {message}")]
    Io { message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json { message: String },

    /// YAML parsing errors for configuration files
    #[error("YAML error: {message}")]
    Yaml { message: String },

    /// HTTP client errors raised by the content client
    #[error("HTTP client error: {message}")]
    HttpClient { message: String },

    /// The gateway answered the content client with a non-success status
    #[error("Unexpected response status {status} from {path}")]
    UnexpectedStatus { status: u16, path: String },
}

impl GatewayError {
    /// Create a configuration error with a custom message
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a validation error for a named request field
    pub fn validation<F: Into<String>, R: Into<String>>(field: F, reason: R) -> Self {
        Self::RequestValidation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a not found error with a custom message
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a store error tagged with the failing operation
    pub fn store<O: Into<String>, S: Into<String>>(operation: O, message: S) -> Self {
        Self::Store {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create an internal error with a custom message
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RequestValidation { .. } => StatusCode::BAD_REQUEST,
            Self::Json { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Yaml { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::HttpClient { .. } => StatusCode::BAD_GATEWAY,
            Self::UnexpectedStatus { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Get a string representation of the error type for logs
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration_error",
            Self::RequestValidation { .. } => "request_validation_error",
            Self::NotFound { .. } => "not_found",
            Self::MethodNotAllowed { .. } => "method_not_allowed",
            Self::Store { .. } => "store_error",
            Self::Internal { .. } => "internal_error",
            Self::Io { .. } => "io_error",
            Self::Json { .. } => "json_error",
            Self::Yaml { .. } => "yaml_error",
            Self::HttpClient { .. } => "http_client_error",
            Self::UnexpectedStatus { .. } => "unexpected_status",
        }
    }

    /// Text placed in the `error` field of the response body
    ///
    /// Client errors describe what was wrong with the request. Server errors
    /// collapse to one opaque message.
    pub fn public_message(&self) -> String {
        match self {
            Self::RequestValidation { reason, .. } => reason.clone(),
            Self::NotFound { message } => message.clone(),
            Self::Json { .. } => "Cuerpo JSON inválido".to_string(),
            Self::MethodNotAllowed { .. } => "Método no permitido".to_string(),
            _ => OPAQUE_SERVER_ERROR.to_string(),
        }
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for GatewayError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpClient {
            message: err.to_string(),
        }
    }
}

/// Implement `IntoResponse` so handlers can return `GatewayResult<Response>` directly
///
/// Server errors are logged here with their full detail, the one place where the
/// original message is still available.
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(
                error = %self,
                error_type = self.error_type(),
                "Request failed with server error"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_type = self.error_type(),
                "Request rejected"
            );
        }

        let body = json!({ "error": self.public_message() });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            GatewayError::validation("id", "ID requerido").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::not_found("Elemento no encontrado").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayError::store("insert_one", "connection reset").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_errors_are_opaque() {
        let err = GatewayError::store("find", "auth failed for user admin:secret");
        assert_eq!(err.public_message(), OPAQUE_SERVER_ERROR);
        assert!(!err.public_message().contains("secret"));
    }

    #[test]
    fn test_client_errors_keep_their_message() {
        let err = GatewayError::validation("id", "ID requerido para eliminación");
        assert_eq!(err.public_message(), "ID requerido para eliminación");

        let err = GatewayError::not_found("Endpoint no encontrado");
        assert_eq!(err.public_message(), "Endpoint no encontrado");
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: GatewayError = parse_err.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_type(), "json_error");
    }
}
