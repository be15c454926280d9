//! # Configuration Module
//!
//! This module handles loading and validating the gateway configuration.
//!
//! ## Key Features
//! - YAML/JSON configuration parsing with serde
//! - Environment variable override support (`MONGO_URL`, `GATEWAY_*`)
//! - Human-readable durations through `humantime-serde` (`"30s"`, `"2m"`)
//! - Validation that reports every problem at once

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::core::error::{GatewayError, GatewayResult};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/gateway.yaml";

/// Database name used by the site unless overridden
pub const DEFAULT_DATABASE: &str = "aipma_db";

/// Main gateway configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener and request handling settings
    pub server: ServerConfig,

    /// Document store backend
    pub storage: StorageConfig,

    /// Demonstration data
    pub seed: SeedConfig,

    /// Cross-origin access for the content client
    pub cors: CorsConfig,

    /// Logging and metrics
    pub observability: ObservabilityConfig,
}

impl GatewayConfig {
    /// Load configuration from a YAML file
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> GatewayResult<Self> {
        let content = tokio::fs::read_to_string(path).await
            .map_err(|e| GatewayError::config(format!("Failed to read config file: {}", e)))?;

        let mut config: GatewayConfig = serde_yaml::from_str(&content)?;

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from JSON
    pub async fn load_from_json<P: AsRef<Path>>(path: P) -> GatewayResult<Self> {
        let content = tokio::fs::read_to_string(path).await
            .map_err(|e| GatewayError::config(format!("Failed to read config file: {}", e)))?;

        let mut config: GatewayConfig = serde_json::from_str(&content)
            .map_err(|e| GatewayError::config(format!("Failed to parse JSON config: {}", e)))?;

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise start from defaults
    ///
    /// The format is picked by extension. Environment overrides apply either way,
    /// so a bare deployment only needs `MONGO_URL`.
    pub async fn load_or_default<P: AsRef<Path>>(path: P) -> GatewayResult<Self> {
        let path = path.as_ref();

        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            info!(path = %path.display(), "Loading configuration file");
            return if path.extension().and_then(|s| s.to_str()) == Some("json") {
                Self::load_from_json(path).await
            } else {
                Self::load_from_file(path).await
            };
        }

        warn!(path = %path.display(), "Configuration file not found, using defaults");
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) -> GatewayResult<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    ///
    /// Variables follow the pattern `GATEWAY_<SECTION>_<FIELD>`. `MONGO_URL` and
    /// `DB_NAME` keep the names the site has always been deployed with; setting
    /// `MONGO_URL` selects the MongoDB backend.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> GatewayResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("GATEWAY_SERVER_HTTP_PORT") {
            self.server.http_port = port.parse()
                .map_err(|e| GatewayError::config(format!("Invalid GATEWAY_SERVER_HTTP_PORT: {}", e)))?;
        }

        if let Some(addr) = lookup("GATEWAY_SERVER_BIND_ADDRESS") {
            self.server.bind_address = addr;
        }

        if let Some(timeout) = lookup("GATEWAY_SERVER_REQUEST_TIMEOUT") {
            self.server.request_timeout = humantime::parse_duration(&timeout)
                .map_err(|e| GatewayError::config(format!("Invalid GATEWAY_SERVER_REQUEST_TIMEOUT: {}", e)))?;
        }

        if let Some(backend) = lookup("GATEWAY_STORAGE_BACKEND") {
            match backend.to_lowercase().as_str() {
                "memory" => self.storage.backend = StorageBackend::Memory,
                "mongo" | "mongodb" => {
                    if !matches!(self.storage.backend, StorageBackend::Mongo { .. }) {
                        self.storage.backend = StorageBackend::Mongo {
                            url: "mongodb://localhost:27017".to_string(),
                            database: DEFAULT_DATABASE.to_string(),
                        };
                    }
                }
                other => {
                    return Err(GatewayError::config(format!(
                        "Invalid GATEWAY_STORAGE_BACKEND: {}",
                        other
                    )))
                }
            }
        }

        if let Some(mongo_url) = lookup("MONGO_URL") {
            let database = match &self.storage.backend {
                StorageBackend::Mongo { database, .. } => database.clone(),
                StorageBackend::Memory => DEFAULT_DATABASE.to_string(),
            };
            self.storage.backend = StorageBackend::Mongo { url: mongo_url, database };
        }

        if let Some(name) = lookup("DB_NAME") {
            if let StorageBackend::Mongo { database, .. } = &mut self.storage.backend {
                *database = name;
            }
        }

        if let Some(enabled) = lookup("GATEWAY_SEED_ENABLED") {
            self.seed.enabled = enabled.parse()
                .map_err(|e| GatewayError::config(format!("Invalid GATEWAY_SEED_ENABLED: {}", e)))?;
        }

        if let Some(level) = lookup("GATEWAY_LOG_LEVEL") {
            self.observability.logging.level = level;
        }

        if let Some(format) = lookup("GATEWAY_LOG_FORMAT") {
            self.observability.logging.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "text" => LogFormat::Text,
                other => {
                    return Err(GatewayError::config(format!("Invalid GATEWAY_LOG_FORMAT: {}", other)))
                }
            };
        }

        if let Some(enabled) = lookup("GATEWAY_METRICS_ENABLED") {
            self.observability.metrics.enabled = enabled.parse()
                .map_err(|e| GatewayError::config(format!("Invalid GATEWAY_METRICS_ENABLED: {}", e)))?;
        }

        Ok(())
    }

    /// Configuration validation with every problem reported at once
    pub fn validate(&self) -> GatewayResult<()> {
        let mut errors = Vec::new();

        if self.server.http_port == 0 {
            errors.push("http_port must be greater than 0".to_string());
        }

        if self.server.bind_address.is_empty() {
            errors.push("bind_address cannot be empty".to_string());
        }

        if self.server.max_request_size == 0 {
            errors.push("max_request_size must be greater than 0".to_string());
        }

        if self.server.request_timeout.is_zero() {
            errors.push("request_timeout must be greater than 0".to_string());
        }

        if !self.server.api_prefix.starts_with('/') || self.server.api_prefix.len() < 2 {
            errors.push(format!("api_prefix must look like \"/api\", got: {:?}", self.server.api_prefix));
        } else if self.server.api_prefix.ends_with('/') {
            errors.push("api_prefix must not end with '/'".to_string());
        }

        if let StorageBackend::Mongo { url, database } = &self.storage.backend {
            if !(url.starts_with("mongodb://") || url.starts_with("mongodb+srv://")) {
                errors.push("storage url must start with mongodb:// or mongodb+srv://".to_string());
            }
            if database.is_empty() {
                errors.push("storage database cannot be empty".to_string());
            }
        }

        match self.observability.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => errors.push(format!("Invalid log level: {}", self.observability.logging.level)),
        }

        if !self.observability.metrics.endpoint_path.starts_with('/') {
            errors.push("metrics endpoint_path must start with '/'".to_string());
        }

        if !errors.is_empty() {
            return Err(GatewayError::config(format!(
                "Configuration validation failed:\n{}",
                errors.join("\n")
            )));
        }

        Ok(())
    }

    /// Socket address the gateway listens on
    pub fn bind_addr(&self) -> GatewayResult<SocketAddr> {
        format!("{}:{}", self.server.bind_address, self.server.http_port)
            .parse()
            .map_err(|e| GatewayError::config(format!("Invalid bind address: {}", e)))
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP port
    pub http_port: u16,

    /// Server bind address
    pub bind_address: String,

    /// Path prefix of the resource API
    pub api_prefix: String,

    /// Maximum request body size in bytes
    pub max_request_size: usize,

    /// Upper bound on handling a single request
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 3000,
            bind_address: "0.0.0.0".to_string(),
            api_prefix: "/api".to_string(),
            max_request_size: 1024 * 1024, // 1MB
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// Time allowed for the initial connection and health ping
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Document store backends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageBackend {
    /// MongoDB reached through a connection string
    Mongo { url: String, database: String },
    /// Process-local store, lost on exit
    Memory,
}

/// Demonstration data configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Fill empty collections with the demonstration set
    pub enabled: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,

    /// Allowed origins; `"*"` allows any
    pub allowed_origins: Vec<String>,

    /// Preflight cache lifetime in seconds
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
            max_age: 3600,
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,

    /// Log format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Text,
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder and expose the endpoint
    pub enabled: bool,

    /// Metrics endpoint path
    pub endpoint_path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint_path: "/metrics".to_string(),
        }
    }
}
