// Error types and HTTP status mapping
pub mod error;

// Configuration loading and validation
pub mod config;

// Resources, records and payloads
pub mod types;
