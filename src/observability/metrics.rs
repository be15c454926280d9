//! # Metrics Collection
//!
//! Request and store-operation metrics recorded through the `metrics` facade, with an optional
//! Prometheus exporter rendered by the gateway's metrics endpoint.
//!
//! Recording is always safe: without an installed recorder the `metrics` macros are no-ops, so
//! handlers record unconditionally and only the exporter depends on configuration.
//!
//! ## Exported Series
//! - `gateway_requests_total{method,status}`
//! - `gateway_request_duration_seconds{method}`
//! - `gateway_store_operations_total{operation,collection,outcome}`
//! - `gateway_store_operation_duration_seconds{operation,collection}`
//! - `gateway_seeded_documents_total`

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::future::Future;
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::info;

use crate::core::config::MetricsConfig;
use crate::core::error::{GatewayError, GatewayResult};

const REQUEST_DURATION: &str = "gateway_request_duration_seconds";
const STORE_DURATION: &str = "gateway_store_operation_duration_seconds";

const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// The process-wide recorder handle; a recorder can only be installed once
static PROMETHEUS: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder when metrics are enabled
///
/// Returns the handle used to render the exposition text. Later calls reuse the recorder
/// installed by the first one.
pub fn install_recorder(config: &MetricsConfig) -> GatewayResult<Option<PrometheusHandle>> {
    if !config.enabled {
        return Ok(None);
    }

    if let Some(handle) = PROMETHEUS.get() {
        return Ok(Some(handle.clone()));
    }

    let builder = PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(REQUEST_DURATION.to_string()), LATENCY_BUCKETS)
        .and_then(|b| b.set_buckets_for_metric(Matcher::Full(STORE_DURATION.to_string()), LATENCY_BUCKETS))
        .map_err(|e| GatewayError::config(format!("Failed to set histogram buckets: {}", e)))?;

    match builder.install_recorder() {
        Ok(handle) => {
            info!(endpoint = %config.endpoint_path, "Prometheus metrics recorder installed");
            Ok(Some(PROMETHEUS.get_or_init(|| handle).clone()))
        }
        // Lost a race with a concurrent installer
        Err(e) => PROMETHEUS
            .get()
            .cloned()
            .map(Some)
            .ok_or_else(|| GatewayError::config(format!("Failed to install metrics recorder: {}", e))),
    }
}

/// Record one handled HTTP request
pub fn record_request(method: &str, status: u16, duration: Duration) {
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(REQUEST_DURATION, "method" => method.to_string()).record(duration.as_secs_f64());
}

/// Record documents inserted by the seeder
pub fn record_seeded(count: usize) {
    metrics::counter!("gateway_seeded_documents_total").increment(count as u64);
}

/// Run one store operation, recording its latency and outcome
pub async fn observe_store<T, F>(operation: &'static str, collection: &'static str, future: F) -> GatewayResult<T>
where
    F: Future<Output = GatewayResult<T>>,
{
    let start = Instant::now();
    let result = future.await;
    let outcome = if result.is_ok() { "success" } else { "error" };

    metrics::counter!(
        "gateway_store_operations_total",
        "operation" => operation,
        "collection" => collection,
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!(STORE_DURATION, "operation" => operation, "collection" => collection)
        .record(start.elapsed().as_secs_f64());

    result
}
