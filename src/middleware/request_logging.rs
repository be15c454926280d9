//! Request logging middleware
//!
//! Wraps every request in a span carrying its correlation id, logs the outcome with latency,
//! records request metrics and echoes the correlation id on the response.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};

use crate::observability::logging::{CorrelationId, CORRELATION_ID_HEADER};
use crate::observability::metrics;

pub async fn track_requests(mut request: Request, next: Next) -> Response {
    let correlation_id = CorrelationId::from_header(
        request
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|value| value.to_str().ok()),
    );
    request.extensions_mut().insert(correlation_id.clone());

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let span = info_span!(
        "request",
        correlation_id = %correlation_id,
        method = %method,
        path = %path
    );

    let start_time = Instant::now();
    let mut response = next.run(request).instrument(span).await;
    let duration = start_time.elapsed();
    let status = response.status();

    metrics::record_request(method.as_str(), status.as_u16(), duration);

    if let Ok(value) = HeaderValue::from_str(correlation_id.as_str()) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }

    if status.is_server_error() {
        warn!(
            correlation_id = %correlation_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis() as u64,
            "Request failed"
        );
    } else {
        info!(
            correlation_id = %correlation_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis() as u64,
            "Request processed"
        );
    }

    response
}
