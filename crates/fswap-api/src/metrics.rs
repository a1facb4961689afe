//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "fswap_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "fswap_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "fswap_http_requests_in_flight";

    // Swap pipeline metrics
    pub const SWAPS_STARTED_TOTAL: &str = "fswap_swaps_started_total";
    pub const SWAPS_COMPLETED_TOTAL: &str = "fswap_swaps_completed_total";
    pub const SWAPS_FAILED_TOTAL: &str = "fswap_swaps_failed_total";
    pub const SWAP_DURATION_SECONDS: &str = "fswap_swap_duration_seconds";

    // Housekeeping metrics
    pub const UPLOADS_SWEPT_TOTAL: &str = "fswap_uploads_swept_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a swap run starting.
pub fn record_swap_started() {
    counter!(names::SWAPS_STARTED_TOTAL).increment(1);
}

/// Record a swap run finishing successfully.
pub fn record_swap_completed(duration_secs: f64) {
    counter!(names::SWAPS_COMPLETED_TOTAL).increment(1);
    let labels = [("outcome", "success".to_string())];
    histogram!(names::SWAP_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a swap run failing.
pub fn record_swap_failed(duration_secs: f64) {
    counter!(names::SWAPS_FAILED_TOTAL).increment(1);
    let labels = [("outcome", "failure".to_string())];
    histogram!(names::SWAP_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record files removed by the upload sweeper.
pub fn record_uploads_swept(count: u64) {
    counter!(names::UPLOADS_SWEPT_TOTAL).increment(count);
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
