//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use smartsession_models::Status;
use smartsession_monitor::BroadcastOutcome;

use crate::error::{ApiError, ApiResult};

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> ApiResult<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ApiError::internal(format!("Failed to install Prometheus recorder: {}", e)))
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "smartsession_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "smartsession_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "smartsession_http_requests_in_flight";

    // WebSocket metrics
    pub const WS_CONNECTIONS_TOTAL: &str = "smartsession_ws_connections_total";
    pub const WS_CONNECTIONS_ACTIVE: &str = "smartsession_ws_connections_active";
    pub const WS_MESSAGES_SENT: &str = "smartsession_ws_messages_sent_total";
    pub const WS_MESSAGES_RECEIVED: &str = "smartsession_ws_messages_received_total";

    // Monitoring metrics
    pub const FRAMES_PROCESSED_TOTAL: &str = "smartsession_frames_processed_total";
    pub const FRAMES_DROPPED_TOTAL: &str = "smartsession_frames_dropped_total";
    pub const FRAME_ANALYSIS_DURATION_SECONDS: &str = "smartsession_frame_analysis_duration_seconds";
    pub const STATUS_TRANSITIONS_TOTAL: &str = "smartsession_status_transitions_total";
    pub const STATUS_DELIVERIES_TOTAL: &str = "smartsession_status_deliveries_total";
    pub const OBSERVERS_PRUNED_TOTAL: &str = "smartsession_observers_pruned_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", route_label(path).to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record WebSocket connection.
pub fn record_ws_connection(role: &str) {
    let labels = [("role", role.to_string())];
    counter!(names::WS_CONNECTIONS_TOTAL, &labels).increment(1);
}

/// Update active WebSocket connections gauge.
pub fn set_ws_active_connections(role: &str, count: usize) {
    let labels = [("role", role.to_string())];
    gauge!(names::WS_CONNECTIONS_ACTIVE, &labels).set(count as f64);
}

/// Record WebSocket message sent.
pub fn record_ws_message_sent(role: &str, message_type: &str) {
    let labels = [
        ("role", role.to_string()),
        ("type", message_type.to_string()),
    ];
    counter!(names::WS_MESSAGES_SENT, &labels).increment(1);
}

/// Record WebSocket message received.
pub fn record_ws_message_received(role: &str) {
    let labels = [("role", role.to_string())];
    counter!(names::WS_MESSAGES_RECEIVED, &labels).increment(1);
}

/// Record a frame that made it through the pipeline.
pub fn record_frame_processed(face_count: u32, analysis_secs: f64) {
    let faces = match face_count {
        0 => "0",
        1 => "1",
        _ => "many",
    };
    counter!(names::FRAMES_PROCESSED_TOTAL, "faces" => faces).increment(1);
    histogram!(names::FRAME_ANALYSIS_DURATION_SECONDS).record(analysis_secs);
}

/// Record a frame skipped before reaching the pipeline.
pub fn record_frame_dropped(reason: &'static str) {
    counter!(names::FRAMES_DROPPED_TOTAL, "reason" => reason).increment(1);
}

/// Record a session status change.
pub fn record_status_transition(to: Status) {
    counter!(names::STATUS_TRANSITIONS_TOTAL, "to" => to.as_str()).increment(1);
}

/// Record the result of one status broadcast.
pub fn record_broadcast(outcome: &BroadcastOutcome) {
    counter!(names::STATUS_DELIVERIES_TOTAL, "result" => "delivered")
        .increment(outcome.delivered as u64);
    if outcome.failed > 0 {
        counter!(names::STATUS_DELIVERIES_TOTAL, "result" => "failed")
            .increment(outcome.failed as u64);
        counter!(names::OBSERVERS_PRUNED_TOTAL, "reason" => "failed").increment(outcome.failed as u64);
    }
    if outcome.timed_out > 0 {
        counter!(names::STATUS_DELIVERIES_TOTAL, "result" => "timed_out")
            .increment(outcome.timed_out as u64);
        counter!(names::OBSERVERS_PRUNED_TOTAL, "reason" => "timeout")
            .increment(outcome.timed_out as u64);
    }
}

/// Collapse request paths onto the known routes to bound label cardinality.
fn route_label(path: &str) -> &'static str {
    match path {
        "/health" => "/health",
        "/ready" => "/ready",
        "/metrics" => "/metrics",
        "/ws/student" => "/ws/student",
        "/ws/teacher" => "/ws/teacher",
        _ => "other",
    }
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
