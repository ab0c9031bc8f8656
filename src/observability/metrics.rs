//! Metrics collection.
//!
//! # Metrics
//! - `shortly_requests_total` (counter): requests by method, endpoint, status
//! - `shortly_request_duration_seconds` (histogram): latency distribution
//! - `shortly_retries_total` (counter): retry attempts by endpoint
//! - `shortly_session_events_total` (counter): login/logout/expiry transitions
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; the host application installs
//!   the recorder (none installed means updates are no-ops)
//! - `observability.metrics_enabled` gates every call site in this crate
//! - Status label is "timeout"/"error" when no HTTP status was received

use metrics::{counter, histogram};
use std::time::Instant;

/// Record a completed request attempt.
pub fn record_request(method: &str, endpoint: &str, status: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("endpoint", endpoint.to_string()),
        ("status", status.to_string()),
    ];
    counter!("shortly_requests_total", &labels).increment(1);
    histogram!("shortly_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

/// Record that an operation is being retried.
pub fn record_retry(operation: &str) {
    counter!("shortly_retries_total", "operation" => operation.to_string()).increment(1);
}

/// Record a session state transition.
pub fn record_session_event(event: &'static str) {
    counter!("shortly_session_events_total", "event" => event).increment(1);
}
