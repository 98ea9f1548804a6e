//! Prometheus metrics for the API server.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // WebSocket metrics
    pub const WS_SESSIONS_TOTAL: &str = "mood_ws_sessions_total";
    pub const WS_SESSIONS_ACTIVE: &str = "mood_ws_sessions_active";
    pub const WS_MESSAGES_RECEIVED: &str = "mood_ws_messages_received_total";

    // Pipeline metrics
    pub const FRAMES_PROCESSED_TOTAL: &str = "mood_frames_processed_total";
    pub const FRAMES_SKIPPED_TOTAL: &str = "mood_frames_skipped_total";
}

/// Record a new WebSocket session.
pub fn record_ws_session() {
    counter!(names::WS_SESSIONS_TOTAL).increment(1);
}

/// Update the active WebSocket sessions gauge.
pub fn set_ws_active_sessions(count: i64) {
    gauge!(names::WS_SESSIONS_ACTIVE).set(count as f64);
}

/// Record an inbound WebSocket message.
pub fn record_ws_message_received() {
    counter!(names::WS_MESSAGES_RECEIVED).increment(1);
}

/// Record a processed frame by outcome ("no_face", "calibrating", "classified").
pub fn record_frame_processed(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::FRAMES_PROCESSED_TOTAL, &labels).increment(1);
}

/// Record a frame dropped before processing (undecodable payload).
pub fn record_frame_skipped() {
    counter!(names::FRAMES_SKIPPED_TOTAL).increment(1);
}
