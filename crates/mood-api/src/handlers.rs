//! HTTP handlers.

use axum::Json;
use serde_json::{json, Value};

/// Service banner at the root path.
pub async fn root() -> Json<Value> {
    Json(json!({ "status": "MoodSense AI is running" }))
}

/// Liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
