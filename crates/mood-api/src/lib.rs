//! Axum HTTP/WS server for real-time mood detection.
//!
//! This crate provides:
//! - The `/ws/mood` per-session WebSocket endpoint
//! - Frame decoding and the session receive/process/send cycle
//! - Health routes and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod state;
pub mod ws;

pub use config::ApiConfig;
pub use error::{SessionError, SessionResult};
pub use routes::create_router;
pub use session::MoodSession;
pub use state::AppState;
