//! Shared data models for the MoodSense backend.
//!
//! This crate provides Serde-serializable types for:
//! - Per-frame feature snapshots and derived deltas
//! - Mood labels and the fixed mood score table
//! - The per-frame result envelope sent over the WebSocket
//! - Inbound client commands

pub mod command;
pub mod features;
pub mod mood;
pub mod result;

// Re-export common types
pub use command::ClientCommand;
pub use features::{FeatureSnapshot, UserProfile, AGE_SCANNING, GENDER_UNKNOWN};
pub use mood::MoodLabel;
pub use result::{Features, MoodResult};
