//! Client and per-session proxy for the demographic estimation sidecar.
//!
//! The estimator itself (age/gender inference on a cropped face) is an
//! external best-effort service. This crate provides:
//! - [`client::DemographicsClient`]: the HTTP client, fed pre-cropped
//!   face images with the sidecar's own face detection disabled
//! - [`proxy::DemographicProxy`]: per-session throttling, the
//!   at-most-one-in-flight guard, and the message-passing completion
//!   channel consumed by the session loop

pub mod client;
pub mod error;
pub mod proxy;
pub mod types;

pub use client::{DemographicsClient, DemographicsConfig};
pub use error::{DemographicsError, DemographicsResult};
pub use proxy::DemographicProxy;
pub use types::Estimate;
