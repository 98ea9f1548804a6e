//! Demographics client error types.

use thiserror::Error;

pub type DemographicsResult<T> = Result<T, DemographicsError>;

/// Failures talking to the estimation sidecar. All of them are swallowed
/// by the proxy (the cache stays stale); the next throttle window is the
/// retry, so there is no retry logic here.
#[derive(Debug, Error)]
pub enum DemographicsError {
    #[error("Estimator unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Face crop could not be encoded: {0}")]
    Encode(String),
}
