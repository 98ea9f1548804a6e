//! Request/response types for the estimation sidecar.

use serde::{Deserialize, Serialize};

/// Request body for an estimation call. The image is a base64-encoded
/// PNG of the pre-cropped face region; `detect_faces` stays false because
/// re-detection on a crop both wastes time and can fail spuriously.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateRequest {
    pub image: String,
    pub detect_faces: bool,
}

impl EstimateRequest {
    pub fn new(image_base64: impl Into<String>) -> Self {
        Self {
            image: image_base64.into(),
            detect_faces: false,
        }
    }
}

/// Raw sidecar response.
#[derive(Debug, Clone, Deserialize)]
pub struct EstimateResponse {
    pub age: u32,
    pub gender: String,
}

/// Normalized demographic estimate cached per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Estimate {
    /// Stringified age, as displayed to the client.
    pub age: String,
    pub gender: String,
}

impl From<EstimateResponse> for Estimate {
    fn from(response: EstimateResponse) -> Self {
        Self {
            age: response.age.to_string(),
            gender: map_gender(&response.gender),
        }
    }
}

/// Map the estimator's gender vocabulary to display labels.
///
/// Labels outside the estimator's documented binary vocabulary pass
/// through verbatim instead of being forced into one of the two.
pub fn map_gender(raw: &str) -> String {
    match raw {
        "Man" => "Male".to_string(),
        "Woman" => "Female".to_string(),
        other => other.to_string(),
    }
}
