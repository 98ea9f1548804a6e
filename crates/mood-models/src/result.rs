//! Per-frame result envelope sent to the client.

use chrono::Utc;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::features::{FeatureSnapshot, UserProfile};
use crate::mood::MoodLabel;

/// Feature payload of a result.
///
/// The wire format distinguishes three cases: a full snapshot, an
/// explicitly empty `{}` object (no face), and an absent key (calibrating).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Features {
    #[default]
    Omitted,
    Empty,
    Full(FeatureSnapshot),
}

impl Features {
    pub fn is_omitted(&self) -> bool {
        matches!(self, Features::Omitted)
    }
}

impl Serialize for Features {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Omitted is skipped at the field level; serializing it anyway
            // degrades to an empty object rather than panicking.
            Features::Omitted | Features::Empty => {
                serializer.serialize_map(Some(0))?.end()
            }
            Features::Full(snapshot) => snapshot.serialize(serializer),
        }
    }
}

/// Result object for one processed frame (or control acknowledgement).
///
/// Serialize-only: the server never parses results back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodResult {
    pub face_detected: bool,
    /// Final mood label, or a status string ("Searching...", "Calibrating...").
    pub mood: String,
    /// 0-100; mood score, or calibration progress while calibrating.
    pub score: u8,
    pub conclusion: String,
    /// At most three recommendation strings.
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Features::is_omitted")]
    pub features: Features,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<UserProfile>,
    /// Server timestamp, epoch milliseconds.
    pub server_ts: i64,
}

impl MoodResult {
    /// Result for a frame with no detectable face (or still warming up).
    pub fn searching() -> Self {
        Self {
            face_detected: false,
            mood: "Searching...".to_string(),
            score: 0,
            conclusion: "No face detected.".to_string(),
            recommendations: vec!["Point your face towards the camera.".to_string()],
            features: Features::Empty,
            user_profile: None,
            server_ts: now_ms(),
        }
    }

    /// Result for a frame consumed by an active calibration cycle.
    pub fn calibrating(progress: u8) -> Self {
        Self {
            face_detected: true,
            mood: "Calibrating...".to_string(),
            score: progress.min(100),
            conclusion: "Calibrating...".to_string(),
            recommendations: Vec::new(),
            features: Features::Omitted,
            user_profile: None,
            server_ts: now_ms(),
        }
    }

    /// Immediate acknowledgement for a calibrate command.
    pub fn calibration_ack() -> Self {
        Self::calibrating(0)
    }

    /// Fully classified result.
    pub fn classified(
        mood: MoodLabel,
        conclusion: impl Into<String>,
        recommendations: Vec<String>,
        features: FeatureSnapshot,
        profile: UserProfile,
    ) -> Self {
        let mut recommendations = recommendations;
        recommendations.truncate(3);
        Self {
            face_detected: true,
            mood: mood.as_str().to_string(),
            score: mood.score(),
            conclusion: conclusion.into(),
            recommendations,
            features: Features::Full(features),
            user_profile: Some(profile),
            server_ts: now_ms(),
        }
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
