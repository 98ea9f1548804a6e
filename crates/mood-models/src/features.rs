//! Per-frame feature snapshot exposed to clients.
//!
//! Field names and rounding match the wire format consumed by the frontend,
//! so renames here are breaking changes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Sentinel shown until the first demographic estimate lands.
pub const AGE_SCANNING: &str = "Scanning...";

/// Sentinel shown until the first demographic estimate lands.
pub const GENDER_UNKNOWN: &str = "...";

/// Diagnostic feature vector for one processed frame.
///
/// Smoothed and delta values are already calibrated against the session
/// baseline; `blink_dur` is non-zero only on the frame where a blink
/// completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FeatureSnapshot {
    /// Smoothed eye-aspect-ratio.
    pub ear: f64,
    /// Relative eyelid drop versus the calibrated baseline (0 = fully open).
    pub relative_drop: f64,
    /// Total blinks observed this session.
    pub blink_rate: u32,
    /// Duration of the blink that completed on this frame, seconds.
    pub blink_dur: f64,
    /// Mean horizontal iris position, 0.5 = centered.
    pub gaze_ratio: f64,
    /// Absolute head tilt in degrees.
    pub head_tilt: f64,
    /// Mean grayscale intensity of the frame (0-255).
    pub brightness: f64,
    /// Distance between the face-edge landmarks, pixels.
    pub face_width: f64,
    /// Smoothed mouth curvature minus the calibrated baseline.
    pub delta_mouth: f64,
    /// Smoothed brow squeeze minus the calibrated baseline.
    pub delta_brow: f64,
    /// Raw brow height, pixels.
    pub brow_height: f64,
    /// Last known age estimate (stringified), or a scanning sentinel.
    pub age: String,
    /// Last known gender estimate, or a scanning sentinel.
    pub gender: String,
}

impl FeatureSnapshot {
    /// Apply the wire-format rounding: 3 dp for EAR and blink duration,
    /// 2 dp for relative drop and gaze, 1 dp for everything else.
    pub fn rounded(mut self) -> Self {
        self.ear = round_dp(self.ear, 3);
        self.relative_drop = round_dp(self.relative_drop, 2);
        self.blink_dur = round_dp(self.blink_dur, 3);
        self.gaze_ratio = round_dp(self.gaze_ratio, 2);
        self.head_tilt = round_dp(self.head_tilt, 1);
        self.brightness = round_dp(self.brightness, 1);
        self.face_width = round_dp(self.face_width, 1);
        self.delta_mouth = round_dp(self.delta_mouth, 1);
        self.delta_brow = round_dp(self.delta_brow, 1);
        self.brow_height = round_dp(self.brow_height, 1);
        self
    }
}

/// Best-effort demographic profile for the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UserProfile {
    pub age: String,
    pub gender: String,
}

impl UserProfile {
    pub fn new(age: impl Into<String>, gender: impl Into<String>) -> Self {
        Self {
            age: age.into(),
            gender: gender.into(),
        }
    }

    /// Profile shown before any estimate has arrived.
    pub fn scanning() -> Self {
        Self::new(AGE_SCANNING, GENDER_UNKNOWN)
    }
}

fn round_dp(value: f64, dp: u32) -> f64 {
    let factor = 10f64.powi(dp as i32);
    (value * factor).round() / factor
}
