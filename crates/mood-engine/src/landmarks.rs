//! Facial landmark contract.
//!
//! Landmarks follow the MediaPipe FaceMesh topology with iris refinement
//! (478 points). The provider itself is an external collaborator: anything
//! that can hand back pixel-space points for at most one face satisfies
//! [`LandmarkProvider`].
//!
//! # Index map (FaceMesh with refined irises)
//!
//! - 33, 160, 158, 133, 153, 144: left eye contour (p1..p6)
//! - 362, 385, 387, 263, 373, 380: right eye contour (p1..p6)
//! - 468 / 473: left / right iris center
//! - 61 / 291: mouth corners, 0 / 17: lip midline
//! - 336 / 296: inner brow pair
//! - 65-159 and 295-386: brow vs. upper eyelid
//! - 234 / 454: face edges (width reference)

use async_trait::async_trait;
use image::RgbImage;
use tracing::warn;

use crate::error::{EngineError, EngineResult};

/// Landmark indices used by the geometry extractor.
pub mod mesh {
    /// Left eye contour in EAR order (p1..p6).
    pub const LEFT_EYE: [usize; 6] = [33, 160, 158, 133, 153, 144];
    /// Right eye contour in EAR order (p1..p6).
    pub const RIGHT_EYE: [usize; 6] = [362, 385, 387, 263, 373, 380];

    pub const LEFT_IRIS: usize = 468;
    pub const RIGHT_IRIS: usize = 473;

    /// Outer / inner corner of the left eye.
    pub const LEFT_EYE_OUTER: usize = 33;
    pub const LEFT_EYE_INNER: usize = 133;
    /// Inner / outer corner of the right eye.
    pub const RIGHT_EYE_INNER: usize = 362;
    pub const RIGHT_EYE_OUTER: usize = 263;

    pub const MOUTH_CORNER_LEFT: usize = 61;
    pub const MOUTH_CORNER_RIGHT: usize = 291;
    pub const LIP_TOP: usize = 0;
    pub const LIP_BOTTOM: usize = 17;

    pub const BROW_INNER_LEFT: usize = 336;
    pub const BROW_INNER_RIGHT: usize = 296;
    pub const LEFT_BROW: usize = 65;
    pub const LEFT_EYELID: usize = 159;
    pub const RIGHT_BROW: usize = 295;
    pub const RIGHT_EYELID: usize = 386;

    pub const FACE_EDGE_LEFT: usize = 234;
    pub const FACE_EDGE_RIGHT: usize = 454;

    /// Point count of the refined FaceMesh topology.
    pub const POINT_COUNT: usize = 478;
}

/// Margins applied when cropping the face region for demographic
/// estimation, pixels.
const CROP_MARGIN_X: f64 = 40.0;
const CROP_MARGIN_TOP: f64 = 60.0;
const CROP_MARGIN_BOTTOM: f64 = 40.0;

/// Pixel-space landmark set for a single face.
#[derive(Debug, Clone)]
pub struct FaceLandmarks {
    /// Landmark coordinates in (x, y) pixel format.
    pub points: Vec<(f64, f64)>,
}

/// Axis-aligned crop region, clamped to image bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FaceLandmarks {
    /// Create landmarks from pixel-space points.
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    /// Create landmarks from normalized coordinates scaled to image size.
    pub fn from_normalized(normalized: &[(f32, f32)], width: u32, height: u32) -> Self {
        let points = normalized
            .iter()
            .map(|&(x, y)| (f64::from(x) * f64::from(width), f64::from(y) * f64::from(height)))
            .collect();
        Self { points }
    }

    /// Checked accessor; a missing index is a provider contract violation.
    pub fn point(&self, index: usize) -> EngineResult<(f64, f64)> {
        self.points
            .get(index)
            .copied()
            .ok_or(EngineError::MissingLandmark(index))
    }

    /// Face crop bounds for demographic estimation, with fixed margins
    /// clamped to the image. Returns `None` when the clamped region is
    /// degenerate.
    pub fn crop_bounds(&self, width: u32, height: u32) -> Option<CropRect> {
        if self.points.is_empty() {
            return None;
        }

        let min_x = self.points.iter().map(|p| p.0).fold(f64::MAX, f64::min);
        let max_x = self.points.iter().map(|p| p.0).fold(f64::MIN, f64::max);
        let min_y = self.points.iter().map(|p| p.1).fold(f64::MAX, f64::min);
        let max_y = self.points.iter().map(|p| p.1).fold(f64::MIN, f64::max);

        let x0 = (min_x - CROP_MARGIN_X).max(0.0) as u32;
        let x1 = ((max_x + CROP_MARGIN_X) as u32).min(width);
        let y0 = (min_y - CROP_MARGIN_TOP).max(0.0) as u32;
        let y1 = ((max_y + CROP_MARGIN_BOTTOM) as u32).min(height);

        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        Some(CropRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

/// External landmark extractor for at most one face per image.
///
/// Contract: `Ok(None)` means no face was found (a first-class outcome);
/// `Err` means the collaborator itself failed and is treated as no
/// detection by callers rather than terminating the session.
#[async_trait]
pub trait LandmarkProvider: Send + Sync {
    async fn detect(&self, image: &RgbImage) -> EngineResult<Option<FaceLandmarks>>;
}

/// Provider used when no landmark backend is wired in.
///
/// Always reports no face, logging a single startup warning, so the server
/// stays functional (every frame yields a "Searching..." result) without a
/// detection backend.
pub struct DisabledLandmarkProvider;

impl DisabledLandmarkProvider {
    pub fn new() -> Self {
        static WARNED: std::sync::Once = std::sync::Once::new();
        WARNED.call_once(|| {
            warn!("No landmark provider configured: every frame will report no face");
        });
        Self
    }
}

impl Default for DisabledLandmarkProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LandmarkProvider for DisabledLandmarkProvider {
    async fn detect(&self, _image: &RgbImage) -> EngineResult<Option<FaceLandmarks>> {
        Ok(None)
    }
}
