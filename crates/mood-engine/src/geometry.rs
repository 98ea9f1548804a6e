//! Geometry extraction: raw landmarks to scalar measurements.
//!
//! Everything here is a pure function of the landmark set and the frame;
//! no state is kept between frames. All size-dependent values stay in
//! pixels and are normalized downstream against `face_width`.

use image::RgbImage;

use crate::error::EngineResult;
use crate::landmarks::{mesh, FaceLandmarks};

/// Raw per-frame measurements derived from one face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMeasurement {
    /// Mean eye-aspect-ratio of both eyes.
    pub ear: f64,
    /// Lip midline y minus mean corner y. Screen Y grows downward, so a
    /// positive value means raised corners (smile-like).
    pub mouth_curve: f64,
    /// Distance between the inner brow landmarks; smaller = more squeezed.
    pub brow_squeeze: f64,
    /// Mean brow-to-eyelid vertical distance, pixels.
    pub brow_height: f64,
    /// Mean horizontal iris position, nominally 0..1, 0.5 = centered.
    pub gaze_ratio: f64,
    /// Absolute angle of the outer-eye-corner vector, degrees.
    pub head_tilt: f64,
    /// Mean grayscale intensity of the full frame, 0..255.
    pub brightness: f64,
    /// Distance between the face edge landmarks, pixels.
    pub face_width: f64,
}

/// Extract all measurements for one frame.
pub fn measure(landmarks: &FaceLandmarks, image: &RgbImage) -> EngineResult<FrameMeasurement> {
    let ear = (eye_aspect_ratio(landmarks, &mesh::LEFT_EYE)?
        + eye_aspect_ratio(landmarks, &mesh::RIGHT_EYE)?)
        / 2.0;

    // Both eyes measure the iris offset toward the same screen side, so the
    // two ratios agree in direction and can be averaged.
    let gaze_ratio = (iris_ratio(
        landmarks.point(mesh::LEFT_IRIS)?,
        landmarks.point(mesh::LEFT_EYE_OUTER)?,
        landmarks.point(mesh::LEFT_EYE_INNER)?,
    ) + iris_ratio(
        landmarks.point(mesh::RIGHT_IRIS)?,
        landmarks.point(mesh::RIGHT_EYE_INNER)?,
        landmarks.point(mesh::RIGHT_EYE_OUTER)?,
    )) / 2.0;

    let corners_y = (landmarks.point(mesh::MOUTH_CORNER_LEFT)?.1
        + landmarks.point(mesh::MOUTH_CORNER_RIGHT)?.1)
        / 2.0;
    let lip_center_y =
        (landmarks.point(mesh::LIP_TOP)?.1 + landmarks.point(mesh::LIP_BOTTOM)?.1) / 2.0;
    let mouth_curve = lip_center_y - corners_y;

    let brow_squeeze = dist(
        landmarks.point(mesh::BROW_INNER_LEFT)?,
        landmarks.point(mesh::BROW_INNER_RIGHT)?,
    );

    let left_brow_h =
        (landmarks.point(mesh::LEFT_BROW)?.1 - landmarks.point(mesh::LEFT_EYELID)?.1).abs();
    let right_brow_h =
        (landmarks.point(mesh::RIGHT_BROW)?.1 - landmarks.point(mesh::RIGHT_EYELID)?.1).abs();
    let brow_height = (left_brow_h + right_brow_h) / 2.0;

    let left_outer = landmarks.point(mesh::LEFT_EYE_OUTER)?;
    let right_outer = landmarks.point(mesh::RIGHT_EYE_OUTER)?;
    let head_tilt = (right_outer.1 - left_outer.1)
        .atan2(right_outer.0 - left_outer.0)
        .to_degrees()
        .abs();

    let face_width = dist(
        landmarks.point(mesh::FACE_EDGE_LEFT)?,
        landmarks.point(mesh::FACE_EDGE_RIGHT)?,
    );

    Ok(FrameMeasurement {
        ear,
        mouth_curve,
        brow_squeeze,
        brow_height,
        gaze_ratio,
        head_tilt,
        brightness: mean_brightness(image),
        face_width,
    })
}

/// EAR for a 6-point eye contour: (|p2-p6| + |p3-p5|) / (2 |p1-p4|).
/// A degenerate horizontal span (p1 == p4) yields 0.
pub fn eye_aspect_ratio(landmarks: &FaceLandmarks, indices: &[usize; 6]) -> EngineResult<f64> {
    let p1 = landmarks.point(indices[0])?;
    let p2 = landmarks.point(indices[1])?;
    let p3 = landmarks.point(indices[2])?;
    let p4 = landmarks.point(indices[3])?;
    let p5 = landmarks.point(indices[4])?;
    let p6 = landmarks.point(indices[5])?;

    let horizontal = dist(p1, p4);
    if horizontal <= 0.0 {
        return Ok(0.0);
    }
    Ok((dist(p2, p6) + dist(p3, p5)) / (2.0 * horizontal))
}

/// Iris position between two eye corners: |iris - near| / |far - near|,
/// where `near` is the screen-right corner of the eye. 1 at the far
/// corner, 0 at the near one. A zero-width eye yields the centered 0.5.
fn iris_ratio(iris: (f64, f64), far: (f64, f64), near: (f64, f64)) -> f64 {
    let total_width = dist(far, near);
    if total_width == 0.0 {
        return 0.5;
    }
    dist(iris, near) / total_width
}

/// Mean grayscale intensity of the frame.
fn mean_brightness(image: &RgbImage) -> f64 {
    let pixels = u64::from(image.width()) * u64::from(image.height());
    if pixels == 0 {
        return 0.0;
    }
    let gray = image::imageops::grayscale(image);
    let sum: u64 = gray.pixels().map(|p| u64::from(p.0[0])).sum();
    sum as f64 / pixels as f64
}

fn dist(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::mesh::POINT_COUNT;

    /// Landmark set with every point at the origin except the given overrides.
    fn landmarks_with(overrides: &[(usize, (f64, f64))]) -> FaceLandmarks {
        let mut points = vec![(0.0, 0.0); POINT_COUNT];
        for &(idx, p) in overrides {
            points[idx] = p;
        }
        FaceLandmarks::new(points)
    }

    #[test]
    fn test_ear_symmetric_eye() {
        // Horizontal span of 4, both vertical pairs of height 2:
        // EAR = (2 + 2) / (2 * 4) = 0.5
        let landmarks = landmarks_with(&[
            (33, (0.0, 0.0)),
            (160, (1.0, -1.0)),
            (158, (3.0, -1.0)),
            (133, (4.0, 0.0)),
            (153, (3.0, 1.0)),
            (144, (1.0, 1.0)),
        ]);
        let ear = eye_aspect_ratio(&landmarks, &mesh::LEFT_EYE).unwrap();
        assert!((ear - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_ear_degenerate_span() {
        // p1 == p4 guards to zero instead of dividing by zero.
        let landmarks = landmarks_with(&[(160, (1.0, -1.0)), (144, (1.0, 1.0))]);
        let ear = eye_aspect_ratio(&landmarks, &mesh::LEFT_EYE).unwrap();
        assert_eq!(ear, 0.0);
    }

    #[test]
    fn test_gaze_centered_iris() {
        assert_eq!(iris_ratio((5.0, 0.0), (10.0, 0.0), (0.0, 0.0)), 0.5);
    }

    #[test]
    fn test_gaze_at_near_corner() {
        assert_eq!(iris_ratio((0.0, 0.0), (10.0, 0.0), (0.0, 0.0)), 0.0);
    }

    #[test]
    fn test_gaze_zero_width_eye() {
        assert_eq!(iris_ratio((3.0, 0.0), (1.0, 1.0), (1.0, 1.0)), 0.5);
    }

    #[test]
    fn test_mouth_curve_sign_convention() {
        // Corners above the lip midline (smaller y) => positive curve.
        let landmarks = landmarks_with(&[
            (61, (10.0, 90.0)),
            (291, (30.0, 90.0)),
            (0, (20.0, 95.0)),
            (17, (20.0, 105.0)),
            // Keep the rest of measure() well-defined.
            (133, (4.0, 0.0)),
            (263, (14.0, 0.0)),
        ]);
        let image = RgbImage::new(4, 4);
        let m = measure(&landmarks, &image).unwrap();
        assert!((m.mouth_curve - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_head_tilt_level_eyes() {
        let landmarks = landmarks_with(&[(33, (0.0, 5.0)), (263, (10.0, 5.0))]);
        let image = RgbImage::new(4, 4);
        let m = measure(&landmarks, &image).unwrap();
        assert_eq!(m.head_tilt, 0.0);
    }

    #[test]
    fn test_head_tilt_absolute_value() {
        // 45 degrees downward still reports 45.
        let landmarks = landmarks_with(&[(33, (0.0, 0.0)), (263, (10.0, -10.0))]);
        let image = RgbImage::new(4, 4);
        let m = measure(&landmarks, &image).unwrap();
        assert!((m.head_tilt - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_brightness_uniform_image() {
        let mut image = RgbImage::new(2, 2);
        for p in image.pixels_mut() {
            *p = image::Rgb([200, 200, 200]);
        }
        let landmarks = landmarks_with(&[(133, (4.0, 0.0)), (263, (14.0, 0.0))]);
        let m = measure(&landmarks, &image).unwrap();
        assert!((m.brightness - 200.0).abs() < 1.5);
    }

    #[test]
    fn test_face_width() {
        let landmarks = landmarks_with(&[
            (234, (0.0, 0.0)),
            (454, (120.0, 0.0)),
            (133, (4.0, 0.0)),
            (263, (14.0, 0.0)),
        ]);
        let image = RgbImage::new(4, 4);
        let m = measure(&landmarks, &image).unwrap();
        assert_eq!(m.face_width, 120.0);
    }

    #[test]
    fn test_missing_landmark_propagates() {
        let landmarks = FaceLandmarks::new(vec![(0.0, 0.0); 10]);
        let image = RgbImage::new(4, 4);
        assert!(measure(&landmarks, &image).is_err());
    }
}
