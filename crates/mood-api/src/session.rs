//! Per-connection mood session.
//!
//! A `MoodSession` owns all pipeline state for one WebSocket connection
//! and is driven message by message: each inbound text is either a JSON
//! control command or a base64-encoded frame. Everything here runs on the
//! connection's task; the only concurrency is the detached demographics
//! worker, reached exclusively through the proxy's completion channel.

use std::sync::Arc;
use std::time::Instant;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::RgbImage;
use tracing::{debug, warn};

use mood_demographics::{DemographicProxy, DemographicsClient};
use mood_engine::classifier::{classify, ClassifierInput};
use mood_engine::debouncer::MoodVoteBuffer;
use mood_engine::detector::{FrameOutcome, MoodDetector};
use mood_engine::geometry::measure;
use mood_engine::landmarks::{FaceLandmarks, LandmarkProvider};
use mood_models::{ClientCommand, FeatureSnapshot, MoodResult};

use crate::error::{SessionError, SessionResult};

/// All state for one connection's receive/process/send cycle.
pub struct MoodSession {
    landmarks: Arc<dyn LandmarkProvider>,
    detector: MoodDetector,
    votes: MoodVoteBuffer,
    demographics: DemographicProxy,
}

impl MoodSession {
    pub fn new(
        landmarks: Arc<dyn LandmarkProvider>,
        demographics: Arc<DemographicsClient>,
        now: Instant,
    ) -> Self {
        Self {
            landmarks,
            detector: MoodDetector::new(now),
            votes: MoodVoteBuffer::new(),
            demographics: DemographicProxy::new(demographics),
        }
    }

    /// Handle one inbound text message. Returns the result to send back,
    /// or `None` when the message is consumed silently (unknown command,
    /// undecodable frame).
    pub async fn handle_text(&mut self, text: &str, now: Instant) -> Option<MoodResult> {
        // Consume any finished background estimation before this frame.
        self.demographics.poll();

        if text.starts_with('{') {
            match serde_json::from_str::<ClientCommand>(text) {
                Ok(ClientCommand::Calibrate) => {
                    self.detector.start_calibration();
                    return Some(MoodResult::calibration_ack());
                }
                Err(_) => {
                    // Any other well-formed JSON is an unknown command and
                    // is dropped; malformed text might still be a frame.
                    if serde_json::from_str::<serde_json::Value>(text).is_ok() {
                        debug!("Ignoring unknown control message");
                        return None;
                    }
                }
            }
        }

        let image = match decode_frame(text) {
            Ok(image) => image,
            Err(e) => {
                warn!("Skipping undecodable frame: {}", e);
                crate::metrics::record_frame_skipped();
                return None;
            }
        };

        Some(self.process_frame(&image, now).await)
    }

    /// Run one decoded frame through the pipeline.
    async fn process_frame(&mut self, image: &RgbImage, now: Instant) -> MoodResult {
        if self.detector.is_warming_up(now) {
            return MoodResult::searching();
        }

        let landmarks = match self.landmarks.detect(image).await {
            Ok(Some(landmarks)) => landmarks,
            Ok(None) => return MoodResult::searching(),
            Err(e) => {
                // Collaborator failure degrades to "no detection" instead
                // of tearing down the session.
                warn!("Landmark provider error: {}", e);
                return MoodResult::searching();
            }
        };

        let measurement = match measure(&landmarks, image) {
            Ok(m) => m,
            Err(e) => {
                warn!("Geometry extraction failed: {}", e);
                return MoodResult::searching();
            }
        };

        let outcome = self.detector.observe(measurement, now);
        self.maybe_dispatch_demographics(&landmarks, image);

        match outcome {
            FrameOutcome::Calibrating { progress } => MoodResult::calibrating(progress),
            FrameOutcome::Measured(frame) => {
                let verdict = classify(&ClassifierInput {
                    delta_mouth: frame.delta_mouth,
                    delta_brow: frame.delta_brow,
                    brow_height: measurement.brow_height,
                    face_width: measurement.face_width,
                    relative_drop: frame.relative_drop,
                    blink_duration: frame.blink_duration,
                    gaze_ratio: measurement.gaze_ratio,
                });
                let final_mood = self.votes.vote(verdict.mood);
                let profile = self.demographics.profile();

                let snapshot = FeatureSnapshot {
                    ear: frame.smoothed_ear,
                    relative_drop: frame.relative_drop,
                    blink_rate: frame.blink_count,
                    blink_dur: frame.blink_duration,
                    gaze_ratio: measurement.gaze_ratio,
                    head_tilt: measurement.head_tilt,
                    brightness: measurement.brightness,
                    face_width: measurement.face_width,
                    delta_mouth: frame.delta_mouth,
                    delta_brow: frame.delta_brow,
                    brow_height: measurement.brow_height,
                    age: profile.age.clone(),
                    gender: profile.gender.clone(),
                }
                .rounded();

                // The conclusion explains the raw (instantaneous) reading
                // even when the vote holds an earlier label.
                MoodResult::classified(
                    final_mood,
                    verdict.conclusion,
                    verdict
                        .recommendations
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                    snapshot,
                    profile,
                )
            }
        }
    }

    /// Kick off a background estimation when this frame falls on a
    /// dispatch boundary. Runs during calibration too; the cache is
    /// independent of calibration state.
    fn maybe_dispatch_demographics(&mut self, landmarks: &FaceLandmarks, image: &RgbImage) {
        if !self.demographics.should_dispatch(self.detector.frame_count()) {
            return;
        }
        let Some(rect) = landmarks.crop_bounds(image.width(), image.height()) else {
            debug!("Skipping demographics dispatch: degenerate face crop");
            return;
        };
        let crop =
            image::imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image();
        self.demographics.dispatch(crop);
    }
}

/// Decode a base64 frame payload (with or without a data-URL prefix) into
/// an RGB raster.
fn decode_frame(text: &str) -> SessionResult<RgbImage> {
    let encoded = match text.find("base64,") {
        Some(idx) => &text[idx + "base64,".len()..],
        None => text,
    };
    let bytes = BASE64.decode(encoded.trim()).map_err(SessionError::Base64)?;
    let image = image::load_from_memory(&bytes).map_err(SessionError::ImageDecode)?;
    Ok(image.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mood_engine::error::EngineResult;
    use mood_engine::landmarks::mesh::POINT_COUNT;
    use mood_engine::landmarks::DisabledLandmarkProvider;
    use std::io::Cursor;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Provider returning a swappable synthetic landmark set.
    struct StaticProvider {
        points: Mutex<Vec<(f64, f64)>>,
    }

    impl StaticProvider {
        fn new(points: Vec<(f64, f64)>) -> Self {
            Self {
                points: Mutex::new(points),
            }
        }

        fn set_points(&self, points: Vec<(f64, f64)>) {
            *self.points.lock().unwrap() = points;
        }
    }

    #[async_trait]
    impl LandmarkProvider for StaticProvider {
        async fn detect(&self, _image: &RgbImage) -> EngineResult<Option<FaceLandmarks>> {
            Ok(Some(FaceLandmarks::new(self.points.lock().unwrap().clone())))
        }
    }

    fn default_client() -> Arc<DemographicsClient> {
        Arc::new(DemographicsClient::new(Default::default()).unwrap())
    }

    fn frame_payload() -> String {
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(RgbImage::new(16, 16))
            .write_to(&mut Cursor::new(&mut buf), image::ImageOutputFormat::Png)
            .unwrap();
        format!("data:image/png;base64,{}", BASE64.encode(buf))
    }

    /// Flat landmark set: everything at the origin except the face edges,
    /// giving a 200px face with neutral features.
    fn neutral_points() -> Vec<(f64, f64)> {
        let mut points = vec![(0.0, 0.0); POINT_COUNT];
        points[234] = (0.0, 0.0);
        points[454] = (200.0, 0.0);
        points
    }

    /// Neutral face with the lip corners raised well past the smile
    /// threshold (mouth curve 30 on a 200px face).
    fn smiling_points() -> Vec<(f64, f64)> {
        let mut points = neutral_points();
        points[0] = (100.0, 130.0);
        points[17] = (100.0, 130.0);
        points[61] = (80.0, 100.0);
        points[291] = (120.0, 100.0);
        points
    }

    #[tokio::test]
    async fn test_calibrate_command_acks_immediately() {
        let mut session = MoodSession::new(
            Arc::new(DisabledLandmarkProvider::new()),
            default_client(),
            Instant::now(),
        );
        let result = session
            .handle_text(r#"{"action": "calibrate"}"#, Instant::now())
            .await
            .unwrap();
        assert_eq!(result.mood, "Calibrating...");
        assert_eq!(result.score, 0);
    }

    #[tokio::test]
    async fn test_unknown_command_dropped_silently() {
        let mut session = MoodSession::new(
            Arc::new(DisabledLandmarkProvider::new()),
            default_client(),
            Instant::now(),
        );
        let result = session
            .handle_text(r#"{"action": "reset"}"#, Instant::now())
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_undecodable_frame_skipped() {
        let mut session = MoodSession::new(
            Arc::new(DisabledLandmarkProvider::new()),
            default_client(),
            Instant::now(),
        );
        assert!(session.handle_text("!!!not-base64!!!", Instant::now()).await.is_none());
        // Valid base64 that is not an image is also skipped.
        let garbage = BASE64.encode(b"hello world");
        assert!(session.handle_text(&garbage, Instant::now()).await.is_none());
    }

    #[tokio::test]
    async fn test_warmup_frames_report_searching() {
        let t0 = Instant::now();
        let mut session = MoodSession::new(
            Arc::new(StaticProvider::new(neutral_points())),
            default_client(),
            t0,
        );
        let result = session.handle_text(&frame_payload(), t0).await.unwrap();
        assert!(!result.face_detected);
        assert_eq!(result.mood, "Searching...");
        assert_eq!(result.score, 0);
    }

    #[tokio::test]
    async fn test_no_face_reports_searching() {
        let t0 = Instant::now();
        let mut session = MoodSession::new(
            Arc::new(DisabledLandmarkProvider::new()),
            default_client(),
            t0,
        );
        let after_warmup = t0 + Duration::from_secs(3);
        let result = session
            .handle_text(&frame_payload(), after_warmup)
            .await
            .unwrap();
        assert!(!result.face_detected);
        assert_eq!(result.mood, "Searching...");
    }

    #[tokio::test]
    async fn test_calibration_progress_at_halfway() {
        let t0 = Instant::now();
        let mut session = MoodSession::new(
            Arc::new(StaticProvider::new(neutral_points())),
            default_client(),
            t0,
        );
        let now = t0 + Duration::from_secs(3);
        let _ = session.handle_text(r#"{"action": "calibrate"}"#, now).await;

        let payload = frame_payload();
        let mut last = None;
        for _ in 0..20 {
            last = session.handle_text(&payload, now).await;
        }
        let result = last.unwrap();
        assert!(result.face_detected);
        assert_eq!(result.mood, "Calibrating...");
        assert_eq!(result.score, 50);
    }

    #[tokio::test]
    async fn test_smile_after_calibration_reads_happy() {
        let t0 = Instant::now();
        let provider = Arc::new(StaticProvider::new(neutral_points()));
        let mut session = MoodSession::new(provider.clone(), default_client(), t0);
        let now = t0 + Duration::from_secs(3);
        let payload = frame_payload();

        // Calibrate on the neutral face.
        let _ = session.handle_text(r#"{"action": "calibrate"}"#, now).await;
        for _ in 0..40 {
            let _ = session.handle_text(&payload, now).await;
        }

        // Then smile: delta_mouth converges toward 30 > 0.06 * 200.
        provider.set_points(smiling_points());
        let mut result = None;
        for _ in 0..6 {
            result = session.handle_text(&payload, now).await;
        }
        let result = result.unwrap();
        assert!(result.face_detected);
        assert_eq!(result.mood, "Happy");
        assert_eq!(result.score, 95);
        assert_eq!(result.conclusion, "Bright smile!");
    }

    #[tokio::test]
    async fn test_neutral_face_reads_focused() {
        // Zeroed EAR with a zeroed baseline guards relative drop to 0,
        // which lands in the Focused bucket.
        let t0 = Instant::now();
        let mut session = MoodSession::new(
            Arc::new(StaticProvider::new(neutral_points())),
            default_client(),
            t0,
        );
        let now = t0 + Duration::from_secs(3);
        let payload = frame_payload();

        let _ = session.handle_text(r#"{"action": "calibrate"}"#, now).await;
        for _ in 0..40 {
            let _ = session.handle_text(&payload, now).await;
        }

        let result = session.handle_text(&payload, now).await.unwrap();
        assert_eq!(result.mood, "Focused");
        assert_eq!(result.score, 90);
        assert!(result.user_profile.is_some());
    }

    #[test]
    fn test_decode_frame_without_prefix() {
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(RgbImage::new(2, 2))
            .write_to(&mut Cursor::new(&mut buf), image::ImageOutputFormat::Png)
            .unwrap();
        let image = decode_frame(&BASE64.encode(buf)).unwrap();
        assert_eq!(image.dimensions(), (2, 2));
    }
}
