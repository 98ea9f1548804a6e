//! Per-session detector state and frame orchestration.
//!
//! One `MoodDetector` exists per connection and is mutated only by that
//! connection's task. It owns the EMA accumulators, calibration state and
//! blink machine; classification and vote debouncing sit downstream.

use std::time::{Duration, Instant};

use crate::calibration::{Baselines, CalibrationStep, Calibrator};
use crate::geometry::FrameMeasurement;
use crate::temporal::{relative_drop, BlinkMonitor, Ema};

/// Frames inside this grace period after session start produce no result.
pub const WARMUP: Duration = Duration::from_secs(2);

/// Result of feeding one measured frame into the detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// Frame was consumed by an active calibration cycle.
    Calibrating { progress: u8 },
    /// Frame was smoothed and is ready for classification.
    Measured(MeasuredFrame),
}

/// Smoothed, baseline-relative view of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasuredFrame {
    pub measurement: FrameMeasurement,
    pub smoothed_ear: f64,
    pub relative_drop: f64,
    pub delta_mouth: f64,
    pub delta_brow: f64,
    pub blink_count: u32,
    /// Seconds; non-zero only on the frame a blink completed.
    pub blink_duration: f64,
}

/// All mutable per-session pipeline state.
#[derive(Debug, Clone)]
pub struct MoodDetector {
    started: Instant,
    frame_count: u64,
    smooth_ear: Ema,
    smooth_mouth: Ema,
    smooth_brow: Ema,
    baselines: Baselines,
    calibrator: Calibrator,
    blinks: BlinkMonitor,
}

impl MoodDetector {
    pub fn new(now: Instant) -> Self {
        let baselines = Baselines::default();
        Self {
            started: now,
            frame_count: 0,
            smooth_ear: Ema::new(baselines.ear),
            smooth_mouth: Ema::new(baselines.mouth),
            smooth_brow: Ema::new(baselines.brow),
            baselines,
            calibrator: Calibrator::new(),
            blinks: BlinkMonitor::new(),
        }
    }

    /// True while the session is inside the startup grace period; callers
    /// skip detection entirely and report "no result yet".
    pub fn is_warming_up(&self, now: Instant) -> bool {
        now.duration_since(self.started) < WARMUP
    }

    /// Frames processed so far (with a face present).
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Begin (or restart) baseline calibration. Smoothing and vote history
    /// are left untouched and resume after completion.
    pub fn start_calibration(&mut self) {
        self.calibrator.start();
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibrator.is_active()
    }

    /// Feed one frame's raw measurements through the pipeline.
    pub fn observe(&mut self, m: FrameMeasurement, now: Instant) -> FrameOutcome {
        self.frame_count += 1;

        if self.calibrator.is_active() {
            let step = self.calibrator.ingest(m.ear, m.mouth_curve, m.brow_squeeze);
            if let CalibrationStep::Completed(baselines) = step {
                // Snap the accumulators to the fresh baselines so the next
                // frames don't ride out a transient from stale history.
                self.baselines = baselines;
                self.smooth_ear.reset(baselines.ear);
                self.smooth_mouth.reset(baselines.mouth);
                self.smooth_brow.reset(baselines.brow);
            }
            return FrameOutcome::Calibrating {
                progress: step.progress(),
            };
        }

        let smoothed_ear = self.smooth_ear.update(m.ear);
        let smoothed_mouth = self.smooth_mouth.update(m.mouth_curve);
        let smoothed_brow = self.smooth_brow.update(m.brow_squeeze);

        let drop = relative_drop(smoothed_ear, self.baselines.ear);
        let blink_duration = self.blinks.update(drop, now);

        FrameOutcome::Measured(MeasuredFrame {
            measurement: m,
            smoothed_ear,
            relative_drop: drop,
            delta_mouth: smoothed_mouth - self.baselines.mouth,
            delta_brow: smoothed_brow - self.baselines.brow,
            blink_count: self.blinks.count(),
            blink_duration,
        })
    }
}
