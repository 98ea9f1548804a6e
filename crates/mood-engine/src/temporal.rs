//! Temporal smoothing and blink detection.
//!
//! Timestamps are injected by the caller so the blink machine can be
//! exercised in tests without sleeping.

use std::time::{Duration, Instant};

/// EMA weight for new samples. 0.6 trades noise rejection for
/// responsiveness; raising it toward 1 makes the output track raw frames
/// more closely at the cost of jitter.
pub const SMOOTHING_ALPHA: f64 = 0.6;

/// Relative eyelid drop above which the eye counts as closed.
pub const BLINK_DROP_THRESHOLD: f64 = 0.35;

/// Closed intervals at or below this duration are measurement noise,
/// not blinks.
pub const BLINK_MIN_DURATION: Duration = Duration::from_millis(80);

/// Exponential moving average over a single scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ema {
    value: f64,
}

impl Ema {
    pub fn new(initial: f64) -> Self {
        Self { value: initial }
    }

    /// Fold in a raw sample and return the new smoothed value.
    pub fn update(&mut self, raw: f64) -> f64 {
        self.value = raw * SMOOTHING_ALPHA + self.value * (1.0 - SMOOTHING_ALPHA);
        self.value
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Reset the accumulator, e.g. to a freshly calibrated baseline.
    pub fn reset(&mut self, value: f64) {
        self.value = value;
    }
}

/// Relative eyelid drop versus a calibrated baseline; 0 when the baseline
/// is unusable.
pub fn relative_drop(smoothed_ear: f64, baseline_ear: f64) -> f64 {
    if baseline_ear > 0.0 {
        1.0 - smoothed_ear / baseline_ear
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EyeState {
    Open,
    Closed { since: Instant },
}

/// Two-state blink machine with debounce.
///
/// A blink is counted on the CLOSED -> OPEN transition, and only when the
/// closed interval outlasted [`BLINK_MIN_DURATION`]. The completed blink's
/// duration is reported exactly once, on the transition frame.
#[derive(Debug, Clone)]
pub struct BlinkMonitor {
    state: EyeState,
    count: u32,
}

impl BlinkMonitor {
    pub fn new() -> Self {
        Self {
            state: EyeState::Open,
            count: 0,
        }
    }

    /// Advance the machine with this frame's relative drop. Returns the
    /// duration (seconds) of a blink completing on this frame, else 0.
    pub fn update(&mut self, relative_drop: f64, now: Instant) -> f64 {
        match self.state {
            EyeState::Open => {
                if relative_drop > BLINK_DROP_THRESHOLD {
                    self.state = EyeState::Closed { since: now };
                }
                0.0
            }
            EyeState::Closed { since } => {
                if relative_drop > BLINK_DROP_THRESHOLD {
                    return 0.0;
                }
                self.state = EyeState::Open;
                let duration = now.duration_since(since);
                if duration > BLINK_MIN_DURATION {
                    self.count += 1;
                    duration.as_secs_f64()
                } else {
                    0.0
                }
            }
        }
    }

    /// Blinks counted so far this session. Monotonically non-decreasing.
    pub fn count(&self) -> u32 {
        self.count
    }
}

impl Default for BlinkMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_converges_to_constant_input() {
        for initial in [0.0, 0.3, 5.0, -2.0] {
            let mut ema = Ema::new(initial);
            for _ in 0..40 {
                ema.update(0.25);
            }
            assert!(
                (ema.value() - 0.25).abs() < 1e-6,
                "did not converge from {initial}"
            );
        }
    }

    #[test]
    fn test_ema_single_step() {
        let mut ema = Ema::new(0.0);
        assert!((ema.update(1.0) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_relative_drop_guard() {
        assert_eq!(relative_drop(0.2, 0.0), 0.0);
        assert_eq!(relative_drop(0.2, -0.1), 0.0);
        assert!((relative_drop(0.15, 0.30) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_blink_exact_debounce_is_noise() {
        let mut monitor = BlinkMonitor::new();
        let t0 = Instant::now();
        monitor.update(0.5, t0);
        // Exactly 0.08s closed does not count.
        let dur = monitor.update(0.1, t0 + Duration::from_millis(80));
        assert_eq!(dur, 0.0);
        assert_eq!(monitor.count(), 0);
    }

    #[test]
    fn test_blink_just_past_debounce_counts() {
        let mut monitor = BlinkMonitor::new();
        let t0 = Instant::now();
        monitor.update(0.5, t0);
        let dur = monitor.update(0.1, t0 + Duration::from_millis(81));
        assert!((dur - 0.081).abs() < 1e-9);
        assert_eq!(monitor.count(), 1);
    }

    #[test]
    fn test_blink_duration_reported_once() {
        let mut monitor = BlinkMonitor::new();
        let t0 = Instant::now();
        monitor.update(0.5, t0);
        let dur = monitor.update(0.1, t0 + Duration::from_millis(200));
        assert!(dur > 0.0);
        // Subsequent open frames report zero again.
        assert_eq!(monitor.update(0.1, t0 + Duration::from_millis(300)), 0.0);
        assert_eq!(monitor.count(), 1);
    }

    #[test]
    fn test_blink_threshold_boundary() {
        let mut monitor = BlinkMonitor::new();
        let t0 = Instant::now();
        // Exactly at the threshold stays open.
        monitor.update(BLINK_DROP_THRESHOLD, t0);
        assert_eq!(monitor.count(), 0);
        monitor.update(BLINK_DROP_THRESHOLD + 0.01, t0);
        monitor.update(0.0, t0 + Duration::from_millis(150));
        assert_eq!(monitor.count(), 1);
    }

    #[test]
    fn test_closed_frames_keep_reporting_zero() {
        let mut monitor = BlinkMonitor::new();
        let t0 = Instant::now();
        monitor.update(0.5, t0);
        assert_eq!(monitor.update(0.5, t0 + Duration::from_millis(50)), 0.0);
        assert_eq!(monitor.update(0.5, t0 + Duration::from_millis(100)), 0.0);
        let dur = monitor.update(0.0, t0 + Duration::from_millis(500));
        assert!((dur - 0.5).abs() < 1e-9);
    }
}
