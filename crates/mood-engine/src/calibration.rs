//! Per-user baseline calibration.

/// Frames accumulated before baselines are computed.
pub const CALIBRATION_TARGET_FRAMES: usize = 40;

/// Per-user reference values for the delta computations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baselines {
    pub ear: f64,
    pub mouth: f64,
    pub brow: f64,
}

impl Default for Baselines {
    /// Sane priors used until the first calibration completes.
    fn default() -> Self {
        Self {
            ear: 0.30,
            mouth: 0.0,
            brow: 0.0,
        }
    }
}

/// Outcome of feeding one frame into an active calibration cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationStep {
    /// Still accumulating; progress is floor(100 * len / target).
    InProgress { progress: u8 },
    /// Target reached on this frame; baselines are the buffer means.
    Completed(Baselines),
}

impl CalibrationStep {
    /// Progress percentage carried by this step (100 on completion).
    pub fn progress(&self) -> u8 {
        match self {
            CalibrationStep::InProgress { progress } => *progress,
            CalibrationStep::Completed(_) => 100,
        }
    }
}

/// Accumulates raw (EAR, mouth, brow) tuples into per-user baselines.
///
/// There is no timeout: a stalled frame supply simply leaves the cycle
/// pending, and `start()` is idempotent so a client can re-issue it.
#[derive(Debug, Clone, Default)]
pub struct Calibrator {
    buffer: Vec<(f64, f64, f64)>,
    active: bool,
}

impl Calibrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin (or restart) a calibration cycle with an empty buffer.
    pub fn start(&mut self) {
        self.buffer.clear();
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Feed one frame's raw measurements. Panics in debug builds if the
    /// cycle is not active; callers gate on `is_active()`.
    pub fn ingest(&mut self, raw_ear: f64, raw_mouth: f64, raw_brow: f64) -> CalibrationStep {
        debug_assert!(self.active, "ingest outside an active calibration cycle");

        self.buffer.push((raw_ear, raw_mouth, raw_brow));

        if self.buffer.len() >= CALIBRATION_TARGET_FRAMES {
            let n = self.buffer.len() as f64;
            let (sum_ear, sum_mouth, sum_brow) = self.buffer.iter().fold(
                (0.0, 0.0, 0.0),
                |(e, m, b), &(ear, mouth, brow)| (e + ear, m + mouth, b + brow),
            );
            let baselines = Baselines {
                ear: sum_ear / n,
                mouth: sum_mouth / n,
                brow: sum_brow / n,
            };
            self.buffer.clear();
            self.active = false;
            return CalibrationStep::Completed(baselines);
        }

        let progress = (100 * self.buffer.len() / CALIBRATION_TARGET_FRAMES) as u8;
        CalibrationStep::InProgress { progress }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_tuples_yield_exact_baselines() {
        let mut calibrator = Calibrator::new();
        calibrator.start();

        for i in 1..CALIBRATION_TARGET_FRAMES {
            let step = calibrator.ingest(0.28, 1.5, 22.0);
            assert!(
                matches!(step, CalibrationStep::InProgress { .. }),
                "completed early at frame {i}"
            );
            assert!(calibrator.is_active());
        }

        let step = calibrator.ingest(0.28, 1.5, 22.0);
        match step {
            CalibrationStep::Completed(baselines) => {
                assert_eq!(baselines.ear, 0.28);
                assert_eq!(baselines.mouth, 1.5);
                assert_eq!(baselines.brow, 22.0);
            }
            other => panic!("expected completion on frame 40, got {other:?}"),
        }
        assert!(!calibrator.is_active());
    }

    #[test]
    fn test_progress_is_floored_percentage() {
        let mut calibrator = Calibrator::new();
        calibrator.start();

        for _ in 0..20 {
            calibrator.ingest(0.3, 0.0, 20.0);
        }
        let step = calibrator.ingest(0.3, 0.0, 20.0);
        // 21/40 -> 52.5 floors to 52.
        assert_eq!(step.progress(), 52);
    }

    #[test]
    fn test_halfway_progress() {
        let mut calibrator = Calibrator::new();
        calibrator.start();
        let mut last = 0;
        for _ in 0..20 {
            last = calibrator.ingest(0.3, 0.0, 20.0).progress();
        }
        assert_eq!(last, 50);
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut calibrator = Calibrator::new();
        calibrator.start();
        for _ in 0..30 {
            calibrator.ingest(0.3, 0.0, 20.0);
        }
        // Restart discards the partial buffer.
        calibrator.start();
        assert!(calibrator.is_active());
        let step = calibrator.ingest(0.3, 0.0, 20.0);
        assert_eq!(step.progress(), 2);
    }

    #[test]
    fn test_default_baselines_priors() {
        let baselines = Baselines::default();
        assert_eq!(baselines.ear, 0.30);
        assert_eq!(baselines.mouth, 0.0);
        assert_eq!(baselines.brow, 0.0);
    }
}
