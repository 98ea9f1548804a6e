//! Instantaneous mood classification.
//!
//! An ordered decision list: rules are evaluated top to bottom and the
//! first match wins, so the slice order *is* the priority order. All
//! pixel-delta thresholds scale with `face_width` to stay invariant across
//! camera distance. The positive mouth threshold is deliberately smaller
//! in magnitude than the negative mouth/brow thresholds: smiles should
//! trigger easily, sad/angry only on a strong deviation.

use mood_models::MoodLabel;

/// Smile threshold as a fraction of face width.
pub const HAPPY_MOUTH_FACTOR: f64 = 0.06;
/// Frown (sad) threshold, negative direction.
pub const SAD_MOUTH_FACTOR: f64 = -0.06;
/// Brow squeeze threshold, negative direction.
pub const ANGRY_BROW_FACTOR: f64 = -0.08;
/// Raised-brow threshold for surprise.
pub const SURPRISE_BROW_FACTOR: f64 = 0.16;
/// Blink duration (seconds) indicating exhaustion.
pub const EXHAUSTED_BLINK_SECS: f64 = 0.4;
/// Relative eyelid drop indicating exhaustion.
pub const EXHAUSTED_DROP: f64 = 0.45;
/// Gaze ratio band considered attentive.
pub const GAZE_LOW: f64 = 0.35;
pub const GAZE_HIGH: f64 = 0.65;
/// Relative drop indicating tiredness.
pub const TIRED_DROP: f64 = 0.25;
/// Relative drop below which the user counts as focused.
pub const FOCUSED_DROP: f64 = 0.08;

/// Feature view consumed by the decision list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierInput {
    /// Smoothed mouth curve minus calibrated baseline.
    pub delta_mouth: f64,
    /// Smoothed brow squeeze minus calibrated baseline.
    pub delta_brow: f64,
    pub brow_height: f64,
    pub face_width: f64,
    pub relative_drop: f64,
    /// Duration of a blink completing this frame, 0 otherwise.
    pub blink_duration: f64,
    pub gaze_ratio: f64,
}

/// Raw classification for one frame, before debouncing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub mood: MoodLabel,
    pub conclusion: &'static str,
    pub recommendations: &'static [&'static str],
}

struct Rule {
    applies: fn(&ClassifierInput) -> bool,
    mood: MoodLabel,
    conclusion: &'static str,
    recommendations: &'static [&'static str],
}

fn is_happy(i: &ClassifierInput) -> bool {
    i.delta_mouth > HAPPY_MOUTH_FACTOR * i.face_width
}

fn is_angry(i: &ClassifierInput) -> bool {
    i.delta_brow < ANGRY_BROW_FACTOR * i.face_width
}

fn is_surprised(i: &ClassifierInput) -> bool {
    i.brow_height > SURPRISE_BROW_FACTOR * i.face_width
}

fn is_sad(i: &ClassifierInput) -> bool {
    i.delta_mouth < SAD_MOUTH_FACTOR * i.face_width
}

fn is_exhausted(i: &ClassifierInput) -> bool {
    i.blink_duration > EXHAUSTED_BLINK_SECS || i.relative_drop > EXHAUSTED_DROP
}

fn is_distracted(i: &ClassifierInput) -> bool {
    i.gaze_ratio < GAZE_LOW || i.gaze_ratio > GAZE_HIGH
}

fn is_tired(i: &ClassifierInput) -> bool {
    i.relative_drop > TIRED_DROP
}

fn is_focused(i: &ClassifierInput) -> bool {
    i.relative_drop < FOCUSED_DROP
}

/// Priority-ordered decision list; first match wins.
const RULES: &[Rule] = &[
    Rule {
        applies: is_happy,
        mood: MoodLabel::Happy,
        conclusion: "Bright smile!",
        recommendations: &["Keep shining!"],
    },
    Rule {
        applies: is_angry,
        mood: MoodLabel::AngrySerious,
        conclusion: "Sharply furrowed brow.",
        recommendations: &[],
    },
    Rule {
        applies: is_surprised,
        mood: MoodLabel::Surprised,
        conclusion: "Startled expression.",
        recommendations: &[],
    },
    Rule {
        applies: is_sad,
        mood: MoodLabel::Sad,
        conclusion: "Looking gloomy.",
        recommendations: &[],
    },
    Rule {
        applies: is_exhausted,
        mood: MoodLabel::Exhausted,
        conclusion: "Extreme fatigue!",
        recommendations: &["⚠️ Sleep now!"],
    },
    Rule {
        applies: is_distracted,
        mood: MoodLabel::Distracted,
        conclusion: "Eyes are wandering.",
        recommendations: &[],
    },
    Rule {
        applies: is_tired,
        mood: MoodLabel::Tired,
        conclusion: "Eyes getting heavy.",
        recommendations: &[],
    },
    Rule {
        applies: is_focused,
        mood: MoodLabel::Focused,
        conclusion: "Locked in.",
        recommendations: &[],
    },
];

/// Classify one frame's features into a raw mood.
pub fn classify(input: &ClassifierInput) -> Verdict {
    for rule in RULES {
        if (rule.applies)(input) {
            return Verdict {
                mood: rule.mood,
                conclusion: rule.conclusion,
                recommendations: rule.recommendations,
            };
        }
    }
    Verdict {
        mood: MoodLabel::Neutral,
        conclusion: "Composed expression.",
        recommendations: &[],
    }
}
