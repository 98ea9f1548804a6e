//! Mood labels and the fixed label-to-score table.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A classified mood state.
///
/// Labels serialize as the exact strings the frontend displays, including
/// the combined "Angry / Serious" label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum MoodLabel {
    Happy,
    #[serde(rename = "Angry / Serious")]
    AngrySerious,
    Surprised,
    Sad,
    /// Urgent fatigue state; never debounced away.
    Exhausted,
    Distracted,
    Tired,
    Focused,
    Neutral,
}

impl MoodLabel {
    /// Returns the label as its display string.
    pub fn as_str(&self) -> &'static str {
        match self {
            MoodLabel::Happy => "Happy",
            MoodLabel::AngrySerious => "Angry / Serious",
            MoodLabel::Surprised => "Surprised",
            MoodLabel::Sad => "Sad",
            MoodLabel::Exhausted => "Exhausted",
            MoodLabel::Distracted => "Distracted",
            MoodLabel::Tired => "Tired",
            MoodLabel::Focused => "Focused",
            MoodLabel::Neutral => "Neutral",
        }
    }

    /// Fixed score mapping for the final (debounced) mood.
    pub fn score(&self) -> u8 {
        match self {
            MoodLabel::Happy => 95,
            MoodLabel::Focused => 90,
            MoodLabel::Neutral => 80,
            MoodLabel::Surprised => 75,
            MoodLabel::Distracted => 60,
            MoodLabel::Tired => 40,
            MoodLabel::Sad => 30,
            MoodLabel::AngrySerious => 20,
            MoodLabel::Exhausted => 10,
        }
    }

    /// True for states that must bypass the vote debouncer.
    pub fn is_urgent(&self) -> bool {
        matches!(self, MoodLabel::Exhausted)
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
