//! Majority-vote mood debouncing.
//!
//! Owned by a single session; never shared across connections.

use std::collections::VecDeque;

use mood_models::MoodLabel;

/// Size of the recent-history vote window.
pub const VOTE_WINDOW: usize = 10;

/// Votes required for a label to win outright (strict majority).
const MAJORITY: usize = VOTE_WINDOW / 2;

/// Fixed-size FIFO of recent raw moods with majority voting.
#[derive(Debug, Clone, Default)]
pub struct MoodVoteBuffer {
    history: VecDeque<MoodLabel>,
}

impl MoodVoteBuffer {
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(VOTE_WINDOW),
        }
    }

    /// Push this frame's raw mood and return the debounced final mood.
    ///
    /// A label needs more than half the window to win; otherwise the most
    /// recently pushed raw label is used. An urgent raw mood (Exhausted)
    /// bypasses the vote entirely.
    pub fn vote(&mut self, raw: MoodLabel) -> MoodLabel {
        if self.history.len() == VOTE_WINDOW {
            self.history.pop_front();
        }
        self.history.push_back(raw);

        if raw.is_urgent() {
            return raw;
        }

        let (dominant, count) = self.dominant();
        if count > MAJORITY {
            dominant
        } else {
            self.history.back().copied().unwrap_or(MoodLabel::Neutral)
        }
    }

    /// Most frequent label in the window and its count.
    fn dominant(&self) -> (MoodLabel, usize) {
        let mut best = (MoodLabel::Neutral, 0);
        for &label in &self.history {
            let count = self.history.iter().filter(|&&l| l == label).count();
            if count > best.1 {
                best = (label, count);
            }
        }
        best
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
