//! Score ledger - the only writer of the session score

use serde::{Deserialize, Serialize};

use crate::core::types::SimTime;

/// Why the score changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreReason {
    RecipeCompleted,
    MealDelivered,
    CutCancelled,
    DividerTimeout,
    MealMissed,
    Trashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub reason: ScoreReason,
    pub delta: i32,
    pub at: SimTime,
}

/// Running score plus the history of every delta applied to it.
///
/// No clamping: the score may go negative.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreLedger {
    initial: i32,
    score: i32,
    history: Vec<ScoreEntry>,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial(initial: i32) -> Self {
        Self { initial, score: initial, history: Vec::new() }
    }

    /// Apply a delta and return the new score
    pub fn add_points(&mut self, delta: i32, reason: ScoreReason, at: SimTime) -> i32 {
        self.score += delta;
        self.history.push(ScoreEntry { reason, delta, at });
        self.score
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn history(&self) -> &[ScoreEntry] {
        &self.history
    }

    /// Recompute the score from the initial value and the recorded deltas
    pub fn replay(&self) -> i32 {
        self.initial + self.history.iter().map(|entry| entry.delta).sum::<i32>()
    }

    /// Sum of deltas recorded for one reason
    pub fn total_for(&self, reason: ScoreReason) -> i32 {
        self.history
            .iter()
            .filter(|entry| entry.reason == reason)
            .map(|entry| entry.delta)
            .sum()
    }

    pub fn reset(&mut self) {
        self.score = self.initial;
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_can_go_negative() {
        let mut ledger = ScoreLedger::new();
        assert_eq!(ledger.add_points(-5, ScoreReason::Trashed, SimTime(100)), -5);
        assert_eq!(ledger.add_points(-10, ScoreReason::DividerTimeout, SimTime(200)), -15);
        assert_eq!(ledger.score(), -15);
    }

    #[test]
    fn test_replay_matches_score() {
        let mut ledger = ScoreLedger::with_initial(20);
        ledger.add_points(50, ScoreReason::RecipeCompleted, SimTime(1));
        ledger.add_points(-5, ScoreReason::CutCancelled, SimTime(2));
        ledger.add_points(40, ScoreReason::MealDelivered, SimTime(3));
        assert_eq!(ledger.score(), 105);
        assert_eq!(ledger.replay(), ledger.score());
        assert_eq!(ledger.total_for(ScoreReason::CutCancelled), -5);
    }

    #[test]
    fn test_reset_restores_initial() {
        let mut ledger = ScoreLedger::with_initial(7);
        ledger.add_points(50, ScoreReason::RecipeCompleted, SimTime(1));
        ledger.reset();
        assert_eq!(ledger.score(), 7);
        assert!(ledger.history().is_empty());
    }
}
