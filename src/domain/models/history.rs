//! Score history for one refinement line.
//!
//! A [`RefinementHistory`] is the ordered, append-only record of
//! `(round, score)` pairs the termination policy consumes. Rounds are
//! assigned by the history itself (1, 2, 3, ...), so strict ordering with
//! no gaps holds by construction. A history belongs exclusively to its
//! driving refinement line and is never shared.

use serde::{Deserialize, Serialize};

/// One recorded refinement round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundScore {
    /// 1-based round number.
    pub round: u32,
    /// The score observed that round, on the 0-100 CMP scale.
    pub score: f64,
}

/// Append-only `(round, score)` history for one refinement line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefinementHistory {
    entries: Vec<RoundScore>,
}

impl RefinementHistory {
    /// An empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history from raw scores, numbering rounds from 1.
    pub fn from_scores(scores: &[f64]) -> Self {
        let mut history = Self::new();
        for &score in scores {
            history.record(score);
        }
        history
    }

    /// Append the next round's score.
    pub fn record(&mut self, score: f64) -> RoundScore {
        let entry = RoundScore {
            round: self.entries.len() as u32 + 1,
            score,
        };
        self.entries.push(entry);
        entry
    }

    /// Number of rounds recorded so far.
    pub fn rounds(&self) -> usize {
        self.entries.len()
    }

    /// All entries in round order.
    pub fn entries(&self) -> &[RoundScore] {
        &self.entries
    }

    /// The last `n` scores in round order (all of them if fewer exist).
    pub fn last_scores(&self, n: usize) -> Vec<f64> {
        let start = self.entries.len().saturating_sub(n);
        self.entries[start..].iter().map(|e| e.score).collect()
    }

    /// The most recent score, if any round was recorded.
    pub fn latest(&self) -> Option<f64> {
        self.entries.last().map(|e| e.score)
    }
}

// =========================================================================
// Tests
// =========================================================================
