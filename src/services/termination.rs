//! Cost-aware termination policy for one refinement line.
//!
//! A pure function of the line's [`RefinementHistory`]; no external calls.
//! The rules run in a fixed priority order so a regressing line stops for
//! the most specific applicable reason: the minimum-rounds floor first,
//! then the hard round cap, then degradation and plateau detection, and
//! only then the generic improvement threshold.

use serde::{Deserialize, Serialize};

use crate::domain::models::{RefinementHistory, TerminationConfig};

// ---------------------------------------------------------------------------
// StopReason / TerminationVerdict
// ---------------------------------------------------------------------------

/// Why a refinement line was stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The hard round cap was reached.
    MaxRounds,
    /// The last three scores were strictly declining.
    Degradation,
    /// Recent scores are statistically flat.
    Plateau,
    /// Average per-round improvement fell below the threshold.
    InsufficientImprovement,
}

impl StopReason {
    /// Human-readable reason recorded in logs and session summaries.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MaxRounds => "max rounds",
            Self::Degradation => "degradation",
            Self::Plateau => "plateau",
            Self::InsufficientImprovement => "insufficient improvement",
        }
    }
}

/// Continue/stop decision for one refinement line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationVerdict {
    /// Keep refining.
    Continue,
    /// Stop, for the given reason.
    Stop(StopReason),
}

impl TerminationVerdict {
    /// Whether the line should stop.
    pub fn should_stop(self) -> bool {
        matches!(self, Self::Stop(_))
    }
}

// ---------------------------------------------------------------------------
// TerminationPolicy
// ---------------------------------------------------------------------------

/// The fixed-priority termination rule set.
#[derive(Debug, Clone, Default)]
pub struct TerminationPolicy {
    config: TerminationConfig,
}

impl TerminationPolicy {
    /// Create a policy with the given thresholds.
    pub fn new(config: TerminationConfig) -> Self {
        Self { config }
    }

    /// Decide whether the line should continue or stop.
    ///
    /// Rule order is part of the contract: degradation and plateau are
    /// checked before the generic improvement threshold so a regressing
    /// line stops for the more specific reason.
    pub fn evaluate(&self, history: &RefinementHistory) -> TerminationVerdict {
        let rounds = history.rounds();

        // 1. Minimum-rounds floor dominates everything.
        if rounds < self.config.min_rounds {
            return TerminationVerdict::Continue;
        }

        // 2. Hard round cap.
        if rounds >= self.config.max_rounds {
            return TerminationVerdict::Stop(StopReason::MaxRounds);
        }

        // 3. Degradation: last three scores strictly declining.
        let last3 = history.last_scores(3);
        if last3.len() == 3 && last3[0] > last3[1] && last3[1] > last3[2] {
            return TerminationVerdict::Stop(StopReason::Degradation);
        }

        let window = history.last_scores(self.config.lookback_window);

        // 4. Plateau: the recent window is statistically flat.
        if window.len() >= 2 && variance(&window) < self.config.plateau_variance {
            return TerminationVerdict::Stop(StopReason::Plateau);
        }

        // 5. Insufficient improvement across the window.
        if window.len() >= 2 {
            let avg_delta = (window[window.len() - 1] - window[0]) / (window.len() - 1) as f64;
            if avg_delta < self.config.improvement_threshold {
                return TerminationVerdict::Stop(StopReason::InsufficientImprovement);
            }
        }

        TerminationVerdict::Continue
    }
}

/// Population variance of a score slice.
fn variance(scores: &[f64]) -> f64 {
    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    scores.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / n
}

// =========================================================================
// Tests
// =========================================================================
