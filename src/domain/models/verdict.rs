//! Judge verdicts and coherence-penalized aggregation.
//!
//! This module holds the scoring data model:
//!
//! - [`JudgeVerdict`] -- one evaluation of one candidate along the fixed
//!   dimension set, with an overall score in `[0, 100]`. A backend failure
//!   produces an all-zero verdict carrying a typed [`JudgeFailure`] instead
//!   of raising, so one bad candidate can never abort a batch.
//! - [`AggregateScore`] -- the coherent multi-perspective ("CMP") score:
//!   the mean of all verdicts for a candidate, penalized for inter-dimension
//!   disagreement.
//! - [`aggregate`] -- the pure function deriving an `AggregateScore` from a
//!   verdict list. Recomputed whenever a new verdict arrives.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Dimension / DimensionScores
// ---------------------------------------------------------------------------

/// The fixed evaluation dimension set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Correctness,
    Completeness,
    Efficiency,
    Safety,
}

impl Dimension {
    /// All dimensions, in rubric order.
    pub const ALL: [Dimension; 4] = [
        Dimension::Correctness,
        Dimension::Completeness,
        Dimension::Efficiency,
        Dimension::Safety,
    ];
}

/// Per-dimension scores for one verdict, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub correctness: f64,
    pub completeness: f64,
    pub efficiency: f64,
    pub safety: f64,
}

impl DimensionScores {
    /// Build from explicit values, clamping each into `[0, 100]`.
    pub fn new(correctness: f64, completeness: f64, efficiency: f64, safety: f64) -> Self {
        Self {
            correctness: correctness.clamp(0.0, 100.0),
            completeness: completeness.clamp(0.0, 100.0),
            efficiency: efficiency.clamp(0.0, 100.0),
            safety: safety.clamp(0.0, 100.0),
        }
    }

    /// The score for one dimension.
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Correctness => self.correctness,
            Dimension::Completeness => self.completeness,
            Dimension::Efficiency => self.efficiency,
            Dimension::Safety => self.safety,
        }
    }

    /// Arithmetic mean across the four dimensions.
    pub fn mean(&self) -> f64 {
        (self.correctness + self.completeness + self.efficiency + self.safety) / 4.0
    }
}

// ---------------------------------------------------------------------------
// JudgeFailure
// ---------------------------------------------------------------------------

/// Typed reason a judging call degraded to a zero verdict.
///
/// Replaces exception-based "judging failed" control flow: the aggregator
/// consumes failed and successful verdicts uniformly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgeFailure {
    /// The backend did not answer within its timeout.
    Timeout,
    /// The backend answered with output that could not be interpreted.
    Malformed,
    /// The backend refused the call for quota reasons.
    QuotaExceeded,
    /// The backend could not be reached at all.
    Unavailable,
}

// ---------------------------------------------------------------------------
// JudgeVerdict
// ---------------------------------------------------------------------------

/// One evaluation result for one candidate. Immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeVerdict {
    /// Overall score in `[0, 100]`: the arithmetic mean of the dimensions.
    pub overall: f64,
    /// Per-dimension scores.
    pub dimensions: DimensionScores,
    /// Free-text reasoning from the judging backend.
    pub reasoning: String,
    /// Identity of the judging backend that produced this verdict.
    pub backend: String,
    /// Present when the backend failed and the scores were zeroed.
    pub failure: Option<JudgeFailure>,
}

impl JudgeVerdict {
    /// A successful verdict; the overall score is derived from the
    /// dimensions.
    pub fn scored(dimensions: DimensionScores, reasoning: impl Into<String>, backend: impl Into<String>) -> Self {
        Self {
            overall: dimensions.mean(),
            dimensions,
            reasoning: reasoning.into(),
            backend: backend.into(),
            failure: None,
        }
    }

    /// An all-zero verdict recording a backend failure.
    pub fn failed(failure: JudgeFailure, backend: impl Into<String>) -> Self {
        Self {
            overall: 0.0,
            dimensions: DimensionScores::default(),
            reasoning: format!("judging backend failure: {failure:?}"),
            backend: backend.into(),
            failure: Some(failure),
        }
    }

    /// Whether this verdict came from a failed backend call.
    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

// ---------------------------------------------------------------------------
// AggregateScore
// ---------------------------------------------------------------------------

/// Default weight applied to the summed cross-dimension variance.
pub const DEFAULT_COHERENCE_WEIGHT: f64 = 0.15;

/// The coherent multi-perspective score for one candidate.
///
/// Derived from one or more verdicts; never stored stale. The adjusted
/// score is what search ranking, archival, and the release gate consume.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AggregateScore {
    /// Mean of the verdicts' overall scores.
    pub mean: f64,
    /// `weight x sum(per-dimension variance across verdicts)`.
    pub coherence_penalty: f64,
    /// `max(0, mean - coherence_penalty)`.
    pub adjusted: f64,
    /// How many verdicts were aggregated.
    pub verdict_count: usize,
}

/// Combine verdicts for one candidate into an [`AggregateScore`].
///
/// For each dimension the population variance of that dimension's scores
/// across the verdicts measures how much the perspectives disagree; the
/// penalty is the weighted sum of those variances. A single verdict yields
/// zero penalty by definition. An empty verdict list yields an all-zero
/// score.
pub fn aggregate(verdicts: &[JudgeVerdict], coherence_weight: f64) -> AggregateScore {
    if verdicts.is_empty() {
        return AggregateScore::default();
    }

    let n = verdicts.len() as f64;
    let mean = verdicts.iter().map(|v| v.overall).sum::<f64>() / n;

    let coherence_penalty = if verdicts.len() < 2 {
        0.0
    } else {
        let variance_sum: f64 = Dimension::ALL
            .iter()
            .map(|&dim| {
                let dim_mean =
                    verdicts.iter().map(|v| v.dimensions.get(dim)).sum::<f64>() / n;
                verdicts
                    .iter()
                    .map(|v| {
                        let delta = v.dimensions.get(dim) - dim_mean;
                        delta * delta
                    })
                    .sum::<f64>()
                    / n
            })
            .sum();
        coherence_weight * variance_sum
    };

    AggregateScore {
        mean,
        coherence_penalty,
        adjusted: (mean - coherence_penalty).max(0.0),
        verdict_count: verdicts.len(),
    }
}

// =========================================================================
// Tests
// =========================================================================
