//! Judging backend port.
//!
//! The judging backend is an opaque "language model" capability that scores
//! one artifact against evaluation criteria. The pipeline never interprets
//! failures as fatal: the judge service degrades every [`BackendError`] to
//! an all-zero verdict so one bad candidate cannot abort a batch.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::backend::BackendError;
use crate::domain::models::Dimension;

// ---------------------------------------------------------------------------
// EvaluationCriteria
// ---------------------------------------------------------------------------

/// What the candidate is being judged against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationCriteria {
    /// The task the artifact is supposed to accomplish.
    pub task: String,
    /// Individual requirements the rubric should weigh.
    pub requirements: Vec<String>,
}

impl EvaluationCriteria {
    /// Criteria with a task description and no itemized requirements.
    pub fn for_task(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            requirements: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// RawJudgment
// ---------------------------------------------------------------------------

/// Raw output of one judging call, before rubric normalization.
///
/// Implementations must degrade missing or malformed per-dimension fields
/// to a score of 0 rather than raising; the judge service additionally
/// treats absent dimensions as 0 and clamps everything into `[0, 100]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawJudgment {
    /// Per-dimension scores, possibly partial.
    pub scores: HashMap<Dimension, f64>,
    /// Free-text reasoning from the backend.
    pub reasoning: String,
}

// ---------------------------------------------------------------------------
// JudgeBackend
// ---------------------------------------------------------------------------

/// Port trait for the judging backend.
///
/// Implementations are stateless per call and must be safe to invoke
/// concurrently (`Send + Sync` across tokio tasks).
#[async_trait]
pub trait JudgeBackend: Send + Sync {
    /// Stable identity recorded on every verdict this backend produces.
    fn backend_id(&self) -> &str;

    /// Score one artifact against the criteria.
    async fn judge(
        &self,
        source: &str,
        criteria: &EvaluationCriteria,
        context: Option<&serde_json::Value>,
    ) -> Result<RawJudgment, BackendError>;
}
