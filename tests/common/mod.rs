//! Common test utilities for integration tests
//!
//! Provides shared test doubles used across multiple integration test
//! files: a scripted judge, a deterministic edit generator, and a
//! scripted review workflow.

use std::collections::HashMap;

use async_trait::async_trait;

use crucible::domain::models::{Candidate, Dimension, GenerationStrategy, SafetyReport};
use crucible::domain::ports::{
    BackendError, EditProposal, EvaluationCriteria, RawJudgment, ReviewVerdict,
};
use crucible::{HypothesisGenerator, JudgeBackend, ReviewWorkflow};

/// Judge scripted by exact source text; unknown sources score 10.
pub struct TableJudge {
    table: HashMap<String, f64>,
}

impl TableJudge {
    pub fn new(pairs: &[(&str, f64)]) -> Self {
        Self {
            table: pairs.iter().map(|(s, v)| ((*s).to_string(), *v)).collect(),
        }
    }
}

#[async_trait]
impl JudgeBackend for TableJudge {
    fn backend_id(&self) -> &str {
        "table-judge"
    }

    async fn judge(
        &self,
        source: &str,
        _criteria: &EvaluationCriteria,
        _context: Option<&serde_json::Value>,
    ) -> Result<RawJudgment, BackendError> {
        let score = self.table.get(source).copied().unwrap_or(10.0);
        Ok(RawJudgment {
            scores: Dimension::ALL.iter().map(|&d| (d, score)).collect(),
            reasoning: format!("scripted score {score}"),
        })
    }
}

/// Deterministic generator emitting `<parent>+<strategy><i>` edits.
pub struct SuffixGenerator;

#[async_trait]
impl HypothesisGenerator for SuffixGenerator {
    async fn propose(
        &self,
        source: &str,
        _task: &str,
        strategy: GenerationStrategy,
        n: usize,
    ) -> Result<Vec<EditProposal>, BackendError> {
        Ok((0..n)
            .map(|i| EditProposal {
                code: format!("{source}+{}{i}", strategy.as_str()),
                hypothesis: format!("edit {i}"),
                reasoning: String::new(),
            })
            .collect())
    }
}

/// Review workflow that always answers with a fixed verdict.
pub struct ScriptedReview {
    pub approved: bool,
}

#[async_trait]
impl ReviewWorkflow for ScriptedReview {
    async fn request_review(
        &self,
        _report: &SafetyReport,
        _candidate: &Candidate,
    ) -> Result<ReviewVerdict, BackendError> {
        Ok(ReviewVerdict {
            approved: self.approved,
            reviewer: "integration-reviewer".to_string(),
            comment: Some("scripted verdict".to_string()),
        })
    }
}
