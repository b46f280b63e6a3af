//! Judge service: multi-dimensional candidate evaluation and aggregation.
//!
//! Wraps the judging backend port with the fixed four-dimension rubric.
//! Every evaluation returns a [`JudgeVerdict`] -- a backend failure
//! (timeout, malformed output, quota) is degraded to an all-zero verdict
//! carrying the typed failure reason, so batches never abort part-way.
//!
//! `evaluate_batch` issues all calls concurrently and returns results in
//! input order regardless of completion order.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::domain::models::{
    aggregate, AggregateScore, Candidate, Dimension, DimensionScores, JudgeConfig, JudgeFailure,
    JudgeVerdict,
};
use crate::domain::ports::{BackendError, EvaluationCriteria, JudgeBackend, RawJudgment};

/// Evaluation service over a judging backend.
///
/// Stateless per call; a single instance is safely shared across
/// concurrent evaluations.
pub struct JudgeService<B: JudgeBackend> {
    backend: Arc<B>,
    config: JudgeConfig,
}

impl<B: JudgeBackend> JudgeService<B> {
    /// Create a judge service over the given backend.
    pub fn new(backend: Arc<B>, config: JudgeConfig) -> Self {
        Self { backend, config }
    }

    /// Score one candidate against the criteria.
    ///
    /// Never fails: backend errors become all-zero verdicts recording the
    /// typed failure reason.
    pub async fn evaluate(
        &self,
        candidate: &Candidate,
        criteria: &EvaluationCriteria,
        context: Option<&serde_json::Value>,
    ) -> JudgeVerdict {
        let timeout = Duration::from_secs(self.config.timeout_secs);
        let call = self.backend.judge(&candidate.source, criteria, context);

        let outcome = match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout(self.config.timeout_secs)),
        };

        match outcome {
            Ok(judgment) => self.normalize(judgment),
            Err(err) => {
                warn!(backend = self.backend.backend_id(), error = %err, "judging call degraded to zero verdict");
                JudgeVerdict::failed(failure_reason(&err), self.backend.backend_id())
            }
        }
    }

    /// Score a batch of candidates concurrently.
    ///
    /// Output order matches input order; per-item failures are isolated
    /// into zero verdicts.
    pub async fn evaluate_batch(
        &self,
        candidates: &[Candidate],
        criteria: &EvaluationCriteria,
        context: Option<&serde_json::Value>,
    ) -> Vec<JudgeVerdict> {
        debug!(count = candidates.len(), "evaluating candidate batch");
        join_all(
            candidates
                .iter()
                .map(|candidate| self.evaluate(candidate, criteria, context)),
        )
        .await
    }

    /// Combine verdicts for one candidate into a coherence-penalized score.
    pub fn aggregate(&self, verdicts: &[JudgeVerdict]) -> AggregateScore {
        aggregate(verdicts, self.config.coherence_weight)
    }

    /// The coherence weight this service aggregates with.
    pub fn coherence_weight(&self) -> f64 {
        self.config.coherence_weight
    }

    /// Map raw backend output onto the fixed rubric: absent dimensions
    /// score 0, everything is clamped into `[0, 100]`.
    fn normalize(&self, judgment: RawJudgment) -> JudgeVerdict {
        let score_for = |dim: Dimension| judgment.scores.get(&dim).copied().unwrap_or(0.0);
        let dimensions = DimensionScores::new(
            score_for(Dimension::Correctness),
            score_for(Dimension::Completeness),
            score_for(Dimension::Efficiency),
            score_for(Dimension::Safety),
        );
        JudgeVerdict::scored(dimensions, judgment.reasoning, self.backend.backend_id())
    }
}

/// Map a backend error onto the closed failure set a verdict records.
fn failure_reason(err: &BackendError) -> JudgeFailure {
    match err {
        BackendError::Timeout(_) => JudgeFailure::Timeout,
        BackendError::Malformed(_) => JudgeFailure::Malformed,
        BackendError::QuotaExceeded(_) => JudgeFailure::QuotaExceeded,
        BackendError::Unavailable(_) => JudgeFailure::Unavailable,
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    /// Backend scripted per-source: a missing entry fails the call.
    struct ScriptedBackend {
        scores: HashMap<String, f64>,
        calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn scoring(pairs: &[(&str, f64)]) -> Self {
            Self {
                scores: pairs.iter().map(|(s, v)| ((*s).to_string(), *v)).collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl JudgeBackend for ScriptedBackend {
        fn backend_id(&self) -> &str {
            "scripted"
        }

        async fn judge(
            &self,
            source: &str,
            _criteria: &EvaluationCriteria,
            _context: Option<&serde_json::Value>,
        ) -> Result<RawJudgment, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let Some(&score) = self.scores.get(source) else {
                return Err(BackendError::Unavailable("no script entry".into()));
            };
            Ok(RawJudgment {
                scores: Dimension::ALL.iter().map(|&d| (d, score)).collect(),
                reasoning: format!("scripted score {score}"),
            })
        }
    }

    fn service(backend: ScriptedBackend) -> JudgeService<ScriptedBackend> {
        JudgeService::new(Arc::new(backend), JudgeConfig::default())
    }

    // -- evaluate ----------------------------------------------------------

    #[tokio::test]
    async fn test_evaluate_scores_all_dimensions() {
        let svc = service(ScriptedBackend::scoring(&[("src", 80.0)]));
        let verdict = svc
            .evaluate(&Candidate::root("src"), &EvaluationCriteria::for_task("t"), None)
            .await;
        assert!((verdict.overall - 80.0).abs() < f64::EPSILON);
        assert!(!verdict.is_failure());
        assert_eq!(verdict.backend, "scripted");
    }

    #[tokio::test]
    async fn test_backend_failure_degrades_to_zero_verdict() {
        let svc = service(ScriptedBackend::scoring(&[]));
        let verdict = svc
            .evaluate(&Candidate::root("src"), &EvaluationCriteria::for_task("t"), None)
            .await;
        assert_eq!(verdict.overall, 0.0);
        assert_eq!(verdict.failure, Some(JudgeFailure::Unavailable));
    }

    #[tokio::test]
    async fn test_missing_dimension_scores_zero() {
        struct PartialBackend;

        #[async_trait]
        impl JudgeBackend for PartialBackend {
            fn backend_id(&self) -> &str {
                "partial"
            }

            async fn judge(
                &self,
                _source: &str,
                _criteria: &EvaluationCriteria,
                _context: Option<&serde_json::Value>,
            ) -> Result<RawJudgment, BackendError> {
                Ok(RawJudgment {
                    scores: [(Dimension::Correctness, 80.0)].into_iter().collect(),
                    reasoning: "only correctness reported".into(),
                })
            }
        }

        let svc = JudgeService::new(Arc::new(PartialBackend), JudgeConfig::default());
        let verdict = svc
            .evaluate(&Candidate::root("src"), &EvaluationCriteria::for_task("t"), None)
            .await;
        assert_eq!(verdict.dimensions.correctness, 80.0);
        assert_eq!(verdict.dimensions.safety, 0.0);
        assert!((verdict.overall - 20.0).abs() < f64::EPSILON);
    }

    // -- evaluate_batch ----------------------------------------------------

    #[tokio::test]
    async fn test_batch_preserves_input_order_and_isolates_failures() {
        let svc = service(ScriptedBackend::scoring(&[("a", 60.0), ("c", 90.0)]));
        let candidates = vec![
            Candidate::root("a"),
            Candidate::root("b"), // no script entry: fails
            Candidate::root("c"),
        ];
        let verdicts = svc
            .evaluate_batch(&candidates, &EvaluationCriteria::for_task("t"), None)
            .await;

        assert_eq!(verdicts.len(), 3);
        assert!((verdicts[0].overall - 60.0).abs() < f64::EPSILON);
        assert!(verdicts[1].is_failure());
        assert!((verdicts[2].overall - 90.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_batch_calls_backend_once_per_candidate() {
        let backend = ScriptedBackend::scoring(&[("a", 50.0), ("b", 50.0)]);
        let svc = JudgeService::new(Arc::new(backend), JudgeConfig::default());
        let candidates = vec![Candidate::root("a"), Candidate::root("b")];
        svc.evaluate_batch(&candidates, &EvaluationCriteria::for_task("t"), None)
            .await;
        assert_eq!(svc.backend.calls.load(Ordering::SeqCst), 2);
    }

    // -- aggregate ---------------------------------------------------------

    #[tokio::test]
    async fn test_aggregate_uses_configured_weight() {
        let backend = ScriptedBackend::scoring(&[]);
        let config = JudgeConfig {
            coherence_weight: 0.0,
            ..JudgeConfig::default()
        };
        let svc = JudgeService::new(Arc::new(backend), config);

        let verdicts = vec![
            JudgeVerdict::scored(DimensionScores::new(60.0, 60.0, 60.0, 60.0), "a", "x"),
            JudgeVerdict::scored(DimensionScores::new(100.0, 100.0, 100.0, 100.0), "b", "x"),
        ];
        let agg = svc.aggregate(&verdicts);
        // Zero weight: disagreement is not penalized.
        assert_eq!(agg.coherence_penalty, 0.0);
        assert!((agg.adjusted - 80.0).abs() < f64::EPSILON);
    }
}
