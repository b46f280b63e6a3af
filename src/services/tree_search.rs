//! Tree search over the candidate space.
//!
//! The search session is a small state machine: the root is scored
//! (INITIALIZED), then each round selects the best-scoring expandable
//! leaf, proposes N edits, scores them concurrently, and keeps the top K
//! as children (EXPANDING). The session ends CONVERGED once the best
//! adjusted score clears the success threshold, or EXHAUSTED when depth,
//! iterations, the wall clock, the termination policy, or the supply of
//! expandable leaves runs out.
//!
//! Determinism: candidates carry a creation sequence (their position in
//! the proposal list, then their arena id), `select_best` breaks score
//! ties toward the earlier candidate, and leaf selection breaks ties
//! toward the most recently created node (a depth-first bias). Re-running
//! with a fixed generator therefore reproduces an identical tree shape.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::judge::JudgeService;
use super::termination::{StopReason, TerminationPolicy, TerminationVerdict};
use crate::domain::errors::DomainResult;
use crate::domain::models::{
    AggregateScore, Candidate, EvolutionBudget, GenerationStrategy, JudgeVerdict, NodeId,
    RefinementHistory, SearchConfig, SearchState, SearchTree,
};
use crate::domain::ports::{EvaluationCriteria, HypothesisGenerator, JudgeBackend};

// ---------------------------------------------------------------------------
// ScoredCandidate / SearchOutcome
// ---------------------------------------------------------------------------

/// A proposed candidate with its evaluation, before tree attachment.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    /// The proposed candidate.
    pub candidate: Candidate,
    /// The verdict it received.
    pub verdict: JudgeVerdict,
    /// Aggregate over the verdicts received so far.
    pub score: AggregateScore,
    /// Creation sequence within the proposal batch; lower is earlier.
    pub seq: usize,
}

/// Result of one search session. The full tree is retained for audit.
#[derive(Debug)]
pub struct SearchOutcome {
    /// The complete session tree.
    pub tree: SearchTree,
    /// The best-scoring node found.
    pub best: NodeId,
    /// Terminal state: `Converged` or `Exhausted`.
    pub state: SearchState,
    /// Per-round best-score history of this refinement line.
    pub history: RefinementHistory,
    /// Set when the termination policy ended the session.
    pub stop_reason: Option<StopReason>,
}

// ---------------------------------------------------------------------------
// TreeSearch
// ---------------------------------------------------------------------------

/// Branching exploration of the candidate space guided by CMP scores.
pub struct TreeSearch<J: JudgeBackend, G: HypothesisGenerator> {
    judge: Arc<JudgeService<J>>,
    generator: Arc<G>,
    config: SearchConfig,
    termination: TerminationPolicy,
}

impl<J: JudgeBackend, G: HypothesisGenerator> TreeSearch<J, G> {
    /// Create a search service over the given judge and generator.
    pub fn new(
        judge: Arc<JudgeService<J>>,
        generator: Arc<G>,
        config: SearchConfig,
        termination: TerminationPolicy,
    ) -> Self {
        Self {
            judge,
            generator,
            config,
            termination,
        }
    }

    // -----------------------------------------------------------------------
    // propose_edits
    // -----------------------------------------------------------------------

    /// Request up to `n` structurally distinct edits of `parent`.
    ///
    /// The hybrid strategy splits `n` roughly in half across the two
    /// concrete strategies, issued concurrently. Failed generator calls are
    /// dropped with a warning; duplicate sources are deduplicated. The
    /// returned list is never empty: when nothing usable comes back, the
    /// unmodified parent is re-submitted so expansion cannot stall.
    pub async fn propose_edits(&self, parent: &Candidate, task: &str, n: usize) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = Vec::new();

        match self.config.strategy {
            GenerationStrategy::Hybrid => {
                let n_hypothesis = n.div_ceil(2);
                let n_operator = n / 2;
                let (hypothesis, operator) = tokio::join!(
                    self.generator.propose(
                        &parent.source,
                        task,
                        GenerationStrategy::HypothesisGuided,
                        n_hypothesis,
                    ),
                    self.generator.propose(
                        &parent.source,
                        task,
                        GenerationStrategy::OperatorBased,
                        n_operator,
                    ),
                );
                self.collect(&mut candidates, hypothesis, GenerationStrategy::HypothesisGuided, parent);
                self.collect(&mut candidates, operator, GenerationStrategy::OperatorBased, parent);
            }
            strategy => {
                let result = self.generator.propose(&parent.source, task, strategy, n).await;
                self.collect(&mut candidates, result, strategy, parent);
            }
        }

        // Structurally distinct: drop duplicate sources, earliest wins.
        let mut seen = std::collections::HashSet::new();
        candidates.retain(|c| seen.insert(c.content_hash()));
        candidates.truncate(n);

        if candidates.is_empty() {
            debug!("no usable proposals; falling back to unmodified parent");
            candidates.push(Candidate::derived(
                parent.source.clone(),
                "retain parent version unchanged",
                GenerationStrategy::OperatorBased,
                parent,
            ));
        }

        candidates
    }

    /// Fold one generator result into the candidate list, dropping
    /// failures and empty proposals.
    fn collect(
        &self,
        candidates: &mut Vec<Candidate>,
        result: Result<Vec<crate::domain::ports::EditProposal>, crate::domain::ports::BackendError>,
        strategy: GenerationStrategy,
        parent: &Candidate,
    ) {
        match result {
            Ok(proposals) => {
                for proposal in proposals {
                    if proposal.code.trim().is_empty() {
                        continue;
                    }
                    candidates.push(Candidate::derived(
                        proposal.code,
                        proposal.hypothesis,
                        strategy,
                        parent,
                    ));
                }
            }
            Err(err) => {
                warn!(strategy = strategy.as_str(), error = %err, "proposal call dropped");
            }
        }
    }

    // -----------------------------------------------------------------------
    // select_best
    // -----------------------------------------------------------------------

    /// Deterministic top-k selection: adjusted score descending, ties
    /// broken by earlier creation sequence.
    pub fn select_best(mut scored: Vec<ScoredCandidate>, k: usize) -> Vec<ScoredCandidate> {
        scored.sort_by(|a, b| {
            b.score
                .adjusted
                .partial_cmp(&a.score.adjusted)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.seq.cmp(&b.seq))
        });
        scored.truncate(k);
        scored
    }

    // -----------------------------------------------------------------------
    // expand
    // -----------------------------------------------------------------------

    /// Expand one node: propose, score, keep the top K as children.
    ///
    /// Returns no children once the node sits at the depth limit. Children
    /// are attached in selection order, so tree shape is reproducible.
    pub async fn expand(
        &self,
        tree: &mut SearchTree,
        node: NodeId,
        criteria: &EvaluationCriteria,
        max_depth: u32,
    ) -> DomainResult<Vec<NodeId>> {
        if tree.node(node)?.depth >= max_depth {
            return Ok(Vec::new());
        }
        tree.record_visit(node)?;

        let parent = tree.node(node)?.candidate.clone();
        let candidates = self
            .propose_edits(&parent, &criteria.task, self.config.branching_factor)
            .await;
        let verdicts = self.judge.evaluate_batch(&candidates, criteria, None).await;

        let scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .zip(verdicts)
            .enumerate()
            .map(|(seq, (candidate, verdict))| {
                let score = self.judge.aggregate(std::slice::from_ref(&verdict));
                ScoredCandidate {
                    candidate,
                    verdict,
                    score,
                    seq,
                }
            })
            .collect();

        let survivors = Self::select_best(scored, self.config.beam_width);

        let mut children = Vec::with_capacity(survivors.len());
        for survivor in survivors {
            let child = tree.add_child(node, survivor.candidate)?;
            tree.record_verdicts(child, [survivor.verdict])?;
            children.push(child);
        }

        debug!(parent = %node, children = children.len(), "expanded node");
        Ok(children)
    }

    // -----------------------------------------------------------------------
    // search
    // -----------------------------------------------------------------------

    /// Run a full search session from `initial`.
    ///
    /// Exactly one expansion runs at a time; the tree is written only by
    /// this loop. No new expansion starts past `deadline`, but the one in
    /// flight is allowed to finish.
    pub async fn search(
        &self,
        initial: Candidate,
        task: &str,
        budget: &EvolutionBudget,
        deadline: Instant,
    ) -> DomainResult<SearchOutcome> {
        let criteria = EvaluationCriteria::for_task(task);
        let mut tree = SearchTree::new(initial, self.judge.coherence_weight());
        let mut history = RefinementHistory::new();
        let mut stop_reason = None;

        // INITIALIZED: score the root.
        let root = tree.root();
        let root_candidate = tree.node(root)?.candidate.clone();
        let verdict = self.judge.evaluate(&root_candidate, &criteria, None).await;
        let root_score = tree.record_verdicts(root, [verdict])?;
        history.record(root_score.adjusted);
        info!(score = root_score.adjusted, "root scored");

        let mut state = SearchState::Initialized;

        for iteration in 0..budget.max_iterations {
            let best_score = tree.node(tree.best_node())?.score.adjusted;

            if best_score >= self.config.success_threshold {
                state = SearchState::Converged;
                break;
            }
            if Instant::now() >= deadline {
                info!(iteration, "wall-clock deadline reached; no new expansion");
                state = SearchState::Exhausted;
                break;
            }

            let Some(leaf) = self.select_leaf(&tree, budget.max_depth) else {
                info!(iteration, "no expandable leaves remain");
                state = SearchState::Exhausted;
                break;
            };

            state = SearchState::Expanding;
            self.expand(&mut tree, leaf, &criteria, budget.max_depth).await?;

            let best_after = tree.node(tree.best_node())?.score.adjusted;
            history.record(best_after);

            if best_after >= self.config.success_threshold {
                state = SearchState::Converged;
                break;
            }

            if let TerminationVerdict::Stop(reason) = self.termination.evaluate(&history) {
                info!(reason = reason.as_str(), "termination policy stopped the line");
                stop_reason = Some(reason);
                state = SearchState::Exhausted;
                break;
            }
        }

        if !state.is_terminal() {
            // Iteration budget consumed: graceful stop with best-so-far.
            state = SearchState::Exhausted;
        }

        let best = tree.best_node();
        info!(
            state = ?state,
            best = %best,
            score = tree.node(best)?.score.adjusted,
            nodes = tree.len(),
            "search session finished"
        );

        Ok(SearchOutcome {
            tree,
            best,
            state,
            history,
            stop_reason,
        })
    }

    /// The expandable leaf with the highest adjusted score. Ties favor the
    /// most recently created node.
    fn select_leaf(&self, tree: &SearchTree, max_depth: u32) -> Option<NodeId> {
        tree.leaves()
            .into_iter()
            .filter_map(|id| tree.node(id).ok())
            .filter(|node| node.depth < max_depth)
            .max_by(|a, b| {
                a.score
                    .adjusted
                    .partial_cmp(&b.score.adjusted)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.id.cmp(&b.id))
            })
            .map(|node| node.id)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use async_trait::async_trait;

    use crate::domain::models::{DimensionScores, JudgeConfig, TerminationConfig};
    use crate::domain::ports::{BackendError, EditProposal, JudgeBackend, RawJudgment};
    use crate::domain::models::Dimension;

    /// Judge scripted by source text; unknown sources score 10.
    struct TableJudge {
        table: HashMap<String, f64>,
    }

    impl TableJudge {
        fn new(pairs: &[(&str, f64)]) -> Self {
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
                reasoning: String::new(),
            })
        }
    }

    /// Generator that emits `<parent>+e<i>` edits, deterministically.
    struct SuffixGenerator;

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

    /// Generator whose every call fails.
    struct BrokenGenerator;

    #[async_trait]
    impl HypothesisGenerator for BrokenGenerator {
        async fn propose(
            &self,
            _source: &str,
            _task: &str,
            _strategy: GenerationStrategy,
            _n: usize,
        ) -> Result<Vec<EditProposal>, BackendError> {
            Err(BackendError::Unavailable("down".into()))
        }
    }

    fn search_service<G: HypothesisGenerator>(
        judge: TableJudge,
        generator: G,
        config: SearchConfig,
    ) -> TreeSearch<TableJudge, G> {
        TreeSearch::new(
            Arc::new(JudgeService::new(Arc::new(judge), JudgeConfig::default())),
            Arc::new(generator),
            config,
            TerminationPolicy::new(TerminationConfig::default()),
        )
    }

    fn scored(adjusted: f64, seq: usize) -> ScoredCandidate {
        let verdict = JudgeVerdict::scored(
            DimensionScores::new(adjusted, adjusted, adjusted, adjusted),
            "",
            "t",
        );
        ScoredCandidate {
            candidate: Candidate::root(format!("c{seq}")),
            score: AggregateScore {
                mean: adjusted,
                coherence_penalty: 0.0,
                adjusted,
                verdict_count: 1,
            },
            verdict,
            seq,
        }
    }

    // -- select_best -------------------------------------------------------

    #[test]
    fn test_select_best_orders_by_score_then_sequence() {
        let input = vec![scored(50.0, 0), scored(80.0, 1), scored(80.0, 2), scored(70.0, 3)];
        let picked = TreeSearch::<TableJudge, SuffixGenerator>::select_best(input, 3);
        let seqs: Vec<usize> = picked.iter().map(|s| s.seq).collect();
        // 80 (seq 1) beats 80 (seq 2) by earlier creation.
        assert_eq!(seqs, vec![1, 2, 3]);
    }

    #[test]
    fn test_select_best_is_deterministic() {
        let make = || vec![scored(60.0, 0), scored(60.0, 1), scored(60.0, 2)];
        let a = TreeSearch::<TableJudge, SuffixGenerator>::select_best(make(), 2);
        let b = TreeSearch::<TableJudge, SuffixGenerator>::select_best(make(), 2);
        let seq = |v: &[ScoredCandidate]| v.iter().map(|s| s.seq).collect::<Vec<_>>();
        assert_eq!(seq(&a), seq(&b));
        assert_eq!(seq(&a), vec![0, 1]);
    }

    // -- propose_edits -----------------------------------------------------

    #[tokio::test]
    async fn test_hybrid_splits_roughly_in_half() {
        let svc = search_service(TableJudge::new(&[]), SuffixGenerator, SearchConfig::default());
        let parent = Candidate::root("base");
        let edits = svc.propose_edits(&parent, "task", 5).await;

        let hypothesis = edits
            .iter()
            .filter(|c| c.strategy == GenerationStrategy::HypothesisGuided)
            .count();
        let operator = edits
            .iter()
            .filter(|c| c.strategy == GenerationStrategy::OperatorBased)
            .count();
        assert_eq!(hypothesis, 3);
        assert_eq!(operator, 2);
    }

    #[tokio::test]
    async fn test_failed_generation_falls_back_to_parent() {
        let svc = search_service(TableJudge::new(&[]), BrokenGenerator, SearchConfig::default());
        let parent = Candidate::root("base");
        let edits = svc.propose_edits(&parent, "task", 4).await;

        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].source, "base");
        assert_eq!(edits[0].parent_hash.as_deref(), Some(parent.content_hash().as_str()));
    }

    // -- expand ------------------------------------------------------------

    #[tokio::test]
    async fn test_expand_attaches_top_k_children() {
        let config = SearchConfig {
            branching_factor: 4,
            beam_width: 2,
            strategy: GenerationStrategy::HypothesisGuided,
            ..SearchConfig::default()
        };
        let judge = TableJudge::new(&[
            ("base+hypothesis_guided0", 40.0),
            ("base+hypothesis_guided1", 90.0),
            ("base+hypothesis_guided2", 70.0),
            ("base+hypothesis_guided3", 20.0),
        ]);
        let svc = search_service(judge, SuffixGenerator, config);

        let mut tree = SearchTree::new(Candidate::root("base"), 0.15);
        let criteria = EvaluationCriteria::for_task("task");
        let root = tree.root();
        let children = svc.expand(&mut tree, root, &criteria, 3).await.unwrap();

        assert_eq!(children.len(), 2);
        // Attached in selection order: best first.
        let scores: Vec<f64> = children
            .iter()
            .map(|&id| tree.node(id).unwrap().score.adjusted)
            .collect();
        assert!((scores[0] - 90.0).abs() < f64::EPSILON);
        assert!((scores[1] - 70.0).abs() < f64::EPSILON);
        assert_eq!(tree.node(tree.root()).unwrap().visits, 1);
    }

    #[tokio::test]
    async fn test_expand_at_depth_cap_returns_empty() {
        let svc = search_service(TableJudge::new(&[]), SuffixGenerator, SearchConfig::default());
        let mut tree = SearchTree::new(Candidate::root("base"), 0.15);
        let criteria = EvaluationCriteria::for_task("task");
        let root = tree.root();
        let children = svc.expand(&mut tree, root, &criteria, 0).await.unwrap();
        assert!(children.is_empty());
        assert_eq!(tree.len(), 1);
    }

    // -- search ------------------------------------------------------------

    fn far_deadline() -> Instant {
        Instant::now() + std::time::Duration::from_secs(3600)
    }

    #[tokio::test]
    async fn test_search_converges_on_threshold() {
        let config = SearchConfig {
            branching_factor: 2,
            beam_width: 2,
            success_threshold: 90.0,
            strategy: GenerationStrategy::HypothesisGuided,
        };
        // Round 1 produces a 92; the session should converge there.
        let judge = TableJudge::new(&[
            ("base", 60.0),
            ("base+hypothesis_guided0", 92.0),
            ("base+hypothesis_guided1", 50.0),
        ]);
        let svc = search_service(judge, SuffixGenerator, config);

        let outcome = svc
            .search(Candidate::root("base"), "task", &EvolutionBudget::default(), far_deadline())
            .await
            .unwrap();

        assert_eq!(outcome.state, SearchState::Converged);
        let best = outcome.tree.node(outcome.best).unwrap();
        assert!((best.score.adjusted - 92.0).abs() < f64::EPSILON);
        assert!(outcome.stop_reason.is_none());
    }

    #[tokio::test]
    async fn test_search_already_converged_root_skips_expansion() {
        let judge = TableJudge::new(&[("base", 95.0)]);
        let svc = search_service(judge, SuffixGenerator, SearchConfig::default());

        let outcome = svc
            .search(Candidate::root("base"), "task", &EvolutionBudget::default(), far_deadline())
            .await
            .unwrap();

        assert_eq!(outcome.state, SearchState::Converged);
        assert_eq!(outcome.tree.len(), 1);
        assert_eq!(outcome.best, outcome.tree.root());
    }

    #[tokio::test]
    async fn test_search_exhausts_when_scores_stall() {
        // Every edit scores 10: after min_rounds the policy stops the line.
        let judge = TableJudge::new(&[("base", 10.0)]);
        let svc = search_service(judge, SuffixGenerator, SearchConfig::default());

        let outcome = svc
            .search(Candidate::root("base"), "task", &EvolutionBudget::default(), far_deadline())
            .await
            .unwrap();

        assert_eq!(outcome.state, SearchState::Exhausted);
        assert!(outcome.stop_reason.is_some());
    }

    #[tokio::test]
    async fn test_search_honors_elapsed_deadline() {
        let judge = TableJudge::new(&[("base", 60.0)]);
        let svc = search_service(judge, SuffixGenerator, SearchConfig::default());

        let outcome = svc
            .search(
                Candidate::root("base"),
                "task",
                &EvolutionBudget::default(),
                Instant::now(), // already past
            )
            .await
            .unwrap();

        // Root is scored, but no expansion starts past the deadline.
        assert_eq!(outcome.state, SearchState::Exhausted);
        assert_eq!(outcome.tree.len(), 1);
    }

    #[tokio::test]
    async fn test_search_tree_shape_is_reproducible() {
        let run = || async {
            let config = SearchConfig {
                branching_factor: 3,
                beam_width: 2,
                success_threshold: 99.0,
                strategy: GenerationStrategy::HypothesisGuided,
            };
            let judge = TableJudge::new(&[("base", 60.0)]);
            let svc = search_service(judge, SuffixGenerator, config);
            let budget = EvolutionBudget {
                max_iterations: 3,
                ..EvolutionBudget::default()
            };
            svc.search(Candidate::root("base"), "task", &budget, far_deadline())
                .await
                .unwrap()
        };

        let a = run().await;
        let b = run().await;

        assert_eq!(a.tree.len(), b.tree.len());
        let shape = |o: &SearchOutcome| {
            o.tree
                .nodes()
                .iter()
                .map(|n| (n.parent, n.candidate.source.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(shape(&a), shape(&b));
    }
}
