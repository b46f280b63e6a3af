//! The end-to-end evolution pipeline.
//!
//! `evolve` chains the full flow for one candidate: eager validation,
//! budgeted tree search, best-effort archival of high-scoring trajectory
//! nodes, and the release gate's final decision. Exhausting any budget
//! dimension is a graceful stop that gates the best candidate found so
//! far; only structural problems (empty input, invalid budget, ledger
//! failure) surface as errors.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use super::safety_gate::{GateContext, SafetyGate};
use super::tree_search::{SearchOutcome, TreeSearch};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Candidate, EvolutionBudget, PipelineConfig, ReleaseDecision};
use crate::domain::ports::{
    ArchiveMetadata, DecisionLedger, HypothesisGenerator, JudgeBackend, ReviewWorkflow,
    TrajectoryArchive,
};

// ---------------------------------------------------------------------------
// EvolutionOutcome
// ---------------------------------------------------------------------------

/// Result of one full `evolve` session: the gate's decision plus the
/// complete search record for audit.
#[derive(Debug)]
pub struct EvolutionOutcome {
    /// Session id, shared with every archive write of this session.
    pub session_id: Uuid,
    /// The final release decision on the best candidate.
    pub decision: ReleaseDecision,
    /// The best candidate the search found.
    pub best: Candidate,
    /// The full search record.
    pub search: SearchOutcome,
}

// ---------------------------------------------------------------------------
// EvolutionPipeline
// ---------------------------------------------------------------------------

/// Orchestrates search, archival, and gating for one candidate at a time.
pub struct EvolutionPipeline<J, G, A, R, L>
where
    J: JudgeBackend,
    G: HypothesisGenerator,
    A: TrajectoryArchive,
    R: ReviewWorkflow,
    L: DecisionLedger,
{
    search: TreeSearch<J, G>,
    gate: SafetyGate<R, L>,
    archive: Arc<A>,
    config: PipelineConfig,
}

impl<J, G, A, R, L> EvolutionPipeline<J, G, A, R, L>
where
    J: JudgeBackend,
    G: HypothesisGenerator,
    A: TrajectoryArchive,
    R: ReviewWorkflow,
    L: DecisionLedger,
{
    /// Assemble the pipeline from its services.
    pub fn new(
        search: TreeSearch<J, G>,
        gate: SafetyGate<R, L>,
        archive: Arc<A>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            search,
            gate,
            archive,
            config,
        }
    }

    /// Run one full evolution session over `initial`.
    ///
    /// Validation is eager: an empty candidate or a zero budget dimension
    /// fails before any backend call is made. The wall-clock deadline is
    /// fixed here, before the search starts.
    pub async fn evolve(
        &self,
        initial: Candidate,
        task: &str,
        budget: EvolutionBudget,
        context: GateContext,
    ) -> DomainResult<EvolutionOutcome> {
        if initial.is_empty() {
            return Err(DomainError::EmptyCandidate);
        }
        budget.validate()?;

        let session_id = Uuid::new_v4();
        let deadline = Instant::now() + budget.max_wall_time;
        info!(%session_id, task, "evolution session started");

        let outcome = self.search.search(initial, task, &budget, deadline).await?;
        self.archive_trajectory(session_id, &outcome).await;

        let best_node = outcome.tree.node(outcome.best)?;
        let best = best_node.candidate.clone();
        let score = best_node.score;

        let decision = self.gate.decide(&best, Some(&score), context).await?;
        info!(
            %session_id,
            state = ?outcome.state,
            rounds = outcome.history.rounds(),
            approved = decision.approved,
            "evolution session finished"
        );

        Ok(EvolutionOutcome {
            session_id,
            decision,
            best,
            search: outcome,
        })
    }

    /// Write every node that cleared the archival threshold to the
    /// trajectory archive. Best-effort: failures are logged and swallowed.
    async fn archive_trajectory(&self, session_id: Uuid, outcome: &SearchOutcome) {
        let threshold = self.config.archive.archival_threshold;
        let mut stored = 0usize;

        for node in outcome.tree.nodes() {
            if node.score.verdict_count == 0 || node.score.adjusted < threshold {
                continue;
            }
            let metadata = ArchiveMetadata {
                session_id,
                depth: node.depth,
                strategy: node.candidate.strategy,
                recorded_at: Utc::now(),
            };
            match self
                .archive
                .store(&node.candidate, &node.score, &metadata)
                .await
            {
                Ok(()) => stored += 1,
                Err(err) => {
                    warn!(node = %node.id, error = %err, "trajectory archive write dropped");
                }
            }
        }

        if stored > 0 {
            info!(%session_id, stored, "archived high-scoring trajectory nodes");
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
