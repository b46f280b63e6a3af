//! Crucible - Evolutionary Code Refinement Pipeline
//!
//! Crucible refines a candidate code artifact through judged tree search:
//! multi-perspective evaluation with a coherence-penalized aggregate
//! score, branching exploration of proposed edits, a cost-aware
//! termination policy, and a release gate with human escalation backed by
//! an append-only approval ledger.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure models, errors, and port traits
//! - **Service Layer** (`services`): Judging, search, termination, gating
//! - **Adapters** (`adapters`): In-memory implementations of the ports
//! - **Infrastructure Layer** (`infrastructure`): Config loading and logging
//!
//! # Example
//!
//! ```ignore
//! use crucible::domain::models::{Candidate, EvolutionBudget};
//! use crucible::services::{EvolutionPipeline, GateContext};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Assemble the pipeline from a judge backend, a generator, an
//!     // archive, a review workflow, and a ledger; then:
//!     // let outcome = pipeline
//!     //     .evolve(Candidate::root(source), "task", EvolutionBudget::default(), GateContext::default())
//!     //     .await?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AggregateScore, Candidate, EvolutionBudget, GateStatus, GenerationStrategy, JudgeVerdict,
    LedgerEntry, NodeId, PipelineConfig, RefinementHistory, ReleaseDecision, RiskTier,
    SafetyReport, SearchState, SearchTree,
};
pub use domain::ports::{
    DecisionLedger, HypothesisGenerator, JudgeBackend, ReviewWorkflow, TrajectoryArchive,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    EvolutionOutcome, EvolutionPipeline, GateContext, JudgeService, SafetyGate, StopReason,
    TerminationPolicy, TreeSearch,
};
