//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the async trait interfaces external collaborators
//! must implement:
//! - `JudgeBackend`: multi-dimensional artifact scoring
//! - `HypothesisGenerator`: candidate edit proposals
//! - `TrajectoryArchive`: best-effort high-score candidate store
//! - `ReviewWorkflow`: human approval escalation
//! - `DecisionLedger`: append-only approval ledger
//!
//! These traits define the contracts that allow the domain to be
//! independent of specific infrastructure implementations.

pub mod backend;
pub mod decision_ledger;
pub mod hypothesis_generator;
pub mod judge_backend;
pub mod review_workflow;
pub mod trajectory_archive;

pub use backend::BackendError;
pub use decision_ledger::DecisionLedger;
pub use hypothesis_generator::{EditProposal, HypothesisGenerator};
pub use judge_backend::{EvaluationCriteria, JudgeBackend, RawJudgment};
pub use review_workflow::{ReviewVerdict, ReviewWorkflow};
pub use trajectory_archive::{ArchiveMetadata, TrajectoryArchive};
