pub mod budget;
pub mod candidate;
pub mod config;
pub mod history;
pub mod safety;
pub mod tree;
pub mod verdict;

pub use budget::EvolutionBudget;
pub use candidate::{Candidate, GenerationStrategy};
pub use config::{
    ArchiveConfig, GateConfig, JudgeConfig, LoggingConfig, PipelineConfig, SearchConfig,
    TerminationConfig,
};
pub use history::{RefinementHistory, RoundScore};
pub use safety::{
    DecidingParty, GateStatus, LedgerEntry, ReleaseDecision, RiskTier, SafetyCheck,
    SafetyCheckResult, SafetyReport,
};
pub use tree::{NodeId, SearchState, SearchTree, TreeNode};
pub use verdict::{
    aggregate, AggregateScore, Dimension, DimensionScores, JudgeFailure, JudgeVerdict,
    DEFAULT_COHERENCE_WEIGHT,
};
