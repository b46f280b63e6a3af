pub mod judge;
pub mod pipeline;
pub mod safety_gate;
pub mod termination;
pub mod tree_search;

pub use judge::JudgeService;
pub use pipeline::{EvolutionOutcome, EvolutionPipeline};
pub use safety_gate::{GateContext, SafetyGate};
pub use termination::{StopReason, TerminationPolicy, TerminationVerdict};
pub use tree_search::{ScoredCandidate, SearchOutcome, TreeSearch};
