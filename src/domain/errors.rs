//! Domain errors for the Crucible evolution pipeline.
//!
//! Only programming-contract violations are hard errors here. Backend
//! failures (judging, generation) are recovered locally with zero/empty
//! substitutions, a denied gate is an ordinary [`ReleaseDecision`], and an
//! exhausted budget is a graceful stop. None of those surface as errors.
//!
//! [`ReleaseDecision`]: crate::domain::models::ReleaseDecision

use thiserror::Error;

/// Domain-level errors that can occur in the Crucible pipeline.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Initial candidate is empty")]
    EmptyCandidate,

    #[error("Invalid budget: {0}")]
    InvalidBudget(String),

    #[error("Node not found in session tree: {0}")]
    NodeNotFound(usize),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}
