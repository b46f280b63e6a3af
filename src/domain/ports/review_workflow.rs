//! Human approval workflow port.
//!
//! When a safety report needs review, the gate hands the report and the
//! candidate to this workflow and waits for an explicit verdict under a
//! deadline. Absence of a timely answer always counts as a rejection --
//! silence is never approval.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::backend::BackendError;
use crate::domain::models::{Candidate, SafetyReport};

/// An explicit human verdict on a flagged candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewVerdict {
    /// Whether the reviewer approved the release.
    pub approved: bool,
    /// Identity of the reviewer who answered.
    pub reviewer: String,
    /// Optional free-text justification.
    pub comment: Option<String>,
}

/// Port trait for the human approval workflow.
#[async_trait]
pub trait ReviewWorkflow: Send + Sync {
    /// Present the report and candidate for review and wait for a verdict.
    ///
    /// The gate enforces its own deadline around this call; implementations
    /// that cannot produce an answer should return
    /// [`BackendError::Unavailable`] rather than blocking forever.
    async fn request_review(
        &self,
        report: &SafetyReport,
        candidate: &Candidate,
    ) -> Result<ReviewVerdict, BackendError>;
}
