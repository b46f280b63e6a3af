//! Trajectory archive port.
//!
//! Best-effort write-through store of high-scoring candidates for later
//! recall. The pipeline writes to it only when a candidate clears the
//! archival threshold; write failures are logged and swallowed, never
//! propagated.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::backend::BackendError;
use crate::domain::models::{AggregateScore, Candidate, GenerationStrategy};

/// Metadata stored alongside an archived candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveMetadata {
    /// The evolution session that produced the candidate.
    pub session_id: Uuid,
    /// Tree depth at which the candidate was found.
    pub depth: u32,
    /// The strategy that produced it.
    pub strategy: GenerationStrategy,
    /// When the archive write was attempted.
    pub recorded_at: DateTime<Utc>,
}

/// Port trait for the trajectory archive.
#[async_trait]
pub trait TrajectoryArchive: Send + Sync {
    /// Store one candidate with its score and metadata.
    async fn store(
        &self,
        candidate: &Candidate,
        score: &AggregateScore,
        metadata: &ArchiveMetadata,
    ) -> Result<(), BackendError>;
}
