//! In-memory adapters for the archive and ledger ports.
//!
//! Process-local stores behind a `tokio::sync::Mutex`, suitable for tests
//! and single-process runs. The ledger adapter preserves the append-only
//! contract: there is no mutation or removal API at all.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::errors::DomainResult;
use crate::domain::models::{AggregateScore, Candidate, LedgerEntry};
use crate::domain::ports::{ArchiveMetadata, BackendError, DecisionLedger, TrajectoryArchive};

// ---------------------------------------------------------------------------
// InMemoryLedger
// ---------------------------------------------------------------------------

/// Append-only decision ledger backed by a process-local vector.
#[derive(Default)]
pub struct InMemoryLedger {
    entries: Mutex<Vec<LedgerEntry>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record in append order.
    pub async fn all(&self) -> Vec<LedgerEntry> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl DecisionLedger for InMemoryLedger {
    async fn append(&self, entry: LedgerEntry) -> DomainResult<()> {
        self.entries.lock().await.push(entry);
        Ok(())
    }

    async fn entries_for(&self, candidate_hash: &str) -> DomainResult<Vec<LedgerEntry>> {
        Ok(self
            .entries
            .lock()
            .await
            .iter()
            .filter(|e| e.candidate_hash == candidate_hash)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// InMemoryArchive
// ---------------------------------------------------------------------------

/// Trajectory archive backed by a process-local vector.
#[derive(Default)]
pub struct InMemoryArchive {
    records: Mutex<Vec<(Candidate, AggregateScore, ArchiveMetadata)>>,
}

impl InMemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every archived record in write order.
    pub async fn stored(&self) -> Vec<(Candidate, AggregateScore, ArchiveMetadata)> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl TrajectoryArchive for InMemoryArchive {
    async fn store(
        &self,
        candidate: &Candidate,
        score: &AggregateScore,
        metadata: &ArchiveMetadata,
    ) -> Result<(), BackendError> {
        self.records
            .lock()
            .await
            .push((candidate.clone(), *score, metadata.clone()));
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================
