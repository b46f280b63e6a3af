//! Approval ledger port.
//!
//! The ledger is the pipeline's only persisted state: one durable record
//! per release decision, keyed by candidate content hash. It is strictly
//! append-only -- entries are never mutated or deleted, which is what makes
//! it safe under concurrent writers. A later human approval of a
//! previously rejected candidate appends a new record.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::LedgerEntry;

/// Port trait for the append-only approval ledger.
#[async_trait]
pub trait DecisionLedger: Send + Sync {
    /// Append one decision record.
    async fn append(&self, entry: LedgerEntry) -> DomainResult<()>;

    /// All records for one candidate hash, oldest first.
    async fn entries_for(&self, candidate_hash: &str) -> DomainResult<Vec<LedgerEntry>>;
}
