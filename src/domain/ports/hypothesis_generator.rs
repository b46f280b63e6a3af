//! Hypothesis generator port.
//!
//! The generator turns a source version plus a task description into
//! candidate edits. It is an opaque capability: the pipeline only relies
//! on the narrow contract below and tolerates short or empty result lists.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::backend::BackendError;
use crate::domain::models::GenerationStrategy;

/// One proposed modification of the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditProposal {
    /// The complete modified source text.
    pub code: String,
    /// The hypothesis this edit pursues.
    pub hypothesis: String,
    /// Why the generator believes the edit helps.
    pub reasoning: String,
}

/// Port trait for the hypothesis generator.
#[async_trait]
pub trait HypothesisGenerator: Send + Sync {
    /// Request up to `n` structurally distinct modifications of `source`.
    ///
    /// May return fewer than `n`. Implementations receive the concrete
    /// strategy to apply; the search service is responsible for splitting
    /// [`GenerationStrategy::Hybrid`] requests across the two concrete
    /// strategies.
    async fn propose(
        &self,
        source: &str,
        task: &str,
        strategy: GenerationStrategy,
        n: usize,
    ) -> Result<Vec<EditProposal>, BackendError>;
}
