//! Candidate artifacts and generation strategies.
//!
//! A [`Candidate`] is one proposed version of a code artifact under
//! evaluation: immutable source text plus the hypothesis that produced it,
//! the generation strategy tag, and a link to the parent it was derived
//! from (absent for the root version). Candidates are created by the
//! hypothesis generator and owned by the requesting search node.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// GenerationStrategy
// ---------------------------------------------------------------------------

/// How a candidate edit was produced.
///
/// This is a closed variant set: downstream code matches exhaustively on it
/// and the proposal request path splits `Hybrid` across the two concrete
/// strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStrategy {
    /// The generator was given a natural-language hypothesis to pursue.
    HypothesisGuided,
    /// The generator applied a mechanical edit operator.
    OperatorBased,
    /// Half hypothesis-guided, half operator-based.
    Hybrid,
}

impl GenerationStrategy {
    /// Stable name used in logs and archived metadata.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HypothesisGuided => "hypothesis_guided",
            Self::OperatorBased => "operator_based",
            Self::Hybrid => "hybrid",
        }
    }
}

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// One proposed version of the artifact under evolution.
///
/// Immutable after construction. The `parent_hash` links a derived candidate
/// to the content hash of the version it was edited from; the root version
/// has no parent and no hypothesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// The full source text of this version.
    pub source: String,
    /// The hypothesis this edit pursued. `None` for the root version.
    pub hypothesis: Option<String>,
    /// The strategy that produced this candidate.
    pub strategy: GenerationStrategy,
    /// Content hash of the parent version, if any.
    pub parent_hash: Option<String>,
    /// When this candidate was created.
    pub created_at: DateTime<Utc>,
}

impl Candidate {
    /// Create the root candidate wrapping the starting version.
    pub fn root(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            hypothesis: None,
            strategy: GenerationStrategy::OperatorBased,
            parent_hash: None,
            created_at: Utc::now(),
        }
    }

    /// Create a candidate derived from `parent` via the given hypothesis.
    pub fn derived(
        source: impl Into<String>,
        hypothesis: impl Into<String>,
        strategy: GenerationStrategy,
        parent: &Candidate,
    ) -> Self {
        Self {
            source: source.into(),
            hypothesis: Some(hypothesis.into()),
            strategy,
            parent_hash: Some(parent.content_hash()),
            created_at: Utc::now(),
        }
    }

    /// SHA-256 of the source text, hex-encoded.
    ///
    /// Used as the durable key for ledger entries and archive metadata, so
    /// identical artifacts always map to the same records.
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.source.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Whether the source text is empty or whitespace-only.
    pub fn is_empty(&self) -> bool {
        self.source.trim().is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
