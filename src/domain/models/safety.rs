//! Release-safety data model: check results, reports, and decisions.
//!
//! A [`SafetyReport`] bundles every static check result for one candidate
//! with a computed [`RiskTier`] and [`GateStatus`]. A [`ReleaseDecision`]
//! pairs that report with the approve/reject outcome and the deciding
//! party; decisions are archived as [`LedgerEntry`] records keyed by the
//! candidate's content hash and are never mutated -- a later human
//! approval appends a new record rather than rewriting the old one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::verdict::AggregateScore;

// ---------------------------------------------------------------------------
// SafetyCheck
// ---------------------------------------------------------------------------

/// The fixed set of static checks the gate runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyCheck {
    /// Adjusted CMP score clears the configured threshold.
    ScoreThreshold,
    /// Source text is structurally well formed.
    SyntacticValidity,
    /// No denylisted dangerous constructs (arbitrary execution, process
    /// spawning, destructive filesystem operations).
    DangerousConstructs,
    /// No denylisted restricted imports (process control, raw sockets,
    /// dynamic import, low-level memory).
    RestrictedImports,
    /// Function/type/line counts stay below the configured ceiling.
    SizeComplexity,
}

impl SafetyCheck {
    /// Whether failing this check alone already implies HIGH risk.
    pub fn is_denylist(self) -> bool {
        matches!(self, Self::DangerousConstructs | Self::RestrictedImports)
    }

    /// Stable name used in reports and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScoreThreshold => "score_threshold",
            Self::SyntacticValidity => "syntactic_validity",
            Self::DangerousConstructs => "dangerous_constructs",
            Self::RestrictedImports => "restricted_imports",
            Self::SizeComplexity => "size_complexity",
        }
    }
}

/// Outcome of one static check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyCheckResult {
    /// Which check produced this result.
    pub check: SafetyCheck,
    /// Whether the check passed.
    pub passed: bool,
    /// Human-readable summary of the outcome.
    pub message: String,
    /// Structured detail (matched patterns, counts, thresholds).
    pub detail: serde_json::Value,
}

impl SafetyCheckResult {
    /// A passing result.
    pub fn pass(check: SafetyCheck, message: impl Into<String>) -> Self {
        Self {
            check,
            passed: true,
            message: message.into(),
            detail: serde_json::Value::Null,
        }
    }

    /// A failing result with structured detail.
    pub fn fail(check: SafetyCheck, message: impl Into<String>, detail: serde_json::Value) -> Self {
        Self {
            check,
            passed: false,
            message: message.into(),
            detail,
        }
    }
}

// ---------------------------------------------------------------------------
// RiskTier / GateStatus
// ---------------------------------------------------------------------------

/// Coarse classification of how much release caution a candidate needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

/// Aggregate status of a safety report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    /// All checks passed and risk is acceptable for automatic release.
    Passed,
    /// All checks passed but the risk tier (or strict mode) demands a human.
    NeedsReview,
    /// At least one check failed.
    Failed,
}

// ---------------------------------------------------------------------------
// SafetyReport
// ---------------------------------------------------------------------------

/// Complete static-check report for one candidate.
///
/// All checks run independently; none short-circuits, so the report always
/// carries one result per check regardless of earlier failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyReport {
    /// Content hash of the candidate this report covers.
    pub candidate_hash: String,
    /// One result per check, in rubric order.
    pub results: Vec<SafetyCheckResult>,
    /// The aggregate score the gate evaluated, if one was supplied.
    pub score: Option<AggregateScore>,
    /// Computed after all checks completed.
    pub risk_tier: RiskTier,
    /// Derived from the results and risk tier.
    pub status: GateStatus,
}

impl SafetyReport {
    /// Whether every check passed.
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// The checks that failed, in report order.
    pub fn failed_checks(&self) -> Vec<SafetyCheck> {
        self.results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| r.check)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// ReleaseDecision
// ---------------------------------------------------------------------------

/// Who made a release decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum DecidingParty {
    /// The gate decided without human involvement.
    Automated,
    /// A human reviewer, identified by their reviewer id.
    Human(String),
}

impl DecidingParty {
    /// The approver string recorded in the ledger.
    pub fn as_approver(&self) -> String {
        match self {
            Self::Automated => "automated".to_string(),
            Self::Human(id) => id.clone(),
        }
    }
}

/// Immutable record of one release decision. The pipeline's externally
/// visible output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseDecision {
    /// The fully evaluated report this decision is based on.
    pub report: SafetyReport,
    /// Whether the candidate may replace production code.
    pub approved: bool,
    /// Who decided.
    pub decided_by: DecidingParty,
    /// Why the decision came out this way.
    pub reasoning: String,
    /// When the decision was made.
    pub decided_at: DateTime<Utc>,
}

impl ReleaseDecision {
    /// The durable ledger record for this decision.
    pub fn to_ledger_entry(&self) -> LedgerEntry {
        LedgerEntry {
            candidate_hash: self.report.candidate_hash.clone(),
            score: self.report.score.map(|s| s.adjusted),
            risk_tier: self.report.risk_tier,
            status: self.report.status,
            approver: self.decided_by.as_approver(),
            reasoning: self.reasoning.clone(),
            timestamp: self.decided_at,
        }
    }
}

// ---------------------------------------------------------------------------
// LedgerEntry
// ---------------------------------------------------------------------------

/// One durable, append-only approval-ledger record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Content hash of the candidate the decision covered.
    pub candidate_hash: String,
    /// The adjusted CMP score at decision time, if one existed.
    pub score: Option<f64>,
    /// Risk tier from the report.
    pub risk_tier: RiskTier,
    /// Gate status from the report.
    pub status: GateStatus,
    /// `"automated"` or a human reviewer id.
    pub approver: String,
    /// Decision reasoning.
    pub reasoning: String,
    /// When the decision was recorded.
    pub timestamp: DateTime<Utc>,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn report(results: Vec<SafetyCheckResult>, risk: RiskTier, status: GateStatus) -> SafetyReport {
        SafetyReport {
            candidate_hash: "abc123".to_string(),
            results,
            score: None,
            risk_tier: risk,
            status,
        }
    }

    #[test]
    fn test_all_passed_and_failed_checks() {
        let r = report(
            vec![
                SafetyCheckResult::pass(SafetyCheck::ScoreThreshold, "ok"),
                SafetyCheckResult::fail(
                    SafetyCheck::DangerousConstructs,
                    "matched",
                    serde_json::json!({"pattern": "eval("}),
                ),
            ],
            RiskTier::High,
            GateStatus::Failed,
        );
        assert!(!r.all_passed());
        assert_eq!(r.failed_checks(), vec![SafetyCheck::DangerousConstructs]);
    }

    #[test]
    fn test_risk_tier_ordering() {
        assert!(RiskTier::Low < RiskTier::Medium);
        assert!(RiskTier::High < RiskTier::Critical);
    }

    #[test]
    fn test_denylist_checks_flagged() {
        assert!(SafetyCheck::DangerousConstructs.is_denylist());
        assert!(SafetyCheck::RestrictedImports.is_denylist());
        assert!(!SafetyCheck::ScoreThreshold.is_denylist());
    }

    #[test]
    fn test_ledger_entry_carries_decision_fields() {
        let decision = ReleaseDecision {
            report: report(vec![], RiskTier::Low, GateStatus::Passed),
            approved: true,
            decided_by: DecidingParty::Automated,
            reasoning: "all checks passed".to_string(),
            decided_at: Utc::now(),
        };
        let entry = decision.to_ledger_entry();
        assert_eq!(entry.candidate_hash, "abc123");
        assert_eq!(entry.approver, "automated");
        assert_eq!(entry.status, GateStatus::Passed);
    }

    #[test]
    fn test_human_party_approver_id() {
        let party = DecidingParty::Human("reviewer-7".to_string());
        assert_eq!(party.as_approver(), "reviewer-7");
    }

    #[test]
    fn test_status_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&GateStatus::NeedsReview).unwrap(),
            "\"needs_review\""
        );
        assert_eq!(
            serde_json::to_string(&RiskTier::Critical).unwrap(),
            "\"critical\""
        );
    }
}
