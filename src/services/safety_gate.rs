//! Release-safety gate: static checks, risk tiering, and the final
//! approve/reject decision.
//!
//! The gate is the pipeline's last authority. All five checks run
//! independently -- none short-circuits -- so every report is complete. The
//! risk tier and status are computed only after all checks finish. A
//! FAILED report is auto-rejected; a NEEDS_REVIEW report is escalated to
//! the human workflow under a deadline where silence counts as rejection;
//! a PASSED report is auto-approved. Every decision is appended to the
//! ledger keyed by the candidate's content hash.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    AggregateScore, Candidate, DecidingParty, GateConfig, GateStatus, ReleaseDecision, RiskTier,
    SafetyCheck, SafetyCheckResult, SafetyReport,
};
use crate::domain::ports::{DecisionLedger, ReviewWorkflow};

// ---------------------------------------------------------------------------
// GateContext
// ---------------------------------------------------------------------------

/// Caller-supplied context flags that raise the risk tier.
#[derive(Debug, Clone, Copy, Default)]
pub struct GateContext {
    /// The change touches security-sensitive code.
    pub security_sensitive: bool,
    /// The change touches a core system component.
    pub core_system: bool,
}

// ---------------------------------------------------------------------------
// SafetyGate
// ---------------------------------------------------------------------------

/// The release gate over a review workflow and the approval ledger.
pub struct SafetyGate<R: ReviewWorkflow, L: DecisionLedger> {
    review: Arc<R>,
    ledger: Arc<L>,
    config: GateConfig,
}

impl<R: ReviewWorkflow, L: DecisionLedger> SafetyGate<R, L> {
    /// Create a gate with the given collaborators.
    pub fn new(review: Arc<R>, ledger: Arc<L>, config: GateConfig) -> Self {
        Self {
            review,
            ledger,
            config,
        }
    }

    // -----------------------------------------------------------------------
    // run_checks
    // -----------------------------------------------------------------------

    /// Run every static check and assemble the complete report.
    pub fn run_checks(
        &self,
        candidate: &Candidate,
        score: Option<&AggregateScore>,
        context: GateContext,
    ) -> SafetyReport {
        let results = vec![
            self.check_score(score),
            self.check_syntax(candidate),
            self.check_denylist(
                candidate,
                SafetyCheck::DangerousConstructs,
                &self.config.dangerous_constructs,
            ),
            self.check_denylist(
                candidate,
                SafetyCheck::RestrictedImports,
                &self.config.restricted_imports,
            ),
            self.check_size(candidate),
        ];

        let risk_tier = compute_risk_tier(&results, context);
        let status = compute_status(&results, risk_tier, self.config.strict_mode);

        SafetyReport {
            candidate_hash: candidate.content_hash(),
            results,
            score: score.copied(),
            risk_tier,
            status,
        }
    }

    // -----------------------------------------------------------------------
    // decide
    // -----------------------------------------------------------------------

    /// Produce the final release decision for a candidate and append it to
    /// the ledger.
    pub async fn decide(
        &self,
        candidate: &Candidate,
        score: Option<&AggregateScore>,
        context: GateContext,
    ) -> DomainResult<ReleaseDecision> {
        let report = self.run_checks(candidate, score, context);

        let decision = match report.status {
            GateStatus::Failed => {
                let failed: Vec<&str> =
                    report.failed_checks().iter().map(|c| c.as_str()).collect();
                reject(
                    report,
                    DecidingParty::Automated,
                    format!("static checks failed: {}", failed.join(", ")),
                )
            }
            GateStatus::Passed => ReleaseDecision {
                reasoning: "all checks passed within acceptable risk".to_string(),
                approved: true,
                decided_by: DecidingParty::Automated,
                decided_at: Utc::now(),
                report,
            },
            GateStatus::NeedsReview => self.escalate(report, candidate).await,
        };

        info!(
            candidate = %decision.report.candidate_hash,
            approved = decision.approved,
            risk = ?decision.report.risk_tier,
            "release decision recorded"
        );
        self.ledger.append(decision.to_ledger_entry()).await?;
        Ok(decision)
    }

    /// Escalate a NEEDS_REVIEW report to the human workflow.
    ///
    /// An explicit verdict within the deadline decides; anything else --
    /// timeout, workflow failure -- is a rejection. Silence is never
    /// approval.
    async fn escalate(&self, report: SafetyReport, candidate: &Candidate) -> ReleaseDecision {
        let deadline = Duration::from_secs(self.config.review_deadline_secs);
        let request = self.review.request_review(&report, candidate);

        match tokio::time::timeout(deadline, request).await {
            Ok(Ok(verdict)) => {
                let reasoning = verdict
                    .comment
                    .unwrap_or_else(|| "explicit reviewer verdict".to_string());
                ReleaseDecision {
                    approved: verdict.approved,
                    decided_by: DecidingParty::Human(verdict.reviewer),
                    reasoning,
                    decided_at: Utc::now(),
                    report,
                }
            }
            Ok(Err(err)) => {
                warn!(error = %err, "review workflow failed; rejecting");
                reject(
                    report,
                    DecidingParty::Automated,
                    format!("review required but workflow failed: {err}"),
                )
            }
            Err(_) => reject(
                report,
                DecidingParty::Automated,
                format!(
                    "review required but no verdict within {}s",
                    self.config.review_deadline_secs
                ),
            ),
        }
    }

    // -----------------------------------------------------------------------
    // individual checks
    // -----------------------------------------------------------------------

    /// (a) Adjusted CMP score clears the configured threshold. A missing
    /// score does not clear it.
    fn check_score(&self, score: Option<&AggregateScore>) -> SafetyCheckResult {
        match score {
            Some(s) if s.adjusted >= self.config.score_threshold => SafetyCheckResult::pass(
                SafetyCheck::ScoreThreshold,
                format!("adjusted score {:.1} >= {:.1}", s.adjusted, self.config.score_threshold),
            ),
            Some(s) => SafetyCheckResult::fail(
                SafetyCheck::ScoreThreshold,
                format!("adjusted score {:.1} < {:.1}", s.adjusted, self.config.score_threshold),
                json!({ "adjusted": s.adjusted, "threshold": self.config.score_threshold }),
            ),
            None => SafetyCheckResult::fail(
                SafetyCheck::ScoreThreshold,
                "no aggregate score available",
                json!({ "threshold": self.config.score_threshold }),
            ),
        }
    }

    /// (b) Language-neutral structural validity: non-empty source,
    /// balanced bracket nesting, terminated string literals.
    fn check_syntax(&self, candidate: &Candidate) -> SafetyCheckResult {
        match structural_error(&candidate.source) {
            None => SafetyCheckResult::pass(SafetyCheck::SyntacticValidity, "source is well formed"),
            Some(problem) => SafetyCheckResult::fail(
                SafetyCheck::SyntacticValidity,
                format!("source is malformed: {problem}"),
                json!({ "problem": problem }),
            ),
        }
    }

    /// (c)/(d) Case-insensitive denylist scan.
    fn check_denylist(
        &self,
        candidate: &Candidate,
        check: SafetyCheck,
        patterns: &[String],
    ) -> SafetyCheckResult {
        let haystack = candidate.source.to_lowercase();
        let matched: Vec<&String> = patterns
            .iter()
            .filter(|p| haystack.contains(&p.to_lowercase()))
            .collect();

        if matched.is_empty() {
            SafetyCheckResult::pass(check, "no denylisted patterns found")
        } else {
            SafetyCheckResult::fail(
                check,
                format!("denylisted patterns found: {}", matched.len()),
                json!({ "patterns": matched }),
            )
        }
    }

    /// (e) Size and complexity ceiling.
    fn check_size(&self, candidate: &Candidate) -> SafetyCheckResult {
        let lines = candidate.source.lines().count();
        let functions = count_occurrences(&candidate.source, &["fn ", "def ", "function "]);
        let types = count_occurrences(&candidate.source, &["struct ", "enum ", "class ", "interface "]);

        let mut breaches = Vec::new();
        if lines > self.config.max_lines {
            breaches.push(format!("{lines} lines > {}", self.config.max_lines));
        }
        if functions > self.config.max_functions {
            breaches.push(format!("{functions} functions > {}", self.config.max_functions));
        }
        if types > self.config.max_types {
            breaches.push(format!("{types} types > {}", self.config.max_types));
        }

        if breaches.is_empty() {
            SafetyCheckResult::pass(
                SafetyCheck::SizeComplexity,
                format!("{lines} lines, {functions} functions, {types} types"),
            )
        } else {
            SafetyCheckResult::fail(
                SafetyCheck::SizeComplexity,
                format!("size ceiling exceeded: {}", breaches.join("; ")),
                json!({ "lines": lines, "functions": functions, "types": types }),
            )
        }
    }
}

// ---------------------------------------------------------------------------
// classification
// ---------------------------------------------------------------------------

/// Risk tier over the complete result set; computed after all checks ran.
fn compute_risk_tier(results: &[SafetyCheckResult], context: GateContext) -> RiskTier {
    let failed: Vec<&SafetyCheckResult> = results.iter().filter(|r| !r.passed).collect();

    if failed.len() >= 2 || context.security_sensitive {
        RiskTier::Critical
    } else if context.core_system || (failed.len() == 1 && failed[0].check.is_denylist()) {
        RiskTier::High
    } else if failed.len() == 1 {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}

/// Status over results + tier. Failure dominates; review demand is next.
fn compute_status(results: &[SafetyCheckResult], tier: RiskTier, strict: bool) -> GateStatus {
    if results.iter().any(|r| !r.passed) {
        GateStatus::Failed
    } else if tier >= RiskTier::High || strict {
        GateStatus::NeedsReview
    } else {
        GateStatus::Passed
    }
}

/// Construct a rejection decision.
fn reject(report: SafetyReport, decided_by: DecidingParty, reasoning: String) -> ReleaseDecision {
    ReleaseDecision {
        report,
        approved: false,
        decided_by,
        reasoning,
        decided_at: Utc::now(),
    }
}

// ---------------------------------------------------------------------------
// structural scanner
// ---------------------------------------------------------------------------

/// Scan for structural problems: unbalanced brackets outside string
/// literals, or an unterminated string. Returns a description of the
/// first problem found.
fn structural_error(source: &str) -> Option<String> {
    if source.trim().is_empty() {
        return Some("source is empty".to_string());
    }

    let mut stack: Vec<char> = Vec::new();
    let mut in_string: Option<char> = None;
    let mut escaped = false;

    for ch in source.chars() {
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote || ch == '\n' {
                // A newline terminates a single-line literal leniently:
                // multi-line string syntaxes vary too much across languages
                // to flag them here.
                in_string = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' => in_string = Some(ch),
            '(' | '[' | '{' => stack.push(ch),
            ')' | ']' | '}' => {
                let expected = match ch {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if stack.pop() != Some(expected) {
                    return Some(format!("unbalanced '{ch}'"));
                }
            }
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Some(format!("unclosed '{open}'"));
    }
    if in_string.is_some() {
        return Some("unterminated string literal".to_string());
    }
    None
}

/// Count whole-ish keyword occurrences across the source.
fn count_occurrences(source: &str, needles: &[&str]) -> usize {
    needles
        .iter()
        .map(|needle| source.matches(needle).count())
        .sum()
}

// =========================================================================
// Tests
// =========================================================================
