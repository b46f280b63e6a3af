//! Pipeline configuration model.
//!
//! Every tunable in the pipeline lives here as a serde-backed section with
//! field-level defaults, so a partial YAML file or a single environment
//! variable can override one knob without restating the rest.

use serde::{Deserialize, Serialize};

use super::candidate::GenerationStrategy;

/// Main configuration structure for Crucible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    /// Judging and aggregation knobs.
    #[serde(default)]
    pub judge: JudgeConfig,

    /// Tree-search shape and thresholds.
    #[serde(default)]
    pub search: SearchConfig,

    /// Termination policy thresholds.
    #[serde(default)]
    pub termination: TerminationConfig,

    /// Release-gate thresholds and denylists.
    #[serde(default)]
    pub gate: GateConfig,

    /// Trajectory archive write-through.
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// JudgeConfig
// ---------------------------------------------------------------------------

/// Judging and aggregation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct JudgeConfig {
    /// Weight applied to the summed cross-dimension variance when
    /// computing the coherence penalty.
    #[serde(default = "default_coherence_weight")]
    pub coherence_weight: f64,

    /// Per-call timeout for the judging backend, in seconds.
    #[serde(default = "default_judge_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_coherence_weight() -> f64 {
    0.15
}

const fn default_judge_timeout_secs() -> u64 {
    60
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            coherence_weight: default_coherence_weight(),
            timeout_secs: default_judge_timeout_secs(),
        }
    }
}

// ---------------------------------------------------------------------------
// SearchConfig
// ---------------------------------------------------------------------------

/// Tree-search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SearchConfig {
    /// How many edits to request per expansion (N).
    #[serde(default = "default_branching_factor")]
    pub branching_factor: usize,

    /// How many scored edits survive per expansion (top-K).
    #[serde(default = "default_beam_width")]
    pub beam_width: usize,

    /// Adjusted score at which search converges.
    #[serde(default = "default_success_threshold")]
    pub success_threshold: f64,

    /// How edit proposals are generated.
    #[serde(default = "default_strategy")]
    pub strategy: GenerationStrategy,
}

const fn default_branching_factor() -> usize {
    10
}

const fn default_beam_width() -> usize {
    3
}

const fn default_success_threshold() -> f64 {
    90.0
}

const fn default_strategy() -> GenerationStrategy {
    GenerationStrategy::Hybrid
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            branching_factor: default_branching_factor(),
            beam_width: default_beam_width(),
            success_threshold: default_success_threshold(),
            strategy: default_strategy(),
        }
    }
}

// ---------------------------------------------------------------------------
// TerminationConfig
// ---------------------------------------------------------------------------

/// Termination policy configuration. All score thresholds are on the
/// 0-100 CMP scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TerminationConfig {
    /// Never stop before this many rounds.
    #[serde(default = "default_min_rounds")]
    pub min_rounds: usize,

    /// Always stop at this many rounds.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,

    /// How many recent scores the plateau and improvement rules inspect.
    #[serde(default = "default_lookback_window")]
    pub lookback_window: usize,

    /// Score variance below which the line is a plateau.
    #[serde(default = "default_plateau_variance")]
    pub plateau_variance: f64,

    /// Average per-round improvement below which refining is not worth
    /// the cost.
    #[serde(default = "default_improvement_threshold")]
    pub improvement_threshold: f64,
}

const fn default_min_rounds() -> usize {
    2
}

const fn default_max_rounds() -> usize {
    5
}

const fn default_lookback_window() -> usize {
    3
}

const fn default_plateau_variance() -> f64 {
    0.01
}

const fn default_improvement_threshold() -> f64 {
    0.05
}

impl Default for TerminationConfig {
    fn default() -> Self {
        Self {
            min_rounds: default_min_rounds(),
            max_rounds: default_max_rounds(),
            lookback_window: default_lookback_window(),
            plateau_variance: default_plateau_variance(),
            improvement_threshold: default_improvement_threshold(),
        }
    }
}

// ---------------------------------------------------------------------------
// GateConfig
// ---------------------------------------------------------------------------

/// Release-gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GateConfig {
    /// Minimum adjusted CMP score for the score-threshold check.
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f64,

    /// When on, even LOW/MEDIUM-risk passing reports need review.
    #[serde(default)]
    pub strict_mode: bool,

    /// Seconds to wait for a human verdict before treating silence as a
    /// rejection.
    #[serde(default = "default_review_deadline_secs")]
    pub review_deadline_secs: u64,

    /// Substring patterns flagging arbitrary execution, process spawning,
    /// or destructive filesystem operations.
    #[serde(default = "default_dangerous_constructs")]
    pub dangerous_constructs: Vec<String>,

    /// Substring patterns flagging process control, raw sockets, dynamic
    /// import, or low-level memory access.
    #[serde(default = "default_restricted_imports")]
    pub restricted_imports: Vec<String>,

    /// Maximum source line count.
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,

    /// Maximum function definition count.
    #[serde(default = "default_max_functions")]
    pub max_functions: usize,

    /// Maximum type definition count.
    #[serde(default = "default_max_types")]
    pub max_types: usize,
}

const fn default_score_threshold() -> f64 {
    70.0
}

const fn default_review_deadline_secs() -> u64 {
    300
}

fn default_dangerous_constructs() -> Vec<String> {
    [
        "eval(",
        "exec(",
        "os.system",
        "subprocess.",
        "popen(",
        "spawn(",
        "fork(",
        "rm -rf",
        "shutil.rmtree",
        "os.remove",
        "unlink(",
        "format(c:",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_restricted_imports() -> Vec<String> {
    [
        "import os",
        "import subprocess",
        "import socket",
        "import ctypes",
        "import mmap",
        "import signal",
        "__import__",
        "importlib",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

const fn default_max_lines() -> usize {
    1000
}

const fn default_max_functions() -> usize {
    50
}

const fn default_max_types() -> usize {
    30
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            score_threshold: default_score_threshold(),
            strict_mode: false,
            review_deadline_secs: default_review_deadline_secs(),
            dangerous_constructs: default_dangerous_constructs(),
            restricted_imports: default_restricted_imports(),
            max_lines: default_max_lines(),
            max_functions: default_max_functions(),
            max_types: default_max_types(),
        }
    }
}

// ---------------------------------------------------------------------------
// ArchiveConfig
// ---------------------------------------------------------------------------

/// Trajectory archive write-through configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ArchiveConfig {
    /// Adjusted score a candidate must clear to be archived.
    #[serde(default = "default_archival_threshold")]
    pub archival_threshold: f64,
}

const fn default_archival_threshold() -> f64 {
    75.0
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            archival_threshold: default_archival_threshold(),
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingConfig
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
