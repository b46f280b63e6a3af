use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::PipelineConfig;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid coherence_weight: {0}. Must be between 0.0 and 1.0")]
    InvalidCoherenceWeight(f64),

    #[error("Invalid {name}: {value}. Must be between 0 and 100")]
    InvalidScoreThreshold { name: &'static str, value: f64 },

    #[error("Invalid beam_width: {0}. Must be at least 1")]
    InvalidBeamWidth(usize),

    #[error("Invalid branching_factor: {0}. Must be at least beam_width ({1})")]
    InvalidBranchingFactor(usize, usize),

    #[error("Invalid rounds: min_rounds ({0}) must not exceed max_rounds ({1})")]
    InvalidRounds(usize, usize),

    #[error("Invalid lookback_window: {0}. Must be at least 2")]
    InvalidLookbackWindow(usize),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .crucible/config.yaml (project config)
    /// 3. .crucible/local.yaml (project local overrides, optional)
    /// 4. Environment variables (CRUCIBLE_* prefix, highest priority)
    ///
    /// Configuration is always project-local (pwd/.crucible/) so multiple
    /// projects on one machine can carry different tunings.
    pub fn load() -> Result<PipelineConfig> {
        let config: PipelineConfig = Figment::new()
            .merge(Serialized::defaults(PipelineConfig::default()))
            .merge(Yaml::file(".crucible/config.yaml"))
            .merge(Yaml::file(".crucible/local.yaml"))
            .merge(Env::prefixed("CRUCIBLE_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<PipelineConfig> {
        let config: PipelineConfig = Figment::new()
            .merge(Serialized::defaults(PipelineConfig::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &PipelineConfig) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&config.judge.coherence_weight) {
            return Err(ConfigError::InvalidCoherenceWeight(
                config.judge.coherence_weight,
            ));
        }

        for (name, value) in [
            ("success_threshold", config.search.success_threshold),
            ("score_threshold", config.gate.score_threshold),
            ("archival_threshold", config.archive.archival_threshold),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::InvalidScoreThreshold { name, value });
            }
        }

        if config.search.beam_width == 0 {
            return Err(ConfigError::InvalidBeamWidth(config.search.beam_width));
        }
        if config.search.branching_factor < config.search.beam_width {
            return Err(ConfigError::InvalidBranchingFactor(
                config.search.branching_factor,
                config.search.beam_width,
            ));
        }

        if config.termination.min_rounds > config.termination.max_rounds {
            return Err(ConfigError::InvalidRounds(
                config.termination.min_rounds,
                config.termination.max_rounds,
            ));
        }
        if config.termination.lookback_window < 2 {
            return Err(ConfigError::InvalidLookbackWindow(
                config.termination.lookback_window,
            ));
        }

        if config.gate.dangerous_constructs.is_empty() || config.gate.restricted_imports.is_empty()
        {
            return Err(ConfigError::ValidationFailed(
                "gate denylists cannot be empty".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}
