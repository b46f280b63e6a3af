//! Infrastructure layer module
//!
//! Cross-cutting concerns that sit outside the domain:
//! - Configuration loading (defaults, YAML files, environment overrides)
//! - Logging initialization
//!
//! Infrastructure implementations satisfy the contracts the domain layer
//! expects without leaking their libraries into it.

pub mod config;
pub mod logging;
