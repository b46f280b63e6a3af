//! Evolution budget: the resource envelope for one `evolve` session.
//!
//! A budget bounds search depth, expansion iterations, and wall-clock time
//! simultaneously. Exhausting any dimension is a graceful stop that returns
//! the best candidate found so far -- never an error. Only a structurally
//! invalid budget (zero depth, zero iterations, zero time) is rejected, and
//! that happens eagerly before any work starts.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

/// Resource bounds for one evolution session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EvolutionBudget {
    /// Maximum tree depth below the root.
    pub max_depth: u32,
    /// Maximum number of expansion rounds.
    pub max_iterations: u32,
    /// Wall-clock ceiling for the whole session. In-flight backend calls
    /// may finish past the deadline, but no new expansion starts after it.
    pub max_wall_time: Duration,
}

impl Default for EvolutionBudget {
    /// Defaults sized for a short refinement session: depth 3, 10
    /// expansion rounds, 10 minutes of wall time.
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_iterations: 10,
            max_wall_time: Duration::from_secs(10 * 60),
        }
    }
}

impl EvolutionBudget {
    /// Reject structurally invalid budgets before any work starts.
    pub fn validate(&self) -> DomainResult<()> {
        if self.max_depth == 0 {
            return Err(DomainError::InvalidBudget("max_depth must be at least 1".into()));
        }
        if self.max_iterations == 0 {
            return Err(DomainError::InvalidBudget(
                "max_iterations must be at least 1".into(),
            ));
        }
        if self.max_wall_time.is_zero() {
            return Err(DomainError::InvalidBudget(
                "max_wall_time must be positive".into(),
            ));
        }
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget_is_valid() {
        assert!(EvolutionBudget::default().validate().is_ok());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let mut b = EvolutionBudget::default();
        b.max_depth = 0;
        assert!(matches!(b.validate(), Err(DomainError::InvalidBudget(_))));

        let mut b = EvolutionBudget::default();
        b.max_iterations = 0;
        assert!(matches!(b.validate(), Err(DomainError::InvalidBudget(_))));

        let mut b = EvolutionBudget::default();
        b.max_wall_time = Duration::ZERO;
        assert!(matches!(b.validate(), Err(DomainError::InvalidBudget(_))));
    }

    #[test]
    fn test_budget_serde_roundtrip() {
        let b = EvolutionBudget::default();
        let json = serde_json::to_string(&b).unwrap();
        let restored: EvolutionBudget = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.max_depth, b.max_depth);
        assert_eq!(restored.max_wall_time, b.max_wall_time);
    }
}
