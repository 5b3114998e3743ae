//! Ranking weights and scored words

use serde::Serialize;

use crate::types::{EngineError, Word};
use crate::{DEFAULT_BETA, DEFAULT_GAMMA};

/// How much each previous word pulls the ranking
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoringWeights {
    /// Weight of the previous human word (0.0-1.0)
    pub beta: f32,
    /// Weight of the previous AI word (0.0-1.0)
    pub gamma: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            beta: DEFAULT_BETA,
            gamma: DEFAULT_GAMMA,
        }
    }
}

impl ScoringWeights {
    /// Build from optional caller values, rejecting anything outside [0, 1]
    pub fn from_request(beta: Option<f32>, gamma: Option<f32>) -> Result<Self, EngineError> {
        let weights = Self {
            beta: beta.unwrap_or(DEFAULT_BETA),
            gamma: gamma.unwrap_or(DEFAULT_GAMMA),
        };
        check_unit("beta", weights.beta)?;
        check_unit("gamma", weights.gamma)?;
        Ok(weights)
    }
}

fn check_unit(name: &str, value: f32) -> Result<(), EngineError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EngineError::Validation(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}

/// One ranked candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredWord {
    pub word: Word,
    /// Weighted cosine sum, not bounded to [0, 1]
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_weights() {
        let w = ScoringWeights::from_request(None, Some(0.25)).unwrap();
        assert_eq!(w.beta, DEFAULT_BETA);
        assert_eq!(w.gamma, 0.25);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(ScoringWeights::from_request(Some(0.0), Some(1.0)).is_ok());
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(matches!(
            ScoringWeights::from_request(Some(1.5), None),
            Err(EngineError::Validation(_))
        ));
        assert!(ScoringWeights::from_request(None, Some(-0.1)).is_err());
        assert!(ScoringWeights::from_request(Some(f32::NAN), None).is_err());
    }
}
