use serde::{Deserialize, Serialize};

use crate::errors::MatchError;

const SUM_TOLERANCE: f64 = 1e-6;

/// Convex weights for the five score components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub skill: f64,
    pub experience: f64,
    pub interest: f64,
    pub presence: f64,
    pub completeness: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skill: 0.60,
            experience: 0.20,
            interest: 0.10,
            presence: 0.05,
            completeness: 0.05,
        }
    }
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.skill + self.experience + self.interest + self.presence + self.completeness
    }

    /// Every weight finite and non-negative, total within 1e-6 of 1.
    pub fn validate(&self) -> Result<(), MatchError> {
        let named = [
            ("skill", self.skill),
            ("experience", self.experience),
            ("interest", self.interest),
            ("presence", self.presence),
            ("completeness", self.completeness),
        ];
        if let Some((name, value)) = named.iter().find(|(_, w)| !w.is_finite() || *w < 0.0) {
            return Err(MatchError::InvalidWeights(format!(
                "{name} weight must be a non-negative number, got {value}"
            )));
        }
        let total = self.sum();
        if (total - 1.0).abs() > SUM_TOLERANCE {
            return Err(MatchError::InvalidWeights(format!(
                "weights must sum to 1.0, got {total:.4}"
            )));
        }
        Ok(())
    }
}
