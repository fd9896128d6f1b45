use serde::{Deserialize, Serialize};

use crate::errors::MatchError;
use crate::models::Level;

/// Every project needs at least this many people, under either policy.
pub const MIN_HEADCOUNT: usize = 2;

/// Headcount multipliers by demand level, applied to the base allocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorityMultipliers {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for PriorityMultipliers {
    fn default() -> Self {
        Self {
            low: 0.9,
            medium: 1.0,
            high: 1.4,
        }
    }
}

impl PriorityMultipliers {
    pub fn for_level(&self, level: Level) -> f64 {
        match level {
            Level::Low => self.low,
            Level::Medium => self.medium,
            Level::High => self.high,
        }
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        for (name, value) in [("low", self.low), ("medium", self.medium), ("high", self.high)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(MatchError::InvalidMultipliers(format!(
                    "'{name}' multiplier must be a positive number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexibleSettings {
    #[serde(default)]
    pub multipliers: PriorityMultipliers,
    /// Hand leftover seats to the highest-demand projects until every
    /// candidate has somewhere to go.
    #[serde(default = "default_absorb_surplus")]
    pub absorb_surplus: bool,
}

fn default_absorb_surplus() -> bool {
    true
}

impl Default for FlexibleSettings {
    fn default() -> Self {
        Self {
            multipliers: PriorityMultipliers::default(),
            absorb_surplus: true,
        }
    }
}

/// The single behavioral fork of a run, chosen once up front.
///
/// - `Standard`: every project gets exactly `MIN_HEADCOUNT`; leftovers are
///   reported as unmatched.
/// - `Flexible`: projects grow past the minimum toward a demand-weighted
///   target so every candidate can be placed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AllocationPolicy {
    #[default]
    Standard,
    Flexible(FlexibleSettings),
}

impl AllocationPolicy {
    pub fn from_name(name: &str) -> Result<Self, MatchError> {
        match name.trim().to_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "flexible" => Ok(Self::Flexible(FlexibleSettings::default())),
            _ => Err(MatchError::UnknownPolicy(name.to_string())),
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Flexible(_) => "flexible",
        }
    }

    /// Whether the engine runs the target-fill phase after the floors.
    pub fn fills_to_target(&self) -> bool {
        matches!(self, Self::Flexible(_))
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        match self {
            Self::Standard => Ok(()),
            Self::Flexible(settings) => settings.multipliers.validate(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
