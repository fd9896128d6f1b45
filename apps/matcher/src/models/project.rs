use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable key for a project. Both parts are trimmed and lowercased, and
/// kept apart so that no choice of names can make two projects collide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectId {
    pub organization: String,
    pub initiative: String,
}

impl ProjectId {
    pub fn new(organization: &str, initiative: &str) -> Self {
        Self {
            organization: organization.trim().to_lowercase(),
            initiative: initiative.trim().to_lowercase(),
        }
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.organization, self.initiative)
    }
}

/// Three-step scale shared by priority, complexity and demand.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    #[default]
    Medium,
    High,
}

impl Level {
    pub fn as_fraction(self) -> f64 {
        match self {
            Level::Low => 0.0,
            Level::Medium => 0.5,
            Level::High => 1.0,
        }
    }

    /// Buckets a [0, 1] scalar into thirds.
    pub fn from_fraction(value: f64) -> Self {
        if value >= 2.0 / 3.0 {
            Level::High
        } else if value >= 1.0 / 3.0 {
            Level::Medium
        } else {
            Level::Low
        }
    }
}

/// One organization's initiative, as handed over by the ingestion layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub organization: String,
    pub initiative: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expected_outcomes: String,
    #[serde(default)]
    pub organizational_benefit: String,
    /// What the organization hopes to get out of the day itself.
    #[serde(default)]
    pub participation_goals: String,
    /// Explicit priority, when the intake form captured one.
    pub priority: Option<Level>,
}

impl Project {
    pub fn id(&self) -> ProjectId {
        ProjectId::new(&self.organization, &self.initiative)
    }

    /// All free-text fields joined and lowercased for keyword matching.
    pub fn full_text(&self) -> String {
        [
            self.organization.as_str(),
            self.initiative.as_str(),
            self.description.as_str(),
            self.expected_outcomes.as_str(),
            self.organizational_benefit.as_str(),
            self.participation_goals.as_str(),
        ]
        .join(" ")
        .to_lowercase()
    }
}
