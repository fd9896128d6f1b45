//! Shortfall, unmatched, standing and placement reporting for a finished run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::allocation::capacity::CapacityPlan;
use crate::allocation::engine::{Assignment, AssignmentStep, Phase};
use crate::allocation::policy::AllocationPolicy;
use crate::errors::MatchError;
use crate::matching::ScoreMatrix;
use crate::models::{CandidateId, ProjectId};
use crate::profile::CandidateFeatures;
use crate::requirements::taxonomy::NON_PROFIT_THEME;
use crate::requirements::ProjectRequirements;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// A project that finished below its minimum headcount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shortfall {
    pub project_id: ProjectId,
    pub assigned: usize,
    pub minimum: usize,
    pub missing: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    Qualified,
    Backup,
    NotSelected,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualificationThresholds {
    pub qualified: f64,
    pub backup: f64,
}

impl Default for QualificationThresholds {
    fn default() -> Self {
        Self {
            qualified: 0.65,
            backup: 0.50,
        }
    }
}

impl QualificationThresholds {
    pub fn validate(&self) -> Result<(), MatchError> {
        let in_range = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        if !in_range(self.qualified) || !in_range(self.backup) {
            return Err(MatchError::InvalidThresholds(format!(
                "thresholds must lie in [0, 1] (qualified {}, backup {})",
                self.qualified, self.backup
            )));
        }
        if self.backup > self.qualified {
            return Err(MatchError::InvalidThresholds(format!(
                "backup threshold {} exceeds qualified threshold {}",
                self.backup, self.qualified
            )));
        }
        Ok(())
    }

    pub fn classify(&self, best_score: f64) -> Standing {
        if best_score >= self.qualified {
            Standing::Qualified
        } else if best_score >= self.backup {
            Standing::Backup
        } else {
            Standing::NotSelected
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateStanding {
    pub candidate_id: CandidateId,
    pub display_name: String,
    pub best_score: f64,
    pub best_project: Option<ProjectId>,
    pub standing: Standing,
}

/// One committed pair with the human-readable reasons for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub project_id: ProjectId,
    pub candidate_id: CandidateId,
    pub display_name: String,
    pub phase: Phase,
    pub score: f64,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub policy: String,
    pub candidates: usize,
    pub projects: usize,
    pub assigned_candidates: usize,
    pub placements: usize,
    pub understaffed_projects: usize,
    pub unmatched_candidates: usize,
    pub mean_score: f64,
}

impl RunSummary {
    /// One line for logs.
    pub fn headline(&self) -> String {
        format!(
            "{} policy: {}/{} candidates placed across {} projects ({} placements, mean score {:.3}); {} understaffed, {} unmatched",
            self.policy,
            self.assigned_candidates,
            self.candidates,
            self.projects,
            self.placements,
            self.mean_score,
            self.understaffed_projects,
            self.unmatched_candidates
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationReport {
    pub shortfalls: Vec<Shortfall>,
    pub unmatched: Vec<CandidateId>,
    /// True under Standard, where leftovers are the normal outcome.
    pub unmatched_expected: bool,
    pub standings: Vec<CandidateStanding>,
    pub placements: Vec<Placement>,
    pub summary: RunSummary,
}

// ────────────────────────────────────────────────────────────────────────────
// Report building
// ────────────────────────────────────────────────────────────────────────────

/// Inputs a report is built from; all read-only snapshots of one run.
pub struct ReportInputs<'a> {
    pub candidates: &'a [CandidateFeatures],
    pub projects: &'a [ProjectRequirements],
    pub matrix: &'a ScoreMatrix,
    pub plan: &'a CapacityPlan,
    pub assignment: &'a Assignment,
    pub policy: &'a AllocationPolicy,
    pub thresholds: &'a QualificationThresholds,
}

pub fn build_report(inputs: &ReportInputs<'_>) -> AllocationReport {
    let shortfalls = find_shortfalls(inputs.plan, inputs.assignment);
    for shortfall in &shortfalls {
        warn!(
            "Project '{}' understaffed: {} of {} (missing {})",
            shortfall.project_id, shortfall.assigned, shortfall.minimum, shortfall.missing
        );
    }

    let unmatched: Vec<CandidateId> = inputs
        .candidates
        .iter()
        .map(|c| &c.candidate_id)
        .filter(|id| inputs.assignment.placements_of(id) == 0)
        .cloned()
        .collect();
    let unmatched_expected = !inputs.policy.fills_to_target();
    if !unmatched.is_empty() && !unmatched_expected {
        warn!(
            "{} candidates left unmatched under {} policy: total target capacity was exhausted",
            unmatched.len(),
            inputs.policy.mode_name()
        );
    }

    let standings = inputs
        .candidates
        .iter()
        .map(|c| candidate_standing(c, inputs.matrix, inputs.thresholds))
        .collect();

    let features: BTreeMap<&CandidateId, &CandidateFeatures> = inputs
        .candidates
        .iter()
        .map(|c| (&c.candidate_id, c))
        .collect();
    let requirements: BTreeMap<&ProjectId, &ProjectRequirements> = inputs
        .projects
        .iter()
        .map(|p| (&p.project_id, p))
        .collect();

    let placements: Vec<Placement> = inputs
        .assignment
        .steps
        .iter()
        .filter_map(|step| {
            let candidate = features.get(&step.candidate_id)?;
            let project = requirements.get(&step.project_id)?;
            Some(placement(step, candidate, project))
        })
        .collect();

    let mean_score = if inputs.assignment.steps.is_empty() {
        0.0
    } else {
        inputs.assignment.steps.iter().map(|s| s.score).sum::<f64>()
            / inputs.assignment.steps.len() as f64
    };

    let summary = RunSummary {
        policy: inputs.policy.mode_name().to_string(),
        candidates: inputs.candidates.len(),
        projects: inputs.projects.len(),
        assigned_candidates: inputs.candidates.len() - unmatched.len(),
        placements: inputs.assignment.total_placements(),
        understaffed_projects: shortfalls.len(),
        unmatched_candidates: unmatched.len(),
        mean_score,
    };

    AllocationReport {
        shortfalls,
        unmatched,
        unmatched_expected,
        standings,
        placements,
        summary,
    }
}

pub fn find_shortfalls(plan: &CapacityPlan, assignment: &Assignment) -> Vec<Shortfall> {
    plan.entries
        .values()
        .filter_map(|entry| {
            let assigned = assignment.members(&entry.project_id).len();
            (assigned < entry.minimum).then(|| Shortfall {
                project_id: entry.project_id.clone(),
                assigned,
                minimum: entry.minimum,
                missing: entry.minimum - assigned,
            })
        })
        .collect()
}

fn candidate_standing(
    candidate: &CandidateFeatures,
    matrix: &ScoreMatrix,
    thresholds: &QualificationThresholds,
) -> CandidateStanding {
    let best = matrix.best_for(&candidate.candidate_id);
    let best_score = best.map_or(0.0, |e| e.composite);
    CandidateStanding {
        candidate_id: candidate.candidate_id.clone(),
        display_name: candidate.display_name.clone(),
        best_score,
        best_project: best.map(|e| e.project_id.clone()),
        standing: thresholds.classify(best_score),
    }
}

/// Requirement weight at which a category counts as central to a project.
const KEY_SKILL_WEIGHT: f64 = 0.15;
/// Normalized rating (4 of 5) that counts as strong.
const STRONG_RATING: f64 = 0.8;
const MAX_SKILL_REASONS: usize = 2;
const EXTENSIVE_EXPERIENCE_YEARS: f64 = 8.0;
const STRONG_PRESENCE: f64 = 0.7;
const COMPLETE_PROFILE: f64 = 0.8;

fn placement(
    step: &AssignmentStep,
    candidate: &CandidateFeatures,
    project: &ProjectRequirements,
) -> Placement {
    Placement {
        project_id: step.project_id.clone(),
        candidate_id: step.candidate_id.clone(),
        display_name: candidate.display_name.clone(),
        phase: step.phase,
        score: step.score,
        reasons: selection_reasons(candidate, project, step.score),
    }
}

/// Short reasons for a placement, most specific first.
pub fn selection_reasons(
    candidate: &CandidateFeatures,
    project: &ProjectRequirements,
    score: f64,
) -> Vec<String> {
    let mut reasons: Vec<String> = project
        .requirements
        .top_categories(usize::MAX)
        .into_iter()
        .filter(|(category, weight)| {
            *weight >= KEY_SKILL_WEIGHT
                && candidate.skills.get(*category).is_some_and(|r| *r >= STRONG_RATING)
        })
        .take(MAX_SKILL_REASONS)
        .map(|(category, _)| format!("Strong {category} skills"))
        .collect();

    if let Some(years) = candidate.years_experience {
        if years >= EXTENSIVE_EXPERIENCE_YEARS {
            reasons.push(format!("Extensive experience ({years:.0} years)"));
        }
    }
    if candidate.interest_themes.contains(NON_PROFIT_THEME) {
        reasons.push("Interested in non-profit work".to_string());
    }
    if candidate.presence >= STRONG_PRESENCE {
        reasons.push("Strong professional presence".to_string());
    }
    if candidate.completeness >= COMPLETE_PROFILE {
        reasons.push("Complete profile".to_string());
    }
    if reasons.is_empty() {
        reasons.push(format!("Best available fit (score {score:.2})"));
    }
    reasons
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
