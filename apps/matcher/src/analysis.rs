//! One analysis run: records in, immutable outcome snapshot out.
//!
//! Flow: candidate/project records → feature vectors → score matrix →
//! capacity plan → allocation → report. Everything before the engine is a
//! pure transform; the engine owns its pools for the duration of the call.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::allocation::{
    build_report, plan_capacity, AllocationEngine, AllocationPolicy, AllocationReport,
    AllocationRules, Assignment, CapacityPlan, QualificationThresholds, ReportInputs,
    MIN_HEADCOUNT,
};
use crate::errors::MatchError;
use crate::matching::{PairScorer, ScoreMatrix, ScoringWeights, WeightedPairScorer};
use crate::models::{Candidate, Project};
use crate::profile::{score_profile, CandidateFeatures};
use crate::requirements::{extract_requirements, ProjectRequirements, Taxonomy};

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub policy: AllocationPolicy,
    pub weights: ScoringWeights,
    /// How many projects one candidate may join. 1 unless a run opts in.
    pub max_assignments_per_candidate: u32,
    pub enforce_unique_company: bool,
    pub thresholds: QualificationThresholds,
    pub taxonomy: Taxonomy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy: AllocationPolicy::Standard,
            weights: ScoringWeights::default(),
            max_assignments_per_candidate: 1,
            enforce_unique_company: false,
            thresholds: QualificationThresholds::default(),
            taxonomy: Taxonomy::standard(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), MatchError> {
        self.weights.validate()?;
        self.policy.validate()?;
        self.thresholds.validate()?;
        self.taxonomy.validate()?;
        if self.max_assignments_per_candidate == 0 {
            return Err(MatchError::ZeroMultiplicity);
        }
        Ok(())
    }

    fn rules(&self) -> AllocationRules {
        AllocationRules {
            max_assignments_per_candidate: self.max_assignments_per_candidate,
            enforce_unique_company: self.enforce_unique_company,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Outcome
// ────────────────────────────────────────────────────────────────────────────

/// Everything one run produced. Run id and timestamp are metadata only.
#[derive(Debug, Clone, Serialize)]
pub struct AllocationOutcome {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub policy: AllocationPolicy,
    pub taxonomy_version: String,
    pub profiles: Vec<CandidateFeatures>,
    pub requirements: Vec<ProjectRequirements>,
    pub scores: ScoreMatrix,
    pub capacity: CapacityPlan,
    pub assignment: Assignment,
    pub report: AllocationReport,
}

/// Runs the full pipeline with the default weighted scorer.
pub fn run_analysis(
    candidates: &[Candidate],
    projects: &[Project],
    config: &EngineConfig,
) -> Result<AllocationOutcome, MatchError> {
    let scorer = WeightedPairScorer::new(config.weights.clone());
    run_analysis_with(&scorer, candidates, projects, config)
}

/// Runs the full pipeline with a caller-supplied pair scorer.
pub fn run_analysis_with(
    scorer: &dyn PairScorer,
    candidates: &[Candidate],
    projects: &[Project],
    config: &EngineConfig,
) -> Result<AllocationOutcome, MatchError> {
    config.validate()?;
    check_inputs(candidates, projects)?;

    let run_id = Uuid::new_v4();
    info!(
        "Run {run_id}: {} candidates, {} projects, {} policy, taxonomy {}",
        candidates.len(),
        projects.len(),
        config.policy.mode_name(),
        config.taxonomy.version
    );

    let profiles: Vec<CandidateFeatures> = candidates
        .iter()
        .map(|c| score_profile(c, &config.taxonomy))
        .collect();
    let requirements: Vec<ProjectRequirements> = projects
        .iter()
        .map(|p| extract_requirements(p, &config.taxonomy))
        .collect();

    let scores = ScoreMatrix::build(&profiles, &requirements, scorer);
    let supply = profiles.len() * config.max_assignments_per_candidate as usize;
    let capacity = plan_capacity(&requirements, supply, &config.policy);
    info!(
        "Capacity plan: minimum {} seats, target {} seats, supply {}",
        capacity.total_minimum(),
        capacity.total_target(),
        supply
    );

    let assignment =
        AllocationEngine::new(&scores, &capacity, &config.policy, config.rules()).run(&profiles);

    let report = build_report(&ReportInputs {
        candidates: &profiles,
        projects: &requirements,
        matrix: &scores,
        plan: &capacity,
        assignment: &assignment,
        policy: &config.policy,
        thresholds: &config.thresholds,
    });
    info!("Run {run_id}: {}", report.summary.headline());

    Ok(AllocationOutcome {
        run_id,
        generated_at: Utc::now(),
        policy: config.policy.clone(),
        taxonomy_version: config.taxonomy.version.clone(),
        profiles,
        requirements,
        scores,
        capacity,
        assignment,
        report,
    })
}

/// Fatal preconditions on the records themselves.
fn check_inputs(candidates: &[Candidate], projects: &[Project]) -> Result<(), MatchError> {
    if projects.is_empty() {
        return Err(MatchError::NoProjects);
    }
    if candidates.len() < MIN_HEADCOUNT {
        return Err(MatchError::InsufficientSupply {
            supply: candidates.len(),
            minimum: MIN_HEADCOUNT,
        });
    }

    let mut seen = BTreeSet::new();
    for candidate in candidates {
        let id = candidate.id();
        if !seen.insert(id.clone()) {
            return Err(MatchError::DuplicateCandidate(id.to_string()));
        }
    }

    let mut seen = BTreeSet::new();
    for project in projects {
        let id = project.id();
        if !seen.insert(id.clone()) {
            return Err(MatchError::DuplicateProject(id.to_string()));
        }
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
