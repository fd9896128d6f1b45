//! Pair scoring — pluggable, trait-based scorer over (candidate, project).
//!
//! Default: `WeightedPairScorer` (pure, deterministic, fully testable).
//! The allocation engine only sees the resulting `ScoreMatrix`, so a different
//! scorer can be swapped in through `run_analysis_with` without touching it.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::matching::weights::ScoringWeights;
use crate::models::{CandidateId, ProjectId};
use crate::profile::scoring::experience_curve;
use crate::profile::CandidateFeatures;
use crate::requirements::{ProjectRequirements, RequirementVector};

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// Per-component breakdown, every value in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub skill_fit: f64,
    pub experience_fit: f64,
    pub interest_fit: f64,
    pub presence: f64,
    pub completeness: f64,
}

impl ScoreComponents {
    pub fn composite(&self, weights: &ScoringWeights) -> f64 {
        (weights.skill * self.skill_fit
            + weights.experience * self.experience_fit
            + weights.interest * self.interest_fit
            + weights.presence * self.presence
            + weights.completeness * self.completeness)
            .clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub candidate_id: CandidateId,
    pub project_id: ProjectId,
    pub composite: f64,
    pub components: ScoreComponents,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap scoring backends without touching allocation.
pub trait PairScorer: Send + Sync {
    /// Label recorded in the run outcome for transparency.
    fn backend(&self) -> &'static str;

    fn score(&self, candidate: &CandidateFeatures, project: &ProjectRequirements) -> ScoreEntry;
}

// ────────────────────────────────────────────────────────────────────────────
// WeightedPairScorer — default implementation
// ────────────────────────────────────────────────────────────────────────────

/// Fixed convex combination of skill, experience, interest, presence and
/// completeness. Weights are validated by the caller.
#[derive(Debug, Clone, Default)]
pub struct WeightedPairScorer {
    pub weights: ScoringWeights,
}

impl WeightedPairScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }
}

impl PairScorer for WeightedPairScorer {
    fn backend(&self) -> &'static str {
        "weighted"
    }

    fn score(&self, candidate: &CandidateFeatures, project: &ProjectRequirements) -> ScoreEntry {
        let components = ScoreComponents {
            skill_fit: skill_fit(candidate, &project.requirements),
            experience_fit: experience_fit(candidate.experience, project.requirements.complexity),
            interest_fit: interest_fit(candidate, project),
            presence: candidate.presence,
            completeness: candidate.completeness,
        };
        ScoreEntry {
            candidate_id: candidate.candidate_id.clone(),
            project_id: project.project_id.clone(),
            composite: components.composite(&self.weights),
            components,
        }
    }
}

/// Weighted overlap of the candidate's ratings with the requirement vector.
///
/// `Σ w·rating / Σ w` over categories with positive weight. An unrated
/// required category earns nothing for that share of the weight, so skipping
/// the project's main skill cannot lift the score. Zero-weight categories
/// play no part; an all-zero requirement vector yields 0.
pub fn skill_fit(candidate: &CandidateFeatures, requirements: &RequirementVector) -> f64 {
    let mut required_weight = 0.0;
    let mut weighted_rating = 0.0;

    for (category, weight) in &requirements.weights {
        if *weight <= 0.0 {
            continue;
        }
        required_weight += weight;
        if let Some(rating) = candidate.skills.get(category) {
            weighted_rating += weight * rating;
        }
    }

    if required_weight > 0.0 {
        (weighted_rating / required_weight).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Years needed for full experience credit at complexity 0 and 1.
const BASE_REQUIRED_YEARS: f64 = 2.0;
const COMPLEXITY_REQUIRED_YEARS: f64 = 6.0;

/// Experience score relative to what the project's complexity calls for.
pub fn experience_fit(experience: f64, complexity: f64) -> f64 {
    let required_years = BASE_REQUIRED_YEARS + COMPLEXITY_REQUIRED_YEARS * complexity.clamp(0.0, 1.0);
    let saturation = experience_curve(required_years);
    (experience / saturation).clamp(0.0, 1.0)
}

/// Fraction of the project's interest themes the candidate signed up for.
pub fn interest_fit(candidate: &CandidateFeatures, project: &ProjectRequirements) -> f64 {
    if project.interest_themes.is_empty() {
        return 0.0;
    }
    let shared = project
        .interest_themes
        .intersection(&candidate.interest_themes)
        .count();
    shared as f64 / project.interest_themes.len() as f64
}

/// Allocation order: composite desc, skill-fit desc, candidate id asc,
/// project id asc. Total, so sorting is reproducible across runs.
pub fn rank_order(a: &ScoreEntry, b: &ScoreEntry) -> Ordering {
    b.composite
        .total_cmp(&a.composite)
        .then_with(|| b.components.skill_fit.total_cmp(&a.components.skill_fit))
        .then_with(|| a.candidate_id.cmp(&b.candidate_id))
        .then_with(|| a.project_id.cmp(&b.project_id))
}

// ────────────────────────────────────────────────────────────────────────────
// Score matrix
// ────────────────────────────────────────────────────────────────────────────

/// Dense candidate × project matrix, candidate-major. Read-only once built.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreMatrix {
    pub backend: String,
    entries: Vec<ScoreEntry>,
    #[serde(skip)]
    lookup: BTreeMap<(CandidateId, ProjectId), usize>,
}

impl ScoreMatrix {
    pub fn build(
        candidates: &[CandidateFeatures],
        projects: &[ProjectRequirements],
        scorer: &dyn PairScorer,
    ) -> Self {
        let mut entries = Vec::with_capacity(candidates.len() * projects.len());
        let mut lookup = BTreeMap::new();

        for candidate in candidates {
            for project in projects {
                let entry = scorer.score(candidate, project);
                lookup.insert(
                    (entry.candidate_id.clone(), entry.project_id.clone()),
                    entries.len(),
                );
                entries.push(entry);
            }
        }

        Self {
            backend: scorer.backend().to_string(),
            entries,
            lookup,
        }
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn get(&self, candidate: &CandidateId, project: &ProjectId) -> Option<&ScoreEntry> {
        self.lookup
            .get(&(candidate.clone(), project.clone()))
            .map(|idx| &self.entries[*idx])
    }

    /// All entries in allocation order.
    pub fn ranked(&self) -> Vec<&ScoreEntry> {
        let mut ranked: Vec<&ScoreEntry> = self.entries.iter().collect();
        ranked.sort_by(|a, b| rank_order(a, b));
        ranked
    }

    /// The candidate's highest-ranked project.
    pub fn best_for(&self, candidate: &CandidateId) -> Option<&ScoreEntry> {
        self.entries
            .iter()
            .filter(|e| &e.candidate_id == candidate)
            .min_by(|a, b| rank_order(a, b))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
