use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Level, Project, ProjectId};
use crate::requirements::taxonomy::{IndicatorSet, Taxonomy};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Required strength per skill category plus a complexity scalar.
///
/// `weights` either sums to 1.0 or is all zero. All-zero means "no explicit
/// requirement": scorers must not reward or penalize any skill for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementVector {
    pub weights: BTreeMap<String, f64>,
    pub complexity: f64,
}

impl RequirementVector {
    pub fn weight(&self, category: &str) -> f64 {
        self.weights.get(category).copied().unwrap_or(0.0)
    }

    pub fn is_unspecified(&self) -> bool {
        self.weights.values().all(|w| *w <= 0.0)
    }

    /// Categories with positive weight, heaviest first.
    pub fn top_categories(&self, limit: usize) -> Vec<(&str, f64)> {
        let mut positive: Vec<(&str, f64)> = self
            .weights
            .iter()
            .filter(|(_, w)| **w > 0.0)
            .map(|(name, w)| (name.as_str(), *w))
            .collect();
        positive.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        positive.truncate(limit);
        positive
    }
}

/// Everything the scorer and planner need to know about one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRequirements {
    pub project_id: ProjectId,
    pub requirements: RequirementVector,
    /// Pre-normalization weights on the 0–10 scale, kept for reporting.
    pub raw_weights: BTreeMap<String, f64>,
    pub interest_themes: BTreeSet<String>,
    pub priority: Level,
    pub complexity_level: Level,
}

// ────────────────────────────────────────────────────────────────────────────
// Extraction
// ────────────────────────────────────────────────────────────────────────────

const HIT_WEIGHT: f64 = 2.0;
const INITIATIVE_BONUS: f64 = 5.0;
const RAW_WEIGHT_CAP: f64 = 10.0;

/// Word count at which description length stops adding complexity.
const LENGTH_SATURATION_WORDS: f64 = 300.0;

const KEYWORD_COMPLEXITY_SHARE: f64 = 0.5;
const LENGTH_COMPLEXITY_SHARE: f64 = 0.3;
const PRIORITY_COMPLEXITY_SHARE: f64 = 0.2;

/// Derives the requirement vector, priority and complexity for one project.
///
/// Algorithm:
/// 1. For each taxonomy category: 2 points per keyword hit in the full text,
///    +5 if any keyword appears in the initiative name, capped at 10
/// 2. Normalize raw weights by their sum (all-zero stays all-zero)
/// 3. Priority: explicit field if present, else keyword indicators
/// 4. Complexity: 50% keyword level, 30% text length, 20% priority
pub fn extract_requirements(project: &Project, taxonomy: &Taxonomy) -> ProjectRequirements {
    let text = project.full_text();
    let initiative = project.initiative.to_lowercase();

    let raw_weights = raw_skill_weights(&text, &initiative, taxonomy);
    let weights = normalize_weights(&raw_weights);

    let priority = project
        .priority
        .unwrap_or_else(|| detect_priority(&text, &taxonomy.priority_indicators));
    let keyword_level = keyword_complexity(&text, &taxonomy.complexity_indicators);
    let word_count = text.split_whitespace().count();
    let complexity = complexity_scalar(keyword_level, word_count, priority);

    let project_id = project.id();
    let requirements = RequirementVector {
        weights,
        complexity,
    };

    if requirements.is_unspecified() {
        debug!("Project '{project_id}' has no keyword hits; skill-fit will be neutral");
    }

    ProjectRequirements {
        project_id,
        interest_themes: taxonomy.themes_for_text(&text),
        requirements,
        raw_weights,
        priority,
        complexity_level: Level::from_fraction(complexity),
    }
}

fn raw_skill_weights(text: &str, initiative: &str, taxonomy: &Taxonomy) -> BTreeMap<String, f64> {
    taxonomy
        .skill_categories
        .iter()
        .map(|category| {
            let hits: usize = category
                .keywords
                .iter()
                .map(|kw| count_keyword(text, kw))
                .sum();
            let mut weight = hits as f64 * HIT_WEIGHT;
            if category
                .keywords
                .iter()
                .any(|kw| count_keyword(initiative, kw) > 0)
            {
                weight += INITIATIVE_BONUS;
            }
            (category.name.clone(), weight.min(RAW_WEIGHT_CAP))
        })
        .collect()
}

fn normalize_weights(raw: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    let total: f64 = raw.values().sum();
    raw.iter()
        .map(|(name, w)| {
            let normalized = if total > 0.0 { w / total } else { 0.0 };
            (name.clone(), normalized)
        })
        .collect()
}

/// First matching tier wins: any high indicator → High, any medium → Medium.
pub fn detect_priority(text: &str, indicators: &IndicatorSet) -> Level {
    if distinct_hits(text, &indicators.high) > 0 {
        Level::High
    } else if distinct_hits(text, &indicators.medium) > 0 {
        Level::Medium
    } else {
        Level::Low
    }
}

/// Level with the most distinct indicator hits; ties favor the higher level.
/// No hits at all → Medium.
fn keyword_complexity(text: &str, indicators: &IndicatorSet) -> Level {
    let high = distinct_hits(text, &indicators.high);
    let medium = distinct_hits(text, &indicators.medium);
    let low = distinct_hits(text, &indicators.low);

    if high == 0 && medium == 0 && low == 0 {
        Level::Medium
    } else if high >= medium && high >= low {
        Level::High
    } else if medium >= low {
        Level::Medium
    } else {
        Level::Low
    }
}

fn distinct_hits(text: &str, words: &[String]) -> usize {
    words.iter().filter(|w| count_keyword(text, w) > 0).count()
}

pub fn complexity_scalar(keyword_level: Level, word_count: usize, priority: Level) -> f64 {
    let length = (word_count as f64 / LENGTH_SATURATION_WORDS).min(1.0);
    (KEYWORD_COMPLEXITY_SHARE * keyword_level.as_fraction()
        + LENGTH_COMPLEXITY_SHARE * length
        + PRIORITY_COMPLEXITY_SHARE * priority.as_fraction())
    .clamp(0.0, 1.0)
}

/// Counts occurrences of `keyword` in `text` that start on a word boundary.
///
/// Both arguments are expected lowercase. The match may run into a longer
/// word, so "event" counts inside "events" but not inside "prevent".
pub(crate) fn count_keyword(text: &str, keyword: &str) -> usize {
    if keyword.is_empty() {
        return 0;
    }
    text.match_indices(keyword)
        .filter(|(idx, _)| {
            text[..*idx]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric())
        })
        .count()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
