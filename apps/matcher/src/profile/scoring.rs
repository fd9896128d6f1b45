//! Candidate feature vector: skills, experience, interests, presence.
//!
//! Malformed input never drops a candidate. Each defect is repaired with a
//! fixed default and logged at `warn`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{Candidate, CandidateId};
use crate::profile::completeness::compute_completeness_report;
use crate::requirements::Taxonomy;

pub const RATING_MIN: f64 = 1.0;
pub const RATING_MAX: f64 = 5.0;

/// Years at which the experience curve reaches 1.0.
pub const EXPERIENCE_SATURATION_YEARS: f64 = 10.0;
const EXPERIENCE_CURVE_SCALE: f64 = 4.0;

/// Experience score used when years are missing or unreadable.
pub const MISSING_EXPERIENCE_SCORE: f64 = 0.2;

/// Share of the presence score taken by profile completeness; the rest is
/// the external credibility signal.
const PRESENCE_COMPLETENESS_SHARE: f64 = 0.4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateFeatures {
    pub candidate_id: CandidateId,
    pub display_name: String,
    /// Rated categories only, each rating / 5. Unrated categories are absent.
    pub skills: BTreeMap<String, f64>,
    /// Saturating experience score in [0, 1].
    pub experience: f64,
    pub years_experience: Option<f64>,
    pub interests: BTreeSet<String>,
    pub interest_themes: BTreeSet<String>,
    pub presence: f64,
    pub completeness: f64,
    pub company: Option<String>,
}

/// Builds the feature vector for one candidate.
pub fn score_profile(candidate: &Candidate, taxonomy: &Taxonomy) -> CandidateFeatures {
    let candidate_id = candidate.id();
    let skills = normalize_skills(&candidate_id, &candidate.skill_ratings, taxonomy);

    let years_experience = match candidate.years_experience {
        Some(years) if years.is_finite() && years >= 0.0 => Some(years),
        Some(years) => {
            warn!("Candidate '{candidate_id}': unreadable years of experience ({years}); using default");
            None
        }
        None => None,
    };
    let experience = years_experience
        .map(experience_curve)
        .unwrap_or(MISSING_EXPERIENCE_SCORE);

    let interests = normalize_interests(&candidate.interests);
    let interest_themes = taxonomy.themes_for_tags(&interests);

    let completeness = compute_completeness_report(candidate).score;
    let credibility = normalize_credibility(&candidate_id, candidate.credibility_score);
    let presence = (PRESENCE_COMPLETENESS_SHARE * completeness
        + (1.0 - PRESENCE_COMPLETENESS_SHARE) * credibility)
        .clamp(0.0, 1.0);

    CandidateFeatures {
        display_name: candidate.display_name(),
        candidate_id,
        skills,
        experience,
        years_experience,
        interests,
        interest_themes,
        presence,
        completeness,
        company: candidate.company_key(),
    }
}

/// Maps years onto [0, 1] with diminishing returns, flat past 10 years.
///
/// `s(y) = (1 - e^(-y/4)) / (1 - e^(-10/4))`
pub fn experience_curve(years: f64) -> f64 {
    let capped = years.clamp(0.0, EXPERIENCE_SATURATION_YEARS);
    let raw = 1.0 - (-capped / EXPERIENCE_CURVE_SCALE).exp();
    let ceiling = 1.0 - (-EXPERIENCE_SATURATION_YEARS / EXPERIENCE_CURVE_SCALE).exp();
    (raw / ceiling).clamp(0.0, 1.0)
}

fn normalize_skills(
    candidate_id: &CandidateId,
    ratings: &BTreeMap<String, Option<f64>>,
    taxonomy: &Taxonomy,
) -> BTreeMap<String, f64> {
    let mut skills = BTreeMap::new();
    for (name, rating) in ratings {
        let Some(rating) = rating else {
            continue;
        };
        if !rating.is_finite() {
            warn!("Candidate '{candidate_id}': non-numeric rating for '{name}' ignored");
            continue;
        }
        let clamped = rating.clamp(RATING_MIN, RATING_MAX);
        if clamped != *rating {
            warn!("Candidate '{candidate_id}': rating {rating} for '{name}' clamped to {clamped}");
        }
        let key = match taxonomy.canonical_category(name) {
            Some(canonical) => canonical.to_string(),
            None => {
                debug!("Candidate '{candidate_id}': '{name}' is not a taxonomy category");
                name.trim().to_string()
            }
        };
        skills.insert(key, clamped / RATING_MAX);
    }
    skills
}

/// Splits free-text interest answers into lowercase tags.
pub fn normalize_interests(raw: &[String]) -> BTreeSet<String> {
    raw.iter()
        .flat_map(|entry| entry.split([',', ';', '\n']))
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

fn normalize_credibility(candidate_id: &CandidateId, raw: Option<f64>) -> f64 {
    match raw {
        None => 0.0,
        Some(value) if !value.is_finite() => {
            warn!("Candidate '{candidate_id}': unreadable credibility score; using 0");
            0.0
        }
        Some(value) => {
            let clamped = value.clamp(0.0, 1.0);
            if clamped != value {
                warn!("Candidate '{candidate_id}': credibility {value} clamped to {clamped}");
            }
            clamped
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_candidate(ratings: &[(&str, Option<f64>)]) -> Candidate {
        Candidate {
            first_name: "Lee".to_string(),
            last_name: "Park".to_string(),
            email: "lee@example.org".to_string(),
            years_experience: Some(5.0),
            skill_ratings: ratings
                .iter()
                .map(|(name, rating)| (name.to_string(), *rating))
                .collect(),
            interests: vec!["Non-profit, Events".to_string()],
            credibility_score: Some(0.5),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_rating_excluded_not_zero() {
        let candidate = make_candidate(&[("Business Analysis", Some(4.0)), ("Portfolio Management", None)]);
        let features = score_profile(&candidate, &Taxonomy::standard());
        assert_eq!(features.skills.get("Business Analysis"), Some(&0.8));
        assert!(!features.skills.contains_key("Portfolio Management"));
    }

    #[test]
    fn test_out_of_range_rating_clamped() {
        let candidate = make_candidate(&[("Business Analysis", Some(9.0)), ("Strategic Planning", Some(-2.0))]);
        let features = score_profile(&candidate, &Taxonomy::standard());
        assert_eq!(features.skills["Business Analysis"], 1.0);
        assert_eq!(features.skills["Strategic Planning"], 0.2);
    }

    #[test]
    fn test_nan_rating_dropped() {
        let candidate = make_candidate(&[("Business Analysis", Some(f64::NAN))]);
        let features = score_profile(&candidate, &Taxonomy::standard());
        assert!(features.skills.is_empty());
    }

    #[test]
    fn test_category_names_canonicalized() {
        let candidate = make_candidate(&[(" business analysis", Some(3.0))]);
        let features = score_profile(&candidate, &Taxonomy::standard());
        assert!(features.skills.contains_key("Business Analysis"));
    }

    #[test]
    fn test_experience_curve_saturates() {
        assert_eq!(experience_curve(0.0), 0.0);
        assert!((experience_curve(10.0) - 1.0).abs() < 1e-12);
        assert!((experience_curve(25.0) - 1.0).abs() < 1e-12);
        // Diminishing returns: the first five years are worth more than the next five.
        let first = experience_curve(5.0) - experience_curve(0.0);
        let second = experience_curve(10.0) - experience_curve(5.0);
        assert!(first > second);
    }

    #[test]
    fn test_missing_years_uses_default() {
        let mut candidate = make_candidate(&[]);
        candidate.years_experience = None;
        let features = score_profile(&candidate, &Taxonomy::standard());
        assert_eq!(features.experience, MISSING_EXPERIENCE_SCORE);
    }

    #[test]
    fn test_negative_years_treated_as_missing() {
        let mut candidate = make_candidate(&[]);
        candidate.years_experience = Some(-3.0);
        let features = score_profile(&candidate, &Taxonomy::standard());
        assert_eq!(features.years_experience, None);
        assert_eq!(features.experience, MISSING_EXPERIENCE_SCORE);
    }

    #[test]
    fn test_interests_split_and_lowercased() {
        let tags = normalize_interests(&["Non-profit; Events".to_string(), " Agile ".to_string()]);
        assert_eq!(
            tags.into_iter().collect::<Vec<_>>(),
            vec!["agile", "events", "non-profit"]
        );
    }

    #[test]
    fn test_interest_themes_resolved() {
        let features = score_profile(&make_candidate(&[]), &Taxonomy::standard());
        assert!(features.interest_themes.contains("non-profit"));
        assert!(features.interest_themes.contains("events"));
    }

    #[test]
    fn test_presence_blends_completeness_and_credibility() {
        let mut candidate = make_candidate(&[]);
        candidate.credibility_score = Some(1.0);
        let high = score_profile(&candidate, &Taxonomy::standard());
        candidate.credibility_score = None;
        let low = score_profile(&candidate, &Taxonomy::standard());
        assert!(high.presence > low.presence);
        assert!((high.presence - low.presence - 0.6).abs() < 1e-9);
        assert!(high.presence <= 1.0);
    }

    #[test]
    fn test_credibility_clamped() {
        let id = CandidateId::from_email("x@example.org");
        assert_eq!(normalize_credibility(&id, Some(3.0)), 1.0);
        assert_eq!(normalize_credibility(&id, Some(f64::INFINITY)), 0.0);
        assert_eq!(normalize_credibility(&id, None), 0.0);
    }
}
