use serde::{Deserialize, Serialize};

use crate::models::Candidate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletenessReport {
    /// Filled points / 10, in [0, 1].
    pub score: f64,
    pub filled_points: u32,
    pub missing_fields: Vec<String>,
}

const TOTAL_POINTS: u32 = 10;

/// Skills whose ratings count toward the "skills completed" point.
const CORE_SKILLS: &[&str] = &[
    "Project Management",
    "Strategic Planning",
    "Business Change Management",
    "Business Analysis",
    "Portfolio Management",
];

/// Scores how completely a registrant filled in their profile.
///
/// One point each for first name, last name, e-mail, job title, company,
/// member id, years of experience, interests and profile URL; one more when
/// at least half of the core skills carry a rating.
pub fn compute_completeness_report(candidate: &Candidate) -> CompletenessReport {
    let text_fields: [(&str, Option<&str>); 7] = [
        ("first_name", Some(candidate.first_name.as_str())),
        ("last_name", Some(candidate.last_name.as_str())),
        ("email", Some(candidate.email.as_str())),
        ("job_title", candidate.job_title.as_deref()),
        ("company", candidate.company.as_deref()),
        ("member_id", candidate.member_id.as_deref()),
        ("profile_url", candidate.profile_url.as_deref()),
    ];

    let mut filled_points = 0;
    let mut missing_fields = Vec::new();

    for (name, value) in text_fields {
        if is_filled(value) {
            filled_points += 1;
        } else {
            missing_fields.push(name.to_string());
        }
    }

    if candidate.years_experience.is_some_and(f64::is_finite) {
        filled_points += 1;
    } else {
        missing_fields.push("years_experience".to_string());
    }

    if candidate.interests.iter().any(|i| is_filled(Some(i))) {
        filled_points += 1;
    } else {
        missing_fields.push("interests".to_string());
    }

    let rated_core = CORE_SKILLS
        .iter()
        .filter(|skill| {
            candidate.skill_ratings.iter().any(|(name, rating)| {
                name.trim().eq_ignore_ascii_case(skill) && rating.is_some_and(f64::is_finite)
            })
        })
        .count();
    if rated_core >= CORE_SKILLS.len() / 2 {
        filled_points += 1;
    } else {
        missing_fields.push("core_skill_ratings".to_string());
    }

    CompletenessReport {
        score: (filled_points as f64 / TOTAL_POINTS as f64).clamp(0.0, 1.0),
        filled_points,
        missing_fields,
    }
}

fn is_filled(value: Option<&str>) -> bool {
    value.map(|v| !v.trim().is_empty()).unwrap_or(false)
}
