use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable key for a candidate: the trimmed, lowercased contact address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(String);

impl CandidateId {
    pub fn from_email(email: &str) -> Self {
        Self(email.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One volunteer registration, as handed over by the ingestion layer.
///
/// Ratings are on a 1–5 scale keyed by skill-category name. A `None` rating
/// means the registrant left the category blank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub member_id: Option<String>,
    pub profile_url: Option<String>,
    pub years_experience: Option<f64>,
    #[serde(default)]
    pub skill_ratings: BTreeMap<String, Option<f64>>,
    #[serde(default)]
    pub interests: Vec<String>,
    /// Pre-computed external credibility signal in [0, 1].
    pub credibility_score: Option<f64>,
}

impl Candidate {
    pub fn id(&self) -> CandidateId {
        CandidateId::from_email(&self.email)
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Normalized employer name, or `None` when the field is blank.
    pub fn company_key(&self) -> Option<String> {
        self.company
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_lowercase)
    }
}
