//! Keyword taxonomy: skill categories, interest themes, priority and
//! complexity indicators.
//!
//! This is configuration data. Updating a keyword list bumps
//! `TAXONOMY_VERSION`; it never requires touching the allocation code.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::MatchError;
use crate::requirements::extractor::count_keyword;

pub const TAXONOMY_VERSION: &str = "2025.1";

/// Theme name used by selection reasons to spot non-profit interest.
pub const NON_PROFIT_THEME: &str = "non-profit";

const SKILL_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Project Management",
        &["project plan", "project management", "timeline", "deliverable", "milestone", "scope", "budget"],
    ),
    (
        "Strategic Planning",
        &["strategic", "strategy", "planning", "vision", "mission", "long-term", "roadmap", "alignment"],
    ),
    (
        "Business Change Management",
        &["change", "transformation", "transition", "migration", "implementation", "adoption"],
    ),
    (
        "Business Analysis",
        &["analysis", "requirements", "process", "workflow", "business", "assessment"],
    ),
    (
        "Portfolio Management",
        &["portfolio", "program", "multiple projects", "prioritisation", "prioritization", "resource allocation"],
    ),
    (
        "Development of User Requirements",
        &["requirements", "user needs", "stakeholder", "specification", "functional"],
    ),
    (
        "Technology Change Management",
        &["technology", "software", "system", "digital", "technical"],
    ),
    (
        "Understanding of Agile Principles",
        &["agile", "iterative", "flexible", "adaptive", "sprint"],
    ),
    (
        "Plan and Manage Agile Projects",
        &["agile project", "scrum", "kanban", "sprint planning"],
    ),
    (
        "Planning & Management of the Implementation of New Software Solutions",
        &["software implementation", "system implementation", "erp", "accounting software", "new software"],
    ),
    (
        "Volunteering for a Non-profit Organisation",
        &["non-profit", "nonprofit", "charity", "volunteer", "community", "foundation", "ngo"],
    ),
    (
        "Events Planning and Management",
        &["event", "anniversary", "fundraising", "celebration", "conference"],
    ),
    (
        "Systems Integration (Business and Technical)",
        &["integration", "system", "platform", "interface", "technical"],
    ),
];

// (theme, candidate tag aliases, project keywords)
const INTEREST_THEMES: &[(&str, &[&str], &[&str])] = &[
    (
        NON_PROFIT_THEME,
        &["non-profit", "nonprofit", "charity", "volunteer", "community", "ngo"],
        &["non-profit", "nonprofit", "charity", "volunteer", "community", "foundation", "ngo"],
    ),
    (
        "strategy",
        &["strategic", "strategy", "planning"],
        &["strategic", "strategy", "planning", "roadmap"],
    ),
    (
        "change",
        &["change", "transformation"],
        &["change", "transformation", "transition"],
    ),
    (
        "events",
        &["event", "fundraising"],
        &["event", "fundraising", "anniversary", "celebration"],
    ),
    (
        "technology",
        &["technology", "digital", "software", "systems"],
        &["technology", "digital", "software", "system", "platform"],
    ),
    ("agile", &["agile", "scrum"], &["agile", "scrum", "kanban", "sprint"]),
];

const HIGH_PRIORITY: &[&str] = &["urgent", "critical", "50th anniversary", "strategic", "foundation"];
const MEDIUM_PRIORITY: &[&str] = &["important", "essential", "significant"];

const HIGH_COMPLEXITY: &[&str] = &[
    "comprehensive",
    "national",
    "multiple",
    "complex",
    "integration",
    "strategic",
    "multi-phase",
    "cross-functional",
];
const MEDIUM_COMPLEXITY: &[&str] = &["implementation", "development", "planning", "management"];
const LOW_COMPLEXITY: &[&str] = &["simple", "basic", "guidance", "advice", "template"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub name: String,
    #[serde(deserialize_with = "lowercase_words")]
    pub keywords: Vec<String>,
}

/// An interest area shared by candidate tags and project text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestTheme {
    pub name: String,
    #[serde(deserialize_with = "lowercase_words")]
    pub tag_aliases: Vec<String>,
    #[serde(deserialize_with = "lowercase_words")]
    pub project_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    #[serde(deserialize_with = "lowercase_words")]
    pub high: Vec<String>,
    #[serde(deserialize_with = "lowercase_words")]
    pub medium: Vec<String>,
    #[serde(default, deserialize_with = "lowercase_words")]
    pub low: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub version: String,
    pub skill_categories: Vec<SkillCategory>,
    pub interest_themes: Vec<InterestTheme>,
    pub priority_indicators: IndicatorSet,
    pub complexity_indicators: IndicatorSet,
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::standard()
    }
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Keyword matching runs against lowercased text, so loaded word lists are
/// normalized the same way.
fn lowercase_words<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let words = Vec::<String>::deserialize(deserializer)?;
    Ok(words.into_iter().map(|w| w.trim().to_lowercase()).collect())
}

impl Taxonomy {
    /// The built-in taxonomy for volunteer project-management matching.
    pub fn standard() -> Self {
        Self {
            version: TAXONOMY_VERSION.to_string(),
            skill_categories: SKILL_KEYWORDS
                .iter()
                .map(|(name, keywords)| SkillCategory {
                    name: name.to_string(),
                    keywords: owned(keywords),
                })
                .collect(),
            interest_themes: INTEREST_THEMES
                .iter()
                .map(|(name, aliases, keywords)| InterestTheme {
                    name: name.to_string(),
                    tag_aliases: owned(aliases),
                    project_keywords: owned(keywords),
                })
                .collect(),
            priority_indicators: IndicatorSet {
                high: owned(HIGH_PRIORITY),
                medium: owned(MEDIUM_PRIORITY),
                low: Vec::new(),
            },
            complexity_indicators: IndicatorSet {
                high: owned(HIGH_COMPLEXITY),
                medium: owned(MEDIUM_COMPLEXITY),
                low: owned(LOW_COMPLEXITY),
            },
        }
    }

    /// Rejects keywords that could never match: empty, or not lowercase.
    pub fn validate(&self) -> Result<(), MatchError> {
        let lists = self
            .skill_categories
            .iter()
            .map(|c| (c.name.as_str(), &c.keywords))
            .chain(self.interest_themes.iter().flat_map(|t| {
                [(t.name.as_str(), &t.tag_aliases), (t.name.as_str(), &t.project_keywords)]
            }))
            .chain([
                ("priority/high", &self.priority_indicators.high),
                ("priority/medium", &self.priority_indicators.medium),
                ("priority/low", &self.priority_indicators.low),
                ("complexity/high", &self.complexity_indicators.high),
                ("complexity/medium", &self.complexity_indicators.medium),
                ("complexity/low", &self.complexity_indicators.low),
            ]);

        for (list, words) in lists {
            for word in words {
                if word.trim().is_empty() || *word != word.to_lowercase() {
                    return Err(MatchError::InvalidTaxonomy(format!(
                        "keyword '{word}' in '{list}' must be non-empty lowercase text"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Taxonomy spelling of a category name, matched case-insensitively.
    pub fn canonical_category(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.skill_categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| c.name.as_str())
    }

    /// Themes a candidate signed up for, given their normalized tags.
    pub fn themes_for_tags(&self, tags: &BTreeSet<String>) -> BTreeSet<String> {
        self.interest_themes
            .iter()
            .filter(|theme| {
                tags.iter().any(|tag| {
                    theme
                        .tag_aliases
                        .iter()
                        .any(|alias| count_keyword(tag, alias) > 0)
                })
            })
            .map(|theme| theme.name.clone())
            .collect()
    }

    /// Themes a project's lowercased text touches.
    pub fn themes_for_text(&self, text: &str) -> BTreeSet<String> {
        self.interest_themes
            .iter()
            .filter(|theme| {
                theme
                    .project_keywords
                    .iter()
                    .any(|kw| count_keyword(text, kw) > 0)
            })
            .map(|theme| theme.name.clone())
            .collect()
    }
}
