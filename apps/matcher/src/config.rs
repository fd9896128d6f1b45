use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use matcher::allocation::AllocationPolicy;
use matcher::matching::ScoringWeights;
use matcher::EngineConfig;

/// Run configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub candidates_path: PathBuf,
    pub projects_path: PathBuf,
    /// Outcome JSON goes to stdout when unset.
    pub output_path: Option<PathBuf>,
    pub engine: EngineConfig,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = ScoringWeights::default();
        let weights = ScoringWeights {
            skill: parse_or(&lookup, "WEIGHT_SKILL", defaults.skill)?,
            experience: parse_or(&lookup, "WEIGHT_EXPERIENCE", defaults.experience)?,
            interest: parse_or(&lookup, "WEIGHT_INTEREST", defaults.interest)?,
            presence: parse_or(&lookup, "WEIGHT_PRESENCE", defaults.presence)?,
            completeness: parse_or(&lookup, "WEIGHT_COMPLETENESS", defaults.completeness)?,
        };

        let policy_name = lookup("MATCH_POLICY").unwrap_or_else(|| "standard".to_string());
        let policy = AllocationPolicy::from_name(&policy_name)
            .context("MATCH_POLICY must be 'standard' or 'flexible'")?;

        let engine = EngineConfig {
            policy,
            weights,
            max_assignments_per_candidate: parse_or(&lookup, "MAX_ASSIGNMENTS_PER_CANDIDATE", 1)?,
            enforce_unique_company: parse_or(&lookup, "ENFORCE_UNIQUE_COMPANY", false)?,
            ..Default::default()
        };
        engine.validate().context("Invalid engine configuration")?;

        Ok(Config {
            candidates_path: require(&lookup, "CANDIDATES_PATH")?.into(),
            projects_path: require(&lookup, "PROJECTS_PATH")?.into(),
            output_path: lookup("OUTPUT_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            engine,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn require(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn make_lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    const PATHS: &[(&str, &str)] = &[
        ("CANDIDATES_PATH", "data/candidates.json"),
        ("PROJECTS_PATH", "data/projects.json"),
    ];

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(make_lookup(PATHS)).unwrap();
        assert_eq!(config.engine, EngineConfig::default());
        assert_eq!(config.output_path, None);
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_missing_required_path() {
        let err = Config::from_lookup(make_lookup(&[("CANDIDATES_PATH", "c.json")])).unwrap_err();
        assert!(err.to_string().contains("PROJECTS_PATH"));
    }

    #[test]
    fn test_flexible_policy_and_overrides() {
        let mut pairs = PATHS.to_vec();
        pairs.extend([
            ("MATCH_POLICY", "Flexible"),
            ("MAX_ASSIGNMENTS_PER_CANDIDATE", "2"),
            ("ENFORCE_UNIQUE_COMPANY", "true"),
            ("OUTPUT_PATH", "out.json"),
        ]);
        let config = Config::from_lookup(make_lookup(&pairs)).unwrap();
        assert!(config.engine.policy.fills_to_target());
        assert_eq!(config.engine.max_assignments_per_candidate, 2);
        assert!(config.engine.enforce_unique_company);
        assert_eq!(config.output_path, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let mut pairs = PATHS.to_vec();
        pairs.push(("MATCH_POLICY", "random"));
        assert!(Config::from_lookup(make_lookup(&pairs)).is_err());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut pairs = PATHS.to_vec();
        pairs.push(("WEIGHT_SKILL", "0.7"));
        let err = Config::from_lookup(make_lookup(&pairs)).unwrap_err();
        assert!(format!("{err:#}").contains("weights"));
    }

    #[test]
    fn test_unparsable_number_names_variable() {
        let mut pairs = PATHS.to_vec();
        pairs.push(("WEIGHT_SKILL", "lots"));
        let err = Config::from_lookup(make_lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("WEIGHT_SKILL"));
    }
}
