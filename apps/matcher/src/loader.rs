//! JSON input and output for the command-line runner.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use matcher::models::{Candidate, Project};
use matcher::AllocationOutcome;
use serde::de::DeserializeOwned;
use tracing::info;

pub fn load_candidates(path: &Path) -> Result<Vec<Candidate>> {
    let candidates: Vec<Candidate> = read_records(path, "candidate")?;
    info!("Loaded {} candidates from {}", candidates.len(), path.display());
    Ok(candidates)
}

pub fn load_projects(path: &Path) -> Result<Vec<Project>> {
    let projects: Vec<Project> = read_records(path, "project")?;
    info!("Loaded {} projects from {}", projects.len(), path.display());
    Ok(projects)
}

fn read_records<T: DeserializeOwned>(path: &Path, kind: &str) -> Result<Vec<T>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {kind} file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {kind} records in {}", path.display()))
}

/// Writes the outcome as pretty JSON to `path`, or to stdout when `None`.
pub fn write_outcome(outcome: &AllocationOutcome, path: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(outcome).context("Failed to serialize outcome")?;
    match path {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Failed to write outcome to {}", path.display()))?;
            info!("Outcome written to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("Failed to write outcome to stdout")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use matcher::{run_analysis, EngineConfig};
    use tempfile::tempdir;

    const CANDIDATES: &str = r#"[
        {"first_name": "Ada", "last_name": "Ng", "email": "ada@example.org",
         "years_experience": 9, "skill_ratings": {"Business Analysis": 5, "Project Management": null},
         "interests": ["Charity"], "credibility_score": 0.8},
        {"first_name": "Ben", "last_name": "Ola", "email": "ben@example.org",
         "company": "Acme", "skill_ratings": {"Project Management": 4}}
    ]"#;

    const PROJECTS: &str = r#"[
        {"organization": "Harbour Trust", "initiative": "Finance Refresh",
         "description": "Choose accounting software", "priority": "high"}
    ]"#;

    #[test]
    fn test_load_records_with_optional_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("candidates.json");
        fs::write(&path, CANDIDATES).unwrap();

        let candidates = load_candidates(&path).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].skill_ratings["Project Management"], None);
        assert!(candidates[1].interests.is_empty());
        assert_eq!(candidates[1].years_experience, None);
    }

    #[test]
    fn test_missing_file_names_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let err = load_projects(&path).unwrap_err();
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("projects.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_projects(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse project records"));
    }

    #[test]
    fn test_outcome_written_as_json() {
        let dir = tempdir().unwrap();
        let candidates_path = dir.path().join("candidates.json");
        let projects_path = dir.path().join("projects.json");
        fs::write(&candidates_path, CANDIDATES).unwrap();
        fs::write(&projects_path, PROJECTS).unwrap();

        let candidates = load_candidates(&candidates_path).unwrap();
        let projects = load_projects(&projects_path).unwrap();
        let outcome = run_analysis(&candidates, &projects, &EngineConfig::default()).unwrap();

        let out = dir.path().join("outcome.json");
        write_outcome(&outcome, Some(&out)).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written["report"]["summary"]["placements"], 2);
        assert_eq!(written["run_id"], outcome.run_id.to_string());
    }
}
