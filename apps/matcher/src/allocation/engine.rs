//! Allocation Engine — two-phase best-first assignment with capacity floors.
//!
//! Phase 1 raises every project's floor one seat at a time, so a short supply
//! is spread over as many projects as possible. Phase 2 (Flexible only) keeps
//! going toward each project's target. Within a phase the ranked pair list is
//! scanned once: a pair that is ineligible stays ineligible for the rest of
//! the phase, so the first eligible pair seen is always the best one left.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::allocation::capacity::CapacityPlan;
use crate::allocation::policy::AllocationPolicy;
use crate::allocation::pool::{CandidatePool, ProjectSeats};
use crate::matching::{ScoreEntry, ScoreMatrix};
use crate::models::{CandidateId, ProjectId};
use crate::profile::CandidateFeatures;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    FloorSatisfaction,
    TargetFill,
}

/// One committed (candidate, project) pair, in commit order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentStep {
    pub sequence: usize,
    pub phase: Phase,
    pub candidate_id: CandidateId,
    pub project_id: ProjectId,
    pub score: f64,
    /// Committed even though the project already had someone from the
    /// same company.
    pub relaxed_diversity: bool,
}

/// Final mapping; member order is commit order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(with = "crate::models::keyed")]
    pub projects: BTreeMap<ProjectId, Vec<CandidateId>>,
    pub steps: Vec<AssignmentStep>,
}

impl Assignment {
    pub fn members(&self, project: &ProjectId) -> &[CandidateId] {
        self.projects.get(project).map(Vec::as_slice).unwrap_or(&[])
    }

    /// How many projects the candidate ended up in.
    pub fn placements_of(&self, candidate: &CandidateId) -> usize {
        self.projects
            .values()
            .filter(|members| members.contains(candidate))
            .count()
    }

    pub fn total_placements(&self) -> usize {
        self.steps.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRules {
    pub max_assignments_per_candidate: u32,
    pub enforce_unique_company: bool,
}

impl Default for AllocationRules {
    fn default() -> Self {
        Self {
            max_assignments_per_candidate: 1,
            enforce_unique_company: false,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

pub struct AllocationEngine<'a> {
    matrix: &'a ScoreMatrix,
    plan: &'a CapacityPlan,
    policy: &'a AllocationPolicy,
    rules: AllocationRules,
}

/// Per-run state. Built fresh by `run`, never shared.
struct RunState {
    pool: CandidatePool,
    seats: BTreeMap<ProjectId, ProjectSeats>,
    steps: Vec<AssignmentStep>,
}

impl<'a> AllocationEngine<'a> {
    pub fn new(
        matrix: &'a ScoreMatrix,
        plan: &'a CapacityPlan,
        policy: &'a AllocationPolicy,
        rules: AllocationRules,
    ) -> Self {
        Self {
            matrix,
            plan,
            policy,
            rules,
        }
    }

    pub fn run(&self, candidates: &[CandidateFeatures]) -> Assignment {
        let ranked = self.matrix.ranked();
        let mut state = RunState {
            pool: CandidatePool::new(candidates, self.rules.max_assignments_per_candidate),
            seats: self
                .plan
                .entries
                .iter()
                .map(|(id, entry)| (id.clone(), ProjectSeats::new(entry)))
                .collect(),
            steps: Vec::new(),
        };

        info!(
            "Allocating {} candidates across {} projects ({} policy, {} seats available)",
            candidates.len(),
            self.plan.entries.len(),
            self.policy.mode_name(),
            state.pool.remaining_supply()
        );

        // Phase 1: floors, one level at a time
        for level in 1..=self.plan.max_minimum() {
            if state.pool.remaining_supply() == 0 {
                break;
            }
            self.fill_phase(&mut state, &ranked, Phase::FloorSatisfaction, |seats| {
                level.min(seats.minimum)
            });
        }
        let floor_commits = state.steps.len();
        let below_floor = state.seats.values().filter(|s| s.filled() < s.minimum).count();
        info!(
            "Floor satisfaction: {floor_commits} placements, {below_floor} projects below minimum"
        );

        // Phase 2: targets
        if self.policy.fills_to_target() && state.pool.remaining_supply() > 0 {
            self.fill_phase(&mut state, &ranked, Phase::TargetFill, |seats| seats.target);
            info!(
                "Target fill: {} placements, {} seats left unused",
                state.steps.len() - floor_commits,
                state.pool.remaining_supply()
            );
        }

        Assignment {
            projects: state
                .seats
                .into_iter()
                .map(|(id, seats)| (id, seats.into_members()))
                .collect(),
            steps: state.steps,
        }
    }

    /// Strict pass, then a relaxed pass when company diversity is enforced.
    fn fill_phase(
        &self,
        state: &mut RunState,
        ranked: &[&ScoreEntry],
        phase: Phase,
        bound: impl Fn(&ProjectSeats) -> usize,
    ) {
        self.fill_pass(state, ranked, phase, &bound, self.rules.enforce_unique_company);
        if self.rules.enforce_unique_company {
            self.fill_pass(state, ranked, phase, &bound, false);
        }
    }

    fn fill_pass(
        &self,
        state: &mut RunState,
        ranked: &[&ScoreEntry],
        phase: Phase,
        bound: &impl Fn(&ProjectSeats) -> usize,
        diverse_only: bool,
    ) {
        for entry in ranked {
            if !state.pool.is_available(&entry.candidate_id) {
                continue;
            }
            let company = state.pool.company_of(&entry.candidate_id).map(str::to_string);
            let Some(seats) = state.seats.get_mut(&entry.project_id) else {
                continue;
            };
            if seats.filled() >= bound(&*seats) || seats.has_member(&entry.candidate_id) {
                continue;
            }
            let collides = seats.has_company(company.as_deref());
            if diverse_only && collides {
                continue;
            }

            state.pool.take(&entry.candidate_id);
            seats.seat(entry.candidate_id.clone(), company.as_deref());

            let step = AssignmentStep {
                sequence: state.steps.len() + 1,
                phase,
                candidate_id: entry.candidate_id.clone(),
                project_id: entry.project_id.clone(),
                score: entry.composite,
                relaxed_diversity: self.rules.enforce_unique_company && collides,
            };
            debug!(
                "#{} {:?}: '{}' -> '{}' (score {:.3}{})",
                step.sequence,
                phase,
                step.candidate_id,
                step.project_id,
                step.score,
                if step.relaxed_diversity { ", diversity relaxed" } else { "" }
            );
            state.steps.push(step);

            if state.pool.remaining_supply() == 0 {
                break;
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::capacity::plan_capacity;
    use crate::allocation::policy::FlexibleSettings;
    use crate::matching::{PairScorer, ScoreComponents};
    use crate::models::Level;
    use crate::requirements::{ProjectRequirements, RequirementVector};
    use std::collections::BTreeSet;

    /// Scores straight from a lookup table so tests control the ranking.
    struct TableScorer(BTreeMap<(String, String), f64>);

    impl PairScorer for TableScorer {
        fn backend(&self) -> &'static str {
            "table"
        }

        fn score(&self, candidate: &CandidateFeatures, project: &ProjectRequirements) -> ScoreEntry {
            let key = (candidate.display_name.clone(), project.project_id.initiative.clone());
            let composite = self.0.get(&key).copied().unwrap_or(0.1);
            ScoreEntry {
                candidate_id: candidate.candidate_id.clone(),
                project_id: project.project_id.clone(),
                composite,
                components: ScoreComponents {
                    skill_fit: composite,
                    experience_fit: 0.0,
                    interest_fit: 0.0,
                    presence: 0.0,
                    completeness: 0.0,
                },
            }
        }
    }

    fn make_candidate(name: &str, company: Option<&str>) -> CandidateFeatures {
        CandidateFeatures {
            candidate_id: CandidateId::from_email(&format!("{name}@x.org")),
            display_name: name.to_string(),
            skills: BTreeMap::new(),
            experience: 0.5,
            years_experience: None,
            interests: BTreeSet::new(),
            interest_themes: BTreeSet::new(),
            presence: 0.0,
            completeness: 0.0,
            company: company.map(str::to_string),
        }
    }

    fn make_project(name: &str) -> ProjectRequirements {
        ProjectRequirements {
            project_id: ProjectId::new("Org", name),
            requirements: RequirementVector {
                weights: BTreeMap::new(),
                complexity: 0.5,
            },
            raw_weights: BTreeMap::new(),
            interest_themes: BTreeSet::new(),
            priority: Level::Medium,
            complexity_level: Level::Medium,
        }
    }

    fn make_table(rows: &[(&str, &str, f64)]) -> TableScorer {
        TableScorer(
            rows.iter()
                .map(|(c, p, s)| ((c.to_string(), p.to_string()), *s))
                .collect(),
        )
    }

    fn allocate(
        candidates: &[CandidateFeatures],
        projects: &[ProjectRequirements],
        scorer: &TableScorer,
        policy: &AllocationPolicy,
        rules: AllocationRules,
    ) -> Assignment {
        let matrix = ScoreMatrix::build(candidates, projects, scorer);
        let supply = candidates.len() * rules.max_assignments_per_candidate as usize;
        let plan = plan_capacity(projects, supply, policy);
        AllocationEngine::new(&matrix, &plan, policy, rules).run(candidates)
    }

    fn names(assignment: &Assignment, project: &str) -> Vec<String> {
        assignment
            .members(&ProjectId::new("Org", project))
            .iter()
            .map(|id| id.as_str().trim_end_matches("@x.org").to_string())
            .collect()
    }

    #[test]
    fn test_floor_raised_level_by_level() {
        // p2 gets its first member before p1 gets its second, even though "b"
        // prefers p1 over anything "c" scores on p2.
        let candidates = vec![make_candidate("a", None), make_candidate("b", None), make_candidate("c", None)];
        let projects = vec![make_project("p1"), make_project("p2")];
        let scorer = make_table(&[("a", "p1", 0.9), ("b", "p1", 0.8), ("c", "p1", 0.7), ("c", "p2", 0.2)]);
        let assignment = allocate(&candidates, &projects, &scorer, &AllocationPolicy::Standard, AllocationRules::default());

        assert_eq!(names(&assignment, "p1"), vec!["a", "b"]);
        assert_eq!(names(&assignment, "p2"), vec!["c"]);
        assert_eq!(assignment.steps[0].candidate_id.as_str(), "a@x.org");
        assert_eq!(assignment.steps[1].project_id, ProjectId::new("Org", "p2"));
    }

    #[test]
    fn test_standard_never_exceeds_two() {
        let candidates: Vec<_> = (0..7).map(|i| make_candidate(&format!("c{i}"), None)).collect();
        let projects = vec![make_project("p1"), make_project("p2")];
        let assignment = allocate(&candidates, &projects, &make_table(&[]), &AllocationPolicy::Standard, AllocationRules::default());
        assert!(assignment.projects.values().all(|m| m.len() == 2));
        assert_eq!(assignment.total_placements(), 4);
        assert!(assignment.steps.iter().all(|s| s.phase == Phase::FloorSatisfaction));
    }

    #[test]
    fn test_flexible_fills_to_target() {
        let candidates: Vec<_> = (0..5).map(|i| make_candidate(&format!("c{i}"), None)).collect();
        let projects = vec![make_project("p1"), make_project("p2")];
        let policy = AllocationPolicy::Flexible(FlexibleSettings::default());
        let assignment = allocate(&candidates, &projects, &make_table(&[]), &policy, AllocationRules::default());
        assert_eq!(assignment.total_placements(), 5);
        assert!(assignment.steps.iter().any(|s| s.phase == Phase::TargetFill));
    }

    #[test]
    fn test_candidate_placed_once_by_default() {
        let candidates = vec![make_candidate("star", None), make_candidate("b", None), make_candidate("c", None), make_candidate("d", None)];
        let projects = vec![make_project("p1"), make_project("p2")];
        let scorer = make_table(&[("star", "p1", 0.99), ("star", "p2", 0.98)]);
        let assignment = allocate(&candidates, &projects, &scorer, &AllocationPolicy::Standard, AllocationRules::default());
        assert_eq!(assignment.placements_of(&CandidateId::from_email("star@x.org")), 1);
    }

    #[test]
    fn test_multi_assignment_never_repeats_within_project() {
        let candidates = vec![make_candidate("star", None), make_candidate("b", None)];
        let projects = vec![make_project("p1"), make_project("p2")];
        let scorer = make_table(&[("star", "p1", 0.99), ("star", "p2", 0.98)]);
        let rules = AllocationRules {
            max_assignments_per_candidate: 2,
            ..Default::default()
        };
        let assignment = allocate(&candidates, &projects, &scorer, &AllocationPolicy::Standard, rules);
        assert_eq!(assignment.placements_of(&CandidateId::from_email("star@x.org")), 2);
        for members in assignment.projects.values() {
            let unique: BTreeSet<_> = members.iter().collect();
            assert_eq!(unique.len(), members.len());
        }
    }

    #[test]
    fn test_company_diversity_prefers_other_employers() {
        let candidates = vec![
            make_candidate("a", Some("acme")),
            make_candidate("b", Some("acme")),
            make_candidate("c", Some("globex")),
            make_candidate("d", Some("acme")),
        ];
        let projects = vec![make_project("p1"), make_project("p2")];
        let scorer = make_table(&[("a", "p1", 0.9), ("b", "p1", 0.8), ("c", "p1", 0.3), ("d", "p2", 0.5)]);
        let rules = AllocationRules {
            enforce_unique_company: true,
            ..Default::default()
        };
        let assignment = allocate(&candidates, &projects, &scorer, &AllocationPolicy::Standard, rules);

        assert_eq!(names(&assignment, "p1"), vec!["a", "c"]);
        let p2 = names(&assignment, "p2");
        assert_eq!(p2, vec!["d", "b"]);
        let relaxed: Vec<_> = assignment.steps.iter().filter(|s| s.relaxed_diversity).collect();
        assert_eq!(relaxed.len(), 1);
        assert_eq!(relaxed[0].candidate_id.as_str(), "b@x.org");
    }

    #[test]
    fn test_target_fill_relaxes_diversity_when_only_colleagues_remain() {
        let candidates = vec![
            make_candidate("a", Some("acme")),
            make_candidate("b", Some("acme")),
            make_candidate("c", Some("globex")),
            make_candidate("d", Some("initech")),
            make_candidate("e", Some("acme")),
        ];
        let projects = vec![make_project("p1"), make_project("p2")];
        let scorer = make_table(&[("a", "p1", 0.9), ("b", "p2", 0.9), ("c", "p1", 0.8), ("d", "p2", 0.8)]);
        let policy = AllocationPolicy::Flexible(FlexibleSettings::default());
        let rules = AllocationRules {
            enforce_unique_company: true,
            ..Default::default()
        };
        let assignment = allocate(&candidates, &projects, &scorer, &policy, rules);

        assert_eq!(names(&assignment, "p1"), vec!["a", "c", "e"]);
        assert_eq!(names(&assignment, "p2"), vec!["b", "d"]);
        let (last, earlier) = assignment.steps.split_last().unwrap();
        assert_eq!(last.phase, Phase::TargetFill);
        assert_eq!(last.candidate_id.as_str(), "e@x.org");
        assert!(last.relaxed_diversity);
        assert!(earlier.iter().all(|s| !s.relaxed_diversity));
        assert!(earlier.iter().all(|s| s.phase == Phase::FloorSatisfaction));
    }

    #[test]
    fn test_same_company_allowed_without_rule() {
        let candidates = vec![make_candidate("a", Some("acme")), make_candidate("b", Some("acme"))];
        let projects = vec![make_project("p1")];
        let assignment = allocate(&candidates, &projects, &make_table(&[]), &AllocationPolicy::Standard, AllocationRules::default());
        assert_eq!(names(&assignment, "p1").len(), 2);
        assert!(assignment.steps.iter().all(|s| !s.relaxed_diversity));
    }

    #[test]
    fn test_sequence_numbers_follow_commit_order() {
        let candidates: Vec<_> = (0..4).map(|i| make_candidate(&format!("c{i}"), None)).collect();
        let projects = vec![make_project("p1"), make_project("p2")];
        let assignment = allocate(&candidates, &projects, &make_table(&[]), &AllocationPolicy::Standard, AllocationRules::default());
        let seq: Vec<usize> = assignment.steps.iter().map(|s| s.sequence).collect();
        assert_eq!(seq, vec![1, 2, 3, 4]);
    }
}
