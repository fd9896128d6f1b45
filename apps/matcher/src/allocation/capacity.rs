//! Capacity Planner — minimum and target headcount per project.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::allocation::policy::{AllocationPolicy, FlexibleSettings, MIN_HEADCOUNT};
use crate::models::{Level, ProjectId};
use crate::requirements::ProjectRequirements;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityEntry {
    pub project_id: ProjectId,
    pub minimum: usize,
    pub target: usize,
    pub demand: Level,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityPlan {
    pub supply: usize,
    #[serde(with = "crate::models::keyed")]
    pub entries: BTreeMap<ProjectId, CapacityEntry>,
}

impl CapacityPlan {
    pub fn get(&self, project: &ProjectId) -> Option<&CapacityEntry> {
        self.entries.get(project)
    }

    pub fn total_minimum(&self) -> usize {
        self.entries.values().map(|e| e.minimum).sum()
    }

    pub fn total_target(&self) -> usize {
        self.entries.values().map(|e| e.target).sum()
    }

    /// Highest floor across projects; the number of floor-raising rounds.
    pub fn max_minimum(&self) -> usize {
        self.entries.values().map(|e| e.minimum).max().unwrap_or(0)
    }
}

/// Higher of the project's priority and its complexity level.
pub fn demand_level(project: &ProjectRequirements) -> Level {
    project.priority.max(project.complexity_level)
}

/// Plans headcount for every project given the total seat supply.
///
/// Standard: 2/2 everywhere. Flexible: target = max(2, round(supply / n ×
/// multiplier)), capped so one project never eats the floors of the others,
/// then optionally topped up until the targets cover the supply.
pub fn plan_capacity(
    projects: &[ProjectRequirements],
    supply: usize,
    policy: &AllocationPolicy,
) -> CapacityPlan {
    let mut entries: BTreeMap<ProjectId, CapacityEntry> = projects
        .iter()
        .map(|project| {
            let entry = plan_project(project, projects.len(), supply, policy);
            (entry.project_id.clone(), entry)
        })
        .collect();

    if let AllocationPolicy::Flexible(settings) = policy {
        if settings.absorb_surplus {
            absorb_surplus(&mut entries, projects, supply, settings);
        }
    }

    CapacityPlan { supply, entries }
}

pub fn plan_project(
    project: &ProjectRequirements,
    project_count: usize,
    supply: usize,
    policy: &AllocationPolicy,
) -> CapacityEntry {
    let demand = demand_level(project);
    let target = match policy {
        AllocationPolicy::Standard => MIN_HEADCOUNT,
        AllocationPolicy::Flexible(settings) => {
            let base = supply as f64 / project_count.max(1) as f64;
            let scaled = (base * settings.multipliers.for_level(demand)).round() as usize;
            scaled
                .max(MIN_HEADCOUNT)
                .min(seat_cap(project_count, supply))
        }
    };

    CapacityEntry {
        project_id: project.project_id.clone(),
        minimum: MIN_HEADCOUNT,
        target,
        demand,
    }
}

/// Most seats one project may hold: the supply left after every other
/// project's floor, never below the floor itself.
fn seat_cap(project_count: usize, supply: usize) -> usize {
    let others = MIN_HEADCOUNT * project_count.saturating_sub(1);
    supply.saturating_sub(others).max(MIN_HEADCOUNT)
}

/// Adds one seat at a time, round-robin in demand order, until the targets
/// cover the supply or every project sits at its cap.
fn absorb_surplus(
    entries: &mut BTreeMap<ProjectId, CapacityEntry>,
    projects: &[ProjectRequirements],
    supply: usize,
    settings: &FlexibleSettings,
) {
    let cap = seat_cap(projects.len(), supply);

    let mut order: Vec<&ProjectRequirements> = projects.iter().collect();
    order.sort_by(|a, b| {
        let ma = settings.multipliers.for_level(demand_level(a));
        let mb = settings.multipliers.for_level(demand_level(b));
        mb.total_cmp(&ma)
            .then_with(|| b.requirements.complexity.total_cmp(&a.requirements.complexity))
            .then_with(|| a.project_id.cmp(&b.project_id))
    });

    let mut total: usize = entries.values().map(|e| e.target).sum();
    while total < supply {
        let mut progressed = false;
        for project in &order {
            if total >= supply {
                break;
            }
            if let Some(entry) = entries.get_mut(&project.project_id) {
                if entry.target < cap {
                    entry.target += 1;
                    total += 1;
                    progressed = true;
                    debug!("Surplus seat to '{}' (target now {})", entry.project_id, entry.target);
                }
            }
        }
        if !progressed {
            break;
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
