//! Mutable allocation state owned by a single engine run.

use std::collections::{BTreeMap, BTreeSet};

use crate::allocation::capacity::CapacityEntry;
use crate::models::CandidateId;
use crate::profile::CandidateFeatures;

/// Who can still be placed, and how many more times.
#[derive(Debug, Clone)]
pub struct CandidatePool {
    remaining: BTreeMap<CandidateId, u32>,
    companies: BTreeMap<CandidateId, Option<String>>,
}

impl CandidatePool {
    pub fn new(candidates: &[CandidateFeatures], multiplicity: u32) -> Self {
        let remaining = candidates
            .iter()
            .map(|c| (c.candidate_id.clone(), multiplicity))
            .collect();
        let companies = candidates
            .iter()
            .map(|c| (c.candidate_id.clone(), c.company.clone()))
            .collect();
        Self {
            remaining,
            companies,
        }
    }

    pub fn is_available(&self, candidate: &CandidateId) -> bool {
        self.remaining.get(candidate).is_some_and(|n| *n > 0)
    }

    /// Uses up one placement; a candidate with none left is unchanged.
    pub fn take(&mut self, candidate: &CandidateId) {
        if let Some(n) = self.remaining.get_mut(candidate) {
            *n = n.saturating_sub(1);
        }
    }

    pub fn remaining_supply(&self) -> usize {
        self.remaining.values().map(|n| *n as usize).sum()
    }

    pub fn company_of(&self, candidate: &CandidateId) -> Option<&str> {
        self.companies.get(candidate).and_then(|c| c.as_deref())
    }
}

/// Seats filled so far in one project.
#[derive(Debug, Clone)]
pub struct ProjectSeats {
    pub minimum: usize,
    pub target: usize,
    members: Vec<CandidateId>,
    companies: BTreeSet<String>,
}

impl ProjectSeats {
    pub fn new(entry: &CapacityEntry) -> Self {
        Self {
            minimum: entry.minimum,
            target: entry.target,
            members: Vec::new(),
            companies: BTreeSet::new(),
        }
    }

    /// Seats taken so far.
    pub fn filled(&self) -> usize {
        self.members.len()
    }

    pub fn has_member(&self, candidate: &CandidateId) -> bool {
        self.members.contains(candidate)
    }

    /// A missing company never collides.
    pub fn has_company(&self, company: Option<&str>) -> bool {
        company.is_some_and(|c| self.companies.contains(c))
    }

    pub fn seat(&mut self, candidate: CandidateId, company: Option<&str>) {
        if let Some(company) = company {
            self.companies.insert(company.to_string());
        }
        self.members.push(candidate);
    }

    pub fn into_members(self) -> Vec<CandidateId> {
        self.members
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
