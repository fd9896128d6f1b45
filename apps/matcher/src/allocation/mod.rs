//! Capacity planning and the two-phase Allocation Engine.

pub mod capacity;
pub mod engine;
pub mod policy;
pub mod pool;
pub mod report;

pub use capacity::{plan_capacity, CapacityEntry, CapacityPlan};
pub use engine::{AllocationEngine, AllocationRules, Assignment, AssignmentStep, Phase};
pub use policy::{AllocationPolicy, FlexibleSettings, PriorityMultipliers, MIN_HEADCOUNT};
pub use report::{build_report, AllocationReport, QualificationThresholds, ReportInputs, RunSummary, Shortfall, Standing};
