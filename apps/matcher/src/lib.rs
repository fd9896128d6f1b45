//! Volunteer-to-project matching engine.
//!
//! Scores every candidate/project pair, plans per-project headcount, and
//! allocates candidates under the Standard or Flexible policy. Pure and
//! synchronous: callers hand in records and get back one immutable outcome.

pub mod allocation;
pub mod analysis;
pub mod errors;
pub mod matching;
pub mod models;
pub mod profile;
pub mod requirements;

pub use analysis::{run_analysis, run_analysis_with, AllocationOutcome, EngineConfig};
pub use errors::MatchError;
