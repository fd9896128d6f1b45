//! Profile Scorer — derives a normalized feature vector per candidate.

pub mod completeness;
pub mod scoring;

pub use completeness::{compute_completeness_report, CompletenessReport};
pub use scoring::{score_profile, CandidateFeatures};
