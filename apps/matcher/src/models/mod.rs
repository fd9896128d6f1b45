pub mod candidate;
pub mod keyed;
pub mod project;

pub use candidate::{Candidate, CandidateId};
pub use project::{Level, Project, ProjectId};
