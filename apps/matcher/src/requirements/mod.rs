//! Requirement Extractor — turns a project's free text into a normalized
//! requirement vector using a versioned keyword taxonomy.

pub mod extractor;
pub mod taxonomy;

pub use extractor::{extract_requirements, ProjectRequirements, RequirementVector};
pub use taxonomy::Taxonomy;
