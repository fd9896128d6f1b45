use thiserror::Error;

/// Fatal precondition failures. Raised before any allocation is attempted.
///
/// Capacity shortfalls are not errors: they are reported in the
/// `AllocationReport` of a successful run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("Invalid scoring weights: {0}")]
    InvalidWeights(String),

    #[error("Unknown allocation policy '{0}' (expected 'standard' or 'flexible')")]
    UnknownPolicy(String),

    #[error("Invalid flexible multipliers: {0}")]
    InvalidMultipliers(String),

    #[error("Invalid qualification thresholds: {0}")]
    InvalidThresholds(String),

    #[error("Invalid taxonomy: {0}")]
    InvalidTaxonomy(String),

    #[error("Each candidate must be assignable at least once")]
    ZeroMultiplicity,

    #[error("No projects supplied")]
    NoProjects,

    #[error("Candidate supply of {supply} cannot satisfy a minimum headcount of {minimum}")]
    InsufficientSupply { supply: usize, minimum: usize },

    #[error("Duplicate candidate key: {0}")]
    DuplicateCandidate(String),

    #[error("Duplicate project key: {0}")]
    DuplicateProject(String),
}
