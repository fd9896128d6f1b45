//! Pairwise Match Scorer — combines a candidate's features with a project's
//! requirements into one weighted composite score.

pub mod fit_scoring;
pub mod weights;

pub use fit_scoring::{rank_order, PairScorer, ScoreComponents, ScoreEntry, ScoreMatrix, WeightedPairScorer};
pub use weights::ScoringWeights;
