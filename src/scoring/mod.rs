pub mod config;
pub mod engine;
pub mod explain;
pub mod normalize;
pub mod types;
pub mod validation;

pub use config::*;
pub use engine::{compute, recency_factor, score_snapshot, FactorContribution};
pub use types::{FeatureSet, Score, Tier};
pub use validation::validate_scoring;
