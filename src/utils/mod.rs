//! Utility modules shared by the scoring pipeline
//!
//! - Defaults: the named substitution table for missing data
//! - Rounding: display rounding of scores and percentages

pub mod defaults;
pub mod rounding;

pub use defaults::DefaultsPolicy;
pub use rounding::{probability_to_score, round_to};
