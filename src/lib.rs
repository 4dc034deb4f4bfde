//! Hybrid Scorer Rust Implementation
//!
//! Pairwise compatibility scoring for plant genera: a trained classifier is
//! run on the averaged traits of two genera under the current and a warmed
//! climate, and the result is annotated with a resilience label, a
//! macro-climate zone of Algeria and a one-sentence rationale.
//!
//! Layout:
//! - `data`: trait and salinity tables loaded with Polars
//! - `features`: pair -> classifier feature vector
//! - `classifier`: classifier seam and the bundled logistic model
//! - `scorer` / `matcher`: pair scoring, best partner, top-K ranking
//! - `zones` / `explanation`: zone rules and rationale text
//! - `api_server` (feature `api`): Axum JSON API

pub mod classifier;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod explanation;
pub mod features;
pub mod matcher;
pub mod scorer;
pub mod search_index;
pub mod traits;
pub mod utils;
pub mod zones;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use classifier::{CompatibilityClassifier, LogisticModel, ModelArtifact, SchemaCheckedClassifier};
pub use config::EngineConfig;
pub use data::{SalinityIndex, TraitColumns, TraitStore};
pub use engine::EngineSnapshot;
pub use error::{ClassifierError, ScoreError};
pub use features::{build_vector, FeatureValue, FeatureVector};
pub use matcher::{MatchOutcome, Matcher, MatcherConfig};
pub use scorer::{CompatibilityResult, CompatibilityTraits, PairScorer, Resilience, ScorerConfig};
pub use search_index::{PlantEntry, SearchIndex};
pub use traits::{AveragedTraits, TraitRow, TraitValue};
pub use utils::DefaultsPolicy;
pub use zones::Zone;

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
