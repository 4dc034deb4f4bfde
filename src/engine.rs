//! Engine Snapshot
//!
//! Everything the scorer reads, loaded once and shared by `Arc`: trait
//! store, salinity index, classifier, decision threshold and the feature
//! schema. Nothing in here is mutated after construction; a reload builds a
//! new snapshot and swaps the `Arc`.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::classifier::{CompatibilityClassifier, ModelArtifact};
use crate::config::EngineConfig;
use crate::data::{SalinityIndex, TraitStore};

pub struct EngineSnapshot {
    pub traits: TraitStore,
    pub salinity: SalinityIndex,
    pub classifier: Box<dyn CompatibilityClassifier>,
    pub threshold: f64,
    pub feature_names: Vec<String>,
}

impl std::fmt::Debug for EngineSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineSnapshot")
            .field("traits", &self.traits)
            .field("salinity", &self.salinity)
            .field("threshold", &self.threshold)
            .field("feature_names", &self.feature_names)
            .finish_non_exhaustive()
    }
}

impl EngineSnapshot {
    pub fn new(
        traits: TraitStore,
        salinity: SalinityIndex,
        classifier: Box<dyn CompatibilityClassifier>,
        threshold: f64,
        feature_names: Vec<String>,
    ) -> Self {
        Self {
            traits,
            salinity,
            classifier,
            threshold,
            feature_names,
        }
    }

    /// Load model artifact, trait table and salinity table
    ///
    /// A missing model artifact or trait table is fatal; a missing salinity
    /// table only logs a warning.
    pub fn load(config: &EngineConfig) -> Result<Arc<Self>> {
        tracing::info!("Loading model artifact: {:?}", config.model_file);
        let artifact = ModelArtifact::load(&config.model_file)
            .context("Brain not found! Build the model artifact first")?;
        let (classifier, threshold, feature_names) = artifact.into_parts();

        tracing::info!("Loading trait table: {:?}", config.traits_file);
        let traits = TraitStore::load_csv(&config.traits_file)?;
        if traits.is_empty() {
            anyhow::bail!("Trait table {:?} contains no genera", config.traits_file);
        }

        tracing::info!("Loading salinity table: {:?}", config.salinity_file);
        let salinity = SalinityIndex::load_optional(&config.salinity_file);

        tracing::info!(
            "Engine snapshot ready: {} genera, {} salinity entries, {} features",
            traits.len(),
            salinity.len(),
            feature_names.len()
        );

        Ok(Arc::new(Self::new(
            traits,
            salinity,
            Box::new(classifier),
            threshold,
            feature_names,
        )))
    }
}
