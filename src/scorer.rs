//! Pairwise Scorer - Main coordinator for scoring a pair of genera
//!
//! Runs the classifier twice (baseline and warmed climate), then derives
//! resilience, zone, explanation and display traits for the pair.

use std::sync::Arc;

use serde::Serialize;

use crate::engine::EngineSnapshot;
use crate::error::ScoreError;
use crate::explanation;
use crate::features::build_vector;
use crate::traits::{AveragedTraits, TraitRow};
use crate::utils::{probability_to_score, round_to};
use crate::zones::Zone;

/// How the pair's probability moves under the warmed climate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Resilience {
    Stable,
    Vulnerable,
    Thriving,
}

impl Resilience {
    /// Strict band: a delta of exactly ±band is still stable
    pub fn from_delta(delta: f64, band: f64) -> Self {
        if delta < -band {
            Resilience::Vulnerable
        } else if delta > band {
            Resilience::Thriving
        } else {
            Resilience::Stable
        }
    }
}

/// Tunable constants of the pairwise scorer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorerConfig {
    /// Climate shift passed to the vector builder for the future run
    pub future_climate_shift: f64,
    /// Half-width of the stable resilience band (probability units)
    pub resilience_band: f64,
    /// Effective salinity above which a pair counts as salt tolerant
    pub salt_tolerance_cutoff: f64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            future_climate_shift: 2.0,
            resilience_band: 0.03,
            salt_tolerance_cutoff: 50.0,
        }
    }
}

/// Display traits of a pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityTraits {
    /// Averaged wood percentage × 100, whole number
    pub drought_tolerance: f64,
    /// (1 − averaged perennial percentage) × 100, whole number
    pub growth_speed: f64,
    /// Effective (max) salinity of the pair, one decimal
    pub salinity_tolerance: f64,
}

/// Full scoring result for one ordered pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityResult {
    pub plant_a: String,
    pub plant_b: String,
    pub score: f64,
    pub future_score: f64,
    pub compatible: bool,
    pub resilience: Resilience,
    pub zone: Zone,
    pub recommended_regions: Vec<&'static str>,
    pub explanation: String,
    pub traits: CompatibilityTraits,
}

/// Scores pairs against a shared engine snapshot
///
/// Cloning is cheap (an `Arc` bump); every method takes `&self` and may be
/// called from any number of threads.
#[derive(Clone)]
pub struct PairScorer {
    snapshot: Arc<EngineSnapshot>,
    config: ScorerConfig,
}

impl PairScorer {
    pub fn new(snapshot: Arc<EngineSnapshot>) -> Self {
        Self::with_config(snapshot, ScorerConfig::default())
    }

    pub fn with_config(snapshot: Arc<EngineSnapshot>, config: ScorerConfig) -> Self {
        Self { snapshot, config }
    }

    pub fn snapshot(&self) -> &Arc<EngineSnapshot> {
        &self.snapshot
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Resolve a genus in the trait store
    pub fn resolve(&self, genus: &str) -> Result<&TraitRow, ScoreError> {
        self.snapshot
            .traits
            .lookup(genus)
            .ok_or_else(|| ScoreError::GenusNotFound(genus.to_string()))
    }

    /// Score the ordered pair (genus_a, genus_b)
    ///
    /// Order matters only through `Family`, which the vector builder takes
    /// from the first genus.
    pub fn score_pair(&self, genus_a: &str, genus_b: &str) -> Result<CompatibilityResult, ScoreError> {
        let row_a = self.resolve(genus_a)?;
        let row_b = self.resolve(genus_b)?;
        self.score_rows(row_a, row_b)
    }

    /// Score two already-resolved rows
    pub fn score_rows(&self, row_a: &TraitRow, row_b: &TraitRow) -> Result<CompatibilityResult, ScoreError> {
        let snapshot = &*self.snapshot;
        let names = &snapshot.feature_names;

        let baseline_vector = build_vector(row_a, row_b, 0.0, names);
        let future_vector = build_vector(row_a, row_b, self.config.future_climate_shift, names);

        let baseline = snapshot.classifier.predict_probability(&baseline_vector)?;
        let future = snapshot.classifier.predict_probability(&future_vector)?;

        let averaged = AveragedTraits::of(row_a, row_b);

        let salinity = snapshot
            .salinity
            .tolerance(&row_a.genus)
            .max(snapshot.salinity.tolerance(&row_b.genus));

        let zone = Zone::classify(&averaged, salinity, snapshot.traits.columns());
        let compatible = baseline > snapshot.threshold;
        let resilience = Resilience::from_delta(future - baseline, self.config.resilience_band);

        let same_family = row_a.family == row_b.family;
        let salt_tolerant = salinity > self.config.salt_tolerance_cutoff;
        let explanation = explanation::explain(baseline, &averaged, salt_tolerant, same_family);

        tracing::debug!(
            "Scored {} x {}: baseline={:.4} future={:.4} zone={}",
            row_a.genus,
            row_b.genus,
            baseline,
            future,
            zone
        );

        Ok(CompatibilityResult {
            plant_a: row_a.genus.clone(),
            plant_b: row_b.genus.clone(),
            score: probability_to_score(baseline),
            future_score: probability_to_score(future),
            compatible,
            resilience,
            zone,
            recommended_regions: zone.regions().to_vec(),
            explanation,
            traits: CompatibilityTraits {
                drought_tolerance: round_to(averaged.perc_wood * 100.0, 0),
                growth_speed: round_to((1.0 - averaged.perc_per) * 100.0, 0),
                salinity_tolerance: round_to(salinity, 1),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::CompatibilityClassifier;
    use crate::data::{SalinityIndex, TraitStore, TEMPERATURE_COL};
    use crate::error::ClassifierError;
    use crate::features::FeatureVector;
    use approx::assert_relative_eq;

    /// Probability = averaged tavg (so the warmed run is 0.1 higher)
    struct TemperatureClassifier;

    impl CompatibilityClassifier for TemperatureClassifier {
        fn predict_probability(&self, vector: &FeatureVector) -> Result<f64, ClassifierError> {
            Ok(vector
                .get(TEMPERATURE_COL)
                .and_then(|v| v.as_numeric())
                .unwrap_or(0.0)
                .clamp(0.0, 1.0))
        }
    }

    /// Probability = 1 - averaged tavg (warming hurts)
    struct ColdLovingClassifier;

    impl CompatibilityClassifier for ColdLovingClassifier {
        fn predict_probability(&self, vector: &FeatureVector) -> Result<f64, ClassifierError> {
            TemperatureClassifier.predict_probability(vector).map(|p| 1.0 - p)
        }
    }

    struct FailingClassifier;

    impl CompatibilityClassifier for FailingClassifier {
        fn predict_probability(&self, _vector: &FeatureVector) -> Result<f64, ClassifierError> {
            Err(ClassifierError::NonFinite(f64::NAN))
        }
    }

    fn scorer(classifier: Box<dyn CompatibilityClassifier>) -> PairScorer {
        let traits = TraitStore::from_rows(vec![
            TraitRow::new("Quercus", "Fagaceae")
                .with_wood(0.9)
                .with_perennial(0.8)
                .with_temperature(0.4),
            TraitRow::new("Fagus", "Fagaceae")
                .with_wood(0.7)
                .with_perennial(1.0)
                .with_temperature(0.3),
            TraitRow::new("Salsola", "Amaranthaceae")
                .with_wood(0.1)
                .with_perennial(0.2)
                .with_temperature(0.8),
        ]);
        let salinity = SalinityIndex::from_pairs(vec![("Salsola", 72.44), ("Quercus", 5.0)]);
        let names = vec!["perc_wood".to_string(), "tavg".to_string(), "Family".to_string()];
        PairScorer::new(Arc::new(EngineSnapshot::new(traits, salinity, classifier, 0.5, names)))
    }

    #[test]
    fn test_resilience_band_is_strict() {
        assert_eq!(Resilience::from_delta(0.03, 0.03), Resilience::Stable);
        assert_eq!(Resilience::from_delta(-0.03, 0.03), Resilience::Stable);
        assert_eq!(Resilience::from_delta(0.031, 0.03), Resilience::Thriving);
        assert_eq!(Resilience::from_delta(-0.031, 0.03), Resilience::Vulnerable);
    }

    #[test]
    fn test_unknown_genus_is_typed_error() {
        let scorer = scorer(Box::new(TemperatureClassifier));
        let err = scorer.score_pair("Quercus", "Nope").unwrap_err();
        assert_eq!(err, ScoreError::GenusNotFound("Nope".to_string()));
    }

    #[test]
    fn test_score_pair_fields() {
        let scorer = scorer(Box::new(TemperatureClassifier));
        let result = scorer.score_pair("Quercus", "Fagus").unwrap();

        assert_eq!(result.plant_a, "Quercus");
        assert_eq!(result.plant_b, "Fagus");
        assert_relative_eq!(result.score, 35.0, epsilon = 1e-9);
        assert_relative_eq!(result.future_score, 45.0, epsilon = 1e-9);
        assert!(!result.compatible);
        assert_eq!(result.resilience, Resilience::Thriving);
        assert_eq!(result.zone, Zone::HighPlateau);
        assert_eq!(result.recommended_regions, Zone::HighPlateau.regions().to_vec());
        assert_relative_eq!(result.traits.drought_tolerance, 80.0, epsilon = 1e-9);
        assert_relative_eq!(result.traits.growth_speed, 10.0, epsilon = 1e-9);
        assert_relative_eq!(result.traits.salinity_tolerance, 5.0, epsilon = 1e-9);
        assert!(result.explanation.starts_with("Viable match driven by"));
        assert!(result.explanation.contains(explanation::SAME_FAMILY));
        assert!(result.explanation.contains(explanation::WOODY));
    }

    #[test]
    fn test_effective_salinity_is_max_of_pair() {
        let scorer = scorer(Box::new(ColdLovingClassifier));
        let result = scorer.score_pair("Quercus", "Salsola").unwrap();

        assert_relative_eq!(result.traits.salinity_tolerance, 72.4, epsilon = 1e-9);
        assert_eq!(result.zone, Zone::Coastal);
        assert!(result.explanation.contains(explanation::SALINITY));
        assert_eq!(result.resilience, Resilience::Vulnerable);
    }

    #[test]
    fn test_compatible_tracks_threshold() {
        let scorer = scorer(Box::new(ColdLovingClassifier));
        let result = scorer.score_pair("Quercus", "Fagus").unwrap();
        // 1 - 0.35 = 0.65 > 0.5
        assert!(result.compatible);
        assert_relative_eq!(result.score, 65.0, epsilon = 1e-9);
    }

    #[test]
    fn test_classifier_failure_fails_the_call() {
        let scorer = scorer(Box::new(FailingClassifier));
        let err = scorer.score_pair("Quercus", "Fagus").unwrap_err();
        assert!(matches!(err, ScoreError::Classifier(ClassifierError::NonFinite(_))));
    }

    #[test]
    fn test_wire_shape() {
        let scorer = scorer(Box::new(TemperatureClassifier));
        let result = scorer.score_pair("Quercus", "Fagus").unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["resilience"], "THRIVING");
        assert_eq!(json["zone"], "High Plateau");
        assert_eq!(json["recommended_regions"][0], "Setif");
        assert!(json["traits"]["drought_tolerance"].is_number());
    }
}
