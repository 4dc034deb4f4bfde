//! VECTOR BUILDER
//!
//! Derives the classifier input for a pair of genera:
//!   1. Element-wise mean of every numeric trait (sentinel encoding)
//!   2. Family carried from the FIRST row only
//!   3. Optional climate shift: tavg + 0.1, capped at 1.0
//!   4. Bio_Stability = perc_wood × perc_per
//!   5. Genomic_Difficulty = phylo × (c_value + 1), sentinel read as 0 here only
//!   6. Projection onto the classifier's feature order, -999 for anything not derived
//!
//! Pure: no shared state, safe to call from any number of threads.

use rustc_hash::FxHashMap;

use crate::data::{C_VALUE_COL, FAMILY_COL, PERENNIAL_COL, PHYLO_COL, TEMPERATURE_COL, WOOD_COL};
use crate::features::{FeatureValue, FeatureVector};
use crate::traits::{AveragedTraits, TraitRow};
use crate::utils::DefaultsPolicy;

pub const FAMILY_FEATURE: &str = FAMILY_COL;
pub const BIO_STABILITY: &str = "Bio_Stability";
pub const GENOMIC_DIFFICULTY: &str = "Genomic_Difficulty";

const CLIMATE_SHIFT_DELTA: f64 = 0.1;
const TEMPERATURE_CEILING: f64 = 1.0;

/// Build the feature vector for (row_a, row_b)
///
/// `climate_shift` only acts as a trigger: any strictly positive value
/// applies the warming perturbation, its magnitude is ignored.
pub fn build_vector(
    row_a: &TraitRow,
    row_b: &TraitRow,
    climate_shift: f64,
    feature_names: &[String],
) -> FeatureVector {
    let policy = DefaultsPolicy::STANDARD;
    let mut avg = AveragedTraits::of(row_a, row_b);

    if climate_shift > 0.0 {
        avg.tavg = (avg.tavg + CLIMATE_SHIFT_DELTA).min(TEMPERATURE_CEILING);
    }

    let bio_stability = avg.perc_wood * avg.perc_per;

    let c_value = policy.or_default(avg.c_value, policy.genomic_unknown_as);
    let phylo = policy.or_default(avg.phylo_dist_root, policy.genomic_unknown_as);
    let genomic_difficulty = phylo * (c_value + 1.0);

    let mut derived: FxHashMap<&str, FeatureValue> = FxHashMap::default();
    for (name, value) in &avg.extra {
        derived.insert(name.as_str(), FeatureValue::Numeric(*value));
    }
    derived.insert(WOOD_COL, FeatureValue::Numeric(avg.perc_wood));
    derived.insert(PERENNIAL_COL, FeatureValue::Numeric(avg.perc_per));
    derived.insert(TEMPERATURE_COL, FeatureValue::Numeric(avg.tavg));
    derived.insert(C_VALUE_COL, FeatureValue::Numeric(avg.c_value));
    derived.insert(PHYLO_COL, FeatureValue::Numeric(avg.phylo_dist_root));
    derived.insert(FAMILY_FEATURE, FeatureValue::Categorical(row_a.family.clone()));
    derived.insert(BIO_STABILITY, FeatureValue::Numeric(bio_stability));
    derived.insert(GENOMIC_DIFFICULTY, FeatureValue::Numeric(genomic_difficulty));

    let mut vector = FeatureVector::with_capacity(feature_names.len());
    for name in feature_names {
        let value = derived
            .remove(name.as_str())
            .unwrap_or(FeatureValue::Numeric(policy.unknown_sentinel));
        vector.push(name.clone(), value);
    }

    vector
}
