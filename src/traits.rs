//! Typed Trait Rows
//!
//! One statically-shaped record per genus. Numeric traits carry an explicit
//! `Unknown` state instead of a magic number; the `-999` sentinel only
//! reappears at the edges (table loading, averaging, classifier input),
//! where it is the agreed encoding.

use std::collections::BTreeMap;

use crate::utils::DefaultsPolicy;

/// A single numeric trait value
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TraitValue {
    Known(f64),
    #[default]
    Unknown,
}

impl TraitValue {
    /// Decode a raw table cell: null and the sentinel both mean unknown
    pub fn from_raw(raw: Option<f64>) -> Self {
        match raw {
            Some(v) if v.is_finite() && !DefaultsPolicy::STANDARD.is_sentinel(v) => {
                TraitValue::Known(v)
            }
            _ => TraitValue::Unknown,
        }
    }

    /// Sentinel encoding (unknown -> -999)
    pub fn encoded(&self) -> f64 {
        match self {
            TraitValue::Known(v) => *v,
            TraitValue::Unknown => DefaultsPolicy::STANDARD.unknown_sentinel,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, TraitValue::Unknown)
    }
}

impl From<f64> for TraitValue {
    fn from(value: f64) -> Self {
        TraitValue::from_raw(Some(value))
    }
}

/// Mean of two trait values in sentinel encoding
///
/// Two unknowns stay at the sentinel; a known value paired with an unknown
/// averages arithmetically with -999, matching what the classifier was
/// trained on.
pub fn encoded_mean(a: TraitValue, b: TraitValue) -> f64 {
    (a.encoded() + b.encoded()) / 2.0
}

/// Trait profile of one genus
#[derive(Debug, Clone, PartialEq)]
pub struct TraitRow {
    pub genus: String,
    pub family: String,
    /// Wood percentage (0-1)
    pub perc_wood: TraitValue,
    /// Perennial percentage (0-1)
    pub perc_per: TraitValue,
    /// Average temperature preference (0-1)
    pub tavg: TraitValue,
    /// Genomic C-value
    pub c_value: TraitValue,
    /// Phylogenetic distance to root
    pub phylo_dist_root: TraitValue,
    /// Every other numeric column of the trait table, keyed by column name
    pub extra: BTreeMap<String, TraitValue>,
}

impl TraitRow {
    /// Row with every trait unknown
    pub fn new(genus: impl Into<String>, family: impl Into<String>) -> Self {
        Self {
            genus: genus.into(),
            family: family.into(),
            perc_wood: TraitValue::Unknown,
            perc_per: TraitValue::Unknown,
            tavg: TraitValue::Unknown,
            c_value: TraitValue::Unknown,
            phylo_dist_root: TraitValue::Unknown,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_wood(mut self, value: f64) -> Self {
        self.perc_wood = value.into();
        self
    }

    pub fn with_perennial(mut self, value: f64) -> Self {
        self.perc_per = value.into();
        self
    }

    pub fn with_temperature(mut self, value: f64) -> Self {
        self.tavg = value.into();
        self
    }

    pub fn with_c_value(mut self, value: f64) -> Self {
        self.c_value = value.into();
        self
    }

    pub fn with_phylo_distance(mut self, value: f64) -> Self {
        self.phylo_dist_root = value.into();
        self
    }

    pub fn with_extra(mut self, name: impl Into<String>, value: f64) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

/// Element-wise mean of two rows' numeric traits (family excluded)
///
/// Values are in sentinel encoding: `-999` means unknown for both genera.
#[derive(Debug, Clone, PartialEq)]
pub struct AveragedTraits {
    pub perc_wood: f64,
    pub perc_per: f64,
    pub tavg: f64,
    pub c_value: f64,
    pub phylo_dist_root: f64,
    pub extra: BTreeMap<String, f64>,
}

impl AveragedTraits {
    /// Average two rows with equal weight
    ///
    /// An `extra` column present in only one row pairs with unknown.
    pub fn of(a: &TraitRow, b: &TraitRow) -> Self {
        let mut extra = BTreeMap::new();
        for name in a.extra.keys().chain(b.extra.keys()) {
            if extra.contains_key(name) {
                continue;
            }
            let va = a.extra.get(name).copied().unwrap_or_default();
            let vb = b.extra.get(name).copied().unwrap_or_default();
            extra.insert(name.clone(), encoded_mean(va, vb));
        }

        Self {
            perc_wood: encoded_mean(a.perc_wood, b.perc_wood),
            perc_per: encoded_mean(a.perc_per, b.perc_per),
            tavg: encoded_mean(a.tavg, b.tavg),
            c_value: encoded_mean(a.c_value, b.c_value),
            phylo_dist_root: encoded_mean(a.phylo_dist_root, b.phylo_dist_root),
            extra,
        }
    }
}
