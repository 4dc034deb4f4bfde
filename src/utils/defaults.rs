//! Missing-Value Defaults
//!
//! Every place the engine substitutes a value for missing data reads it from
//! [`DefaultsPolicy`]. Keeping the substitutions in one table lets tests pin
//! the policy independently of the scoring math.

/// Substitution table for unknown or absent trait data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultsPolicy {
    /// Encoding of an unknown numeric trait (as stored in the trait table
    /// and as seen by the classifier)
    pub unknown_sentinel: f64,
    /// Value an unknown C-value / phylogenetic distance takes inside the
    /// Genomic_Difficulty derivation (and nowhere else)
    pub genomic_unknown_as: f64,
    /// Temperature preference assumed by the zone rules when the trait
    /// table has no `tavg` column
    pub zone_temperature: f64,
    /// Wood percentage assumed by the zone rules when the trait table has
    /// no `perc_wood` column
    pub zone_wood: f64,
    /// Salinity tolerance of a genus absent from the salinity table
    pub salinity: f64,
    /// Family of a genus whose family cell is empty
    pub family: &'static str,
}

impl DefaultsPolicy {
    pub const STANDARD: DefaultsPolicy = DefaultsPolicy {
        unknown_sentinel: -999.0,
        genomic_unknown_as: 0.0,
        zone_temperature: 0.5,
        zone_wood: 0.0,
        salinity: 0.0,
        family: "Unknown",
    };

    /// True if `value` is exactly the unknown sentinel
    pub fn is_sentinel(&self, value: f64) -> bool {
        value == self.unknown_sentinel
    }

    /// Replace the sentinel with `fallback`, leave anything else untouched
    pub fn or_default(&self, value: f64, fallback: f64) -> f64 {
        if self.is_sentinel(value) {
            fallback
        } else {
            value
        }
    }
}

impl Default for DefaultsPolicy {
    fn default() -> Self {
        Self::STANDARD
    }
}
