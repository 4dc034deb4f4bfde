//! Explanation Synthesizer
//!
//! Turns a pair's probability, averaged traits and two flags into one
//! sentence. Rules are independent: every rule that applies contributes a
//! phrase, in a fixed order.

use smallvec::SmallVec;

use crate::traits::AveragedTraits;

/// Probability above which a match is called exceptional
pub const EXCEPTIONAL_PROBABILITY: f64 = 0.8;

pub const SAME_FAMILY: &str = "strong taxonomic alignment (Same Family)";
pub const INTER_FAMILY: &str = "high inter-family compatibility";
pub const WOODY: &str = "robust woody structure compatibility";
pub const HERBACEOUS: &str = "similar herbaceous growth patterns";
pub const SALINITY: &str = "shared salinity tolerance traits";
pub const HIGH_TEMPERATURE: &str = "aligned high-temperature preferences";
pub const FALLBACK: &str = "convergent biological traits";

/// Rationale phrases for a pair, in rule order
pub fn rationale(
    probability: f64,
    traits: &AveragedTraits,
    salt_tolerant: bool,
    same_family: bool,
) -> SmallVec<[&'static str; 4]> {
    let mut reasons: SmallVec<[&'static str; 4]> = SmallVec::new();

    if same_family {
        reasons.push(SAME_FAMILY);
    } else if probability > EXCEPTIONAL_PROBABILITY {
        reasons.push(INTER_FAMILY);
    }

    if traits.perc_wood > 0.7 {
        reasons.push(WOODY);
    } else if traits.perc_wood < 0.2 {
        reasons.push(HERBACEOUS);
    }

    if salt_tolerant {
        reasons.push(SALINITY);
    }

    if traits.tavg > 0.7 {
        reasons.push(HIGH_TEMPERATURE);
    }

    if reasons.is_empty() {
        reasons.push(FALLBACK);
    }

    reasons
}

/// "{Exceptional|Viable} match driven by {reasons}."
pub fn explain(
    probability: f64,
    traits: &AveragedTraits,
    salt_tolerant: bool,
    same_family: bool,
) -> String {
    let intro = if probability > EXCEPTIONAL_PROBABILITY {
        "Exceptional match"
    } else {
        "Viable match"
    };

    let reasons = rationale(probability, traits, salt_tolerant, same_family);
    format!("{} driven by {}.", intro, reasons.join(", "))
}
