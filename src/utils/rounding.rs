//! Display rounding for scores and trait percentages

/// Round to `decimals` places, half away from zero
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Probability (0-1) to a one-decimal percentage (0-100)
pub fn probability_to_score(probability: f64) -> f64 {
    round_to(probability * 100.0, 1)
}
