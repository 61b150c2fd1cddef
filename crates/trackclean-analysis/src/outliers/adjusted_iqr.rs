//! Skewness-adjusted Tukey fences (Hubert–Vandervieren).
//!
//! Displacement distributions are right-skewed, so symmetric Tukey fences
//! over-flag the long tail. The fences are stretched by the medcouple (MC):
//!
//! - MC ≥ 0: `[Q1 − k·e^(−4·MC)·IQR, Q3 + k·e^(3·MC)·IQR]`
//! - MC < 0: `[Q1 − k·e^(−3·MC)·IQR, Q3 + k·e^(4·MC)·IQR]`

use super::types::PolicyStatistics;
use crate::stats::{medcouple, quantile_sorted};

pub fn statistics(sorted: &[f64], multiplier: f64) -> Option<PolicyStatistics> {
    let q1 = quantile_sorted(sorted, 0.25)?;
    let q3 = quantile_sorted(sorted, 0.75)?;
    let mc = medcouple(sorted)?;
    let (lower_factor, upper_factor) = skew_factors(mc);
    Some(PolicyStatistics::AdjustedIqr {
        q1,
        q3,
        iqr: q3 - q1,
        medcouple: mc,
        lower_factor,
        upper_factor,
        multiplier,
    })
}

/// Exponential fence factors for a medcouple value.
pub fn skew_factors(mc: f64) -> (f64, f64) {
    if mc >= 0.0 {
        ((-4.0 * mc).exp(), (3.0 * mc).exp())
    } else {
        ((-3.0 * mc).exp(), (4.0 * mc).exp())
    }
}
