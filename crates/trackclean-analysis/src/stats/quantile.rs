//! Order statistics with linear interpolation between ranks.

use super::sorted_valid;

/// Quantile `q ∈ [0, 1]` of ascending, NaN-free `sorted`.
///
/// Rank `q·(n−1)`, interpolated linearly between its neighbouring order
/// statistics. A constant input returns the constant exactly.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let rank = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(n - 1);
    let frac = rank - lower as f64;
    let (a, b) = (sorted[lower], sorted[upper]);
    if frac == 0.0 || a == b {
        return Some(a);
    }
    Some(a + (b - a) * frac)
}

/// `p`-th percentile (`p ∈ [0, 100]`) of the non-missing values.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    quantile_sorted(&sorted_valid(values), p / 100.0)
}

pub fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 50.0)
}
