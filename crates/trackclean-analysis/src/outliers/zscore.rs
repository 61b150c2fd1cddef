//! Z-score against mean and population standard deviation.

use super::types::PolicyStatistics;
use crate::stats::mean_std;

/// `sorted`: valid displacements. `cutoff`: |z| above which a value is flagged (default 3.0).
///
/// A zero standard deviation is floored at `f64::EPSILON`.
pub fn statistics(sorted: &[f64], cutoff: f64) -> Option<PolicyStatistics> {
    let (mean, raw_std) = mean_std(sorted)?;
    let floored = raw_std < f64::EPSILON;
    let std = if floored { f64::EPSILON } else { raw_std };
    Some(PolicyStatistics::Std {
        mean,
        std,
        floored,
        cutoff,
    })
}
