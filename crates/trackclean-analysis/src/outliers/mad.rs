//! Modified z-score against the median absolute deviation.
//!
//! Robust to the outliers it is looking for: neither the median nor the MAD
//! moves much when a few displacements are extreme. A zero MAD (more than
//! half the sample identical) is floored at `f64::EPSILON` so a single jump
//! in an otherwise still track is still flagged.

use super::types::PolicyStatistics;
use crate::stats::median_abs_deviation;

/// Compute median and MAD of ascending `sorted`.
///
/// `cutoff`: modified z-score above which a displacement is flagged (default 3.5).
pub fn statistics(sorted: &[f64], cutoff: f64) -> Option<PolicyStatistics> {
    let (median, raw_mad) = median_abs_deviation(sorted)?;

    let floored = raw_mad < f64::EPSILON;
    let mad = if floored { f64::EPSILON } else { raw_mad };

    Some(PolicyStatistics::Mad {
        median,
        mad,
        floored,
        cutoff,
    })
}
