//! IQR with Tukey fences.
//!
//! Uses Q1 - k*IQR and Q3 + k*IQR as fences (k = 1.5 default). Both sides
//! are strict: a value exactly on a fence is kept.

use super::types::PolicyStatistics;
use crate::stats::quantile_sorted;

/// `sorted`: ascending valid displacements. `multiplier`: fence width k.
pub fn statistics(sorted: &[f64], multiplier: f64) -> Option<PolicyStatistics> {
    let q1 = quantile_sorted(sorted, 0.25)?;
    let q3 = quantile_sorted(sorted, 0.75)?;
    Some(PolicyStatistics::Iqr {
        q1,
        q3,
        iqr: q3 - q1,
        multiplier,
    })
}
