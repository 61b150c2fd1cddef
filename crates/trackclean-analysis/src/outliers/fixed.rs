//! Fixed displacement threshold.

use super::types::PolicyStatistics;

/// Flag `d > threshold`. The sample only decides whether there is anything to judge.
pub fn statistics(sorted: &[f64], threshold: f64) -> Option<PolicyStatistics> {
    if sorted.is_empty() {
        return None;
    }
    Some(PolicyStatistics::Fixed { threshold })
}
