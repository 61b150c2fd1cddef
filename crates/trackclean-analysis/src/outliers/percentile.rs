//! Flag displacements above a percentile of the sample.

use super::types::PolicyStatistics;
use crate::stats::quantile_sorted;

pub fn statistics(sorted: &[f64], percentile: f64) -> Option<PolicyStatistics> {
    let cutoff = quantile_sorted(sorted, percentile / 100.0)?;
    Some(PolicyStatistics::Percentile { percentile, cutoff })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_cutoff() {
        let sorted: Vec<f64> = (0..=10).map(f64::from).collect();
        let stats = statistics(&sorted, 90.0).unwrap();
        assert_eq!(stats.fences().upper, Some(9.0));
        assert!(stats.is_outlier(10.0));
        assert!(!stats.is_outlier(9.0));
    }

    #[test]
    fn test_percentile_100_flags_nothing() {
        let sorted = [1.0, 2.0, 3.0];
        let stats = statistics(&sorted, 100.0).unwrap();
        assert!(sorted.iter().all(|&v| !stats.is_outlier(v)));
    }
}
