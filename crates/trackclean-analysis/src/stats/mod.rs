//! NaN-aware descriptive statistics shared by the confidence and outlier stages.
//!
//! Missing values (`NaN`) are ignored everywhere. Every function returns
//! `None` when no valid value remains.

pub mod medcouple;
pub mod quantile;

pub use medcouple::medcouple;
pub use quantile::{median, percentile, quantile_sorted};

use statrs::statistics::Statistics;

/// Copy out the non-missing values.
pub fn valid_values(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| !v.is_nan()).collect()
}

/// Non-missing values in ascending order.
pub fn sorted_valid(values: &[f64]) -> Vec<f64> {
    let mut valid = valid_values(values);
    valid.sort_by(f64::total_cmp);
    valid
}

/// Mean and population standard deviation.
pub fn mean_std(values: &[f64]) -> Option<(f64, f64)> {
    let valid = valid_values(values);
    if valid.is_empty() {
        return None;
    }
    let mean = valid.iter().mean();
    let std = valid.iter().population_std_dev();
    Some((mean, std))
}

/// Median and median absolute deviation (unscaled).
pub fn median_abs_deviation(values: &[f64]) -> Option<(f64, f64)> {
    let sorted = sorted_valid(values);
    let med = quantile_sorted(&sorted, 0.5)?;
    let mut deviations: Vec<f64> = sorted.iter().map(|v| (v - med).abs()).collect();
    deviations.sort_by(f64::total_cmp);
    let mad = quantile_sorted(&deviations, 0.5)?;
    Some((med, mad))
}
