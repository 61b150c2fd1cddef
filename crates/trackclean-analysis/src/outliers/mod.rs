//! Outlier detection on frame-to-frame displacement.
//!
//! One pure statistics function per policy, all fed the same sorted valid
//! sample:
//! - `fixed` → absolute displacement threshold
//! - `mad` → modified z-score against the median absolute deviation
//! - `zscore` → z-score against mean and population standard deviation
//! - `iqr` → Tukey fences
//! - `adjusted_iqr` → medcouple-skewed Tukey fences (Hubert–Vandervieren)
//! - `percentile` → flag everything above a percentile of the sample

pub mod adjusted_iqr;
pub mod detector;
pub mod fixed;
pub mod iqr;
pub mod mad;
pub mod percentile;
pub mod types;
pub mod zscore;

pub use detector::{apply_outlier_mask, detect_position_outliers, filter_position_outliers, OutlierDetector};
pub use types::{
    BodypartOutliers, Fences, OutlierDetection, OutlierPolicy, OutlierSettings, PolicyStatistics,
    StatisticScope,
};
