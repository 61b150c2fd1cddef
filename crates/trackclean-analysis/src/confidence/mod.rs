//! Confidence filtering: null x/y of frames the pose estimator was unsure about.

pub mod filter;
pub mod types;

pub use filter::{apply_confidence_filter, pooled_percentile_threshold};
pub use types::{BodypartConfidence, ConfidenceReport, ConfidenceSettings, ThresholdScope, ThresholdSpec};
