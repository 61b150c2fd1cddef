//! trackclean-analysis: the signal cleaning and gap-filling engine.
//!
//! Stages, applied in this order by [`pipeline::Pipeline`]:
//! - Preprocess: bodypart exclusion, y inversion, corrupted-frame handling
//! - Confidence: null coordinates of low-confidence frames
//! - Outliers: flag implausible frame-to-frame displacement
//! - Interpolation: fill short gaps, leave long ones missing
//!
//! Every stage consumes a [`table::FrameTable`] and returns it together with
//! an explicit report value; nothing is printed or persisted here.

pub mod columns;
pub mod confidence;
pub mod displacement;
pub mod interpolation;
pub mod outliers;
pub mod pipeline;
pub mod preprocess;
pub mod stats;
pub mod table;
pub mod warnings;

pub use columns::{BodypartColumns, ChannelKind, ColumnModel};
pub use confidence::{apply_confidence_filter, ConfidenceSettings, ThresholdScope, ThresholdSpec};
pub use displacement::DisplacementMetric;
pub use interpolation::{apply_interpolation, DisplacementCeiling, GapFillSpec, InterpolationMethod, InterpolationSettings};
pub use outliers::{
    apply_outlier_mask, detect_position_outliers, filter_position_outliers, OutlierPolicy,
    OutlierSettings,
};
pub use pipeline::{CleaningJob, CleaningReport, Pipeline, PipelineSettings};
pub use preprocess::{preprocess, PreprocessSettings, ZeroFrameAction};
pub use table::FrameTable;
pub use warnings::CleaningWarning;
