//! Gap-limited interpolation of missing coordinates.
//!
//! A gap is a maximal run of missing values in one channel. Interior runs up
//! to `max_gap` long are filled by the bodypart's method, edge runs by
//! extending the nearest valid value, and longer runs stay missing in full.

pub mod gaps;
pub mod interpolator;
pub mod kernels;
pub mod types;

pub use gaps::{missing_runs, MissingRun, RunKind};
pub use interpolator::apply_interpolation;
pub use types::{
    BodypartInterpolation, ChannelInterpolation, DisplacementCeiling, GapFillSpec,
    InterpolationMethod, InterpolationReport, InterpolationSettings,
};
