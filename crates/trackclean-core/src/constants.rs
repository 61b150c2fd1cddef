//! Shared constants for the trackclean engine.

/// Project-level configuration file name.
pub const PROJECT_CONFIG_FILE: &str = "trackclean.toml";

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV_VAR: &str = "TRACKCLEAN_LOG";

/// Filter used when `TRACKCLEAN_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "trackclean=info";

// ---- Column naming contract ----

/// Suffix of x-coordinate columns.
pub const X_SUFFIX: &str = "_x";

/// Suffix of y-coordinate columns.
pub const Y_SUFFIX: &str = "_y";

/// Preferred confidence suffix (pose-estimation "likelihood").
pub const LIKELIHOOD_SUFFIX: &str = "_likelihood";

/// Alternate confidence suffix.
pub const CONFIDENCE_SUFFIX: &str = "_confidence";

// ---- Outlier detection ----

/// Default modified Z-score cutoff for the MAD policy.
pub const DEFAULT_MAD_CUTOFF: f64 = 3.5;

/// Default Z-score cutoff for the standard-deviation policy.
pub const DEFAULT_STD_CUTOFF: f64 = 3.0;

/// Default fence multiplier for the IQR and adjusted-IQR policies.
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

/// Consistency constant of the modified Z-score (Iglewicz & Hoaglin).
pub const MAD_SCALE: f64 = 0.6745;

/// Offset added before the log transform of displacements.
pub const LOG_TRANSFORM_OFFSET: f64 = 1e-8;

// ---- Interpolation ----

/// Default maximum run of missing frames to fill.
pub const DEFAULT_MAX_GAP: usize = 5;

/// Default interpolation method name.
pub const DEFAULT_INTERPOLATION_METHOD: &str = "linear";

/// Highest polynomial degree accepted by the polynomial method.
pub const MAX_POLYNOMIAL_DEGREE: u32 = 10;
