//! Configuration system for trackclean.
//! TOML-based, 3-layer resolution: overrides > env > project > defaults.

pub mod cleaning_config;
pub mod confidence_config;
pub mod interpolation_config;
pub mod outlier_config;
pub mod preprocess_config;

pub use cleaning_config::{CleaningConfig, ConfigOverrides};
pub use confidence_config::{ConfidenceConfig, ConfidenceOverride};
pub use interpolation_config::{InterpolationConfig, InterpolationOverride};
pub use outlier_config::OutlierConfig;
pub use preprocess_config::PreprocessConfig;
