//! Top-level cleaning configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ConfidenceConfig, InterpolationConfig, OutlierConfig, PreprocessConfig};
use crate::constants::PROJECT_CONFIG_FILE;
use crate::errors::ConfigError;

/// Top-level configuration aggregating all stage configs.
///
/// Resolution order (highest priority first):
/// 1. Explicit overrides (applied via `apply_overrides`)
/// 2. Environment variables (`TRACKCLEAN_*`)
/// 3. Project config (`trackclean.toml` in the project root)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct CleaningConfig {
    pub preprocess: PreprocessConfig,
    pub confidence: ConfidenceConfig,
    pub outliers: OutlierConfig,
    pub interpolation: InterpolationConfig,
}

/// Caller-supplied overrides (typically CLI flags in the boundary layer).
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub confidence_threshold: Option<f64>,
    pub confidence_percentile: Option<f64>,
    pub outlier_policy: Option<String>,
    pub outlier_metric: Option<String>,
    pub outlier_threshold: Option<f64>,
    pub interpolation_method: Option<String>,
    pub max_gap: Option<usize>,
}

impl CleaningConfig {
    /// Load configuration with layered resolution from `root`.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            ::tracing::debug!(path = %project_config_path.display(), "merging project config");
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(o) = overrides {
            Self::apply_overrides(&mut config, o);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate every stage section.
    pub fn validate(config: &CleaningConfig) -> Result<(), ConfigError> {
        config.confidence.validate()?;
        config.outliers.validate()?;
        config.interpolation.validate()?;
        Ok(())
    }

    /// Merge a TOML file into the existing config.
    fn merge_toml_file(config: &mut CleaningConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: CleaningConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins wherever it has a value.
    fn merge(base: &mut CleaningConfig, other: &CleaningConfig) {
        // Preprocess
        if !other.preprocess.exclude_bodyparts.is_empty() {
            base.preprocess.exclude_bodyparts = other.preprocess.exclude_bodyparts.clone();
        }
        if other.preprocess.invert_y.is_some() {
            base.preprocess.invert_y = other.preprocess.invert_y;
        }
        if other.preprocess.zero_frames.is_some() {
            base.preprocess.zero_frames = other.preprocess.zero_frames.clone();
        }

        // Confidence: threshold and percentile are one choice, so they move together.
        if other.confidence.threshold.is_some() || other.confidence.percentile.is_some() {
            base.confidence.threshold = other.confidence.threshold;
            base.confidence.percentile = other.confidence.percentile;
        }
        if other.confidence.scope.is_some() {
            base.confidence.scope = other.confidence.scope.clone();
        }
        for (bodypart, o) in &other.confidence.bodyparts {
            base.confidence.bodyparts.insert(bodypart.clone(), o.clone());
        }

        // Outliers
        if other.outliers.metric.is_some() {
            base.outliers.metric = other.outliers.metric.clone();
        }
        if other.outliers.policy.is_some() {
            base.outliers.policy = other.outliers.policy.clone();
        }
        if other.outliers.threshold.is_some() {
            base.outliers.threshold = other.outliers.threshold;
        }
        if other.outliers.cutoff.is_some() {
            base.outliers.cutoff = other.outliers.cutoff;
        }
        if other.outliers.multiplier.is_some() {
            base.outliers.multiplier = other.outliers.multiplier;
        }
        if other.outliers.percentile.is_some() {
            base.outliers.percentile = other.outliers.percentile;
        }
        if other.outliers.log_transform.is_some() {
            base.outliers.log_transform = other.outliers.log_transform;
        }
        if other.outliers.scope.is_some() {
            base.outliers.scope = other.outliers.scope.clone();
        }

        // Interpolation
        if other.interpolation.method.is_some() {
            base.interpolation.method = other.interpolation.method.clone();
        }
        if other.interpolation.degree.is_some() {
            base.interpolation.degree = other.interpolation.degree;
        }
        if other.interpolation.max_gap.is_some() {
            base.interpolation.max_gap = other.interpolation.max_gap;
        }
        if other.interpolation.displacement_ceiling.is_some() {
            base.interpolation.displacement_ceiling = other.interpolation.displacement_ceiling;
        }
        if other.interpolation.ceiling_metric.is_some() {
            base.interpolation.ceiling_metric = other.interpolation.ceiling_metric.clone();
        }
        for (bodypart, o) in &other.interpolation.bodyparts {
            base.interpolation.bodyparts.insert(bodypart.clone(), o.clone());
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `TRACKCLEAN_CONFIDENCE_THRESHOLD`, `TRACKCLEAN_INTERPOLATION_MAX_GAP`, etc.
    fn apply_env_overrides(config: &mut CleaningConfig) {
        if let Ok(val) = std::env::var("TRACKCLEAN_CONFIDENCE_THRESHOLD") {
            if let Ok(v) = val.parse::<f64>() {
                config.confidence.threshold = Some(v);
                config.confidence.percentile = None;
            }
        }
        if let Ok(val) = std::env::var("TRACKCLEAN_CONFIDENCE_PERCENTILE") {
            if let Ok(v) = val.parse::<f64>() {
                config.confidence.percentile = Some(v);
                config.confidence.threshold = None;
            }
        }
        if let Ok(val) = std::env::var("TRACKCLEAN_OUTLIER_POLICY") {
            config.outliers.policy = Some(val);
        }
        if let Ok(val) = std::env::var("TRACKCLEAN_OUTLIER_METRIC") {
            config.outliers.metric = Some(val);
        }
        if let Ok(val) = std::env::var("TRACKCLEAN_INTERPOLATION_METHOD") {
            config.interpolation.method = Some(val);
        }
        if let Ok(val) = std::env::var("TRACKCLEAN_INTERPOLATION_MAX_GAP") {
            if let Ok(v) = val.parse::<usize>() {
                config.interpolation.max_gap = Some(v);
            }
        }
    }

    /// Apply explicit overrides (highest priority).
    pub fn apply_overrides(config: &mut CleaningConfig, o: &ConfigOverrides) {
        if let Some(v) = o.confidence_threshold {
            config.confidence.threshold = Some(v);
            config.confidence.percentile = None;
        }
        if let Some(v) = o.confidence_percentile {
            config.confidence.percentile = Some(v);
            config.confidence.threshold = None;
        }
        if let Some(ref v) = o.outlier_policy {
            config.outliers.policy = Some(v.clone());
        }
        if let Some(ref v) = o.outlier_metric {
            config.outliers.metric = Some(v.clone());
        }
        if let Some(v) = o.outlier_threshold {
            config.outliers.threshold = Some(v);
        }
        if let Some(ref v) = o.interpolation_method {
            config.interpolation.method = Some(v.clone());
        }
        if let Some(v) = o.max_gap {
            config.interpolation.max_gap = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}
