//! Confidence filter configuration.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::types::BTreeMap;

/// Configuration for the confidence filter stage.
///
/// Exactly one of `threshold` (fixed, in [0, 1]) or `percentile`
/// (in [0, 100]) may be set globally and per bodypart.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ConfidenceConfig {
    /// Fixed confidence threshold.
    pub threshold: Option<f64>,
    /// Percentile of the lowest confidence values to remove.
    pub percentile: Option<f64>,
    /// "per_bodypart" (default) or "pooled".
    pub scope: Option<String>,
    /// Per-bodypart overrides.
    pub bodyparts: BTreeMap<String, ConfidenceOverride>,
}

/// Per-bodypart confidence threshold override.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ConfidenceOverride {
    pub threshold: Option<f64>,
    pub percentile: Option<f64>,
}

impl ConfidenceConfig {
    /// True when the stage has any threshold to apply.
    pub fn is_configured(&self) -> bool {
        self.threshold.is_some() || self.percentile.is_some() || !self.bodyparts.is_empty()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_pair("confidence", self.threshold, self.percentile)?;
        for (bodypart, o) in &self.bodyparts {
            validate_pair(&format!("confidence.bodyparts.{bodypart}"), o.threshold, o.percentile)?;
            if o.threshold.is_none() && o.percentile.is_none() {
                return Err(ConfigError::MissingParameter {
                    field: format!("confidence.bodyparts.{bodypart}.threshold|percentile"),
                });
            }
        }
        Ok(())
    }
}

fn validate_pair(prefix: &str, threshold: Option<f64>, percentile: Option<f64>) -> Result<(), ConfigError> {
    if threshold.is_some() && percentile.is_some() {
        return Err(ConfigError::ConflictingOptions {
            first: format!("{prefix}.threshold"),
            second: format!("{prefix}.percentile"),
            message: "a fixed threshold and a percentile cannot both be set".to_string(),
        });
    }
    if let Some(t) = threshold {
        if !(0.0..=1.0).contains(&t) {
            return Err(ConfigError::ValidationFailed {
                field: format!("{prefix}.threshold"),
                message: "must be between 0.0 and 1.0".to_string(),
            });
        }
    }
    if let Some(p) = percentile {
        if !(0.0..=100.0).contains(&p) {
            return Err(ConfigError::ValidationFailed {
                field: format!("{prefix}.percentile"),
                message: "must be between 0 and 100".to_string(),
            });
        }
    }
    Ok(())
}
