//! Interpolation configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_INTERPOLATION_METHOD, DEFAULT_MAX_GAP};
use crate::errors::ConfigError;
use crate::types::BTreeMap;

/// Configuration for the gap interpolation stage.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct InterpolationConfig {
    /// Global default method. Default: "linear".
    pub method: Option<String>,
    /// Degree for the "polynomial" method.
    pub degree: Option<u32>,
    /// Maximum run of missing frames to fill. Default: 5.
    pub max_gap: Option<usize>,
    /// Revert interpolated frames whose displacement exceeds this value.
    pub displacement_ceiling: Option<f64>,
    /// Metric for the ceiling check: "euclidean" (default), "x" or "y".
    pub ceiling_metric: Option<String>,
    /// Per-bodypart overrides.
    pub bodyparts: BTreeMap<String, InterpolationOverride>,
}

/// Per-bodypart interpolation override. Unset fields inherit the global values.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct InterpolationOverride {
    pub method: Option<String>,
    pub degree: Option<u32>,
    pub max_gap: Option<usize>,
}

impl InterpolationConfig {
    /// True when the stage should run. A ceiling alone runs the stage with
    /// the default method and max gap.
    pub fn is_configured(&self) -> bool {
        self.method.is_some()
            || self.max_gap.is_some()
            || self.displacement_ceiling.is_some()
            || !self.bodyparts.is_empty()
    }

    /// Returns the effective global method, defaulting to "linear".
    pub fn effective_method(&self) -> &str {
        self.method.as_deref().unwrap_or(DEFAULT_INTERPOLATION_METHOD)
    }

    /// Returns the effective global max gap, defaulting to 5.
    pub fn effective_max_gap(&self) -> usize {
        self.max_gap.unwrap_or(DEFAULT_MAX_GAP)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_gap == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "interpolation.max_gap".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        for (bodypart, o) in &self.bodyparts {
            if o.max_gap == Some(0) {
                return Err(ConfigError::ValidationFailed {
                    field: format!("interpolation.bodyparts.{bodypart}.max_gap"),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(ceiling) = self.displacement_ceiling {
            if !(ceiling.is_finite() && ceiling > 0.0) {
                return Err(ConfigError::ValidationFailed {
                    field: "interpolation.displacement_ceiling".to_string(),
                    message: "must be a positive number".to_string(),
                });
            }
        }
        Ok(())
    }
}
