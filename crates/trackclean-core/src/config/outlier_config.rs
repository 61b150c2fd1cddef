//! Outlier detection configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_IQR_MULTIPLIER, DEFAULT_MAD_CUTOFF, DEFAULT_STD_CUTOFF};
use crate::errors::ConfigError;

/// Configuration for the displacement outlier stage.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct OutlierConfig {
    /// "euclidean" (default), "x" or "y".
    pub metric: Option<String>,
    /// "fixed", "mad", "std", "iqr", "adj_iqr" or "percentile".
    pub policy: Option<String>,
    /// Displacement threshold for the fixed policy.
    pub threshold: Option<f64>,
    /// Cutoff for "mad" (default 3.5) and "std" (default 3.0).
    pub cutoff: Option<f64>,
    /// Fence multiplier for "iqr" and "adj_iqr". Default: 1.5.
    pub multiplier: Option<f64>,
    /// Percentile for the "percentile" policy.
    pub percentile: Option<f64>,
    /// Log-transform displacements before non-fixed policies. Default: false.
    pub log_transform: Option<bool>,
    /// "per_bodypart" (default) or "pooled".
    pub scope: Option<String>,
}

impl OutlierConfig {
    /// True when a policy is selected.
    pub fn is_configured(&self) -> bool {
        self.policy.is_some()
    }

    /// Returns the effective cutoff for the named policy.
    pub fn effective_cutoff(&self, policy: &str) -> f64 {
        self.cutoff.unwrap_or(match policy {
            "std" => DEFAULT_STD_CUTOFF,
            _ => DEFAULT_MAD_CUTOFF,
        })
    }

    /// Returns the effective IQR multiplier, defaulting to 1.5.
    pub fn effective_multiplier(&self) -> f64 {
        self.multiplier.unwrap_or(DEFAULT_IQR_MULTIPLIER)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let Some(policy) = self.policy.as_deref() else {
            return Ok(());
        };
        if policy == "fixed" {
            if self.threshold.is_none() {
                return Err(ConfigError::MissingParameter {
                    field: "outliers.threshold".to_string(),
                });
            }
            if self.log_transform.unwrap_or(false) {
                return Err(ConfigError::ConflictingOptions {
                    first: "outliers.log_transform".to_string(),
                    second: "outliers.policy = \"fixed\"".to_string(),
                    message: "log transform only applies to statistical policies".to_string(),
                });
            }
        }
        if policy == "percentile" && self.percentile.is_none() {
            return Err(ConfigError::MissingParameter {
                field: "outliers.percentile".to_string(),
            });
        }
        Ok(())
    }
}
