//! Core types for displacement outlier detection.

use serde::Serialize;

use trackclean_core::config::OutlierConfig;
use trackclean_core::constants::{
    DEFAULT_IQR_MULTIPLIER, DEFAULT_MAD_CUTOFF, DEFAULT_STD_CUTOFF, LOG_TRANSFORM_OFFSET,
    MAD_SCALE,
};
use trackclean_core::errors::ConfigError;

use crate::displacement::DisplacementMetric;
use crate::warnings::CleaningWarning;

/// Statistical policy deciding which displacements are implausible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum OutlierPolicy {
    /// `d > threshold`.
    Fixed { threshold: f64 },
    /// `|0.6745·(d − median) / MAD| > cutoff`.
    Mad { cutoff: f64 },
    /// `|(d − mean) / std| > cutoff`.
    Std { cutoff: f64 },
    /// Outside `[Q1 − k·IQR, Q3 + k·IQR]`.
    Iqr { multiplier: f64 },
    /// Tukey fences skewed by the medcouple.
    #[serde(rename = "adj_iqr")]
    AdjustedIqr { multiplier: f64 },
    /// `d` above the `percentile`-th percentile of the sample.
    Percentile { percentile: f64 },
}

impl OutlierPolicy {
    pub const EXPECTED: &'static str = "fixed, mad, std, iqr, adj_iqr, percentile";

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fixed { .. } => "fixed",
            Self::Mad { .. } => "mad",
            Self::Std { .. } => "std",
            Self::Iqr { .. } => "iqr",
            Self::AdjustedIqr { .. } => "adj_iqr",
            Self::Percentile { .. } => "percentile",
        }
    }

    pub fn mad() -> Self {
        Self::Mad {
            cutoff: DEFAULT_MAD_CUTOFF,
        }
    }

    pub fn std() -> Self {
        Self::Std {
            cutoff: DEFAULT_STD_CUTOFF,
        }
    }

    pub fn iqr() -> Self {
        Self::Iqr {
            multiplier: DEFAULT_IQR_MULTIPLIER,
        }
    }

    pub fn adjusted_iqr() -> Self {
        Self::AdjustedIqr {
            multiplier: DEFAULT_IQR_MULTIPLIER,
        }
    }

    /// Build the policy named in `config`. `Ok(None)` when no policy is set.
    pub fn from_config(config: &OutlierConfig) -> Result<Option<Self>, ConfigError> {
        let Some(name) = config.policy.as_deref() else {
            return Ok(None);
        };
        let policy = match name {
            "fixed" => Self::Fixed {
                threshold: config.threshold.ok_or_else(|| ConfigError::MissingParameter {
                    field: "outliers.threshold".to_string(),
                })?,
            },
            "mad" | "std" => {
                let cutoff = config.effective_cutoff(name);
                if name == "mad" {
                    Self::Mad { cutoff }
                } else {
                    Self::Std { cutoff }
                }
            }
            "iqr" => Self::Iqr {
                multiplier: config.effective_multiplier(),
            },
            "adj_iqr" => Self::AdjustedIqr {
                multiplier: config.effective_multiplier(),
            },
            "percentile" => Self::Percentile {
                percentile: config.percentile.ok_or_else(|| ConfigError::MissingParameter {
                    field: "outliers.percentile".to_string(),
                })?,
            },
            other => {
                return Err(ConfigError::UnknownVariant {
                    field: "outliers.policy".to_string(),
                    value: other.to_string(),
                    expected: Self::EXPECTED,
                })
            }
        };
        policy.validate()?;
        Ok(Some(policy))
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |field: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::invalid(field, format!("must be a positive number, got {v}")))
            }
        };
        match *self {
            Self::Fixed { threshold } => positive("outliers.threshold", threshold),
            Self::Mad { cutoff } | Self::Std { cutoff } => positive("outliers.cutoff", cutoff),
            Self::Iqr { multiplier } | Self::AdjustedIqr { multiplier } => {
                if multiplier.is_finite() && multiplier >= 0.0 {
                    Ok(())
                } else {
                    Err(ConfigError::invalid(
                        "outliers.multiplier",
                        format!("must be non-negative, got {multiplier}"),
                    ))
                }
            }
            Self::Percentile { percentile } => {
                if (0.0..=100.0).contains(&percentile) {
                    Ok(())
                } else {
                    Err(ConfigError::invalid(
                        "outliers.percentile",
                        format!("must be within [0, 100], got {percentile}"),
                    ))
                }
            }
        }
    }
}

impl std::fmt::Display for OutlierPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which displacements feed the policy statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticScope {
    /// Each bodypart against its own displacements.
    #[default]
    PerBodypart,
    /// One set of statistics over all bodyparts' displacements.
    Pooled,
}

impl StatisticScope {
    pub const EXPECTED: &'static str = "per_bodypart, pooled";

    pub fn parse(field: &str, value: &str) -> Result<Self, ConfigError> {
        match value {
            "per_bodypart" => Ok(Self::PerBodypart),
            "pooled" => Ok(Self::Pooled),
            other => Err(ConfigError::UnknownVariant {
                field: field.to_string(),
                value: other.to_string(),
                expected: Self::EXPECTED,
            }),
        }
    }
}

/// Full configuration of the outlier stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierSettings {
    pub metric: DisplacementMetric,
    pub policy: OutlierPolicy,
    /// Apply `ln(d + 1e-8)` before computing statistics.
    pub log_transform: bool,
    pub scope: StatisticScope,
}

impl OutlierSettings {
    pub fn new(metric: DisplacementMetric, policy: OutlierPolicy) -> Self {
        Self {
            metric,
            policy,
            log_transform: false,
            scope: StatisticScope::PerBodypart,
        }
    }

    pub fn with_log_transform(mut self, log_transform: bool) -> Self {
        self.log_transform = log_transform;
        self
    }

    pub fn with_scope(mut self, scope: StatisticScope) -> Self {
        self.scope = scope;
        self
    }

    /// Build settings from config. `Ok(None)` when no policy is configured.
    pub fn from_config(config: &OutlierConfig) -> Result<Option<Self>, ConfigError> {
        let Some(policy) = OutlierPolicy::from_config(config)? else {
            return Ok(None);
        };
        let metric = match config.metric.as_deref() {
            Some(name) => DisplacementMetric::parse("outliers.metric", name)?,
            None => DisplacementMetric::default(),
        };
        let scope = match config.scope.as_deref() {
            Some(name) => StatisticScope::parse("outliers.scope", name)?,
            None => StatisticScope::default(),
        };
        let settings = Self {
            metric,
            policy,
            log_transform: config.log_transform.unwrap_or(false),
            scope,
        };
        settings.validate()?;
        Ok(Some(settings))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy.validate()?;
        if self.log_transform && matches!(self.policy, OutlierPolicy::Fixed { .. }) {
            return Err(ConfigError::ConflictingOptions {
                first: "outliers.log_transform".to_string(),
                second: "outliers.policy = fixed".to_string(),
                message: "a fixed threshold is expressed in raw displacement units".to_string(),
            });
        }
        Ok(())
    }

    /// Map a raw displacement into the space the statistics live in.
    #[inline]
    pub fn transform(&self, d: f64) -> f64 {
        if self.log_transform {
            (d + LOG_TRANSFORM_OFFSET).ln()
        } else {
            d
        }
    }

    /// Inverse of [`transform`](Self::transform).
    #[inline]
    pub fn untransform(&self, v: f64) -> f64 {
        if self.log_transform {
            v.exp() - LOG_TRANSFORM_OFFSET
        } else {
            v
        }
    }
}

/// Lower and upper decision bounds. A side without a bound is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fences {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl Fences {
    pub fn upper(upper: f64) -> Self {
        Self {
            lower: None,
            upper: Some(upper),
        }
    }

    pub fn both(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            lower: self.lower.map(&f),
            upper: self.upper.map(&f),
        }
    }
}

/// Numbers a policy computed from its sample, exposed for auditing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum PolicyStatistics {
    Fixed {
        threshold: f64,
    },
    Mad {
        median: f64,
        /// MAD after flooring at `f64::EPSILON`.
        mad: f64,
        floored: bool,
        cutoff: f64,
    },
    Std {
        mean: f64,
        /// Population std after flooring at `f64::EPSILON`.
        std: f64,
        floored: bool,
        cutoff: f64,
    },
    Iqr {
        q1: f64,
        q3: f64,
        iqr: f64,
        multiplier: f64,
    },
    #[serde(rename = "adj_iqr")]
    AdjustedIqr {
        q1: f64,
        q3: f64,
        iqr: f64,
        medcouple: f64,
        lower_factor: f64,
        upper_factor: f64,
        multiplier: f64,
    },
    Percentile {
        percentile: f64,
        cutoff: f64,
    },
}

impl PolicyStatistics {
    /// Strict decision rule of the policy. Missing values are never outliers.
    pub fn is_outlier(&self, v: f64) -> bool {
        if v.is_nan() {
            return false;
        }
        match *self {
            Self::Fixed { threshold } => v > threshold,
            Self::Mad {
                median,
                mad,
                cutoff,
                ..
            } => (MAD_SCALE * (v - median) / mad).abs() > cutoff,
            Self::Std {
                mean, std, cutoff, ..
            } => ((v - mean) / std).abs() > cutoff,
            Self::Iqr { .. } | Self::AdjustedIqr { .. } => {
                let fences = self.fences();
                fences.lower.is_some_and(|l| v < l) || fences.upper.is_some_and(|u| v > u)
            }
            Self::Percentile { cutoff, .. } => v > cutoff,
        }
    }

    /// Fences in the space the statistics were computed in.
    pub fn fences(&self) -> Fences {
        match *self {
            Self::Fixed { threshold } => Fences::upper(threshold),
            Self::Mad {
                median,
                mad,
                cutoff,
                ..
            } => {
                let half_width = cutoff * mad / MAD_SCALE;
                Fences::both(median - half_width, median + half_width)
            }
            Self::Std {
                mean, std, cutoff, ..
            } => Fences::both(mean - cutoff * std, mean + cutoff * std),
            Self::Iqr {
                q1,
                q3,
                iqr,
                multiplier,
            } => Fences::both(q1 - multiplier * iqr, q3 + multiplier * iqr),
            Self::AdjustedIqr {
                q1,
                q3,
                iqr,
                lower_factor,
                upper_factor,
                multiplier,
                ..
            } => Fences::both(
                q1 - multiplier * lower_factor * iqr,
                q3 + multiplier * upper_factor * iqr,
            ),
            Self::Percentile { cutoff, .. } => Fences::upper(cutoff),
        }
    }
}

/// Detection outcome for one bodypart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodypartOutliers {
    pub bodypart: String,
    /// One entry per frame; `mask[0]` is always false.
    #[serde(skip)]
    pub mask: Vec<bool>,
    /// Row positions set in `mask`.
    pub flagged_rows: Vec<usize>,
    /// Displacements that entered the statistics: the frame 0 placeholder plus every non-missing frame.
    pub valid_displacements: usize,
    pub statistics: Option<PolicyStatistics>,
    /// Fences in raw displacement units.
    pub fences: Option<Fences>,
    /// Fences in log space, present when the log transform is active.
    pub transformed_fences: Option<Fences>,
}

impl BodypartOutliers {
    pub fn flagged(&self) -> usize {
        self.flagged_rows.len()
    }
}

/// Per-bodypart masks and statistics for one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierDetection {
    pub settings: OutlierSettings,
    /// Shared statistics when the scope is pooled.
    pub pooled_statistics: Option<PolicyStatistics>,
    pub bodyparts: Vec<BodypartOutliers>,
    pub warnings: Vec<CleaningWarning>,
}

impl OutlierDetection {
    pub fn get(&self, bodypart: &str) -> Option<&BodypartOutliers> {
        self.bodyparts.iter().find(|b| b.bodypart == bodypart)
    }

    pub fn total_flagged(&self) -> usize {
        self.bodyparts.iter().map(BodypartOutliers::flagged).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_config_defaults() {
        let config = OutlierConfig {
            policy: Some("mad".into()),
            ..Default::default()
        };
        assert_eq!(
            OutlierPolicy::from_config(&config).unwrap(),
            Some(OutlierPolicy::Mad { cutoff: 3.5 })
        );

        let config = OutlierConfig {
            policy: Some("std".into()),
            ..Default::default()
        };
        assert_eq!(
            OutlierPolicy::from_config(&config).unwrap(),
            Some(OutlierPolicy::Std { cutoff: 3.0 })
        );
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let config = OutlierConfig {
            policy: Some("grubbs".into()),
            ..Default::default()
        };
        assert!(matches!(
            OutlierPolicy::from_config(&config),
            Err(ConfigError::UnknownVariant { .. })
        ));
    }

    #[test]
    fn test_log_transform_with_fixed_conflicts() {
        let settings = OutlierSettings::new(
            DisplacementMetric::Euclidean,
            OutlierPolicy::Fixed { threshold: 5.0 },
        )
        .with_log_transform(true);
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::ConflictingOptions { .. })
        ));
    }

    #[test]
    fn test_non_positive_threshold_rejected() {
        assert!(OutlierPolicy::Fixed { threshold: 0.0 }.validate().is_err());
        assert!(OutlierPolicy::Percentile { percentile: 101.0 }.validate().is_err());
        assert!(OutlierPolicy::Iqr { multiplier: 0.0 }.validate().is_ok());
    }

    #[test]
    fn test_transform_round_trip() {
        let settings =
            OutlierSettings::new(DisplacementMetric::X, OutlierPolicy::mad()).with_log_transform(true);
        let v = settings.transform(12.5);
        assert!((settings.untransform(v) - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_iqr_rule_is_strict() {
        let stats = PolicyStatistics::Iqr {
            q1: 1.0,
            q3: 3.0,
            iqr: 2.0,
            multiplier: 1.5,
        };
        assert!(!stats.is_outlier(6.0));
        assert!(stats.is_outlier(6.0 + 1e-9));
        assert!(!stats.is_outlier(-2.0));
        assert!(stats.is_outlier(-2.0 - 1e-9));
        assert!(!stats.is_outlier(f64::NAN));
    }
}
