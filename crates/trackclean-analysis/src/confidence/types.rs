//! Core types for the confidence filter.

use serde::Serialize;

use trackclean_core::config::ConfidenceConfig;
use trackclean_core::errors::ConfigError;
use trackclean_core::types::BTreeMap;

use crate::warnings::CleaningWarning;

/// How the confidence threshold of a bodypart is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum ThresholdSpec {
    /// Remove frames with confidence below this value, in [0, 1].
    Fixed(f64),
    /// Remove frames below the p-th percentile, p in [0, 100].
    Percentile(f64),
}

impl ThresholdSpec {
    pub fn validate(&self, field: &str) -> Result<(), ConfigError> {
        match *self {
            Self::Fixed(t) if !(0.0..=1.0).contains(&t) => Err(ConfigError::ValidationFailed {
                field: format!("{field}.threshold"),
                message: format!("must be within [0, 1], got {t}"),
            }),
            Self::Percentile(p) if !(0.0..=100.0).contains(&p) => {
                Err(ConfigError::ValidationFailed {
                    field: format!("{field}.percentile"),
                    message: format!("must be within [0, 100], got {p}"),
                })
            }
            _ => Ok(()),
        }
    }

    fn from_pair(threshold: Option<f64>, percentile: Option<f64>) -> Option<Self> {
        threshold
            .map(Self::Fixed)
            .or_else(|| percentile.map(Self::Percentile))
    }
}

/// Where percentile thresholds take their sample from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdScope {
    /// Each bodypart's own confidence values.
    #[default]
    PerBodypart,
    /// The confidence values of every bodypart using the default spec.
    Pooled,
}

impl ThresholdScope {
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

/// Global default plus per-bodypart overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfidenceSettings {
    pub default: Option<ThresholdSpec>,
    pub bodyparts: BTreeMap<String, ThresholdSpec>,
    pub scope: ThresholdScope,
}

impl ConfidenceSettings {
    pub fn fixed(threshold: f64) -> Self {
        Self {
            default: Some(ThresholdSpec::Fixed(threshold)),
            ..Default::default()
        }
    }

    pub fn percentile(percentile: f64) -> Self {
        Self {
            default: Some(ThresholdSpec::Percentile(percentile)),
            ..Default::default()
        }
    }

    pub fn with_override(mut self, bodypart: impl Into<String>, spec: ThresholdSpec) -> Self {
        self.bodyparts.insert(bodypart.into(), spec);
        self
    }

    pub fn with_scope(mut self, scope: ThresholdScope) -> Self {
        self.scope = scope;
        self
    }

    /// Override first, then the global default.
    pub fn resolve(&self, bodypart: &str) -> Option<ThresholdSpec> {
        self.bodyparts.get(bodypart).copied().or(self.default)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(spec) = &self.default {
            spec.validate("confidence")?;
        }
        for (bodypart, spec) in &self.bodyparts {
            spec.validate(&format!("confidence.bodyparts.{bodypart}"))?;
        }
        Ok(())
    }

    /// Typed settings from config. `Ok(None)` when nothing is configured.
    pub fn from_config(config: &ConfidenceConfig) -> Result<Option<Self>, ConfigError> {
        config.validate()?;
        if !config.is_configured() {
            return Ok(None);
        }
        let scope = match config.scope.as_deref() {
            Some(name) => ThresholdScope::parse("confidence.scope", name)?,
            None => ThresholdScope::default(),
        };
        let bodyparts = config
            .bodyparts
            .iter()
            .filter_map(|(bp, o)| ThresholdSpec::from_pair(o.threshold, o.percentile).map(|s| (bp.clone(), s)))
            .collect();
        let settings = Self {
            default: ThresholdSpec::from_pair(config.threshold, config.percentile),
            bodyparts,
            scope,
        };
        settings.validate()?;
        Ok(Some(settings))
    }
}

/// Filter outcome for one bodypart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodypartConfidence {
    pub bodypart: String,
    pub spec: ThresholdSpec,
    /// `None` when a percentile had no valid confidence values to come from.
    pub effective_threshold: Option<f64>,
    /// Frames whose confidence is below the threshold.
    pub frames_removed: usize,
    /// Removed frames that still had a coordinate before this stage.
    pub frames_newly_nulled: usize,
    pub total_frames: usize,
}

impl BodypartConfidence {
    pub fn percent_removed(&self) -> f64 {
        if self.total_frames == 0 {
            0.0
        } else {
            100.0 * self.frames_removed as f64 / self.total_frames as f64
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfidenceReport {
    pub bodyparts: Vec<BodypartConfidence>,
    /// Shared percentile threshold under pooled scope.
    pub pooled_threshold: Option<f64>,
    pub warnings: Vec<CleaningWarning>,
}

impl ConfidenceReport {
    pub fn get(&self, bodypart: &str) -> Option<&BodypartConfidence> {
        self.bodyparts.iter().find(|b| b.bodypart == bodypart)
    }

    pub fn total_removed(&self) -> usize {
        self.bodyparts.iter().map(|b| b.frames_removed).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackclean_core::config::ConfidenceOverride;

    #[test]
    fn test_resolve_prefers_override() {
        let settings = ConfidenceSettings::fixed(0.6).with_override("tail", ThresholdSpec::Percentile(10.0));
        assert_eq!(settings.resolve("tail"), Some(ThresholdSpec::Percentile(10.0)));
        assert_eq!(settings.resolve("snout"), Some(ThresholdSpec::Fixed(0.6)));
        assert_eq!(ConfidenceSettings::default().resolve("snout"), None);
    }

    #[test]
    fn test_validate_ranges() {
        assert!(ConfidenceSettings::fixed(1.2).validate().is_err());
        assert!(ConfidenceSettings::percentile(-1.0).validate().is_err());
        assert!(ConfidenceSettings::fixed(0.0).validate().is_ok());
        assert!(ConfidenceSettings::percentile(100.0).validate().is_ok());
    }

    #[test]
    fn test_from_config() {
        let mut config = ConfidenceConfig {
            percentile: Some(5.0),
            scope: Some("pooled".into()),
            ..Default::default()
        };
        config.bodyparts.insert(
            "tail".into(),
            ConfidenceOverride {
                threshold: Some(0.3),
                percentile: None,
            },
        );
        let settings = ConfidenceSettings::from_config(&config).unwrap().unwrap();
        assert_eq!(settings.default, Some(ThresholdSpec::Percentile(5.0)));
        assert_eq!(settings.scope, ThresholdScope::Pooled);
        assert_eq!(settings.resolve("tail"), Some(ThresholdSpec::Fixed(0.3)));
    }

    #[test]
    fn test_from_config_unconfigured() {
        assert_eq!(ConfidenceSettings::from_config(&ConfidenceConfig::default()).unwrap(), None);
    }

    #[test]
    fn test_unknown_scope() {
        let config = ConfidenceConfig {
            threshold: Some(0.5),
            scope: Some("global".into()),
            ..Default::default()
        };
        assert!(matches!(
            ConfidenceSettings::from_config(&config),
            Err(ConfigError::UnknownVariant { .. })
        ));
    }
}
