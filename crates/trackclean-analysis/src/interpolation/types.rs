//! Core types for gap interpolation.

use serde::Serialize;

use trackclean_core::config::InterpolationConfig;
use trackclean_core::constants::{DEFAULT_MAX_GAP, MAX_POLYNOMIAL_DEGREE};
use trackclean_core::errors::ConfigError;
use trackclean_core::types::{BTreeMap, SmallVec2};

use crate::columns::ChannelKind;
use crate::displacement::DisplacementMetric;
use crate::warnings::CleaningWarning;

/// Gap-filling method. Every method except `Linear` works over frame
/// numbers, so rows dropped by preprocessing keep their true spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum InterpolationMethod {
    /// Previous valid value.
    Zero,
    /// Straight line over row positions.
    Linear,
    /// Straight line over frame numbers.
    Time,
    /// Nearest valid sample, ties to the earlier one.
    Nearest,
    /// First-order spline over frame numbers.
    Slinear,
    /// Local three-point polynomial around the gap.
    Quadratic,
    /// Natural cubic spline through every valid sample.
    Cubic,
    /// Shape-preserving piecewise cubic Hermite (PCHIP).
    Spline,
    /// Local `degree + 1` point polynomial around the gap.
    Polynomial { degree: u32 },
}

impl InterpolationMethod {
    pub const EXPECTED: &'static str =
        "zero, linear, time, nearest, slinear, quadratic, cubic, spline, polynomial";

    pub fn name(&self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::Linear => "linear",
            Self::Time => "time",
            Self::Nearest => "nearest",
            Self::Slinear => "slinear",
            Self::Quadratic => "quadratic",
            Self::Cubic => "cubic",
            Self::Spline => "spline",
            Self::Polynomial { .. } => "polynomial",
        }
    }

    /// Valid samples the method needs before it falls back to `Linear`.
    pub fn min_samples(&self) -> usize {
        match *self {
            Self::Zero | Self::Linear | Self::Time | Self::Nearest | Self::Slinear => 2,
            Self::Quadratic => 3,
            Self::Cubic | Self::Spline => 4,
            Self::Polynomial { degree } => 4.max(degree as usize + 1),
        }
    }

    /// Whether the method measures distance in frame numbers rather than rows.
    pub fn uses_frame_axis(&self) -> bool {
        !matches!(self, Self::Linear)
    }

    /// Parse a configured method. `degree` is required for "polynomial" only.
    pub fn parse(field: &str, name: &str, degree: Option<u32>) -> Result<Self, ConfigError> {
        let method = match name {
            "zero" => Self::Zero,
            "linear" => Self::Linear,
            "time" => Self::Time,
            "nearest" => Self::Nearest,
            "slinear" => Self::Slinear,
            "quadratic" => Self::Quadratic,
            "cubic" => Self::Cubic,
            "spline" => Self::Spline,
            "polynomial" => Self::Polynomial {
                degree: degree.ok_or_else(|| ConfigError::MissingParameter {
                    field: format!("{field}.degree"),
                })?,
            },
            other => {
                return Err(ConfigError::UnknownVariant {
                    field: format!("{field}.method"),
                    value: other.to_string(),
                    expected: Self::EXPECTED,
                })
            }
        };
        method.validate(field)?;
        Ok(method)
    }

    pub fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if let Self::Polynomial { degree } = *self {
            if !(1..=MAX_POLYNOMIAL_DEGREE).contains(&degree) {
                return Err(ConfigError::ValidationFailed {
                    field: format!("{field}.degree"),
                    message: format!("must be within 1..={MAX_POLYNOMIAL_DEGREE}, got {degree}"),
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Polynomial { degree } => write!(f, "polynomial({degree})"),
            other => f.write_str(other.name()),
        }
    }
}

/// Method and run-length limit for one bodypart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GapFillSpec {
    pub method: InterpolationMethod,
    /// Longest run of missing frames that is filled; at least 1.
    pub max_gap: usize,
}

impl GapFillSpec {
    pub fn new(method: InterpolationMethod, max_gap: usize) -> Self {
        Self { method, max_gap }
    }

    pub fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if self.max_gap == 0 {
            return Err(ConfigError::ValidationFailed {
                field: format!("{field}.max_gap"),
                message: "must be greater than 0".to_string(),
            });
        }
        self.method.validate(field)
    }
}

impl Default for GapFillSpec {
    fn default() -> Self {
        Self::new(InterpolationMethod::Linear, DEFAULT_MAX_GAP)
    }
}

/// Global default plus per-bodypart overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InterpolationSettings {
    pub default: Option<GapFillSpec>,
    pub bodyparts: BTreeMap<String, GapFillSpec>,
}

impl InterpolationSettings {
    pub fn all(spec: GapFillSpec) -> Self {
        Self {
            default: Some(spec),
            bodyparts: BTreeMap::new(),
        }
    }

    pub fn with_override(mut self, bodypart: impl Into<String>, spec: GapFillSpec) -> Self {
        self.bodyparts.insert(bodypart.into(), spec);
        self
    }

    pub fn resolve(&self, bodypart: &str) -> Option<GapFillSpec> {
        self.bodyparts.get(bodypart).copied().or(self.default)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(spec) = &self.default {
            spec.validate("interpolation")?;
        }
        for (bodypart, spec) in &self.bodyparts {
            spec.validate(&format!("interpolation.bodyparts.{bodypart}"))?;
        }
        Ok(())
    }

    /// Typed settings from config. `Ok(None)` when the stage is not configured.
    ///
    /// Override fields left unset inherit the global values.
    pub fn from_config(config: &InterpolationConfig) -> Result<Option<Self>, ConfigError> {
        config.validate()?;
        if !config.is_configured() {
            return Ok(None);
        }
        let default = GapFillSpec::new(
            InterpolationMethod::parse("interpolation", config.effective_method(), config.degree)?,
            config.effective_max_gap(),
        );
        let mut bodyparts = BTreeMap::new();
        for (bodypart, o) in &config.bodyparts {
            let field = format!("interpolation.bodyparts.{bodypart}");
            let method = o.method.as_deref().unwrap_or(config.effective_method());
            let degree = o.degree.or(config.degree);
            let spec = GapFillSpec::new(
                InterpolationMethod::parse(&field, method, degree)?,
                o.max_gap.unwrap_or(default.max_gap),
            );
            bodyparts.insert(bodypart.clone(), spec);
        }
        let settings = Self {
            default: Some(default),
            bodyparts,
        };
        settings.validate()?;
        Ok(Some(settings))
    }
}

/// Revert interpolated frames that moved implausibly far from their predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplacementCeiling {
    pub metric: DisplacementMetric,
    pub max_displacement: f64,
}

impl DisplacementCeiling {
    pub fn new(metric: DisplacementMetric, max_displacement: f64) -> Self {
        Self {
            metric,
            max_displacement,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_displacement.is_finite() && self.max_displacement > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::ValidationFailed {
                field: "interpolation.displacement_ceiling".to_string(),
                message: format!("must be a positive number, got {}", self.max_displacement),
            })
        }
    }

    pub fn from_config(config: &InterpolationConfig) -> Result<Option<Self>, ConfigError> {
        let Some(max_displacement) = config.displacement_ceiling else {
            return Ok(None);
        };
        let metric = match config.ceiling_metric.as_deref() {
            Some(name) => DisplacementMetric::parse("interpolation.ceiling_metric", name)?,
            None => DisplacementMetric::default(),
        };
        let ceiling = Self::new(metric, max_displacement);
        ceiling.validate()?;
        Ok(Some(ceiling))
    }
}

/// Outcome for one coordinate channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelInterpolation {
    pub channel: ChannelKind,
    pub requested: InterpolationMethod,
    pub applied: InterpolationMethod,
    pub fell_back: bool,
    pub valid_samples: usize,
    pub missing_before: usize,
    pub missing_after: usize,
    pub filled: usize,
    /// Runs longer than `max_gap`, left missing.
    pub runs_left_open: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodypartInterpolation {
    pub bodypart: String,
    pub spec: GapFillSpec,
    /// x then y.
    pub channels: SmallVec2<ChannelInterpolation>,
    /// Frames nulled again because only one of x/y could be filled.
    pub unpaired_reverted: usize,
    /// Frames nulled again by the displacement ceiling.
    pub ceiling_reverted: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InterpolationReport {
    pub bodyparts: Vec<BodypartInterpolation>,
    pub warnings: Vec<CleaningWarning>,
}

impl InterpolationReport {
    pub fn get(&self, bodypart: &str) -> Option<&BodypartInterpolation> {
        self.bodyparts.iter().find(|b| b.bodypart == bodypart)
    }

    pub fn total_filled(&self) -> usize {
        self.bodyparts
            .iter()
            .flat_map(|b| b.channels.iter())
            .map(|c| c.filled)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackclean_core::config::InterpolationOverride;

    #[test]
    fn test_min_samples() {
        assert_eq!(InterpolationMethod::Linear.min_samples(), 2);
        assert_eq!(InterpolationMethod::Quadratic.min_samples(), 3);
        assert_eq!(InterpolationMethod::Spline.min_samples(), 4);
        assert_eq!(InterpolationMethod::Polynomial { degree: 2 }.min_samples(), 4);
        assert_eq!(InterpolationMethod::Polynomial { degree: 7 }.min_samples(), 8);
    }

    #[test]
    fn test_parse_polynomial_requires_degree() {
        assert!(matches!(
            InterpolationMethod::parse("interpolation", "polynomial", None),
            Err(ConfigError::MissingParameter { .. })
        ));
        assert!(matches!(
            InterpolationMethod::parse("interpolation", "polynomial", Some(11)),
            Err(ConfigError::ValidationFailed { .. })
        ));
        assert_eq!(
            InterpolationMethod::parse("interpolation", "polynomial", Some(3)).unwrap(),
            InterpolationMethod::Polynomial { degree: 3 }
        );
    }

    #[test]
    fn test_parse_unknown_method() {
        assert!(matches!(
            InterpolationMethod::parse("interpolation", "akima", None),
            Err(ConfigError::UnknownVariant { .. })
        ));
    }

    #[test]
    fn test_zero_max_gap_rejected() {
        let spec = GapFillSpec::new(InterpolationMethod::Linear, 0);
        assert!(InterpolationSettings::all(spec).validate().is_err());
    }

    #[test]
    fn test_from_config_inherits_globals() {
        let mut config = InterpolationConfig {
            method: Some("cubic".into()),
            max_gap: Some(8),
            ..Default::default()
        };
        config.bodyparts.insert(
            "tail".into(),
            InterpolationOverride {
                method: Some("nearest".into()),
                degree: None,
                max_gap: None,
            },
        );
        let settings = InterpolationSettings::from_config(&config).unwrap().unwrap();
        assert_eq!(
            settings.resolve("snout"),
            Some(GapFillSpec::new(InterpolationMethod::Cubic, 8))
        );
        assert_eq!(
            settings.resolve("tail"),
            Some(GapFillSpec::new(InterpolationMethod::Nearest, 8))
        );
    }

    #[test]
    fn test_ceiling_from_config() {
        let config = InterpolationConfig {
            displacement_ceiling: Some(25.0),
            ceiling_metric: Some("y".into()),
            ..Default::default()
        };
        assert_eq!(
            DisplacementCeiling::from_config(&config).unwrap(),
            Some(DisplacementCeiling::new(DisplacementMetric::Y, 25.0))
        );
        assert!(DisplacementCeiling::new(DisplacementMetric::X, 0.0).validate().is_err());
    }
}
