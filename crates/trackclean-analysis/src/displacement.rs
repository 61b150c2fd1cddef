//! Frame-to-frame displacement of a bodypart.

use serde::Serialize;

use trackclean_core::errors::ConfigError;

/// How displacement between consecutive frames is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplacementMetric {
    #[default]
    Euclidean,
    X,
    Y,
}

impl DisplacementMetric {
    pub const EXPECTED: &'static str = "euclidean, x, y";

    pub fn name(&self) -> &'static str {
        match self {
            Self::Euclidean => "euclidean",
            Self::X => "x",
            Self::Y => "y",
        }
    }

    /// Parse a configured metric name; `field` names the config key in errors.
    pub fn parse(field: &str, value: &str) -> Result<Self, ConfigError> {
        match value {
            "euclidean" => Ok(Self::Euclidean),
            "x" => Ok(Self::X),
            "y" => Ok(Self::Y),
            other => Err(ConfigError::UnknownVariant {
                field: field.to_string(),
                value: other.to_string(),
                expected: Self::EXPECTED,
            }),
        }
    }

    #[inline]
    fn between(&self, dx: f64, dy: f64) -> f64 {
        match self {
            Self::Euclidean => dx.hypot(dy),
            Self::X => dx.abs(),
            Self::Y => dy.abs(),
        }
    }
}

impl std::fmt::Display for DisplacementMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Displacement series, one value per frame.
///
/// `d[0]` is `0.0`. For `i ≥ 1`, `d[i]` compares row `i` with row `i − 1`
/// and is `NaN` when a coordinate the metric reads is missing in either row.
pub fn displacement(x: &[f64], y: &[f64], metric: DisplacementMetric) -> Vec<f64> {
    let n = x.len().min(y.len());
    let mut d = Vec::with_capacity(n);
    if n == 0 {
        return d;
    }
    d.push(0.0);
    for i in 1..n {
        d.push(metric.between(x[i] - x[i - 1], y[i] - y[i - 1]));
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean() {
        let d = displacement(&[0.0, 3.0, 3.0], &[0.0, 4.0, 4.0], DisplacementMetric::Euclidean);
        assert_eq!(d, vec![0.0, 5.0, 0.0]);
    }

    #[test]
    fn test_axis_metrics_use_absolute_difference() {
        let x = [5.0, 2.0];
        let y = [1.0, 7.0];
        assert_eq!(displacement(&x, &y, DisplacementMetric::X), vec![0.0, 3.0]);
        assert_eq!(displacement(&x, &y, DisplacementMetric::Y), vec![0.0, 6.0]);
    }

    #[test]
    fn test_missing_propagates() {
        let d = displacement(&[1.0, f64::NAN, 2.0], &[1.0, 1.0, 1.0], DisplacementMetric::Euclidean);
        assert_eq!(d[0], 0.0);
        assert!(d[1].is_nan());
        assert!(d[2].is_nan());
    }

    #[test]
    fn test_axis_metric_ignores_other_axis() {
        let d = displacement(&[1.0, 2.0], &[f64::NAN, f64::NAN], DisplacementMetric::X);
        assert_eq!(d, vec![0.0, 1.0]);
    }

    #[test]
    fn test_parse_unknown() {
        let err = DisplacementMetric::parse("outliers.metric", "manhattan").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownVariant { .. }));
        assert_eq!(DisplacementMetric::parse("m", "y").unwrap(), DisplacementMetric::Y);
    }
}
