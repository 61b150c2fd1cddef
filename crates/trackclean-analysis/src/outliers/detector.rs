//! Per-bodypart displacement outlier detection over a whole table.

use tracing::{debug, info, instrument, warn};

use trackclean_core::errors::ConfigError;

use super::types::{BodypartOutliers, OutlierDetection, OutlierPolicy, OutlierSettings, PolicyStatistics, StatisticScope};
use super::{adjusted_iqr, fixed, iqr, mad, percentile, zscore};
use crate::displacement::displacement;
use crate::stats::sorted_valid;
use crate::table::FrameTable;
use crate::warnings::CleaningWarning;

/// Validated outlier settings bound to the policy functions.
#[derive(Debug, Clone)]
pub struct OutlierDetector {
    settings: OutlierSettings,
}

impl OutlierDetector {
    pub fn new(settings: OutlierSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &OutlierSettings {
        &self.settings
    }

    /// Dispatch to the policy function. `sorted` is ascending and NaN-free.
    pub fn statistics(&self, sorted: &[f64]) -> Option<PolicyStatistics> {
        match self.settings.policy {
            OutlierPolicy::Fixed { threshold } => fixed::statistics(sorted, threshold),
            OutlierPolicy::Mad { cutoff } => mad::statistics(sorted, cutoff),
            OutlierPolicy::Std { cutoff } => zscore::statistics(sorted, cutoff),
            OutlierPolicy::Iqr { multiplier } => iqr::statistics(sorted, multiplier),
            OutlierPolicy::AdjustedIqr { multiplier } => {
                adjusted_iqr::statistics(sorted, multiplier)
            }
            OutlierPolicy::Percentile { percentile: p } => percentile::statistics(sorted, p),
        }
    }

    /// Displacement series in statistic space. Frame 0 keeps its zero
    /// placeholder and is transformed like every other frame.
    fn series(&self, x: &[f64], y: &[f64]) -> Vec<f64> {
        let mut d = displacement(x, y, self.settings.metric);
        for v in d.iter_mut() {
            *v = self.settings.transform(*v);
        }
        d
    }

    pub fn detect(&self, table: &FrameTable) -> OutlierDetection {
        let model = table.model();
        let series: Vec<(&str, Vec<f64>)> = model
            .bodyparts()
            .iter()
            .map(|bp| {
                let d = self.series(table.column_at(bp.x), table.column_at(bp.y));
                (bp.bodypart.as_str(), d)
            })
            .collect();

        let pooled_statistics = match self.settings.scope {
            StatisticScope::PerBodypart => None,
            StatisticScope::Pooled => {
                let all: Vec<f64> = series
                    .iter()
                    .flat_map(|(_, d)| d.iter().copied())
                    .collect();
                let stats = self.statistics(&sorted_valid(&all));
                debug!(pooled = ?stats, "pooled displacement statistics");
                stats
            }
        };

        let mut warnings = Vec::new();
        let mut bodyparts = Vec::with_capacity(series.len());

        for (bodypart, d) in series {
            // The frame 0 placeholder is part of the sample but does not make
            // a track with no real displacement worth judging.
            let has_motion = d.iter().skip(1).any(|v| !v.is_nan());
            let sorted = sorted_valid(&d);
            let statistics = if !has_motion {
                warn!(bodypart, "no valid displacement values, nothing flagged");
                warnings.push(CleaningWarning::NoValidDisplacements {
                    bodypart: bodypart.to_string(),
                });
                None
            } else {
                match self.settings.scope {
                    StatisticScope::PerBodypart => self.statistics(&sorted),
                    StatisticScope::Pooled => pooled_statistics,
                }
            };

            let mut mask = vec![false; d.len()];
            if let Some(stats) = &statistics {
                for (i, &v) in d.iter().enumerate().skip(1) {
                    mask[i] = stats.is_outlier(v);
                }
            }
            let flagged_rows: Vec<usize> = (0..mask.len()).filter(|&i| mask[i]).collect();

            let transformed = statistics.map(|s| s.fences());
            let fences = transformed.map(|f| f.map(|v| self.settings.untransform(v)));

            debug!(
                bodypart,
                valid = sorted.len(),
                flagged = flagged_rows.len(),
                "outlier detection"
            );

            bodyparts.push(BodypartOutliers {
                bodypart: bodypart.to_string(),
                mask,
                flagged_rows,
                valid_displacements: sorted.len(),
                statistics,
                fences,
                transformed_fences: if self.settings.log_transform {
                    transformed
                } else {
                    None
                },
            });
        }

        OutlierDetection {
            settings: self.settings.clone(),
            pooled_statistics,
            bodyparts,
            warnings,
        }
    }
}

/// Compute per-bodypart outlier masks and the statistics behind them.
#[instrument(skip_all, fields(policy = %settings.policy, metric = %settings.metric))]
pub fn detect_position_outliers(
    table: &FrameTable,
    settings: &OutlierSettings,
) -> Result<OutlierDetection, ConfigError> {
    let detector = OutlierDetector::new(settings.clone())?;
    let detection = detector.detect(table);
    info!(
        bodyparts = detection.bodyparts.len(),
        flagged = detection.total_flagged(),
        "outlier detection complete"
    );
    Ok(detection)
}

/// Null x and y of every flagged frame. Confidence columns are untouched.
pub fn apply_outlier_mask(mut table: FrameTable, detection: &OutlierDetection) -> FrameTable {
    let model = table.shared_model();
    for outliers in &detection.bodyparts {
        let Some(columns) = model.get(&outliers.bodypart) else {
            warn!(bodypart = %outliers.bodypart, "bodypart not in table, mask ignored");
            continue;
        };
        if outliers.mask.len() != table.len() {
            warn!(
                bodypart = %outliers.bodypart,
                mask = outliers.mask.len(),
                rows = table.len(),
                "mask length does not match table, mask ignored"
            );
            continue;
        }
        table.null_coordinates(columns, &outliers.mask);
    }
    table
}

/// Detect and apply in one step.
pub fn filter_position_outliers(
    table: FrameTable,
    settings: &OutlierSettings,
) -> Result<(FrameTable, OutlierDetection), ConfigError> {
    let detection = detect_position_outliers(&table, settings)?;
    let table = apply_outlier_mask(table, &detection);
    Ok((table, detection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::displacement::DisplacementMetric;

    fn table(x: &[f64], y: &[f64]) -> FrameTable {
        FrameTable::new(vec![
            ("part1_x".to_string(), x.to_vec()),
            ("part1_y".to_string(), y.to_vec()),
            ("part1_likelihood".to_string(), vec![0.9; x.len()]),
        ])
        .unwrap()
    }

    #[test]
    fn test_fixed_threshold_scenario() {
        let t = table(&[10.0, 12.0, 20.0], &[20.0, 24.0, 30.0]);
        let settings = OutlierSettings::new(
            DisplacementMetric::Euclidean,
            OutlierPolicy::Fixed { threshold: 5.0 },
        );
        let (cleaned, detection) = filter_position_outliers(t, &settings).unwrap();
        assert_eq!(detection.get("part1").unwrap().flagged_rows, vec![2]);
        let x = cleaned.column("part1_x").unwrap();
        assert_eq!(&x[..2], &[10.0, 12.0]);
        assert!(x[2].is_nan());
        assert!(cleaned.column("part1_y").unwrap()[2].is_nan());
        assert_eq!(cleaned.column("part1_likelihood").unwrap()[2], 0.9);
    }

    #[test]
    fn test_frame_zero_never_flagged() {
        let t = table(&[1000.0, 0.0, 0.0, 0.0], &[0.0; 4]);
        let settings = OutlierSettings::new(
            DisplacementMetric::X,
            OutlierPolicy::Fixed { threshold: 1.0 },
        );
        let detection = detect_position_outliers(&t, &settings).unwrap();
        let mask = &detection.get("part1").unwrap().mask;
        assert!(!mask[0]);
        assert!(mask[1]);
    }

    #[test]
    fn test_all_missing_is_noop_with_warning() {
        let nan = f64::NAN;
        let t = table(&[nan, nan, nan], &[nan, nan, nan]);
        let settings = OutlierSettings::new(DisplacementMetric::Euclidean, OutlierPolicy::mad());
        let detection = detect_position_outliers(&t, &settings).unwrap();
        let part = detection.get("part1").unwrap();
        assert!(part.statistics.is_none());
        assert!(part.mask.iter().all(|m| !m));
        assert_eq!(detection.warnings.len(), 1);
    }

    #[test]
    fn test_log_transform_reports_both_fence_spaces() {
        let x: Vec<f64> = (0..30).map(|i| i as f64 * 1.5 + (i % 3) as f64).collect();
        let t = table(&x, &vec![0.0; 30]);
        let settings = OutlierSettings::new(DisplacementMetric::X, OutlierPolicy::iqr())
            .with_log_transform(true);
        let detection = detect_position_outliers(&t, &settings).unwrap();
        let part = detection.get("part1").unwrap();
        let raw = part.fences.unwrap().upper.unwrap();
        let log = part.transformed_fences.unwrap().upper.unwrap();
        assert!((raw - (log.exp() - 1e-8)).abs() < 1e-9);
    }

    #[test]
    fn test_pooled_scope_shares_statistics() {
        let t = FrameTable::new(vec![
            ("a_x".to_string(), vec![0.0, 1.0, 2.0, 3.0, 4.0]),
            ("a_y".to_string(), vec![0.0; 5]),
            ("b_x".to_string(), vec![0.0, 3.0, 6.0, 9.0, 12.0]),
            ("b_y".to_string(), vec![0.0; 5]),
        ])
        .unwrap();
        let settings = OutlierSettings::new(
            DisplacementMetric::X,
            OutlierPolicy::Percentile { percentile: 50.0 },
        )
        .with_scope(StatisticScope::Pooled);
        let detection = detect_position_outliers(&t, &settings).unwrap();
        assert_eq!(
            detection.pooled_statistics,
            Some(PolicyStatistics::Percentile {
                percentile: 50.0,
                cutoff: 1.0
            })
        );
        assert_eq!(detection.get("a").unwrap().flagged(), 0);
        assert_eq!(detection.get("b").unwrap().flagged(), 4);
    }

    #[test]
    fn test_frame_zero_placeholder_enters_quartiles() {
        // d = [0, 3, 3, 4, 4, 5, 5, 8]: Q1 = 3, Q3 = 5, upper fence 8.
        let t = table(&[0.0, 3.0, 6.0, 10.0, 14.0, 19.0, 24.0, 32.0], &[0.0; 8]);
        let settings = OutlierSettings::new(DisplacementMetric::X, OutlierPolicy::iqr());
        let detection = detect_position_outliers(&t, &settings).unwrap();
        let part = detection.get("part1").unwrap();
        match part.statistics {
            Some(PolicyStatistics::Iqr { q1, q3, .. }) => {
                assert_eq!((q1, q3), (3.0, 5.0));
            }
            other => panic!("unexpected statistics {other:?}"),
        }
        assert_eq!(part.fences.unwrap().upper, Some(8.0));
        assert!(part.flagged_rows.is_empty());
        assert_eq!(part.valid_displacements, 8);
    }

    #[test]
    fn test_invalid_settings_fail_before_detection() {
        let t = table(&[0.0, 1.0], &[0.0, 1.0]);
        let settings = OutlierSettings::new(
            DisplacementMetric::Euclidean,
            OutlierPolicy::Fixed { threshold: -1.0 },
        );
        assert!(detect_position_outliers(&t, &settings).is_err());
    }
}
