//! Optional clean-up before filtering: bodypart exclusion, y inversion and
//! handling of corrupted (all-zero) frames.

use serde::Serialize;
use tracing::{info, instrument, warn};

use trackclean_core::config::PreprocessConfig;
use trackclean_core::errors::ConfigError;
use trackclean_core::types::FxHashSet;

use crate::columns::BodypartChannel;
use crate::table::FrameTable;
use crate::warnings::CleaningWarning;

/// What to do with a frame whose every x and y is exactly zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroFrameAction {
    #[default]
    Keep,
    /// Remove the row; remaining rows keep their frame numbers.
    Drop,
    /// Null every x and y of the row.
    MarkMissing,
}

impl ZeroFrameAction {
    pub const EXPECTED: &'static str = "keep, drop, mark_missing";

    pub fn parse(field: &str, value: &str) -> Result<Self, ConfigError> {
        match value {
            "keep" => Ok(Self::Keep),
            "drop" => Ok(Self::Drop),
            "mark_missing" => Ok(Self::MarkMissing),
            other => Err(ConfigError::UnknownVariant {
                field: field.to_string(),
                value: other.to_string(),
                expected: Self::EXPECTED,
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreprocessSettings {
    pub exclude_bodyparts: Vec<String>,
    pub invert_y: bool,
    pub zero_frames: ZeroFrameAction,
}

impl PreprocessSettings {
    pub fn from_config(config: &PreprocessConfig) -> Result<Option<Self>, ConfigError> {
        if !config.is_configured() {
            return Ok(None);
        }
        let zero_frames = match config.zero_frames.as_deref() {
            Some(name) => ZeroFrameAction::parse("preprocess.zero_frames", name)?,
            None => ZeroFrameAction::default(),
        };
        Ok(Some(Self {
            exclude_bodyparts: config.exclude_bodyparts.clone(),
            invert_y: config.invert_y.unwrap_or(false),
            zero_frames,
        }))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreprocessReport {
    pub excluded_bodyparts: Vec<String>,
    pub dropped_columns: Vec<String>,
    pub inverted_columns: Vec<String>,
    /// Rows where every recognized coordinate was exactly zero.
    pub zero_frames: usize,
    pub zero_frame_action: ZeroFrameAction,
    pub warnings: Vec<CleaningWarning>,
}

#[instrument(skip_all, fields(rows = table.len()))]
pub fn preprocess(mut table: FrameTable, settings: &PreprocessSettings) -> (FrameTable, PreprocessReport) {
    let mut report = PreprocessReport {
        zero_frame_action: settings.zero_frames,
        ..Default::default()
    };

    // Corruption is judged on the table as recorded, before any bodypart is excluded.
    let zero_rows = zero_coordinate_rows(&table);
    report.zero_frames = zero_rows.iter().filter(|&&z| z).count();

    let excluded: FxHashSet<&str> = settings.exclude_bodyparts.iter().map(String::as_str).collect();
    for bodypart in &settings.exclude_bodyparts {
        if table.model().contains(bodypart) {
            report.excluded_bodyparts.push(bodypart.clone());
        } else {
            warn!(bodypart = %bodypart, "excluded bodypart not in table");
            report.warnings.push(CleaningWarning::UnknownBodypart {
                stage: "preprocess",
                bodypart: bodypart.clone(),
            });
        }
    }
    // Every suffixed column of an excluded bodypart goes, shadowed ones included.
    let dropped: Vec<String> = table
        .column_names()
        .iter()
        .filter(|name| {
            BodypartChannel::parse(name).is_some_and(|c| excluded.contains(c.bodypart.as_str()))
        })
        .cloned()
        .collect();
    table.drop_columns(&dropped);
    report.dropped_columns = dropped;

    let model = table.shared_model();

    if settings.invert_y {
        for bp in model.bodyparts() {
            for v in table.column_at_mut(bp.y) {
                *v = -*v;
            }
            report.inverted_columns.push(table.column_names()[bp.y].clone());
        }
    }

    if report.zero_frames > 0 {
        match settings.zero_frames {
            ZeroFrameAction::Keep => {}
            ZeroFrameAction::Drop => {
                let keep: Vec<bool> = zero_rows.iter().map(|z| !z).collect();
                table.retain_rows(&keep);
            }
            ZeroFrameAction::MarkMissing => {
                for bp in model.bodyparts() {
                    table.null_coordinates(bp, &zero_rows);
                }
            }
        }
    }

    info!(
        excluded = report.excluded_bodyparts.len(),
        inverted = report.inverted_columns.len(),
        zero_frames = report.zero_frames,
        "preprocess complete"
    );
    (table, report)
}

/// Rows where every recognized x and y value is exactly zero.
fn zero_coordinate_rows(table: &FrameTable) -> Vec<bool> {
    let bodyparts = table.model().bodyparts();
    (0..table.len())
        .map(|row| {
            !bodyparts.is_empty()
                && bodyparts
                    .iter()
                    .all(|bp| table.column_at(bp.x)[row] == 0.0 && table.column_at(bp.y)[row] == 0.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FrameTable {
        FrameTable::new(vec![
            ("a_x".to_string(), vec![0.0, 1.0, 0.0]),
            ("a_y".to_string(), vec![0.0, 2.0, 0.0]),
            ("a_likelihood".to_string(), vec![0.1, 0.9, 0.8]),
            ("b_x".to_string(), vec![0.0, 3.0, 5.0]),
            ("b_y".to_string(), vec![0.0, 4.0, 0.0]),
            ("b_likelihood".to_string(), vec![0.2, 0.9, 0.7]),
        ])
        .unwrap()
    }

    #[test]
    fn test_exclude_drops_all_columns() {
        let settings = PreprocessSettings {
            exclude_bodyparts: vec!["b".into()],
            ..Default::default()
        };
        let (t, report) = preprocess(sample(), &settings);
        assert_eq!(t.column_names(), &["a_x", "a_y", "a_likelihood"]);
        assert_eq!(report.dropped_columns.len(), 3);
    }

    #[test]
    fn test_exclude_unknown_warns() {
        let settings = PreprocessSettings {
            exclude_bodyparts: vec!["tail".into()],
            ..Default::default()
        };
        let (t, report) = preprocess(sample(), &settings);
        assert_eq!(t.column_names().len(), 6);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_invert_y() {
        let settings = PreprocessSettings {
            invert_y: true,
            ..Default::default()
        };
        let (t, report) = preprocess(sample(), &settings);
        assert_eq!(t.column("a_y").unwrap()[1], -2.0);
        assert_eq!(t.column("a_x").unwrap()[1], 1.0);
        assert_eq!(report.inverted_columns, vec!["a_y", "b_y"]);
    }

    #[test]
    fn test_zero_frames_dropped_keep_frame_numbers() {
        let settings = PreprocessSettings {
            zero_frames: ZeroFrameAction::Drop,
            ..Default::default()
        };
        let (t, report) = preprocess(sample(), &settings);
        assert_eq!(report.zero_frames, 1);
        assert_eq!(t.frames(), &[1, 2]);
    }

    #[test]
    fn test_zero_frames_marked_missing() {
        let settings = PreprocessSettings {
            zero_frames: ZeroFrameAction::MarkMissing,
            ..Default::default()
        };
        let (t, _) = preprocess(sample(), &settings);
        assert!(t.column("a_x").unwrap()[0].is_nan());
        assert!(t.column("b_y").unwrap()[0].is_nan());
        assert_eq!(t.column("a_likelihood").unwrap()[0], 0.1);
        assert_eq!(t.column("a_x").unwrap()[2], 0.0);
    }

    #[test]
    fn test_excluded_bodypart_still_counts_against_zero_frames() {
        // Row 2 is all zero for `a` only; `b` moves, so the frame is kept.
        let settings = PreprocessSettings {
            exclude_bodyparts: vec!["b".into()],
            zero_frames: ZeroFrameAction::Drop,
            ..Default::default()
        };
        let (t, report) = preprocess(sample(), &settings);
        assert_eq!(report.zero_frames, 1);
        assert_eq!(t.frames(), &[1, 2]);
        assert_eq!(t.column("a_x").unwrap(), &[1.0, 0.0]);
    }

    #[test]
    fn test_unknown_zero_frame_action() {
        let config = PreprocessConfig {
            zero_frames: Some("delete".into()),
            ..Default::default()
        };
        assert!(PreprocessSettings::from_config(&config).is_err());
    }
}
