//! Confidence filter over a whole table.

use tracing::{debug, info, instrument, warn};

use trackclean_core::errors::ConfigError;

use super::types::{BodypartConfidence, ConfidenceReport, ConfidenceSettings, ThresholdScope, ThresholdSpec};
use crate::stats::percentile;
use crate::table::FrameTable;
use crate::warnings::CleaningWarning;

/// Null x and y wherever confidence is strictly below the bodypart's threshold.
///
/// Confidence columns are never modified, so running the filter twice with
/// the same settings changes nothing the second time.
#[instrument(skip_all, fields(rows = table.len()))]
pub fn apply_confidence_filter(
    mut table: FrameTable,
    settings: &ConfidenceSettings,
) -> Result<(FrameTable, ConfidenceReport), ConfigError> {
    settings.validate()?;

    let model = table.shared_model();
    let mut report = ConfidenceReport::default();

    for bodypart in settings.bodyparts.keys() {
        if !model.contains(bodypart) {
            warn!(bodypart = %bodypart, "confidence override for unknown bodypart");
            report.warnings.push(CleaningWarning::UnknownBodypart {
                stage: "confidence",
                bodypart: bodypart.clone(),
            });
        }
    }

    if let (ThresholdScope::Pooled, Some(ThresholdSpec::Percentile(p))) = (settings.scope, settings.default) {
        let pooled: Vec<f64> = model
            .bodyparts()
            .iter()
            .filter(|bp| !settings.bodyparts.contains_key(&bp.bodypart))
            .filter_map(|bp| bp.confidence)
            .flat_map(|c| table.column_at(c).iter().copied())
            .collect();
        report.pooled_threshold = percentile(&pooled, p);
        debug!(percentile = p, threshold = ?report.pooled_threshold, "pooled confidence threshold");
    }

    for bp in model.bodyparts() {
        let Some(confidence) = bp.confidence else {
            warn!(bodypart = %bp.bodypart, "no confidence column, skipping");
            report.warnings.push(CleaningWarning::NoConfidenceColumn {
                bodypart: bp.bodypart.clone(),
            });
            continue;
        };
        let Some(spec) = settings.resolve(&bp.bodypart) else {
            warn!(bodypart = %bp.bodypart, "no confidence threshold configured, skipping");
            report.warnings.push(CleaningWarning::NoThresholdConfigured {
                bodypart: bp.bodypart.clone(),
            });
            continue;
        };

        let values = table.column_at(confidence);
        let uses_pooled = settings.scope == ThresholdScope::Pooled
            && !settings.bodyparts.contains_key(&bp.bodypart);
        let effective_threshold = match spec {
            ThresholdSpec::Fixed(t) => Some(t),
            ThresholdSpec::Percentile(_) if uses_pooled => report.pooled_threshold,
            ThresholdSpec::Percentile(p) => percentile(values, p),
        };

        let total_frames = values.len();
        let Some(threshold) = effective_threshold else {
            warn!(bodypart = %bp.bodypart, "no valid confidence values for percentile threshold");
            report.warnings.push(CleaningWarning::NoValidConfidence {
                bodypart: bp.bodypart.clone(),
            });
            report.bodyparts.push(BodypartConfidence {
                bodypart: bp.bodypart.clone(),
                spec,
                effective_threshold: None,
                frames_removed: 0,
                frames_newly_nulled: 0,
                total_frames,
            });
            continue;
        };

        let mask: Vec<bool> = values.iter().map(|&c| c < threshold).collect();
        let frames_removed = mask.iter().filter(|&&m| m).count();
        let frames_newly_nulled = table.null_coordinates(bp, &mask);

        debug!(
            bodypart = %bp.bodypart,
            threshold,
            removed = frames_removed,
            newly_nulled = frames_newly_nulled,
            "confidence filter"
        );

        report.bodyparts.push(BodypartConfidence {
            bodypart: bp.bodypart.clone(),
            spec,
            effective_threshold: Some(threshold),
            frames_removed,
            frames_newly_nulled,
            total_frames,
        });
    }

    info!(
        bodyparts = report.bodyparts.len(),
        removed = report.total_removed(),
        "confidence filter complete"
    );
    Ok((table, report))
}

/// One percentile threshold over the confidence values of many tables.
///
/// The caller applies the result as a [`ThresholdSpec::Fixed`] to every
/// table so one cutoff governs a whole batch.
pub fn pooled_percentile_threshold<'a>(
    tables: impl IntoIterator<Item = &'a FrameTable>,
    p: f64,
) -> Result<Option<f64>, ConfigError> {
    ThresholdSpec::Percentile(p).validate("confidence")?;
    let mut pooled = Vec::new();
    for table in tables {
        for bp in table.model().bodyparts() {
            if let Some(c) = bp.confidence {
                pooled.extend_from_slice(table.column_at(c));
            }
        }
    }
    Ok(percentile(&pooled, p))
}
