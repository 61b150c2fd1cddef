//! Gap filling over a whole table.

use tracing::{debug, info, instrument, warn};

use trackclean_core::errors::ConfigError;
use trackclean_core::types::SmallVec2;

use super::gaps::{missing_runs, RunKind};
use super::kernels::Interpolant;
use super::types::{
    BodypartInterpolation, ChannelInterpolation, DisplacementCeiling, GapFillSpec,
    InterpolationMethod, InterpolationReport, InterpolationSettings,
};
use crate::columns::ChannelKind;
use crate::displacement::displacement;
use crate::table::FrameTable;
use crate::warnings::CleaningWarning;

/// Fill short gaps in every bodypart's x and y columns.
///
/// After filling, a frame where only one of x/y ended up present is nulled
/// in both. With a `ceiling`, displacement is recomputed once on the filled
/// table and interpolated frames that jump further than the ceiling from
/// their predecessor are reverted to missing.
#[instrument(skip_all, fields(rows = table.len()))]
pub fn apply_interpolation(
    mut table: FrameTable,
    settings: &InterpolationSettings,
    ceiling: Option<&DisplacementCeiling>,
) -> Result<(FrameTable, InterpolationReport), ConfigError> {
    settings.validate()?;
    if let Some(c) = ceiling {
        c.validate()?;
    }

    let model = table.shared_model();
    let mut report = InterpolationReport::default();

    for bodypart in settings.bodyparts.keys() {
        if !model.contains(bodypart) {
            warn!(bodypart = %bodypart, "interpolation override for unknown bodypart");
            report.warnings.push(CleaningWarning::UnknownBodypart {
                stage: "interpolation",
                bodypart: bodypart.clone(),
            });
        }
    }

    let row_axis: Vec<f64> = (0..table.len()).map(|i| i as f64).collect();
    let frame_axis: Vec<f64> = table.frames().iter().map(|&f| f as f64).collect();

    for bp in model.bodyparts() {
        let Some(spec) = settings.resolve(&bp.bodypart) else {
            warn!(bodypart = %bp.bodypart, "no interpolation settings, skipping");
            report.warnings.push(CleaningWarning::NoInterpolationSettings {
                bodypart: bp.bodypart.clone(),
            });
            continue;
        };

        let mut channels = SmallVec2::new();
        let mut filled_rows = vec![false; table.len()];
        for (kind, column) in [(ChannelKind::X, bp.x), (ChannelKind::Y, bp.y)] {
            let values = table.column_at_mut(column);
            let outcome = fill_channel(values, &spec, &row_axis, &frame_axis, &mut filled_rows);
            if outcome.fell_back {
                warn!(
                    bodypart = %bp.bodypart,
                    channel = %kind,
                    requested = %spec.method,
                    valid = outcome.valid_samples,
                    required = spec.method.min_samples(),
                    "too few samples, falling back to linear"
                );
                report.warnings.push(CleaningWarning::MethodFallback {
                    bodypart: bp.bodypart.clone(),
                    channel: kind,
                    requested: spec.method.to_string(),
                    applied: outcome.applied.to_string(),
                    valid_samples: outcome.valid_samples,
                    required: spec.method.min_samples(),
                });
            }
            channels.push(ChannelInterpolation {
                channel: kind,
                requested: spec.method,
                applied: outcome.applied,
                fell_back: outcome.fell_back,
                valid_samples: outcome.valid_samples,
                missing_before: outcome.missing_before,
                missing_after: 0,
                filled: 0,
                runs_left_open: outcome.runs_left_open,
            });
        }

        let unpaired: Vec<bool> = {
            let x = table.column_at(bp.x);
            let y = table.column_at(bp.y);
            (0..x.len())
                .map(|i| filled_rows[i] && x[i].is_nan() != y[i].is_nan())
                .collect()
        };
        let unpaired_reverted = table.null_coordinates(bp, &unpaired);

        let ceiling_reverted = match ceiling {
            Some(c) => {
                let d = displacement(table.column_at(bp.x), table.column_at(bp.y), c.metric);
                let mask: Vec<bool> = d
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| i > 0 && filled_rows[i] && v > c.max_displacement)
                    .collect();
                table.null_coordinates(bp, &mask)
            }
            None => 0,
        };

        for channel in channels.iter_mut() {
            let column = match channel.channel {
                ChannelKind::X => bp.x,
                _ => bp.y,
            };
            channel.missing_after = table.column_at(column).iter().filter(|v| v.is_nan()).count();
            channel.filled = channel.missing_before.saturating_sub(channel.missing_after);
        }

        debug!(
            bodypart = %bp.bodypart,
            method = %spec.method,
            unpaired = unpaired_reverted,
            ceiling = ceiling_reverted,
            "interpolation"
        );

        report.bodyparts.push(BodypartInterpolation {
            bodypart: bp.bodypart.clone(),
            spec,
            channels,
            unpaired_reverted,
            ceiling_reverted,
        });
    }

    info!(
        bodyparts = report.bodyparts.len(),
        filled = report.total_filled(),
        "interpolation complete"
    );
    Ok((table, report))
}

struct ChannelOutcome {
    applied: InterpolationMethod,
    fell_back: bool,
    valid_samples: usize,
    missing_before: usize,
    runs_left_open: usize,
}

/// Fill one channel in place and mark every filled row in `filled_rows`.
fn fill_channel(
    values: &mut [f64],
    spec: &GapFillSpec,
    row_axis: &[f64],
    frame_axis: &[f64],
    filled_rows: &mut [bool],
) -> ChannelOutcome {
    let runs = missing_runs(values);
    let missing_before = runs.iter().map(|r| r.len).sum();
    let valid_samples = values.len() - missing_before;

    let fell_back = !runs.is_empty() && valid_samples < spec.method.min_samples();
    let applied = if fell_back {
        InterpolationMethod::Linear
    } else {
        spec.method
    };

    let mut outcome = ChannelOutcome {
        applied,
        fell_back,
        valid_samples,
        missing_before,
        runs_left_open: 0,
    };
    if runs.is_empty() || valid_samples == 0 {
        outcome.runs_left_open = runs.len();
        return outcome;
    }

    let axis = if applied.uses_frame_axis() {
        frame_axis
    } else {
        row_axis
    };
    let known: Vec<usize> = (0..values.len()).filter(|&i| !values[i].is_nan()).collect();
    let xs: Vec<f64> = known.iter().map(|&i| axis[i]).collect();
    let ys: Vec<f64> = known.iter().map(|&i| values[i]).collect();
    let interpolant = (known.len() >= 2).then(|| Interpolant::new(applied, &xs, &ys));

    for run in runs {
        if run.len > spec.max_gap || run.kind == RunKind::Whole {
            outcome.runs_left_open += 1;
            continue;
        }
        // The last valid sample before the run brackets it from the left.
        let k = known.partition_point(|&i| i < run.start).saturating_sub(1);
        for row in run.start..run.end() {
            values[row] = match (run.kind, &interpolant) {
                (RunKind::Leading, _) => ys[0],
                (RunKind::Trailing, _) => ys[ys.len() - 1],
                (_, Some(f)) => f.eval(axis[row], k),
                (_, None) => continue,
            };
            filled_rows[row] = true;
        }
    }
    outcome
}
