//! Non-fatal conditions reported by the stages.
//!
//! Every skip or fallback produces one of these in the stage report and a
//! matching `tracing` event.

use serde::Serialize;

use crate::columns::ChannelKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CleaningWarning {
    /// Both `_likelihood` and `_confidence` exist; the first one is used.
    DuplicateConfidence {
        bodypart: String,
        used: String,
        ignored: String,
    },
    /// A coordinate column has no partner, so the bodypart is not recognized.
    OrphanCoordinate { column: String, missing: String },
    /// The bodypart has no confidence column; the confidence stage skips it.
    NoConfidenceColumn { bodypart: String },
    /// No threshold resolves for the bodypart.
    NoThresholdConfigured { bodypart: String },
    /// Percentile mode with no valid confidence values; nothing was removed.
    NoValidConfidence { bodypart: String },
    /// No valid displacement values; nothing was flagged.
    NoValidDisplacements { bodypart: String },
    /// No interpolation settings resolve for the bodypart.
    NoInterpolationSettings { bodypart: String },
    /// Too few valid samples for the requested method.
    MethodFallback {
        bodypart: String,
        channel: ChannelKind,
        requested: String,
        applied: String,
        valid_samples: usize,
        required: usize,
    },
    /// A per-bodypart override or exclusion names a bodypart the table lacks.
    UnknownBodypart { stage: &'static str, bodypart: String },
}
