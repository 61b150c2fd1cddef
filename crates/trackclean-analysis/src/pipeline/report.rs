//! Aggregate report of one pipeline run.

use serde::Serialize;

use crate::confidence::ConfidenceReport;
use crate::interpolation::InterpolationReport;
use crate::outliers::OutlierDetection;
use crate::preprocess::PreprocessReport;
use crate::table::FrameTable;
use crate::warnings::CleaningWarning;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningReport {
    pub rows_in: usize,
    pub rows_out: usize,
    /// Missing x/y values across all bodyparts after the last stage.
    pub missing_coordinates: usize,
    pub column_warnings: Vec<CleaningWarning>,
    pub preprocess: Option<PreprocessReport>,
    pub confidence: Option<ConfidenceReport>,
    pub outliers: Option<OutlierDetection>,
    pub interpolation: Option<InterpolationReport>,
}

impl CleaningReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Every warning any stage produced, in stage order.
    pub fn warnings(&self) -> impl Iterator<Item = &CleaningWarning> {
        self.column_warnings
            .iter()
            .chain(self.preprocess.iter().flat_map(|r| r.warnings.iter()))
            .chain(self.confidence.iter().flat_map(|r| r.warnings.iter()))
            .chain(self.outliers.iter().flat_map(|r| r.warnings.iter()))
            .chain(self.interpolation.iter().flat_map(|r| r.warnings.iter()))
    }

    pub(crate) fn count_missing(table: &FrameTable) -> usize {
        table
            .model()
            .bodyparts()
            .iter()
            .flat_map(|bp| [bp.x, bp.y])
            .map(|c| table.column_at(c).iter().filter(|v| v.is_nan()).count())
            .sum()
    }
}

/// Cleaned table plus everything the stages reported.
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    pub table: FrameTable,
    pub report: CleaningReport,
}
