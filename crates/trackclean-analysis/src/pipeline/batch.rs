//! Parallel cleaning of many independent tables.

use rayon::prelude::*;
use tracing::{info, warn};

use trackclean_core::errors::{PipelineError, PipelineResult, TableError};

use super::{CleaningReport, Pipeline};
use crate::table::FrameTable;

/// One input table, identified for error reporting (usually its file name).
#[derive(Debug)]
pub struct CleaningJob {
    pub id: String,
    /// The loader's result; a load failure is reported, not fatal.
    pub table: Result<FrameTable, TableError>,
}

impl CleaningJob {
    pub fn new(id: impl Into<String>, table: Result<FrameTable, TableError>) -> Self {
        Self {
            id: id.into(),
            table,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CleanedTable {
    pub id: String,
    pub table: FrameTable,
    pub report: CleaningReport,
}

/// Successful tables in input order, plus one error per failed job.
pub type BatchResult = PipelineResult<Vec<CleanedTable>>;

impl Pipeline {
    /// Clean every job in parallel. One failure never stops the others.
    pub fn run_batch(&self, jobs: Vec<CleaningJob>) -> BatchResult {
        let total = jobs.len();
        let outcomes: Vec<Result<CleanedTable, PipelineError>> = jobs
            .into_par_iter()
            .map(|job| {
                let CleaningJob { id, table } = job;
                let result = table
                    .map_err(PipelineError::from)
                    .and_then(|t| self.run(t));
                match result {
                    Ok(outcome) => Ok(CleanedTable {
                        id,
                        table: outcome.table,
                        report: outcome.report,
                    }),
                    Err(e) => {
                        warn!(file = %id, error = %e, "table failed");
                        Err(PipelineError::for_file(id, e))
                    }
                }
            })
            .collect();

        let mut result = BatchResult::default();
        for outcome in outcomes {
            match outcome {
                Ok(cleaned) => result.data.push(cleaned),
                Err(e) => result.add_error(e),
            }
        }
        info!(
            total,
            cleaned = result.data.len(),
            failed = result.error_count(),
            "batch complete"
        );
        result
    }
}
