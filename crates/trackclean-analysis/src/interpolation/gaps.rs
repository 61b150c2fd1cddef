//! Maximal runs of missing values.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    /// Starts at row 0, valid data follows.
    Leading,
    /// Valid data on both sides.
    Interior,
    /// Ends at the last row, valid data precedes.
    Trailing,
    /// The whole channel is missing.
    Whole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MissingRun {
    pub start: usize,
    pub len: usize,
    pub kind: RunKind,
}

impl MissingRun {
    /// One past the last missing row.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

pub fn missing_runs(values: &[f64]) -> Vec<MissingRun> {
    let n = values.len();
    let mut runs = Vec::new();
    let mut i = 0;
    while i < n {
        if !values[i].is_nan() {
            i += 1;
            continue;
        }
        let start = i;
        while i < n && values[i].is_nan() {
            i += 1;
        }
        let kind = match (start == 0, i == n) {
            (true, true) => RunKind::Whole,
            (true, false) => RunKind::Leading,
            (false, true) => RunKind::Trailing,
            (false, false) => RunKind::Interior,
        };
        runs.push(MissingRun {
            start,
            len: i - start,
            kind,
        });
    }
    runs
}
