//! `FrameTable`: the in-memory frame × column store all stages operate on.

use std::sync::Arc;

use trackclean_core::errors::TableError;
use trackclean_core::types::FxHashMap;

use crate::columns::{BodypartColumns, ColumnModel};

/// Rows are frames in position order; every row carries its original frame
/// number. Columns are named `f64` vectors, `NaN` marks a missing value.
///
/// The bodypart column model is resolved once at construction and shared
/// by every stage that touches the table.
#[derive(Debug, Clone)]
pub struct FrameTable {
    frames: Vec<u64>,
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    lookup: FxHashMap<String, usize>,
    model: Arc<ColumnModel>,
}

impl FrameTable {
    /// Build a table with frame numbers `0..N`.
    pub fn new(columns: Vec<(String, Vec<f64>)>) -> Result<Self, TableError> {
        let rows = columns.first().map_or(0, |(_, values)| values.len());
        Self::with_frames((0..rows as u64).collect(), columns)
    }

    /// Build a table with explicit frame numbers (strictly increasing).
    pub fn with_frames(
        frames: Vec<u64>,
        columns: Vec<(String, Vec<f64>)>,
    ) -> Result<Self, TableError> {
        if let Some(row) = frames.windows(2).position(|w| w[1] <= w[0]) {
            return Err(TableError::FrameNumbersNotIncreasing { row: row + 1 });
        }

        let mut names = Vec::with_capacity(columns.len());
        let mut data = Vec::with_capacity(columns.len());
        let mut lookup = FxHashMap::default();

        for (index, (name, values)) in columns.into_iter().enumerate() {
            if name.is_empty() {
                return Err(TableError::EmptyColumnName { index });
            }
            if index == 0 && values.len() != frames.len() {
                return Err(TableError::FrameCountMismatch {
                    expected: values.len(),
                    actual: frames.len(),
                });
            }
            if values.len() != frames.len() {
                return Err(TableError::RaggedColumn {
                    column: name,
                    expected: frames.len(),
                    actual: values.len(),
                });
            }
            if lookup.insert(name.clone(), index).is_some() {
                return Err(TableError::DuplicateColumn { name });
            }
            names.push(name);
            data.push(values);
        }

        let model = Arc::new(ColumnModel::resolve(&names));
        Ok(Self {
            frames,
            names,
            columns: data,
            lookup,
            model,
        })
    }

    /// Number of rows (frames).
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[u64] {
        &self.frames
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.index_of(name).map(|i| self.columns[i].as_slice())
    }

    /// Like [`column`](Self::column), for callers that need the column to exist.
    pub fn require(&self, name: &str) -> Result<&[f64], TableError> {
        self.column(name)
            .ok_or_else(|| TableError::UnknownColumn { name: name.to_string() })
    }

    /// Column by position. Panics if `index` is out of range.
    pub fn column_at(&self, index: usize) -> &[f64] {
        &self.columns[index]
    }

    pub(crate) fn column_at_mut(&mut self, index: usize) -> &mut [f64] {
        &mut self.columns[index]
    }

    /// The resolved bodypart model for this table's columns.
    pub fn model(&self) -> &ColumnModel {
        &self.model
    }

    pub(crate) fn shared_model(&self) -> Arc<ColumnModel> {
        Arc::clone(&self.model)
    }

    /// Null x and y of `bodypart` on every row where `mask` is set.
    /// Returns how many rows had at least one coordinate present before.
    pub(crate) fn null_coordinates(&mut self, bodypart: &BodypartColumns, mask: &[bool]) -> usize {
        let mut newly_nulled = 0;
        for row in (0..mask.len()).filter(|&row| mask[row]) {
            let x = &mut self.columns[bodypart.x][row];
            let was_present = !x.is_nan();
            *x = f64::NAN;
            let y = &mut self.columns[bodypart.y][row];
            let was_present = was_present || !y.is_nan();
            *y = f64::NAN;
            if was_present {
                newly_nulled += 1;
            }
        }
        newly_nulled
    }

    /// Keep only rows where `keep` is set. Frame numbers of kept rows are preserved.
    pub(crate) fn retain_rows(&mut self, keep: &[bool]) {
        for column in &mut self.columns {
            retain_by_mask(column, keep);
        }
        retain_by_mask(&mut self.frames, keep);
    }

    /// Remove the named columns and re-resolve the column model.
    pub(crate) fn drop_columns(&mut self, drop: &[String]) {
        if drop.is_empty() {
            return;
        }
        let mut names = Vec::with_capacity(self.names.len());
        let mut columns = Vec::with_capacity(self.columns.len());
        for (name, values) in self.names.drain(..).zip(self.columns.drain(..)) {
            if !drop.contains(&name) {
                names.push(name);
                columns.push(values);
            }
        }
        self.lookup = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        self.model = Arc::new(ColumnModel::resolve(&names));
        self.names = names;
        self.columns = columns;
    }

    /// Decompose into frame numbers and named columns.
    pub fn into_columns(self) -> (Vec<u64>, Vec<(String, Vec<f64>)>) {
        (self.frames, self.names.into_iter().zip(self.columns).collect())
    }
}

fn retain_by_mask<T>(values: &mut Vec<T>, keep: &[bool]) {
    let mut row = 0;
    values.retain(|_| {
        let k = keep[row];
        row += 1;
        k
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, values: &[f64]) -> (String, Vec<f64>) {
        (name.to_string(), values.to_vec())
    }

    #[test]
    fn test_new_assigns_sequential_frames() {
        let table = FrameTable::new(vec![col("a_x", &[1.0, 2.0, 3.0])]).unwrap();
        assert_eq!(table.frames(), &[0, 1, 2]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_ragged_column_rejected() {
        let err = FrameTable::new(vec![col("a_x", &[1.0, 2.0]), col("a_y", &[1.0])]).unwrap_err();
        assert!(matches!(err, TableError::RaggedColumn { ref column, expected: 2, actual: 1 } if column == "a_y"));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = FrameTable::new(vec![col("a_x", &[1.0]), col("a_x", &[2.0])]).unwrap_err();
        assert!(matches!(err, TableError::DuplicateColumn { .. }));
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = FrameTable::new(vec![col("", &[1.0])]).unwrap_err();
        assert!(matches!(err, TableError::EmptyColumnName { index: 0 }));
    }

    #[test]
    fn test_non_increasing_frames_rejected() {
        let err = FrameTable::with_frames(vec![0, 2, 2], vec![col("a_x", &[1.0, 2.0, 3.0])])
            .unwrap_err();
        assert!(matches!(err, TableError::FrameNumbersNotIncreasing { row: 2 }));
    }

    #[test]
    fn test_frame_index_length_mismatch() {
        let err = FrameTable::with_frames(vec![0, 1], vec![col("a_x", &[1.0, 2.0, 3.0])]).unwrap_err();
        assert!(matches!(err, TableError::FrameCountMismatch { expected: 3, actual: 2 }));
    }

    #[test]
    fn test_require_unknown_column() {
        let table = FrameTable::new(vec![col("a_x", &[1.0])]).unwrap();
        assert!(table.require("a_x").is_ok());
        assert!(matches!(table.require("a_y"), Err(TableError::UnknownColumn { .. })));
    }

    #[test]
    fn test_retain_rows_keeps_frame_numbers() {
        let mut table = FrameTable::new(vec![col("a_x", &[1.0, 2.0, 3.0])]).unwrap();
        table.retain_rows(&[true, false, true]);
        assert_eq!(table.frames(), &[0, 2]);
        assert_eq!(table.column("a_x").unwrap(), &[1.0, 3.0]);
    }

    #[test]
    fn test_drop_columns_refreshes_model() {
        let mut table = FrameTable::new(vec![
            col("a_x", &[1.0]),
            col("a_y", &[1.0]),
            col("b_x", &[1.0]),
            col("b_y", &[1.0]),
        ])
        .unwrap();
        assert_eq!(table.model().bodyparts().len(), 2);
        table.drop_columns(&["a_x".to_string(), "a_y".to_string()]);
        assert_eq!(table.model().bodyparts().len(), 1);
        assert_eq!(table.index_of("b_y"), Some(1));
        assert!(table.column("a_x").is_none());
    }

    #[test]
    fn test_null_coordinates_counts_newly_nulled() {
        let mut table = FrameTable::new(vec![
            col("a_x", &[1.0, f64::NAN, 3.0]),
            col("a_y", &[1.0, f64::NAN, 3.0]),
        ])
        .unwrap();
        let bp = table.model().bodyparts()[0].clone();
        let n = table.null_coordinates(&bp, &[false, true, true]);
        assert_eq!(n, 1);
        assert!(table.column("a_x").unwrap()[2].is_nan());
        assert!(table.column("a_y").unwrap()[2].is_nan());
    }
}
