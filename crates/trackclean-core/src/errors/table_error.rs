//! Frame table errors.

use super::error_code::{self, ErrorCode};

/// Errors for malformed input tables.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("Column {column} has {actual} rows, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Duplicate column name: {name}")]
    DuplicateColumn { name: String },

    #[error("Column at position {index} has an empty name")]
    EmptyColumnName { index: usize },

    #[error("Frame numbers must be strictly increasing (row {row})")]
    FrameNumbersNotIncreasing { row: usize },

    #[error("Frame index has {actual} entries, expected {expected}")]
    FrameCountMismatch { expected: usize, actual: usize },

    #[error("Unknown column: {name}")]
    UnknownColumn { name: String },

    #[error("Unreadable input: {message}")]
    Unreadable { message: String },
}

impl ErrorCode for TableError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unreadable { .. } => error_code::UNREADABLE_INPUT,
            _ => error_code::TABLE_ERROR,
        }
    }
}
