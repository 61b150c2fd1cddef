//! ErrorCode trait for boundary-layer reporting.

/// Structured error code for every trackclean error enum.
/// Boundary layers (CLI, batch drivers, report writers) key on these
/// strings instead of parsing Display output.
pub trait ErrorCode {
    /// Returns the error code string (e.g., "CONFIG_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const CONFLICTING_OPTIONS: &str = "CONFLICTING_OPTIONS";
pub const TABLE_ERROR: &str = "TABLE_ERROR";
pub const UNREADABLE_INPUT: &str = "UNREADABLE_INPUT";
