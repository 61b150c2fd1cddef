//! Configuration errors.

use super::error_code::{self, ErrorCode};

/// Errors raised while loading or validating cleaning configuration.
/// All of these are raised before any track data is touched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Config parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Config validation failed for {field}: {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Invalid config value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Unknown {field} '{value}' (expected one of: {expected})")]
    UnknownVariant {
        field: String,
        value: String,
        expected: &'static str,
    },

    #[error("Missing required parameter: {field}")]
    MissingParameter { field: String },

    #[error("Conflicting options {first} and {second}: {message}")]
    ConflictingOptions {
        first: String,
        second: String,
        message: String,
    },
}

impl ConfigError {
    /// Shorthand for a value that is out of its allowed range.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConflictingOptions { .. } => error_code::CONFLICTING_OPTIONS,
            _ => error_code::CONFIG_ERROR,
        }
    }
}
