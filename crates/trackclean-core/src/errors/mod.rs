//! Error handling for trackclean.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod error_code;
pub mod pipeline_error;
pub mod table_error;

pub use config_error::ConfigError;
pub use error_code::ErrorCode;
pub use pipeline_error::{PipelineError, PipelineResult};
pub use table_error::TableError;
