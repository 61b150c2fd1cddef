//! trackclean-core: shared foundations for the trackclean engine.
//!
//! - Errors: one `thiserror` enum per subsystem, each with a stable error code
//! - Config: TOML-based, layered resolution (overrides > env > project > defaults)
//! - Tracing: `tracing-subscriber` setup driven by `TRACKCLEAN_LOG`
//! - Constants and collection aliases used across the workspace

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;
pub mod types;
