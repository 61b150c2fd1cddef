//! Preprocess configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the optional preprocess stage.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Bodyparts whose columns are dropped before cleaning.
    pub exclude_bodyparts: Vec<String>,
    /// Negate every y column. Default: false.
    pub invert_y: Option<bool>,
    /// Handling of all-zero frames: "keep", "drop" or "mark_missing". Default: "keep".
    pub zero_frames: Option<String>,
}

impl PreprocessConfig {
    /// True when any preprocess step is requested.
    pub fn is_configured(&self) -> bool {
        !self.exclude_bodyparts.is_empty()
            || self.invert_y.unwrap_or(false)
            || self.zero_frames.as_deref().is_some_and(|z| z != "keep")
    }
}
