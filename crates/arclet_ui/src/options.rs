//! Component defaults
//!
//! Application-wide base options for every widget family, usually kept in
//! an `arclet.toml` file:
//!
//! ```toml
//! [progress_spinner]
//! stroke = "#333333"
//! indeterminate_timing = "1.5s ease-in-out"
//!
//! [action_tracker]
//! circle_diameter = 24.0
//! stroke_success = "teal"
//! ```
//!
//! Every table and every field is optional. Widgets overlay their own
//! options on top of these.

use crate::components::action_tracker::ActionTrackerOptions;
use crate::components::checkmark::CheckmarkOptions;
use crate::components::progress_spinner::ProgressSpinnerOptions;
use crate::components::spinner::SpinnerOptions;
use crate::error::OptionsError;
use arclet_animation::Timing;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Base options per widget family
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComponentDefaults {
    pub spinner: Option<SpinnerOptions>,
    pub progress_spinner: Option<ProgressSpinnerOptions>,
    pub checkmark: Option<CheckmarkOptions>,
    pub action_tracker: Option<ActionTrackerOptions>,
}

impl ComponentDefaults {
    pub fn from_toml_str(content: &str) -> Result<Self, OptionsError> {
        Ok(toml::from_str(content)?)
    }

    /// Load defaults from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OptionsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| OptionsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let defaults = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded component defaults");
        Ok(defaults)
    }
}

/// Parse a timing string given outside of a defaults file
pub fn parse_timing(value: &str) -> Result<Timing, OptionsError> {
    Ok(value.parse()?)
}
