//! Error types for arclet_ui

use arclet_animation::TimingParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Invalid action tracker state transitions
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionTrackerError {
    /// `start` while a sequence is playing or finishing
    #[error("Previous animation sequence hasn't finished yet")]
    AlreadyRunning,

    /// `finish` while idle
    #[error("Animation sequence hasn't started yet")]
    NotStarted,

    /// `finish` while already finishing
    #[error("Animation sequence is already scheduled to finish")]
    AlreadyFinishing,
}

/// Errors that can occur while loading component defaults
#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid component options: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid timing: {0}")]
    Timing(#[from] TimingParseError),
}

/// Result type for action tracker operations
pub type Result<T> = std::result::Result<T, ActionTrackerError>;
