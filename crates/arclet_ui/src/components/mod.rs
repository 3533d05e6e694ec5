//! Loading indicator widgets
//!
//! Each widget family follows the same pattern:
//! - Options struct with every field optional (e.g., `CheckmarkOptions`)
//! - Config builder that keeps derived geometry in sync (e.g., `CheckmarkConfigBuilder`)
//! - Memoized animation factories (e.g., `CheckmarkAnimations`)
//! - Widget handle driven through an `AnimationDriver` (e.g., `Checkmark`)

pub mod action_tracker;
pub mod checkmark;
pub mod progress_spinner;
pub mod spinner;

pub use action_tracker::{
    ActionTracker, ActionTrackerChanges, ActionTrackerConfig, ActionTrackerConfigBuilder,
    ActionTrackerOptions, ActionTrackerState, CheckmarkAccessor, SpinnerAccessor, SpinnerBinding,
};
pub use checkmark::{
    Checkmark, CheckmarkAnimations, CheckmarkChanges, CheckmarkConfig, CheckmarkConfigBuilder,
    CheckmarkOptions,
};
pub use progress_spinner::{
    ProgressSpinner, ProgressSpinnerAnimations, ProgressSpinnerChanges, ProgressSpinnerConfig,
    ProgressSpinnerConfigBuilder, ProgressSpinnerMode, ProgressSpinnerOptions,
    SpinnerAnimationDone,
};
pub use spinner::{DashArray, SpinnerConfig, SpinnerOptions, SpinnerSvgBuilder, SpinnerSvgOptions};
