//! # Arclet UI
//!
//! Loading indicators built on `arclet_animation` descriptions and
//! `arclet_core` memoization.
//!
//! ## Components
//!
//! - **Spinner** - Geometry of the single-SVG spinner with an optional inline checkmark
//! - **ProgressSpinner** - Indeterminate spin or determinate fill of a stroked circle
//! - **Checkmark** - Self-drawing checkmark polyline
//! - **ActionTracker** - Spinner and checkmark combined into a "working... done" sequence
//!
//! Widgets never render. They own their configuration, ask an
//! [`AnimationDriver`](arclet_animation::AnimationDriver) for players and
//! report completion through event channels.
//!
//! ## Example
//!
//! ```rust
//! use arclet_animation::AnimationScheduler;
//! use arclet_ui::prelude::*;
//! use std::rc::Rc;
//! use std::time::Duration;
//!
//! let scheduler = AnimationScheduler::new();
//! let tracker = cn::action_tracker(Rc::new(scheduler.handle()));
//!
//! tracker.start()?;
//! tracker.finish()?;
//! while scheduler.has_active_animations() {
//!     scheduler.advance(Duration::from_millis(16));
//! }
//! assert_eq!(tracker.state(), ActionTrackerState::Idle);
//! # Ok::<(), ActionTrackerError>(())
//! ```

pub mod components;
pub mod error;
pub mod options;

pub use components::*;
pub use error::{ActionTrackerError, OptionsError, Result};
pub use options::ComponentDefaults;

/// Convenience constructors with the built-in defaults, for the `cn::` prefix
pub mod cn {
    use crate::components::{ActionTracker, Checkmark, ProgressSpinner};
    use crate::options::ComponentDefaults;
    use arclet_animation::AnimationDriver;
    use std::rc::Rc;

    pub fn progress_spinner(driver: Rc<dyn AnimationDriver>) -> ProgressSpinner {
        ProgressSpinner::new(driver, None)
    }

    pub fn checkmark(driver: Rc<dyn AnimationDriver>) -> Checkmark {
        Checkmark::new(driver, None)
    }

    pub fn action_tracker(driver: Rc<dyn AnimationDriver>) -> ActionTracker {
        ActionTracker::mount(driver, &ComponentDefaults::default())
    }
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::cn;
    pub use crate::components::{
        ActionTracker, ActionTrackerOptions, ActionTrackerState, Checkmark, CheckmarkOptions,
        ProgressSpinner, ProgressSpinnerMode, ProgressSpinnerOptions, SpinnerAnimationDone,
    };
    pub use crate::error::{ActionTrackerError, OptionsError};
    pub use crate::options::ComponentDefaults;
    pub use arclet_animation::{AnimationDriver, Timing};
}
