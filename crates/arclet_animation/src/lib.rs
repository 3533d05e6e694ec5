//! Arclet Animation System
//!
//! Declarative animation descriptions and the playback capability widgets
//! use to run them.
//!
//! # Features
//!
//! - **Timing Strings**: CSS-like `"<duration> [<delay>] [<easing>]"` values
//! - **Animation Metadata**: Ordered style maps, single-style and keyframe steps
//! - **Players**: The `AnimationDriver`/`AnimationPlayer` capability
//! - **Scheduler**: A frame-ticked driver with weak handles and deferred
//!   done callbacks

pub mod metadata;
pub mod player;
pub mod scheduler;
pub mod timing;

pub use metadata::{animate, keyframes, style, Animation, AnimationStep, StepStyles, Style};
pub use player::{AnimationDriver, AnimationPlayer, DoneCallback, NoopPlayer};
pub use scheduler::{
    AnimationScheduler, PlayerId, PlayerState, ScheduledPlayer, SchedulerHandle,
};
pub use timing::{CubicBezier, Delay, Easing, Timing, TimingParseError};
