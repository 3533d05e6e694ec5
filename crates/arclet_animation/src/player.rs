//! Animation playback capability
//!
//! Widgets never run frames themselves. They hand an [`Animation`] to an
//! [`AnimationDriver`] and get back a player that reports completion
//! through its done callbacks.

use crate::metadata::Animation;

pub type DoneCallback = Box<dyn FnOnce()>;

/// A single playable instance of an animation
pub trait AnimationPlayer {
    /// Register a callback for the next completion
    fn on_done(&self, callback: DoneCallback);

    fn play(&self);

    /// Stop playback and drop every pending callback
    ///
    /// A destroyed player never reports completion.
    fn destroy(&self);

    fn is_destroyed(&self) -> bool;
}

/// Creates players for a target element
pub trait AnimationDriver {
    fn create_player(&self, animation: &Animation, target: &str) -> Box<dyn AnimationPlayer>;
}

/// A player that never plays and never completes
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPlayer;

impl AnimationPlayer for NoopPlayer {
    fn on_done(&self, _callback: DoneCallback) {}

    fn play(&self) {}

    fn destroy(&self) {}

    fn is_destroyed(&self) -> bool {
        true
    }
}
