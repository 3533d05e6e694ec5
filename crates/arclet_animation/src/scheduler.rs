//! Animation scheduler
//!
//! Owns every player created through its [`SchedulerHandle`] and advances
//! them frame by frame. The host calls [`AnimationScheduler::tick`] once
//! per frame, or [`AnimationScheduler::advance`] with an explicit delta
//! when it controls time itself (tests, offline rendering).
//!
//! Done callbacks run after the scheduler's internal borrow is released,
//! so a callback may create, play or destroy players freely.

use crate::metadata::Animation;
use crate::player::{AnimationDriver, AnimationPlayer, DoneCallback, NoopPlayer};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

new_key_type! {
    /// Handle to a registered player
    pub struct PlayerId;
}

impl PlayerId {
    /// Convert to raw u64, e.g. for logging
    pub fn to_raw(self) -> u64 {
        self.0.as_ffi()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Playing,
    Finished,
}

struct PlayerEntry {
    target: String,
    duration: Duration,
    elapsed: Duration,
    state: PlayerState,
    callbacks: SmallVec<[DoneCallback; 2]>,
}

/// Internal state of the animation scheduler
struct SchedulerInner {
    players: SlotMap<PlayerId, PlayerEntry>,
    last_frame: Instant,
}

/// The scheduler that ticks all players
///
/// Held by the host. Widgets only see a weak [`SchedulerHandle`].
pub struct AnimationScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                players: SlotMap::with_key(),
                last_frame: Instant::now(),
            })),
        }
    }

    /// Get a handle to this scheduler for passing to widgets
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Advance using the wall clock since the previous frame
    ///
    /// Returns true if any player is still playing.
    pub fn tick(&self) -> bool {
        let dt = {
            let mut inner = self.inner.borrow_mut();
            let now = Instant::now();
            let dt = now - inner.last_frame;
            inner.last_frame = now;
            dt
        };
        self.advance(dt)
    }

    /// Advance every playing player by `dt`
    ///
    /// Players whose elapsed time reaches their duration finish and fire
    /// their done callbacks. Returns true if any player is still playing.
    pub fn advance(&self, dt: Duration) -> bool {
        let mut finished: SmallVec<[(PlayerId, SmallVec<[DoneCallback; 2]>); 4]> =
            SmallVec::new();

        {
            let mut inner = self.inner.borrow_mut();
            for (id, entry) in inner.players.iter_mut() {
                if entry.state != PlayerState::Playing {
                    continue;
                }
                entry.elapsed += dt;
                if entry.elapsed >= entry.duration {
                    entry.state = PlayerState::Finished;
                    tracing::trace!(player = id.to_raw(), element = %entry.target, "player finished");
                    finished.push((id, std::mem::take(&mut entry.callbacks)));
                }
            }
        }

        for (id, callbacks) in finished {
            // An earlier callback in this frame may have destroyed the player
            if !self.inner.borrow().players.contains_key(id) {
                continue;
            }
            for callback in callbacks {
                callback();
            }
        }

        self.has_active_animations()
    }

    /// Check if any player is still playing
    pub fn has_active_animations(&self) -> bool {
        self.inner
            .borrow()
            .players
            .values()
            .any(|p| p.state == PlayerState::Playing)
    }

    /// Number of registered (not destroyed) players
    pub fn player_count(&self) -> usize {
        self.inner.borrow().players.len()
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// A weak handle to the animation scheduler
///
/// It won't prevent the scheduler from being dropped. Once the scheduler
/// is gone, the handle hands out inert players.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<RefCell<SchedulerInner>>,
}

impl SchedulerHandle {
    /// Register a player and return its ID
    pub fn register_player(&self, animation: &Animation, target: &str) -> Option<PlayerId> {
        self.inner.upgrade().map(|inner| {
            let mut guard = inner.borrow_mut();
            // Reset last_frame so the first tick doesn't see a huge dt
            guard.last_frame = Instant::now();
            let id = guard.players.insert(PlayerEntry {
                target: target.to_string(),
                duration: animation.duration(),
                elapsed: Duration::ZERO,
                state: PlayerState::Idle,
                callbacks: SmallVec::new(),
            });
            tracing::trace!(player = id.to_raw(), element = target, "player registered");
            id
        })
    }

    pub fn player_state(&self, id: PlayerId) -> Option<PlayerState> {
        self.inner
            .upgrade()
            .and_then(|inner| inner.borrow().players.get(id).map(|p| p.state))
    }

    /// Start or restart a player
    pub fn play(&self, id: PlayerId) {
        if let Some(inner) = self.inner.upgrade() {
            if let Some(entry) = inner.borrow_mut().players.get_mut(id) {
                entry.elapsed = Duration::ZERO;
                entry.state = PlayerState::Playing;
            }
        }
    }

    pub fn add_done_callback(&self, id: PlayerId, callback: DoneCallback) {
        if let Some(inner) = self.inner.upgrade() {
            if let Some(entry) = inner.borrow_mut().players.get_mut(id) {
                entry.callbacks.push(callback);
            }
        }
    }

    /// Remove a player, dropping its pending callbacks
    pub fn remove_player(&self, id: PlayerId) {
        if let Some(inner) = self.inner.upgrade() {
            let removed = inner.borrow_mut().players.remove(id);
            // Callbacks are dropped outside of the borrow
            if let Some(entry) = removed {
                tracing::trace!(player = id.to_raw(), element = %entry.target, "player removed");
            }
        }
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl AnimationDriver for SchedulerHandle {
    fn create_player(&self, animation: &Animation, target: &str) -> Box<dyn AnimationPlayer> {
        match self.register_player(animation, target) {
            Some(id) => Box::new(ScheduledPlayer {
                handle: self.clone(),
                id,
            }),
            None => {
                tracing::debug!(element = target, "scheduler dropped, handing out an inert player");
                Box::new(NoopPlayer)
            }
        }
    }
}

/// A player registered with an [`AnimationScheduler`]
///
/// Dropping it removes it from the scheduler.
pub struct ScheduledPlayer {
    handle: SchedulerHandle,
    id: PlayerId,
}

impl ScheduledPlayer {
    pub fn id(&self) -> PlayerId {
        self.id
    }
}

impl AnimationPlayer for ScheduledPlayer {
    fn on_done(&self, callback: DoneCallback) {
        self.handle.add_done_callback(self.id, callback);
    }

    fn play(&self) {
        self.handle.play(self.id);
    }

    fn destroy(&self) {
        self.handle.remove_player(self.id);
    }

    fn is_destroyed(&self) -> bool {
        self.handle.player_state(self.id).is_none()
    }
}

impl Drop for ScheduledPlayer {
    fn drop(&mut self) {
        self.handle.remove_player(self.id);
    }
}
