//! Action tracker
//!
//! Combines a progress spinner and a checkmark into one "working... done"
//! sequence driven by a small state machine:
//!
//! ```text
//!   Idle --start()--> Playing --finish()--> Finishing --both done--> Idle
//!     ^                                                               |
//!     +------------------------- reset() (any state) -----------------+
//! ```
//!
//! After `finish()` the spinner completes its current indeterminate cycle,
//! switches to determinate mode and fills up with the success stroke while
//! the checkmark draws itself. Once both report completion the tracker
//! emits [`ActionTracker::animation_done`] exactly once.
//!
//! # Example
//!
//! ```rust
//! use arclet_animation::AnimationScheduler;
//! use arclet_ui::components::action_tracker::{ActionTracker, ActionTrackerState};
//! use arclet_ui::options::ComponentDefaults;
//! use std::rc::Rc;
//! use std::time::Duration;
//!
//! let scheduler = AnimationScheduler::new();
//! let tracker = ActionTracker::mount(Rc::new(scheduler.handle()), &ComponentDefaults::default());
//!
//! tracker.start().unwrap();
//! tracker.finish().unwrap();
//! assert_eq!(tracker.state(), ActionTrackerState::Finishing);
//!
//! // Remaining spin cycle, then the success fill and the checkmark
//! scheduler.advance(Duration::from_secs(1));
//! scheduler.advance(Duration::from_millis(225));
//! assert_eq!(tracker.state(), ActionTrackerState::Idle);
//! ```

use crate::components::checkmark::{Checkmark, CheckmarkChanges, CheckmarkOptions};
use crate::components::progress_spinner::{
    ProgressSpinner, ProgressSpinnerChanges, ProgressSpinnerMode, ProgressSpinnerOptions,
    SpinnerAnimationDone,
};
use crate::error::{ActionTrackerError, Result};
use crate::options::ComponentDefaults;
use arclet_animation::AnimationDriver;
use arclet_core::memo::{memoize, Memoized};
use arclet_core::numeric::precise;
use arclet_core::{EventEmitter, Subscription};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, OnceCell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

// ============================================================================
// Sub-widget capabilities
// ============================================================================

/// What the tracker needs from its spinner
pub trait SpinnerAccessor {
    fn play(&self);

    /// Stop after the current indeterminate cycle
    fn finish(&self);

    fn reset(&self);

    /// Push tracker-controlled inputs to the spinner
    fn bind(&self, binding: &SpinnerBinding);
}

/// What the tracker needs from its checkmark
pub trait CheckmarkAccessor {
    fn play(&self);

    fn reset(&self);
}

/// Spinner inputs owned by the tracker
#[derive(Clone, Debug, PartialEq)]
pub struct SpinnerBinding {
    pub mode: ProgressSpinnerMode,
    pub stroke: String,
    pub value: f64,
}

// ============================================================================
// Options and config
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ActionTrackerState {
    #[default]
    Idle,
    Playing,
    Finishing,
}

impl fmt::Display for ActionTrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionTrackerState::Idle => f.write_str("idle"),
            ActionTrackerState::Playing => f.write_str("playing"),
            ActionTrackerState::Finishing => f.write_str("finishing"),
        }
    }
}

/// Partial tracker options; unset fields take the defaults
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActionTrackerOptions {
    pub circle_diameter: Option<f64>,
    pub circle_stroke_width: Option<f64>,
    pub stroke: Option<String>,
    pub stroke_success: Option<String>,
    pub checkmark_stroke_width: Option<f64>,
}

impl ActionTrackerOptions {
    /// Overlay `other` on top of `self`, field by field
    pub fn merge(&self, other: &ActionTrackerOptions) -> ActionTrackerOptions {
        ActionTrackerOptions {
            circle_diameter: other.circle_diameter.or(self.circle_diameter),
            circle_stroke_width: other.circle_stroke_width.or(self.circle_stroke_width),
            stroke: other.stroke.clone().or_else(|| self.stroke.clone()),
            stroke_success: other
                .stroke_success
                .clone()
                .or_else(|| self.stroke_success.clone()),
            checkmark_stroke_width: other.checkmark_stroke_width.or(self.checkmark_stroke_width),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ActionTrackerConfig {
    pub circle_diameter: f64,
    pub circle_stroke_width: f64,
    pub stroke: String,
    pub stroke_success: String,
    pub checkmark_stroke_width: f64,
    checkmark_container_size: f64,
}

impl ActionTrackerConfig {
    /// Side of the square the checkmark is drawn into
    pub fn checkmark_container_size(&self) -> f64 {
        self.checkmark_container_size
    }
}

pub struct ActionTrackerConfigBuilder {
    config: ActionTrackerConfig,
    container_size: Memoized<(f64, f64), f64>,
}

impl ActionTrackerConfigBuilder {
    pub fn new(options: Option<&ActionTrackerOptions>) -> Self {
        let defaults = ActionTrackerOptions::default();
        let options = options.unwrap_or(&defaults);

        // 85% of the square inscribed in the circle's inner edge
        let container_size = memoize(|(diameter, stroke_width): (f64, f64)| {
            let inner_diameter = diameter - stroke_width * 2.0;
            precise(inner_diameter / 2f64.sqrt() * 0.85)
        });

        let circle_diameter = options.circle_diameter.unwrap_or(18.0);
        let circle_stroke_width = options.circle_stroke_width.unwrap_or(2.0);

        let config = ActionTrackerConfig {
            circle_diameter,
            circle_stroke_width,
            stroke: options
                .stroke
                .clone()
                .unwrap_or_else(|| "#7DB0D5".to_string()),
            stroke_success: options
                .stroke_success
                .clone()
                .unwrap_or_else(|| "green".to_string()),
            checkmark_stroke_width: options.checkmark_stroke_width.unwrap_or(2.0),
            checkmark_container_size: container_size.call((circle_diameter, circle_stroke_width)),
        };

        Self {
            config,
            container_size,
        }
    }

    pub fn build(&self) -> ActionTrackerConfig {
        self.config.clone()
    }

    pub fn set_circle_diameter(&mut self, circle_diameter: f64) -> &mut Self {
        self.config.circle_diameter = circle_diameter;
        self.update_container_size();
        self
    }

    pub fn set_circle_stroke_width(&mut self, circle_stroke_width: f64) -> &mut Self {
        self.config.circle_stroke_width = circle_stroke_width;
        self.update_container_size();
        self
    }

    pub fn set_stroke(&mut self, stroke: impl Into<String>) -> &mut Self {
        self.config.stroke = stroke.into();
        self
    }

    pub fn set_stroke_success(&mut self, stroke_success: impl Into<String>) -> &mut Self {
        self.config.stroke_success = stroke_success.into();
        self
    }

    pub fn set_checkmark_stroke_width(&mut self, checkmark_stroke_width: f64) -> &mut Self {
        self.config.checkmark_stroke_width = checkmark_stroke_width;
        self
    }

    fn update_container_size(&mut self) {
        let c = &mut self.config;
        c.checkmark_container_size = self
            .container_size
            .call((c.circle_diameter, c.circle_stroke_width));
    }
}

impl Default for ActionTrackerConfigBuilder {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Changed inputs, as reported by the rendering collaborator
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionTrackerChanges {
    /// Replace the options; fields missing here fall back to the defaults
    pub options: Option<ActionTrackerOptions>,
    pub circle_diameter: Option<f64>,
    pub circle_stroke_width: Option<f64>,
    pub stroke: Option<String>,
    pub stroke_success: Option<String>,
    pub checkmark_stroke_width: Option<f64>,
}

// ============================================================================
// Tracker
// ============================================================================

/// Sub-widgets created by [`ActionTracker::mount`]
struct Mounted {
    spinner: ProgressSpinner,
    checkmark: Checkmark,
}

struct TrackerInner {
    defaults: ActionTrackerOptions,
    builder: RefCell<ActionTrackerConfigBuilder>,
    config: RefCell<ActionTrackerConfig>,
    state: Cell<ActionTrackerState>,
    spinner: Rc<dyn SpinnerAccessor>,
    checkmark: Rc<dyn CheckmarkAccessor>,
    spinner_done: EventEmitter<SpinnerAnimationDone>,
    checkmark_done: EventEmitter<()>,
    animation_done: EventEmitter<()>,
    /// Sequence listeners that reset tears down
    pending: RefCell<Vec<Subscription>>,
    /// Sub-widgets still show the last completed sequence
    completed: Cell<bool>,
    mounted: RefCell<Option<Mounted>>,
    disposed: Cell<bool>,
}

/// Listen until `predicate` matches once, then unsubscribe
fn once_where<T, P, F>(emitter: &EventEmitter<T>, predicate: P, callback: F) -> Subscription
where
    T: 'static,
    P: Fn(&T) -> bool + 'static,
    F: FnOnce(&T) + 'static,
{
    let slot: Rc<OnceCell<Subscription>> = Rc::default();
    let own = slot.clone();
    let mut callback = Some(callback);

    let subscription = emitter.subscribe(move |value| {
        if !predicate(value) {
            return;
        }
        if let Some(subscription) = own.get() {
            subscription.unsubscribe();
        }
        if let Some(callback) = callback.take() {
            callback(value);
        }
    });
    let _ = slot.set(subscription.clone());
    subscription
}

/// Both halves of the finishing join
#[derive(Default)]
struct Join {
    spinner: Cell<bool>,
    checkmark: Cell<bool>,
    fired: Cell<bool>,
    subscriptions: RefCell<Vec<Subscription>>,
}

/// Action tracker widget
///
/// Clones are handles to the same tracker.
#[derive(Clone)]
pub struct ActionTracker {
    inner: Rc<TrackerInner>,
}

impl ActionTracker {
    /// Tracker over caller-provided sub-widgets
    ///
    /// The caller forwards the sub-widgets' completions to
    /// [`on_spinner_animation_done`](Self::on_spinner_animation_done) and
    /// [`on_checkmark_animation_done`](Self::on_checkmark_animation_done).
    pub fn new(
        spinner: Rc<dyn SpinnerAccessor>,
        checkmark: Rc<dyn CheckmarkAccessor>,
        defaults: Option<&ActionTrackerOptions>,
    ) -> Self {
        let defaults = defaults.cloned().unwrap_or_default();
        let builder = ActionTrackerConfigBuilder::new(Some(&defaults));
        let config = builder.build();

        Self {
            inner: Rc::new(TrackerInner {
                defaults,
                builder: RefCell::new(builder),
                config: RefCell::new(config),
                state: Cell::new(ActionTrackerState::Idle),
                spinner,
                checkmark,
                spinner_done: EventEmitter::new(),
                checkmark_done: EventEmitter::new(),
                animation_done: EventEmitter::new(),
                pending: RefCell::new(Vec::new()),
                completed: Cell::new(false),
                mounted: RefCell::new(None),
                disposed: Cell::new(false),
            }),
        }
    }

    /// Tracker with its own progress spinner and checkmark
    ///
    /// The sub-widgets take their shared defaults from `defaults`, with the
    /// geometry and colors controlled by the tracker on top.
    pub fn mount(driver: Rc<dyn AnimationDriver>, defaults: &ComponentDefaults) -> Self {
        let tracker_defaults = defaults.action_tracker.clone().unwrap_or_default();
        let config = ActionTrackerConfigBuilder::new(Some(&tracker_defaults)).build();

        let spinner_defaults = defaults.progress_spinner.clone().unwrap_or_default();
        let checkmark_defaults = defaults.checkmark.clone().unwrap_or_default();

        let spinner = ProgressSpinner::new(
            driver.clone(),
            Some(&spinner_defaults.merge(&Self::spinner_options(&config))),
        );
        let checkmark = Checkmark::new(
            driver,
            Some(&checkmark_defaults.merge(&Self::checkmark_options(&config))),
        );

        let tracker = Self::new(
            Rc::new(spinner.clone()),
            Rc::new(checkmark.clone()),
            Some(&tracker_defaults),
        );

        let weak = Rc::downgrade(&tracker.inner);
        spinner.animation_done().subscribe(move |event| {
            if let Some(tracker) = Self::upgrade(&weak) {
                tracker.on_spinner_animation_done(*event);
            }
        });
        let weak = Rc::downgrade(&tracker.inner);
        checkmark.animation_done().subscribe(move |_| {
            if let Some(tracker) = Self::upgrade(&weak) {
                tracker.on_checkmark_animation_done();
            }
        });

        spinner.initialize();
        checkmark.initialize();

        *tracker.inner.mounted.borrow_mut() = Some(Mounted { spinner, checkmark });
        tracker
    }

    fn upgrade(weak: &Weak<TrackerInner>) -> Option<ActionTracker> {
        weak.upgrade().map(|inner| ActionTracker { inner })
    }

    fn spinner_options(config: &ActionTrackerConfig) -> ProgressSpinnerOptions {
        ProgressSpinnerOptions {
            mode: Some(ProgressSpinnerMode::Indeterminate),
            diameter: Some(config.circle_diameter),
            stroke_width: Some(config.circle_stroke_width),
            stroke: Some(config.stroke.clone()),
            value: Some(0.0),
            play_on_init: Some(false),
            ..Default::default()
        }
    }

    fn checkmark_options(config: &ActionTrackerConfig) -> CheckmarkOptions {
        CheckmarkOptions {
            container_size: Some(config.checkmark_container_size()),
            stroke: Some(config.stroke_success.clone()),
            stroke_width: Some(config.checkmark_stroke_width),
            play_on_init: Some(false),
            ..Default::default()
        }
    }

    pub fn state(&self) -> ActionTrackerState {
        self.inner.state.get()
    }

    pub fn config(&self) -> ActionTrackerConfig {
        self.inner.config.borrow().clone()
    }

    /// Fires once per completed sequence
    pub fn animation_done(&self) -> &EventEmitter<()> {
        &self.inner.animation_done
    }

    /// Mounted spinner, if the tracker created its own sub-widgets
    pub fn spinner(&self) -> Option<ProgressSpinner> {
        self.inner
            .mounted
            .borrow()
            .as_ref()
            .map(|m| m.spinner.clone())
    }

    /// Mounted checkmark, if the tracker created its own sub-widgets
    pub fn checkmark(&self) -> Option<Checkmark> {
        self.inner
            .mounted
            .borrow()
            .as_ref()
            .map(|m| m.checkmark.clone())
    }

    pub fn on_inputs_changed(&self, changes: ActionTrackerChanges) {
        if self.inner.disposed.get() {
            return;
        }

        let config = {
            let mut builder = self.inner.builder.borrow_mut();
            if let Some(options) = &changes.options {
                *builder = ActionTrackerConfigBuilder::new(Some(&self.inner.defaults.merge(options)));
            }
            if let Some(diameter) = changes.circle_diameter {
                builder.set_circle_diameter(diameter);
            }
            if let Some(stroke_width) = changes.circle_stroke_width {
                builder.set_circle_stroke_width(stroke_width);
            }
            if let Some(stroke) = changes.stroke {
                builder.set_stroke(stroke);
            }
            if let Some(stroke_success) = changes.stroke_success {
                builder.set_stroke_success(stroke_success);
            }
            if let Some(width) = changes.checkmark_stroke_width {
                builder.set_checkmark_stroke_width(width);
            }
            builder.build()
        };
        *self.inner.config.borrow_mut() = config.clone();

        self.apply_to_mounted(&config);
    }

    /// Push geometry and colors down to mounted sub-widgets
    fn apply_to_mounted(&self, config: &ActionTrackerConfig) {
        let mounted = self.inner.mounted.borrow();
        let Some(mounted) = mounted.as_ref() else {
            return;
        };

        mounted.spinner.on_inputs_changed(ProgressSpinnerChanges {
            diameter: Some(config.circle_diameter),
            stroke_width: Some(config.circle_stroke_width),
            ..Default::default()
        });
        mounted.checkmark.on_inputs_changed(CheckmarkChanges {
            container_size: Some(config.checkmark_container_size()),
            stroke: Some(config.stroke_success.clone()),
            stroke_width: Some(config.checkmark_stroke_width),
            ..Default::default()
        });
    }

    /// Begin a sequence
    ///
    /// # Errors
    ///
    /// [`ActionTrackerError::AlreadyRunning`] unless the tracker is idle.
    pub fn start(&self) -> Result<()> {
        if self.state() != ActionTrackerState::Idle {
            return Err(ActionTrackerError::AlreadyRunning);
        }

        if self.inner.completed.replace(false) {
            self.restore_sub_widgets();
        }
        self.set_state(ActionTrackerState::Playing);
        self.inner.spinner.play();

        let weak = Rc::downgrade(&self.inner);
        let subscription = once_where(
            &self.inner.spinner_done,
            |event: &SpinnerAnimationDone| event.mode == ProgressSpinnerMode::Indeterminate,
            move |_| {
                let Some(tracker) = Self::upgrade(&weak) else {
                    return;
                };
                let stroke_success = tracker.inner.config.borrow().stroke_success.clone();
                tracker.inner.spinner.bind(&SpinnerBinding {
                    mode: ProgressSpinnerMode::Determinate,
                    stroke: stroke_success,
                    value: 100.0,
                });
                tracker.inner.checkmark.play();
            },
        );
        self.track(subscription);
        Ok(())
    }

    /// Let the running sequence complete
    ///
    /// # Errors
    ///
    /// [`ActionTrackerError::NotStarted`] when idle and
    /// [`ActionTrackerError::AlreadyFinishing`] when already finishing.
    pub fn finish(&self) -> Result<()> {
        match self.state() {
            ActionTrackerState::Playing => {}
            ActionTrackerState::Idle => return Err(ActionTrackerError::NotStarted),
            ActionTrackerState::Finishing => return Err(ActionTrackerError::AlreadyFinishing),
        }

        self.set_state(ActionTrackerState::Finishing);
        self.listen_animation_done();
        self.inner.spinner.finish();
        Ok(())
    }

    /// Return to a fresh idle tracker, abandoning any running sequence
    pub fn reset(&self) {
        self.teardown_pending();
        self.inner.completed.set(false);
        self.restore_sub_widgets();
        self.set_state(ActionTrackerState::Idle);
    }

    /// Spinner back to an idle indeterminate ring, checkmark hidden
    fn restore_sub_widgets(&self) {
        let stroke = self.inner.config.borrow().stroke.clone();
        self.inner.spinner.bind(&SpinnerBinding {
            mode: ProgressSpinnerMode::Indeterminate,
            stroke,
            value: 0.0,
        });
        self.inner.spinner.reset();
        self.inner.checkmark.reset();
    }

    /// Forward a spinner completion into the tracker
    pub fn on_spinner_animation_done(&self, event: SpinnerAnimationDone) {
        self.inner.spinner_done.emit(&event);
    }

    /// Forward a checkmark completion into the tracker
    pub fn on_checkmark_animation_done(&self) {
        self.inner.checkmark_done.emit(&());
    }

    /// Complete every channel and dispose mounted sub-widgets
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        self.teardown_pending();
        self.inner.spinner_done.complete();
        self.inner.checkmark_done.complete();
        self.inner.animation_done.complete();

        let mounted = self.inner.mounted.borrow_mut().take();
        if let Some(mounted) = mounted {
            mounted.spinner.dispose();
            mounted.checkmark.dispose();
        }
        tracing::debug!("ActionTracker: disposed");
    }

    fn set_state(&self, state: ActionTrackerState) {
        let previous = self.inner.state.replace(state);
        if previous != state {
            tracing::debug!(from = %previous, to = %state, "ActionTracker: state changed");
        }
    }

    fn track(&self, subscription: Subscription) {
        let mut pending = self.inner.pending.borrow_mut();
        pending.retain(|s| !s.is_closed());
        pending.push(subscription);
    }

    fn teardown_pending(&self) {
        let pending = std::mem::take(&mut *self.inner.pending.borrow_mut());
        for subscription in pending {
            subscription.unsubscribe();
        }
    }

    /// Wait for the determinate fill and the checkmark, in either order
    fn listen_animation_done(&self) {
        let join = Rc::new(Join::default());

        let weak = Rc::downgrade(&self.inner);
        let spinner_join = join.clone();
        let spinner_sub = self.inner.spinner_done.subscribe(move |event| {
            if event.mode != ProgressSpinnerMode::Determinate {
                return;
            }
            spinner_join.spinner.set(true);
            if let Some(tracker) = Self::upgrade(&weak) {
                tracker.try_complete(&spinner_join);
            }
        });

        let weak = Rc::downgrade(&self.inner);
        let checkmark_join = join.clone();
        let checkmark_sub = self.inner.checkmark_done.subscribe(move |_| {
            checkmark_join.checkmark.set(true);
            if let Some(tracker) = Self::upgrade(&weak) {
                tracker.try_complete(&checkmark_join);
            }
        });

        join.subscriptions
            .borrow_mut()
            .extend([spinner_sub.clone(), checkmark_sub.clone()]);
        self.track(spinner_sub);
        self.track(checkmark_sub);
    }

    fn try_complete(&self, join: &Join) {
        if !join.spinner.get() || !join.checkmark.get() || join.fired.replace(true) {
            return;
        }

        let subscriptions = std::mem::take(&mut *join.subscriptions.borrow_mut());
        for subscription in subscriptions {
            subscription.unsubscribe();
        }

        tracing::debug!("ActionTracker: sequence complete");
        self.inner.completed.set(true);
        self.inner.animation_done.emit(&());
        self.set_state(ActionTrackerState::Idle);
    }
}

impl fmt::Debug for ActionTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionTracker")
            .field("state", &self.state())
            .field("mounted", &self.inner.mounted.borrow().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSpinner {
        calls: RefCell<Vec<&'static str>>,
        bindings: RefCell<Vec<SpinnerBinding>>,
    }

    impl SpinnerAccessor for RecordingSpinner {
        fn play(&self) {
            self.calls.borrow_mut().push("play");
        }

        fn finish(&self) {
            self.calls.borrow_mut().push("finish");
        }

        fn reset(&self) {
            self.calls.borrow_mut().push("reset");
        }

        fn bind(&self, binding: &SpinnerBinding) {
            self.bindings.borrow_mut().push(binding.clone());
        }
    }

    #[derive(Default)]
    struct RecordingCheckmark {
        calls: RefCell<Vec<&'static str>>,
    }

    impl CheckmarkAccessor for RecordingCheckmark {
        fn play(&self) {
            self.calls.borrow_mut().push("play");
        }

        fn reset(&self) {
            self.calls.borrow_mut().push("reset");
        }
    }

    struct Fixture {
        tracker: ActionTracker,
        spinner: Rc<RecordingSpinner>,
        checkmark: Rc<RecordingCheckmark>,
        done: Rc<Cell<u32>>,
    }

    fn fixture() -> Fixture {
        let spinner = Rc::new(RecordingSpinner::default());
        let checkmark = Rc::new(RecordingCheckmark::default());
        let tracker = ActionTracker::new(spinner.clone(), checkmark.clone(), None);

        let done = Rc::new(Cell::new(0));
        let done_clone = done.clone();
        tracker
            .animation_done()
            .subscribe(move |_| done_clone.set(done_clone.get() + 1));

        Fixture {
            tracker,
            spinner,
            checkmark,
            done,
        }
    }

    const INDETERMINATE_DONE: SpinnerAnimationDone = SpinnerAnimationDone {
        mode: ProgressSpinnerMode::Indeterminate,
        value: None,
    };

    const DETERMINATE_DONE: SpinnerAnimationDone = SpinnerAnimationDone {
        mode: ProgressSpinnerMode::Determinate,
        value: Some(100.0),
    };

    #[test]
    fn test_default_config() {
        let config = ActionTrackerConfigBuilder::new(None).build();
        assert_eq!(config.circle_diameter, 18.0);
        assert_eq!(config.circle_stroke_width, 2.0);
        assert_eq!(config.stroke, "#7DB0D5");
        assert_eq!(config.stroke_success, "green");
        assert_eq!(config.checkmark_stroke_width, 2.0);
        assert_eq!(config.checkmark_container_size(), 8.415);
    }

    #[test]
    fn test_container_size_follows_circle() {
        let config = ActionTrackerConfigBuilder::new(Some(&ActionTrackerOptions {
            circle_diameter: Some(24.0),
            circle_stroke_width: Some(3.0),
            ..Default::default()
        }))
        .build();
        assert_eq!(config.checkmark_container_size(), 10.82);

        let mut builder = ActionTrackerConfigBuilder::new(None);
        assert_eq!(builder.set_circle_diameter(24.0).build().checkmark_container_size(), 12.02);

        let mut builder = ActionTrackerConfigBuilder::new(None);
        let config = builder.set_circle_stroke_width(3.0).build();
        assert_eq!(config.checkmark_container_size(), 7.212);

        let config = builder
            .set_stroke("black")
            .set_stroke_success("yellow")
            .set_checkmark_stroke_width(3.0)
            .build();
        assert_eq!(config.checkmark_container_size(), 7.212);
    }

    #[test]
    fn test_start_plays_spinner() {
        let f = fixture();
        f.tracker.start().unwrap();

        assert_eq!(*f.spinner.calls.borrow(), vec!["play"]);
        assert_eq!(f.tracker.state(), ActionTrackerState::Playing);
    }

    #[test]
    fn test_start_twice_fails() {
        let f = fixture();
        f.tracker.start().unwrap();

        let err = f.tracker.start().unwrap_err();
        assert_eq!(err, ActionTrackerError::AlreadyRunning);
        assert_eq!(err.to_string(), "Previous animation sequence hasn't finished yet");
        assert_eq!(f.tracker.state(), ActionTrackerState::Playing);
    }

    #[test]
    fn test_finish_guards() {
        let f = fixture();
        let err = f.tracker.finish().unwrap_err();
        assert_eq!(err, ActionTrackerError::NotStarted);
        assert_eq!(err.to_string(), "Animation sequence hasn't started yet");

        f.tracker.start().unwrap();
        f.tracker.finish().unwrap();
        let err = f.tracker.finish().unwrap_err();
        assert_eq!(err, ActionTrackerError::AlreadyFinishing);
        assert_eq!(err.to_string(), "Animation sequence is already scheduled to finish");
    }

    #[test]
    fn test_full_sequence() {
        let f = fixture();
        f.tracker.start().unwrap();
        f.tracker.finish().unwrap();

        assert_eq!(f.tracker.state(), ActionTrackerState::Finishing);
        assert_eq!(*f.spinner.calls.borrow(), vec!["play", "finish"]);

        f.tracker.on_spinner_animation_done(INDETERMINATE_DONE);
        assert_eq!(*f.checkmark.calls.borrow(), vec!["play"]);
        assert_eq!(
            *f.spinner.bindings.borrow(),
            vec![SpinnerBinding {
                mode: ProgressSpinnerMode::Determinate,
                stroke: "green".into(),
                value: 100.0,
            }]
        );

        f.tracker.on_spinner_animation_done(DETERMINATE_DONE);
        assert_eq!(f.done.get(), 0);
        f.tracker.on_checkmark_animation_done();

        assert_eq!(f.done.get(), 1);
        assert_eq!(f.tracker.state(), ActionTrackerState::Idle);
    }

    #[test]
    fn test_join_fires_once_in_either_order() {
        let f = fixture();
        f.tracker.start().unwrap();
        f.tracker.finish().unwrap();
        f.tracker.on_spinner_animation_done(INDETERMINATE_DONE);

        f.tracker.on_checkmark_animation_done();
        f.tracker.on_checkmark_animation_done();
        assert_eq!(f.done.get(), 0);
        f.tracker.on_spinner_animation_done(DETERMINATE_DONE);
        f.tracker.on_spinner_animation_done(DETERMINATE_DONE);
        f.tracker.on_checkmark_animation_done();

        assert_eq!(f.done.get(), 1);
        assert_eq!(f.tracker.state(), ActionTrackerState::Idle);
    }

    #[test]
    fn test_indeterminate_listener_fires_once() {
        let f = fixture();
        f.tracker.start().unwrap();

        // Determinate events do not trigger the switch
        f.tracker.on_spinner_animation_done(DETERMINATE_DONE);
        assert!(f.checkmark.calls.borrow().is_empty());

        f.tracker.on_spinner_animation_done(INDETERMINATE_DONE);
        f.tracker.on_spinner_animation_done(INDETERMINATE_DONE);
        assert_eq!(*f.checkmark.calls.borrow(), vec!["play"]);
        assert_eq!(f.spinner.bindings.borrow().len(), 1);
    }

    #[test]
    fn test_reset_restores_idle_spinner() {
        let f = fixture();
        f.tracker.start().unwrap();
        f.tracker.finish().unwrap();
        f.tracker.reset();

        assert_eq!(f.tracker.state(), ActionTrackerState::Idle);
        assert_eq!(*f.spinner.calls.borrow(), vec!["play", "finish", "reset"]);
        assert_eq!(*f.checkmark.calls.borrow(), vec!["reset"]);
        assert_eq!(
            f.spinner.bindings.borrow().last(),
            Some(&SpinnerBinding {
                mode: ProgressSpinnerMode::Indeterminate,
                stroke: "#7DB0D5".into(),
                value: 0.0,
            })
        );
        assert_eq!(f.done.get(), 0);
    }

    #[test]
    fn test_reset_tears_down_pending_listeners() {
        let f = fixture();
        f.tracker.start().unwrap();
        f.tracker.finish().unwrap();
        f.tracker.reset();

        // Late completions from the abandoned sequence are ignored
        f.tracker.on_spinner_animation_done(INDETERMINATE_DONE);
        f.tracker.on_spinner_animation_done(DETERMINATE_DONE);
        f.tracker.on_checkmark_animation_done();

        assert!(f.checkmark.calls.borrow().iter().all(|c| *c == "reset"));
        assert_eq!(f.done.get(), 0);
        assert_eq!(f.tracker.state(), ActionTrackerState::Idle);
        assert!(f.tracker.start().is_ok());
    }

    #[test]
    fn test_start_after_completion_restores_sub_widgets() {
        let f = fixture();
        f.tracker.start().unwrap();
        f.tracker.finish().unwrap();
        f.tracker.on_spinner_animation_done(INDETERMINATE_DONE);
        f.tracker.on_spinner_animation_done(DETERMINATE_DONE);
        f.tracker.on_checkmark_animation_done();
        assert_eq!(f.done.get(), 1);

        f.tracker.start().unwrap();
        assert_eq!(
            *f.spinner.calls.borrow(),
            vec!["play", "finish", "reset", "play"]
        );
        assert_eq!(*f.checkmark.calls.borrow(), vec!["play", "reset"]);
        assert_eq!(
            f.spinner.bindings.borrow().last(),
            Some(&SpinnerBinding {
                mode: ProgressSpinnerMode::Indeterminate,
                stroke: "#7DB0D5".into(),
                value: 0.0,
            })
        );

        f.tracker.finish().unwrap();
        f.tracker.on_spinner_animation_done(INDETERMINATE_DONE);
        f.tracker.on_checkmark_animation_done();
        f.tracker.on_spinner_animation_done(DETERMINATE_DONE);
        assert_eq!(f.done.get(), 2);
        assert_eq!(f.tracker.state(), ActionTrackerState::Idle);
    }

    #[test]
    fn test_inputs_change_merges_options_with_defaults() {
        let spinner = Rc::new(RecordingSpinner::default());
        let checkmark = Rc::new(RecordingCheckmark::default());
        let tracker = ActionTracker::new(
            spinner,
            checkmark,
            Some(&ActionTrackerOptions {
                stroke_success: Some("teal".into()),
                ..Default::default()
            }),
        );

        tracker.on_inputs_changed(ActionTrackerChanges {
            options: Some(ActionTrackerOptions {
                circle_diameter: Some(24.0),
                circle_stroke_width: Some(3.0),
                stroke: Some("grey".into()),
                ..Default::default()
            }),
            ..Default::default()
        });

        let config = tracker.config();
        assert_eq!(config.circle_diameter, 24.0);
        assert_eq!(config.circle_stroke_width, 3.0);
        assert_eq!(config.stroke, "grey");
        assert_eq!(config.stroke_success, "teal");
        assert_eq!(config.checkmark_container_size(), 10.82);

        tracker.on_inputs_changed(ActionTrackerChanges {
            checkmark_stroke_width: Some(3.0),
            ..Default::default()
        });
        assert_eq!(tracker.config().checkmark_stroke_width, 3.0);
    }

    #[test]
    fn test_dispose_completes_channels() {
        let f = fixture();
        f.tracker.start().unwrap();
        f.tracker.dispose();

        assert!(f.tracker.inner.spinner_done.is_stopped());
        assert!(f.tracker.inner.checkmark_done.is_stopped());
        assert!(f.tracker.animation_done().is_stopped());

        f.tracker.on_spinner_animation_done(INDETERMINATE_DONE);
        assert!(f.checkmark.calls.borrow().is_empty());
    }
}
