//! Progress spinner
//!
//! A stroked circle that either spins forever (indeterminate mode) or
//! fills up to a percentage (determinate mode).
//!
//! The indeterminate spin loops cycle after cycle. Calling
//! [`ProgressSpinner::finish`] lets the current cycle run to its end, then
//! the spinner stops and reports through [`ProgressSpinner::animation_done`].
//!
//! # Example
//!
//! ```rust
//! use arclet_animation::AnimationScheduler;
//! use arclet_ui::components::progress_spinner::{ProgressSpinner, ProgressSpinnerOptions};
//! use std::rc::Rc;
//! use std::time::Duration;
//!
//! let scheduler = AnimationScheduler::new();
//! let spinner = ProgressSpinner::new(Rc::new(scheduler.handle()), None);
//!
//! spinner.initialize();
//! spinner.finish();
//! scheduler.advance(Duration::from_secs(1));
//!
//! assert!(!spinner.is_playing());
//! ```

use crate::components::action_tracker::{SpinnerAccessor, SpinnerBinding};
use crate::components::spinner::{DashArray, SpinnerSvgBuilder};
use arclet_animation::{
    animate, keyframes, style, Animation, AnimationDriver, AnimationPlayer, Timing,
};
use arclet_core::memo::{memoize, Memoized};
use arclet_core::numeric::clamp_percent;
use arclet_core::EventEmitter;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

// ============================================================================
// Options and config
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressSpinnerMode {
    #[default]
    Indeterminate,
    Determinate,
}

impl fmt::Display for ProgressSpinnerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressSpinnerMode::Indeterminate => f.write_str("indeterminate"),
            ProgressSpinnerMode::Determinate => f.write_str("determinate"),
        }
    }
}

/// Partial progress spinner options; unset fields take the defaults
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProgressSpinnerOptions {
    pub mode: Option<ProgressSpinnerMode>,
    pub diameter: Option<f64>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    /// Shortest arc as a fraction of the circumference
    pub min: Option<f64>,
    /// Longest arc as a fraction of the circumference
    pub max: Option<f64>,
    pub indeterminate_timing: Option<Timing>,
    pub determinate_timing: Option<Timing>,
    pub value: Option<f64>,
    pub play_on_init: Option<bool>,
}

impl ProgressSpinnerOptions {
    /// Overlay `other` on top of `self`, field by field
    pub fn merge(&self, other: &ProgressSpinnerOptions) -> ProgressSpinnerOptions {
        ProgressSpinnerOptions {
            mode: other.mode.or(self.mode),
            diameter: other.diameter.or(self.diameter),
            stroke: other.stroke.clone().or_else(|| self.stroke.clone()),
            stroke_width: other.stroke_width.or(self.stroke_width),
            min: other.min.or(self.min),
            max: other.max.or(self.max),
            indeterminate_timing: other.indeterminate_timing.or(self.indeterminate_timing),
            determinate_timing: other.determinate_timing.or(self.determinate_timing),
            value: other.value.or(self.value),
            play_on_init: other.play_on_init.or(self.play_on_init),
        }
    }
}

fn default_indeterminate_timing() -> Timing {
    Timing::new(Duration::from_secs(1)).with_easing(arclet_animation::Easing::Linear)
}

fn default_determinate_timing() -> Timing {
    Timing::new(Duration::from_millis(225)).with_easing(arclet_animation::Easing::Linear)
}

/// Snapshot of a progress spinner's configuration
///
/// Raw fields are public. Derived fields are read through accessors and
/// only change through [`ProgressSpinnerConfigBuilder`].
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressSpinnerConfig {
    pub mode: ProgressSpinnerMode,
    pub play_on_init: bool,
    pub value: f64,
    pub diameter: f64,
    pub stroke: String,
    pub stroke_width: f64,
    pub min: f64,
    pub max: f64,
    pub indeterminate_timing: Timing,
    pub determinate_timing: Timing,
    radius: f64,
    stroke_circumference: f64,
    dash_array: DashArray,
    dash_offset: f64,
}

impl ProgressSpinnerConfig {
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn stroke_circumference(&self) -> f64 {
        self.stroke_circumference
    }

    pub fn dash_array(&self) -> DashArray {
        self.dash_array
    }

    /// Dash offset for the current value; the full circumference at 0
    pub fn dash_offset(&self) -> f64 {
        self.dash_offset
    }
}

// ============================================================================
// Config builder
// ============================================================================

struct Derivations {
    radius: Memoized<(f64, f64), f64>,
    circumference: Memoized<(f64, f64), f64>,
    dash_array: Memoized<(f64, f64, f64), DashArray>,
    dash_offset: Memoized<(f64, f64), f64>,
}

impl Derivations {
    fn new() -> Self {
        Self {
            radius: memoize(|(diameter, stroke_width): (f64, f64)| {
                SpinnerSvgBuilder::svg_circle_radius(diameter, stroke_width)
            }),
            circumference: memoize(|(diameter, stroke_width): (f64, f64)| {
                SpinnerSvgBuilder::circumference(diameter, stroke_width)
            }),
            dash_array: memoize(|(circumference, min, max): (f64, f64, f64)| {
                SpinnerSvgBuilder::circle_dash_array(circumference, min, max)
            }),
            dash_offset: memoize(|(circumference, value): (f64, f64)| {
                circumference * ((100.0 - value) / 100.0)
            }),
        }
    }
}

/// Keeps a [`ProgressSpinnerConfig`] consistent while single fields change
pub struct ProgressSpinnerConfigBuilder {
    config: ProgressSpinnerConfig,
    derive: Derivations,
}

impl ProgressSpinnerConfigBuilder {
    pub fn new(options: Option<&ProgressSpinnerOptions>) -> Self {
        let defaults = ProgressSpinnerOptions::default();
        let options = options.unwrap_or(&defaults);
        let derive = Derivations::new();

        let diameter = options.diameter.unwrap_or(18.0);
        let stroke_width = options.stroke_width.unwrap_or(2.0);
        let min = options.min.unwrap_or(0.0);
        let max = options.max.unwrap_or(0.5);
        let value = clamp_percent(options.value.unwrap_or(0.0));

        let stroke_circumference = derive.circumference.call((diameter, stroke_width));

        let config = ProgressSpinnerConfig {
            mode: options.mode.unwrap_or_default(),
            play_on_init: options.play_on_init.unwrap_or(true),
            value,
            diameter,
            stroke: options
                .stroke
                .clone()
                .unwrap_or_else(|| "#7DB0D5".to_string()),
            stroke_width,
            min,
            max,
            indeterminate_timing: options
                .indeterminate_timing
                .unwrap_or_else(default_indeterminate_timing),
            determinate_timing: options
                .determinate_timing
                .unwrap_or_else(default_determinate_timing),
            radius: derive.radius.call((diameter, stroke_width)),
            stroke_circumference,
            dash_array: derive.dash_array.call((stroke_circumference, min, max)),
            dash_offset: derive.dash_offset.call((stroke_circumference, value)),
        };

        Self { config, derive }
    }

    pub fn build(&self) -> ProgressSpinnerConfig {
        self.config.clone()
    }

    pub fn set_mode(&mut self, mode: ProgressSpinnerMode) -> &mut Self {
        self.config.mode = mode;
        self
    }

    pub fn set_play_on_init(&mut self, play_on_init: bool) -> &mut Self {
        self.config.play_on_init = play_on_init;
        self
    }

    pub fn set_diameter(&mut self, diameter: f64) -> &mut Self {
        self.config.diameter = diameter;
        self.update_geometry();
        self
    }

    pub fn set_stroke(&mut self, stroke: impl Into<String>) -> &mut Self {
        self.config.stroke = stroke.into();
        self
    }

    pub fn set_stroke_width(&mut self, stroke_width: f64) -> &mut Self {
        self.config.stroke_width = stroke_width;
        self.update_geometry();
        self
    }

    pub fn set_min(&mut self, min: f64) -> &mut Self {
        self.config.min = min;
        self.update_dash_array();
        self
    }

    pub fn set_max(&mut self, max: f64) -> &mut Self {
        self.config.max = max;
        self.update_dash_array();
        self
    }

    pub fn set_indeterminate_timing(&mut self, timing: Timing) -> &mut Self {
        self.config.indeterminate_timing = timing;
        self
    }

    pub fn set_determinate_timing(&mut self, timing: Timing) -> &mut Self {
        self.config.determinate_timing = timing;
        self
    }

    /// Values outside `[0, 100]` are clamped
    pub fn set_value(&mut self, value: f64) -> &mut Self {
        self.config.value = clamp_percent(value);
        self.update_dash_offset();
        self
    }

    fn update_geometry(&mut self) {
        let c = &mut self.config;
        c.radius = self.derive.radius.call((c.diameter, c.stroke_width));
        c.stroke_circumference = self.derive.circumference.call((c.diameter, c.stroke_width));
        self.update_dash_array();
        self.update_dash_offset();
    }

    fn update_dash_array(&mut self) {
        let c = &mut self.config;
        c.dash_array = self
            .derive
            .dash_array
            .call((c.stroke_circumference, c.min, c.max));
    }

    fn update_dash_offset(&mut self) {
        let c = &mut self.config;
        c.dash_offset = self
            .derive
            .dash_offset
            .call((c.stroke_circumference, c.value));
    }
}

impl Default for ProgressSpinnerConfigBuilder {
    fn default() -> Self {
        Self::new(None)
    }
}

// ============================================================================
// Animations
// ============================================================================

/// Memoized animation factories of the progress spinner
pub struct ProgressSpinnerAnimations {
    indeterminate: Memoized<(f64, f64, f64, Timing), Animation>,
    determinate: Memoized<(f64, Timing), Animation>,
}

impl ProgressSpinnerAnimations {
    pub fn new() -> Self {
        Self {
            indeterminate: memoize(|(min, max, full, timing): (f64, f64, f64, Timing)| {
                Animation::new(vec![animate(
                    timing,
                    keyframes(vec![
                        style([
                            ("transform", "rotate(0)".to_string()),
                            ("stroke-dasharray", format!("{min} {full}")),
                        ]),
                        style([
                            ("transform", "rotate(180deg)".to_string()),
                            ("stroke-dasharray", format!("{max} {max}")),
                        ]),
                        style([
                            ("transform", "rotate(720deg)".to_string()),
                            ("stroke-dasharray", format!("{min} {full}")),
                        ]),
                    ]),
                )])
            }),
            determinate: memoize(|(finish, timing): (f64, Timing)| {
                Animation::new(vec![animate(
                    timing,
                    style([("stroke-dashoffset", finish.to_string())]),
                )])
            }),
        }
    }

    /// One spin cycle: the arc grows from `min` to `max` and shrinks back
    pub fn indeterminate(&self, min: f64, max: f64, full: f64, timing: Timing) -> Animation {
        self.indeterminate.call((min, max, full, timing))
    }

    /// Fill the circle up to the dash offset `finish`
    pub fn determinate(&self, finish: f64, timing: Timing) -> Animation {
        self.determinate.call((finish, timing))
    }
}

impl Default for ProgressSpinnerAnimations {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Widget
// ============================================================================

/// Payload of [`ProgressSpinner::animation_done`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpinnerAnimationDone {
    pub mode: ProgressSpinnerMode,
    /// Reached value, only set in determinate mode
    pub value: Option<f64>,
}

/// Changed inputs, as reported by the rendering collaborator
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProgressSpinnerChanges {
    /// Replace the options; fields missing here fall back to the defaults
    pub options: Option<ProgressSpinnerOptions>,
    pub mode: Option<ProgressSpinnerMode>,
    pub diameter: Option<f64>,
    pub stroke_width: Option<f64>,
    pub stroke: Option<String>,
    pub indeterminate_timing: Option<Timing>,
    pub determinate_timing: Option<Timing>,
    pub value: Option<f64>,
    pub play_on_init: Option<bool>,
}

struct SpinnerView {
    builder: ProgressSpinnerConfigBuilder,
    config: ProgressSpinnerConfig,
    /// Rendered offset, which trails the config while animating
    dash_offset: f64,
}

struct ProgressSpinnerInner {
    driver: Rc<dyn AnimationDriver>,
    defaults: ProgressSpinnerOptions,
    animations: ProgressSpinnerAnimations,
    view: RefCell<SpinnerView>,
    player: RefCell<Option<Box<dyn AnimationPlayer>>>,
    should_finish: Cell<bool>,
    initialized: Cell<bool>,
    disposed: Cell<bool>,
    animation_done: EventEmitter<SpinnerAnimationDone>,
}

/// Progress spinner widget
///
/// Clones are handles to the same widget.
#[derive(Clone)]
pub struct ProgressSpinner {
    inner: Rc<ProgressSpinnerInner>,
}

impl ProgressSpinner {
    pub fn new(driver: Rc<dyn AnimationDriver>, defaults: Option<&ProgressSpinnerOptions>) -> Self {
        let defaults = defaults.cloned().unwrap_or_default();
        let builder = ProgressSpinnerConfigBuilder::new(Some(&defaults));
        let config = builder.build();
        let dash_offset = config.stroke_circumference();

        Self {
            inner: Rc::new(ProgressSpinnerInner {
                driver,
                defaults,
                animations: ProgressSpinnerAnimations::new(),
                view: RefCell::new(SpinnerView {
                    builder,
                    config,
                    dash_offset,
                }),
                player: RefCell::new(None),
                should_finish: Cell::new(false),
                initialized: Cell::new(false),
                disposed: Cell::new(false),
                animation_done: EventEmitter::new(),
            }),
        }
    }

    pub fn config(&self) -> ProgressSpinnerConfig {
        self.inner.view.borrow().config.clone()
    }

    /// Currently rendered dash offset
    pub fn dash_offset(&self) -> f64 {
        self.inner.view.borrow().dash_offset
    }

    pub fn is_playing(&self) -> bool {
        self.inner.player.borrow().is_some()
    }

    /// Completion channel
    pub fn animation_done(&self) -> &EventEmitter<SpinnerAnimationDone> {
        &self.inner.animation_done
    }

    /// Call once the widget is rendered; plays if `play_on_init` is set
    pub fn initialize(&self) {
        if self.inner.disposed.get() || self.inner.initialized.replace(true) {
            return;
        }
        if self.config().play_on_init {
            self.play();
        }
    }

    pub fn on_inputs_changed(&self, changes: ProgressSpinnerChanges) {
        if self.inner.disposed.get() {
            return;
        }

        let mode = {
            let mut view = self.inner.view.borrow_mut();
            if let Some(options) = &changes.options {
                view.builder =
                    ProgressSpinnerConfigBuilder::new(Some(&self.inner.defaults.merge(options)));
            }

            let builder = &mut view.builder;
            if let Some(mode) = changes.mode {
                builder.set_mode(mode);
            }
            if let Some(diameter) = changes.diameter {
                builder.set_diameter(diameter);
            }
            if let Some(stroke_width) = changes.stroke_width {
                builder.set_stroke_width(stroke_width);
            }
            if let Some(stroke) = &changes.stroke {
                builder.set_stroke(stroke.as_str());
            }
            if let Some(timing) = changes.indeterminate_timing {
                builder.set_indeterminate_timing(timing);
            }
            if let Some(timing) = changes.determinate_timing {
                builder.set_determinate_timing(timing);
            }
            if let Some(value) = changes.value {
                builder.set_value(value);
            }
            if let Some(play_on_init) = changes.play_on_init {
                builder.set_play_on_init(play_on_init);
            }

            let config = builder.build();
            view.dash_offset = config.stroke_circumference();
            view.config = config;
            view.config.mode
        };

        // Value changes before the first render only configure
        if mode == ProgressSpinnerMode::Determinate
            && changes.value.is_some()
            && self.inner.initialized.get()
        {
            self.play();
        }
    }

    /// Restart the animation of the current mode
    pub fn play(&self) {
        if self.inner.disposed.get() {
            tracing::debug!("ProgressSpinner: play after dispose ignored");
            return;
        }
        self.destroy_player();

        let config = self.config();
        match config.mode {
            ProgressSpinnerMode::Indeterminate => {
                let DashArray { min, max, full } = config.dash_array();
                let animation = self.inner.animations.indeterminate(
                    min,
                    max,
                    full,
                    config.indeterminate_timing,
                );
                self.spin(animation);
            }
            ProgressSpinnerMode::Determinate => {
                let animation = self
                    .inner
                    .animations
                    .determinate(config.dash_offset(), config.determinate_timing);
                self.fill(animation, config.dash_offset());
            }
        }
    }

    /// Stop spinning once the current cycle completes
    pub fn finish(&self) {
        self.inner.should_finish.set(true);
    }

    pub fn reset(&self) {
        self.inner.should_finish.set(false);
        {
            let mut view = self.inner.view.borrow_mut();
            view.dash_offset = view.config.stroke_circumference();
        }
        self.destroy_player();
    }

    /// Release the player and close the completion channel
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        self.destroy_player();
        self.inner.animation_done.complete();
        tracing::debug!("ProgressSpinner: disposed");
    }

    fn spin(&self, animation: Animation) {
        let player = self.inner.driver.create_player(&animation, "circle");
        let weak = Rc::downgrade(&self.inner);

        player.on_done(Box::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let spinner = ProgressSpinner { inner };
            spinner.destroy_player();

            if spinner.inner.should_finish.get() {
                let mode = spinner.inner.view.borrow().config.mode;
                tracing::debug!("ProgressSpinner: indeterminate cycle finished");
                spinner
                    .inner
                    .animation_done
                    .emit(&SpinnerAnimationDone { mode, value: None });
            } else {
                spinner.spin(animation);
            }
        }));

        self.start_player(player);
    }

    fn fill(&self, animation: Animation, dash_offset: f64) {
        let player = self.inner.driver.create_player(&animation, "circle");
        let weak = Rc::downgrade(&self.inner);

        player.on_done(Box::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let spinner = ProgressSpinner { inner };
            let event = {
                let mut view = spinner.inner.view.borrow_mut();
                view.dash_offset = dash_offset;
                SpinnerAnimationDone {
                    mode: view.config.mode,
                    value: Some(view.config.value),
                }
            };
            spinner.destroy_player();
            tracing::debug!(value = ?event.value, "ProgressSpinner: determinate fill finished");
            spinner.inner.animation_done.emit(&event);
        }));

        self.start_player(player);
    }

    fn start_player(&self, player: Box<dyn AnimationPlayer>) {
        player.play();
        *self.inner.player.borrow_mut() = Some(player);
    }

    fn destroy_player(&self) {
        let player = self.inner.player.borrow_mut().take();
        if let Some(player) = player {
            player.destroy();
        }
    }
}

impl fmt::Debug for ProgressSpinner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.inner.view.borrow();
        f.debug_struct("ProgressSpinner")
            .field("mode", &view.config.mode)
            .field("value", &view.config.value)
            .field("dash_offset", &view.dash_offset)
            .field("playing", &self.is_playing())
            .finish()
    }
}

impl SpinnerAccessor for ProgressSpinner {
    fn play(&self) {
        ProgressSpinner::play(self);
    }

    fn finish(&self) {
        ProgressSpinner::finish(self);
    }

    fn reset(&self) {
        ProgressSpinner::reset(self);
    }

    fn bind(&self, binding: &SpinnerBinding) {
        self.on_inputs_changed(ProgressSpinnerChanges {
            mode: Some(binding.mode),
            stroke: Some(binding.stroke.clone()),
            value: Some(binding.value),
            ..Default::default()
        });
    }
}
