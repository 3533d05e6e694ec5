//! Checkmark
//!
//! A three-point polyline drawn into a square container by animating its
//! dash offset from `-dash_array` to `0`.

use crate::components::action_tracker::CheckmarkAccessor;
use arclet_animation::{
    animate, keyframes, style, Animation, AnimationDriver, AnimationPlayer, Easing, Timing,
};
use arclet_core::memo::{memoize, Memoized};
use arclet_core::numeric::precise;
use arclet_core::EventEmitter;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Partial checkmark options; unset fields take the defaults
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckmarkOptions {
    pub play_on_init: Option<bool>,
    pub container_size: Option<f64>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub timing: Option<Timing>,
}

impl CheckmarkOptions {
    /// Overlay `other` on top of `self`, field by field
    pub fn merge(&self, other: &CheckmarkOptions) -> CheckmarkOptions {
        CheckmarkOptions {
            play_on_init: other.play_on_init.or(self.play_on_init),
            container_size: other.container_size.or(self.container_size),
            stroke: other.stroke.clone().or_else(|| self.stroke.clone()),
            stroke_width: other.stroke_width.or(self.stroke_width),
            timing: other.timing.or(self.timing),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CheckmarkConfig {
    pub play_on_init: bool,
    pub container_size: f64,
    pub stroke: String,
    pub stroke_width: f64,
    pub timing: Timing,
    points: String,
    dash_array: f64,
}

impl CheckmarkConfig {
    /// Polyline `points` attribute
    pub fn points(&self) -> &str {
        &self.points
    }

    /// Length of the dash that hides the whole polyline
    pub fn dash_array(&self) -> f64 {
        self.dash_array
    }
}

/// Builds a [`CheckmarkConfig`], recomputing points and dash array as
/// their inputs change
pub struct CheckmarkConfigBuilder {
    config: CheckmarkConfig,
    points: Memoized<(f64, f64), String>,
    dash_array: Memoized<(f64,), f64>,
}

impl CheckmarkConfigBuilder {
    pub fn new(options: Option<&CheckmarkOptions>) -> Self {
        let defaults = CheckmarkOptions::default();
        let options = options.unwrap_or(&defaults);

        let points = memoize(|(size, stroke_width): (f64, f64)| {
            format!(
                "{} 0, {} {}, {} {}",
                size,
                precise(size * 0.4),
                size - stroke_width / 2.0,
                stroke_width / 2.0,
                precise(size * 0.6)
            )
        });
        let dash_array = memoize(|(size,): (f64,)| size * 2.0);

        let container_size = options.container_size.unwrap_or(8.0);
        let stroke_width = options.stroke_width.unwrap_or(2.0);

        let config = CheckmarkConfig {
            play_on_init: options.play_on_init.unwrap_or(true),
            container_size,
            stroke: options.stroke.clone().unwrap_or_else(|| "green".to_string()),
            stroke_width,
            timing: options.timing.unwrap_or_else(|| {
                Timing::new(Duration::from_millis(225)).with_easing(Easing::Linear)
            }),
            points: points.call((container_size, stroke_width)),
            dash_array: dash_array.call((container_size,)),
        };

        Self {
            config,
            points,
            dash_array,
        }
    }

    pub fn build(&self) -> CheckmarkConfig {
        self.config.clone()
    }

    pub fn set_play_on_init(&mut self, play_on_init: bool) -> &mut Self {
        self.config.play_on_init = play_on_init;
        self
    }

    pub fn set_container_size(&mut self, container_size: f64) -> &mut Self {
        self.config.container_size = container_size;
        self.config.dash_array = self.dash_array.call((container_size,));
        self.update_points();
        self
    }

    pub fn set_stroke(&mut self, stroke: impl Into<String>) -> &mut Self {
        self.config.stroke = stroke.into();
        self
    }

    pub fn set_stroke_width(&mut self, stroke_width: f64) -> &mut Self {
        self.config.stroke_width = stroke_width;
        self.update_points();
        self
    }

    pub fn set_timing(&mut self, timing: Timing) -> &mut Self {
        self.config.timing = timing;
        self
    }

    fn update_points(&mut self) {
        self.config.points = self
            .points
            .call((self.config.container_size, self.config.stroke_width));
    }
}

impl Default for CheckmarkConfigBuilder {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Memoized draw animation
pub struct CheckmarkAnimations {
    checkmark: Memoized<(f64, Timing), Animation>,
}

impl CheckmarkAnimations {
    pub fn new() -> Self {
        Self {
            checkmark: memoize(|(dash_array, timing): (f64, Timing)| {
                Animation::new(vec![animate(
                    timing,
                    keyframes(vec![
                        style([("stroke-dashoffset", format!("-{dash_array}"))]),
                        style([("stroke-dashoffset", "0")]),
                    ]),
                )])
            }),
        }
    }

    pub fn checkmark(&self, dash_array: f64, timing: Timing) -> Animation {
        self.checkmark.call((dash_array, timing))
    }
}

impl Default for CheckmarkAnimations {
    fn default() -> Self {
        Self::new()
    }
}

/// Changed inputs, as reported by the rendering collaborator
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CheckmarkChanges {
    /// Replace the options; fields missing here fall back to the defaults
    pub options: Option<CheckmarkOptions>,
    pub play_on_init: Option<bool>,
    pub container_size: Option<f64>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub timing: Option<Timing>,
}

struct CheckmarkView {
    builder: CheckmarkConfigBuilder,
    config: CheckmarkConfig,
    dash_offset: f64,
}

struct CheckmarkInner {
    driver: Rc<dyn AnimationDriver>,
    defaults: CheckmarkOptions,
    animations: CheckmarkAnimations,
    view: RefCell<CheckmarkView>,
    player: RefCell<Option<Box<dyn AnimationPlayer>>>,
    initialized: Cell<bool>,
    disposed: Cell<bool>,
    animation_done: EventEmitter<()>,
}

/// Checkmark widget
///
/// Clones are handles to the same widget.
#[derive(Clone)]
pub struct Checkmark {
    inner: Rc<CheckmarkInner>,
}

impl Checkmark {
    pub fn new(driver: Rc<dyn AnimationDriver>, defaults: Option<&CheckmarkOptions>) -> Self {
        let defaults = defaults.cloned().unwrap_or_default();
        let builder = CheckmarkConfigBuilder::new(Some(&defaults));
        let config = builder.build();
        let dash_offset = -config.dash_array();

        Self {
            inner: Rc::new(CheckmarkInner {
                driver,
                defaults,
                animations: CheckmarkAnimations::new(),
                view: RefCell::new(CheckmarkView {
                    builder,
                    config,
                    dash_offset,
                }),
                player: RefCell::new(None),
                initialized: Cell::new(false),
                disposed: Cell::new(false),
                animation_done: EventEmitter::new(),
            }),
        }
    }

    pub fn config(&self) -> CheckmarkConfig {
        self.inner.view.borrow().config.clone()
    }

    /// Currently rendered dash offset; `-dash_array` hides the polyline
    pub fn dash_offset(&self) -> f64 {
        self.inner.view.borrow().dash_offset
    }

    pub fn is_playing(&self) -> bool {
        self.inner.player.borrow().is_some()
    }

    pub fn animation_done(&self) -> &EventEmitter<()> {
        &self.inner.animation_done
    }

    pub fn initialize(&self) {
        if self.inner.disposed.get() || self.inner.initialized.replace(true) {
            return;
        }
        if self.config().play_on_init {
            self.play();
        }
    }

    pub fn on_inputs_changed(&self, changes: CheckmarkChanges) {
        if self.inner.disposed.get() {
            return;
        }

        let mut view = self.inner.view.borrow_mut();
        if let Some(options) = &changes.options {
            view.builder = CheckmarkConfigBuilder::new(Some(&self.inner.defaults.merge(options)));
        }

        let builder = &mut view.builder;
        if let Some(play_on_init) = changes.play_on_init {
            builder.set_play_on_init(play_on_init);
        }
        if let Some(size) = changes.container_size {
            builder.set_container_size(size);
        }
        if let Some(stroke) = changes.stroke {
            builder.set_stroke(stroke);
        }
        if let Some(stroke_width) = changes.stroke_width {
            builder.set_stroke_width(stroke_width);
        }
        if let Some(timing) = changes.timing {
            builder.set_timing(timing);
        }

        let config = builder.build();
        view.dash_offset = -config.dash_array();
        view.config = config;
    }

    /// Draw the checkmark from scratch
    pub fn play(&self) {
        if self.inner.disposed.get() {
            tracing::debug!("Checkmark: play after dispose ignored");
            return;
        }
        self.destroy_player();

        let config = self.config();
        let animation = self
            .inner
            .animations
            .checkmark(config.dash_array(), config.timing);
        let player = self.inner.driver.create_player(&animation, "polyline");
        let weak = Rc::downgrade(&self.inner);

        player.on_done(Box::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.view.borrow_mut().dash_offset = 0.0;
            let checkmark = Checkmark { inner };
            checkmark.destroy_player();
            tracing::debug!("Checkmark: drawn");
            checkmark.inner.animation_done.emit(&());
        }));

        player.play();
        *self.inner.player.borrow_mut() = Some(player);
    }

    /// Hide the checkmark again
    pub fn reset(&self) {
        {
            let mut view = self.inner.view.borrow_mut();
            view.dash_offset = -view.config.dash_array();
        }
        self.destroy_player();
    }

    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        self.destroy_player();
        self.inner.animation_done.complete();
        tracing::debug!("Checkmark: disposed");
    }

    fn destroy_player(&self) {
        let player = self.inner.player.borrow_mut().take();
        if let Some(player) = player {
            player.destroy();
        }
    }
}

impl fmt::Debug for Checkmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.inner.view.borrow();
        f.debug_struct("Checkmark")
            .field("points", &view.config.points)
            .field("dash_offset", &view.dash_offset)
            .field("playing", &self.is_playing())
            .finish()
    }
}

impl CheckmarkAccessor for Checkmark {
    fn play(&self) {
        Checkmark::play(self);
    }

    fn reset(&self) {
        Checkmark::reset(self);
    }
}
