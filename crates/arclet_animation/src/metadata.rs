//! Declarative animation descriptions
//!
//! An [`Animation`] is an immutable list of steps. Each step animates a
//! target element's style properties over a [`Timing`], either towards a
//! single [`Style`] or through a sequence of keyframes spread evenly over
//! the step.
//!
//! ```rust
//! use arclet_animation::metadata::{animate, keyframes, style, Animation};
//!
//! let timing = "0.225s linear".parse().unwrap();
//! let draw = Animation::new(vec![animate(
//!     timing,
//!     keyframes(vec![
//!         style([("stroke-dashoffset", "-16")]),
//!         style([("stroke-dashoffset", "0")]),
//!     ]),
//! )]);
//!
//! assert_eq!(draw.duration().as_millis(), 225);
//! ```

use crate::timing::Timing;
use indexmap::IndexMap;
use std::rc::Rc;
use std::time::Duration;

/// Ordered style property map
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Style {
    properties: IndexMap<String, String>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(property.into(), value.into());
        self
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Style
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            properties: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Target styles of one step
#[derive(Clone, Debug, PartialEq)]
pub enum StepStyles {
    /// Animate from the current style to this one
    Style(Style),
    /// Pass through every keyframe, evenly spaced
    Keyframes(Vec<Style>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum AnimationStep {
    Animate { timing: Timing, styles: StepStyles },
}

impl AnimationStep {
    pub fn timing(&self) -> &Timing {
        match self {
            AnimationStep::Animate { timing, .. } => timing,
        }
    }
}

/// Immutable, cheaply cloneable animation description
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    steps: Rc<[AnimationStep]>,
}

impl Animation {
    pub fn new(steps: Vec<AnimationStep>) -> Self {
        Self {
            steps: steps.into(),
        }
    }

    pub fn steps(&self) -> &[AnimationStep] {
        &self.steps
    }

    /// Sum of every step's delay and duration
    pub fn duration(&self) -> Duration {
        self.steps.iter().map(|step| step.timing().total()).sum()
    }

    /// True when both values share the same step list
    pub fn ptr_eq(&self, other: &Animation) -> bool {
        Rc::ptr_eq(&self.steps, &other.steps)
    }
}

/// Build a [`Style`] from property/value pairs
pub fn style<K, V, I>(properties: I) -> Style
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    properties.into_iter().collect()
}

pub fn keyframes(frames: Vec<Style>) -> StepStyles {
    StepStyles::Keyframes(frames)
}

pub fn animate(timing: Timing, styles: impl Into<StepStyles>) -> AnimationStep {
    AnimationStep::Animate {
        timing,
        styles: styles.into(),
    }
}

impl From<Style> for StepStyles {
    fn from(style: Style) -> Self {
        StepStyles::Style(style)
    }
}
