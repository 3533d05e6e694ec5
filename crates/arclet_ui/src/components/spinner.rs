//! Spinner geometry
//!
//! The single-SVG spinner draws one stroked circle and, optionally, a
//! checkmark polyline inside it. Everything it needs to render is derived
//! here from a [`SpinnerConfig`].
//!
//! # Example
//!
//! ```rust
//! use arclet_ui::components::spinner::{SpinnerConfig, SpinnerOptions, SpinnerSvgBuilder};
//!
//! let config = SpinnerConfig::new(&SpinnerOptions::default());
//! let svg = SpinnerSvgBuilder::build(&config);
//!
//! assert_eq!(svg.center, 9.0);
//! assert_eq!(svg.radius, 8.0);
//! assert!(svg.checkmark_points.is_none());
//! ```

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Partial spinner options; unset fields take the defaults
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpinnerOptions {
    pub circle_diameter: Option<f64>,
    pub circle_stroke: Option<String>,
    pub circle_stroke_success: Option<String>,
    pub circle_stroke_width: Option<f64>,
    pub circle_stroke_min_fracture: Option<f64>,
    pub circle_stroke_max_fracture: Option<f64>,
    /// Seconds per spin
    pub spinning_timing: Option<f64>,
    pub with_checkmark: Option<bool>,
    pub checkmark_stroke_width: Option<f64>,
    pub checkmark_stroke: Option<String>,
    pub checkmark_distance: Option<f64>,
    /// Seconds to draw the checkmark
    pub checkmark_timing: Option<f64>,
}

impl SpinnerOptions {
    /// Overlay `other` on top of `self`, field by field
    pub fn merge(&self, other: &SpinnerOptions) -> SpinnerOptions {
        SpinnerOptions {
            circle_diameter: other.circle_diameter.or(self.circle_diameter),
            circle_stroke: other.circle_stroke.clone().or_else(|| self.circle_stroke.clone()),
            circle_stroke_success: other
                .circle_stroke_success
                .clone()
                .or_else(|| self.circle_stroke_success.clone()),
            circle_stroke_width: other.circle_stroke_width.or(self.circle_stroke_width),
            circle_stroke_min_fracture: other
                .circle_stroke_min_fracture
                .or(self.circle_stroke_min_fracture),
            circle_stroke_max_fracture: other
                .circle_stroke_max_fracture
                .or(self.circle_stroke_max_fracture),
            spinning_timing: other.spinning_timing.or(self.spinning_timing),
            with_checkmark: other.with_checkmark.or(self.with_checkmark),
            checkmark_stroke_width: other.checkmark_stroke_width.or(self.checkmark_stroke_width),
            checkmark_stroke: other
                .checkmark_stroke
                .clone()
                .or_else(|| self.checkmark_stroke.clone()),
            checkmark_distance: other.checkmark_distance.or(self.checkmark_distance),
            checkmark_timing: other.checkmark_timing.or(self.checkmark_timing),
        }
    }
}

/// Complete spinner configuration
#[derive(Clone, Debug, PartialEq)]
pub struct SpinnerConfig {
    pub circle_diameter: f64,
    pub circle_stroke: String,
    pub circle_stroke_success: String,
    pub circle_stroke_width: f64,
    pub circle_stroke_min_fracture: f64,
    pub circle_stroke_max_fracture: f64,
    pub spinning_timing: f64,
    pub with_checkmark: bool,
    pub checkmark_stroke_width: f64,
    pub checkmark_stroke: String,
    pub checkmark_distance: f64,
    pub checkmark_timing: f64,
}

impl SpinnerConfig {
    pub fn new(options: &SpinnerOptions) -> Self {
        Self {
            circle_diameter: options.circle_diameter.unwrap_or(18.0),
            circle_stroke: options
                .circle_stroke
                .clone()
                .unwrap_or_else(|| "#7DB0D5".to_string()),
            circle_stroke_success: options
                .circle_stroke_success
                .clone()
                .unwrap_or_else(|| "green".to_string()),
            circle_stroke_width: options.circle_stroke_width.unwrap_or(2.0),
            circle_stroke_min_fracture: options.circle_stroke_min_fracture.unwrap_or(0.0),
            circle_stroke_max_fracture: options.circle_stroke_max_fracture.unwrap_or(0.5),
            spinning_timing: options.spinning_timing.unwrap_or(2.0),
            with_checkmark: options.with_checkmark.unwrap_or(false),
            checkmark_stroke_width: options.checkmark_stroke_width.unwrap_or(3.0),
            checkmark_stroke: options
                .checkmark_stroke
                .clone()
                .unwrap_or_else(|| "green".to_string()),
            checkmark_distance: options.checkmark_distance.unwrap_or(0.15),
            checkmark_timing: options.checkmark_timing.unwrap_or(0.6),
        }
    }
}

impl Default for SpinnerConfig {
    fn default() -> Self {
        Self::new(&SpinnerOptions::default())
    }
}

/// Shortest arc, longest arc and full circumference
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DashArray {
    pub min: f64,
    pub max: f64,
    pub full: f64,
}

/// Derived SVG attributes of a spinner
#[derive(Clone, Debug, PartialEq)]
pub struct SpinnerSvgOptions {
    pub center: f64,
    pub radius: f64,
    pub circle_stroke_circumference: f64,
    pub circle_dash_array: DashArray,
    /// Only present when the spinner carries a checkmark
    pub checkmark_points: Option<String>,
}

/// Pure geometry of the spinner family
pub struct SpinnerSvgBuilder;

impl SpinnerSvgBuilder {
    pub fn degrees_to_radians(degrees: f64) -> f64 {
        degrees * (PI / 180.0)
    }

    /// Radius of a plain circle
    pub fn radius(diameter: f64) -> f64 {
        diameter / 2.0
    }

    /// Radius of an SVG circle whose stroke must fit inside `diameter`
    ///
    /// SVG strokes are centered on the path, so half the stroke width on
    /// each side is taken off first: an 18px circle with a 2px stroke has
    /// a radius of 8.
    pub fn svg_circle_radius(diameter: f64, stroke_width: f64) -> f64 {
        Self::radius(diameter - stroke_width)
    }

    pub fn circumference(diameter: f64, stroke_width: f64) -> f64 {
        2.0 * PI * Self::svg_circle_radius(diameter, stroke_width)
    }

    /// `min` and `max` are fractions of the circumference in `[0, 1]`
    pub fn circle_dash_array(circumference: f64, min: f64, max: f64) -> DashArray {
        DashArray {
            min: circumference * min,
            max: circumference * max,
            full: circumference,
        }
    }

    /// Polyline points of a checkmark centered inside the circle
    ///
    /// The checkmark lives in a square inscribed in the inner circle, moved
    /// inwards by `distance` (a fraction of the inner diameter) along the
    /// diagonal.
    pub fn checkmark_points(diameter: f64, stroke_width: f64, distance: f64) -> String {
        let inner_diameter = diameter - stroke_width * 2.0;
        let inscribed_side = inner_diameter / 2f64.sqrt();
        let inscribed_offset = (diameter - inscribed_side) / 2.0;
        let offset = inscribed_offset
            + inner_diameter * distance * Self::degrees_to_radians(45.0).sin();
        let side = diameter - offset * 2.0;
        let (x, y) = (offset, offset);

        format!(
            "{} {}, {} {}, {} {}",
            x + side,
            y,
            x + side * 0.4,
            y + side,
            x,
            x + side * 0.6
        )
    }

    pub fn build(config: &SpinnerConfig) -> SpinnerSvgOptions {
        let circumference = Self::circumference(config.circle_diameter, config.circle_stroke_width);

        SpinnerSvgOptions {
            center: Self::radius(config.circle_diameter),
            radius: Self::svg_circle_radius(config.circle_diameter, config.circle_stroke_width),
            circle_stroke_circumference: circumference,
            circle_dash_array: Self::circle_dash_array(
                circumference,
                config.circle_stroke_min_fracture,
                config.circle_stroke_max_fracture,
            ),
            checkmark_points: config.with_checkmark.then(|| {
                Self::checkmark_points(
                    config.circle_diameter,
                    config.circle_stroke_width,
                    config.checkmark_distance,
                )
            }),
        }
    }
}
