//! Render-ready snapshot types and the near/far presentation rules.

use solar_core::color::Color;
use solar_core::time::{self, TimeError};
use solar_core::vector::{self, Point2, Vector3};

/// Labels longer than this are anchored vertically centred.
pub const LONG_LABEL_CHARS: usize = 20;

/// How a body is drawn in a given frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// Drawn at its true position.
    Near,
    /// Drawn as a fixed-length arrow toward its bearing from the origin.
    Far,
}

impl Presentation {
    /// Classify a position against a square window of half-width `threshold`.
    ///
    /// Both axes use a strict `<`; with no threshold every body is `Near`.
    pub fn classify(position: &Vector3, threshold: Option<f64>) -> Self {
        match threshold {
            Some(t) if !(position[0].abs() < t && position[1].abs() < t) => Presentation::Far,
            _ => Presentation::Near,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Presentation::Near => "near",
            Presentation::Far => "far",
        }
    }
}

/// Far-field bearing-indicator parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FarField {
    /// Half-width (AU) of the square inside which bodies are drawn literally.
    pub threshold_au: f64,
    /// Divisor scale: the indicator head sits at `xy / (bearing_scale * r)`.
    pub bearing_scale: f64,
    /// Fraction of the head vector at which the indicator tail starts.
    pub tail_fraction: f64,
}

impl Default for FarField {
    fn default() -> Self {
        Self {
            threshold_au: 2.0,
            bearing_scale: 0.6,
            tail_fraction: 0.8,
        }
    }
}

impl FarField {
    /// Tail and head of the indicator for a body at `position`.
    ///
    /// The head lies on the ray from the origin through the body's planar
    /// position, at distance `1 / (bearing_scale * stretch)`.
    pub fn indicator(&self, position: &Vector3, stretch: f64) -> (Point2, Point2) {
        let r = vector::planar_norm(position);
        let length = self.bearing_scale * r * stretch;
        let head = [position[0] / length, position[1] / length];
        let tail = [head[0] * self.tail_fraction, head[1] * self.tail_fraction];
        (tail, head)
    }
}

/// Header text shown on every frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampFormat {
    pub prefix: String,
    /// Maximum characters kept from `prefix + calendar string`.
    pub width: usize,
}

impl Default for TimestampFormat {
    fn default() -> Self {
        Self {
            prefix: "Day: ".to_string(),
            width: 15,
        }
    }
}

impl TimestampFormat {
    pub fn format(&self, jd: f64) -> Result<String, TimeError> {
        let full = format!("{}{}", self.prefix, time::format_iso(jd)?);
        Ok(full.chars().take(self.width).collect())
    }
}

/// Where the body's glyph goes this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Marker {
    Point(Point2),
    Bearing { tail: Point2, head: Point2 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelAlign {
    Baseline,
    Center,
}

impl LabelAlign {
    pub fn for_label(label: &str) -> Self {
        if label.chars().count() > LONG_LABEL_CHARS {
            LabelAlign::Center
        } else {
            LabelAlign::Baseline
        }
    }
}

/// Per-body slice of a frame. Borrows the trajectory from the scene.
#[derive(Debug, Clone)]
pub struct BodyFrame<'a> {
    pub name: &'a str,
    pub color: Color,
    pub display_radius: f64,
    pub presentation: Presentation,
    /// True heliocentric position after the step.
    pub position: Vector3,
    pub marker: Marker,
    pub trajectory: &'a [Point2],
    pub label_anchor: Point2,
    pub label_align: LabelAlign,
}

/// Everything a renderer needs for one output frame.
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    /// Number of completed steps when the frame was taken.
    pub index: u64,
    pub simulation_time: f64,
    pub timestamp: String,
    pub bodies: Vec<BodyFrame<'a>>,
}

impl Frame<'_> {
    pub fn body(&self, name: &str) -> Option<&BodyFrame<'_>> {
        self.bodies.iter().find(|b| b.name == name)
    }
}
