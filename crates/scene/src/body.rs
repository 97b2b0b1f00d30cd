use solar_core::color::Color;
use solar_core::vector::{Point2, Vector3};

/// One body's kinematic state and its accumulated planar path.
///
/// Presentation attributes are fixed at construction. Position, velocity and
/// trajectory are only ever changed by [`crate::Scene::evolve`].
#[derive(Debug, Clone)]
pub struct Body {
    name: String,
    display_radius: f64,
    color: Color,
    bearing_stretch: f64,
    pub(crate) position: Vector3,
    pub(crate) velocity: Vector3,
    pub(crate) trajectory: Vec<Point2>,
}

impl Body {
    /// Create a body from an initial heliocentric state (AU, AU/day).
    pub fn new(
        name: impl Into<String>,
        display_radius: f64,
        color: Color,
        position: Vector3,
        velocity: Vector3,
    ) -> Self {
        Self {
            name: name.into(),
            display_radius,
            color,
            bearing_stretch: 1.0,
            position,
            velocity,
            trajectory: Vec::new(),
        }
    }

    /// Extra length factor applied to the far-field bearing scale for this body.
    pub fn with_bearing_stretch(mut self, stretch: f64) -> Self {
        self.bearing_stretch = stretch;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_radius(&self) -> f64 {
        self.display_radius
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn bearing_stretch(&self) -> f64 {
        self.bearing_stretch
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn velocity(&self) -> Vector3 {
        self.velocity
    }

    /// Planar path, one point per completed step.
    pub fn trajectory(&self) -> &[Point2] {
        &self.trajectory
    }

    /// Specific orbital energy about a central mass with parameter `gm`.
    pub fn specific_energy(&self, gm: f64) -> f64 {
        solar_orbits::specific_orbital_energy(&self.position, &self.velocity, gm)
    }

    pub fn angular_momentum(&self) -> Vector3 {
        solar_orbits::specific_angular_momentum(&self.position, &self.velocity)
    }
}
