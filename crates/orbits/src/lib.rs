//! Two-body helpers: central-force acceleration and the symplectic Euler step.
//!
//! Everything here treats the attractor as a fixed point mass at the origin.
//! Bodies never feel each other.
use solar_core::vector::{self, Vector3};

/// Gravitational acceleration toward a point mass at the origin.
///
/// Undefined at the origin: the caller must keep `|position| > 0`.
pub fn central_acceleration(position: &Vector3, gm: f64) -> Vector3 {
    let r = vector::norm(position);
    vector::scale(position, -gm / (r * r * r))
}

/// Result of one symplectic Euler step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    pub position: Vector3,
    pub velocity: Vector3,
    pub acceleration: Vector3,
}

/// Advance a state by `dt` with position-first semi-implicit Euler.
///
/// The acceleration is evaluated at the already-drifted position.
pub fn symplectic_euler_step(
    position: &Vector3,
    velocity: &Vector3,
    gm: f64,
    dt: f64,
) -> StepResult {
    let position = vector::add_scaled(position, velocity, dt);
    let acceleration = central_acceleration(&position, gm);
    let velocity = vector::add_scaled(velocity, &acceleration, dt);
    StepResult {
        position,
        velocity,
        acceleration,
    }
}

/// Specific orbital energy `½|v|² − GM/|r|` (AU²/day²).
pub fn specific_orbital_energy(position: &Vector3, velocity: &Vector3, gm: f64) -> f64 {
    0.5 * vector::dot(velocity, velocity) - gm / vector::norm(position)
}

/// Specific angular momentum `r × v` (AU²/day).
pub fn specific_angular_momentum(position: &Vector3, velocity: &Vector3) -> Vector3 {
    vector::cross(position, velocity)
}

/// Circular orbital speed at radius `r`.
pub fn circular_speed(gm: f64, r: f64) -> f64 {
    (gm / r).sqrt()
}

/// Keplerian period (days) implied by a specific energy, or `None` if unbound.
pub fn period_from_energy(gm: f64, energy: f64) -> Option<f64> {
    if energy >= 0.0 {
        return None;
    }
    let a = -gm / (2.0 * energy);
    Some(2.0 * std::f64::consts::PI * (a * a * a / gm).sqrt())
}
