use solar_core::constants::GM_SUN_AU3_DAY2;
use solar_core::time::TimeError;
use solar_core::vector;
use solar_orbits::{StepResult, symplectic_euler_step};
use thiserror::Error;
use tracing::debug;

use crate::body::Body;
use crate::frame::{BodyFrame, FarField, Frame, LabelAlign, Marker, Presentation, TimestampFormat};

/// Fixed parameters of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSettings {
    /// Central-mass gravitational parameter (AU³/day²).
    pub gm: f64,
    /// Step length in days.
    pub timestep: f64,
    /// `None` disables the bearing-indicator mode entirely.
    pub far_field: Option<FarField>,
    /// Offset (AU, both axes) from a near-field marker to its label.
    pub label_offset: f64,
    pub timestamp: TimestampFormat,
}

impl SceneSettings {
    /// Defaults with `timestep = 1 / frames_per_day`.
    pub fn with_frames_per_day(frames_per_day: u32) -> Self {
        Self {
            timestep: 1.0 / f64::from(frames_per_day),
            ..Self::default()
        }
    }
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            gm: GM_SUN_AU3_DAY2,
            timestep: 1.0 / 6.0,
            far_field: Some(FarField::default()),
            label_offset: 0.03,
            timestamp: TimestampFormat::default(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("invalid scene settings: {0}")]
    InvalidSettings(&'static str),
    #[error("body `{name}` has a non-finite initial state")]
    NonFiniteState { name: String },
    #[error("body `{name}` starts at the central mass")]
    AtOrigin { name: String },
    #[error("body `{name}` has zero angular momentum and would fall into the central mass")]
    RadialOrbit { name: String },
    #[error("body `{name}` has an invalid bearing stretch {stretch}")]
    InvalidStretch { name: String, stretch: f64 },
    #[error("body `{name}` reached a degenerate state on step {step}")]
    DegenerateState { name: String, step: u64 },
    #[error("cannot format simulation time: {0}")]
    Time(#[from] TimeError),
}

/// Bodies orbiting an implicit fixed mass at the origin.
///
/// The clock is kept as `start + steps * timestep` rather than accumulated, so
/// after `k` steps it equals that expression exactly.
#[derive(Debug, Clone)]
pub struct Scene {
    settings: SceneSettings,
    bodies: Vec<Body>,
    start_time: f64,
    steps: u64,
}

impl Scene {
    pub fn new(start_time: f64, settings: SceneSettings) -> Result<Self, SceneError> {
        if !start_time.is_finite() {
            return Err(SceneError::InvalidSettings("start time must be finite"));
        }
        if !(settings.timestep.is_finite() && settings.timestep > 0.0) {
            return Err(SceneError::InvalidSettings("timestep must be positive"));
        }
        if !(settings.gm.is_finite() && settings.gm > 0.0) {
            return Err(SceneError::InvalidSettings(
                "gravitational parameter must be positive",
            ));
        }
        if let Some(far) = &settings.far_field {
            if !(far.threshold_au > 0.0 && far.bearing_scale > 0.0) {
                return Err(SceneError::InvalidSettings(
                    "far-field threshold and bearing scale must be positive",
                ));
            }
        }
        Ok(Self {
            settings,
            bodies: Vec::new(),
            start_time,
            steps: 0,
        })
    }

    /// Append a body; insertion order is draw order.
    pub fn add_body(&mut self, body: Body) -> Result<(), SceneError> {
        let name = body.name().to_string();
        if !(vector::is_finite(&body.position) && vector::is_finite(&body.velocity)) {
            return Err(SceneError::NonFiniteState { name });
        }
        if vector::norm(&body.position) == 0.0 {
            return Err(SceneError::AtOrigin { name });
        }
        if vector::norm(&body.angular_momentum()) == 0.0 {
            return Err(SceneError::RadialOrbit { name });
        }
        let stretch = body.bearing_stretch();
        if !(stretch.is_finite() && stretch > 0.0) {
            return Err(SceneError::InvalidStretch { name, stretch });
        }
        self.bodies.push(body);
        Ok(())
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, name: &str) -> Option<&Body> {
        self.bodies.iter().find(|b| b.name() == name)
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Current epoch as a Julian Date.
    pub fn simulation_time(&self) -> f64 {
        self.start_time + self.steps as f64 * self.settings.timestep
    }

    pub fn timestep(&self) -> f64 {
        self.settings.timestep
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Advance every body by one timestep and return the resulting frame.
    ///
    /// New states are computed for all bodies before any is written back, so
    /// a degenerate body leaves the scene untouched.
    pub fn evolve(&mut self) -> Result<Frame<'_>, SceneError> {
        let gm = self.settings.gm;
        let dt = self.settings.timestep;
        let threshold = self.settings.far_field.map(|f| f.threshold_au);
        let step = self.steps + 1;

        let staged = self
            .bodies
            .iter()
            .map(|body| {
                let next = symplectic_euler_step(&body.position, &body.velocity, gm, dt);
                let r = vector::norm(&next.position);
                if r > 0.0 && r.is_finite() && vector::is_finite(&next.velocity) {
                    Ok(next)
                } else {
                    Err(SceneError::DegenerateState {
                        name: body.name().to_string(),
                        step,
                    })
                }
            })
            .collect::<Result<Vec<StepResult>, _>>()?;

        // Formatting can fail too; check before committing.
        let timestamp = self
            .settings
            .timestamp
            .format(self.start_time + step as f64 * dt)?;

        for (body, next) in self.bodies.iter_mut().zip(staged) {
            let before = Presentation::classify(&body.position, threshold);
            let after = Presentation::classify(&next.position, threshold);
            if before != after {
                debug!(
                    body = body.name(),
                    step,
                    from = before.as_str(),
                    to = after.as_str(),
                    "presentation changed"
                );
            }
            body.position = next.position;
            body.velocity = next.velocity;
            body.trajectory.push([next.position[0], next.position[1]]);
        }
        self.steps = step;
        debug!(step, jd = self.simulation_time(), "scene advanced");

        Ok(self.build_frame(timestamp))
    }

    /// Snapshot of the current state without stepping.
    pub fn frame(&self) -> Result<Frame<'_>, SceneError> {
        let timestamp = self.settings.timestamp.format(self.simulation_time())?;
        Ok(self.build_frame(timestamp))
    }

    fn build_frame(&self, timestamp: String) -> Frame<'_> {
        let bodies = self
            .bodies
            .iter()
            .map(|body| self.present(body))
            .collect();
        Frame {
            index: self.steps,
            simulation_time: self.simulation_time(),
            timestamp,
            bodies,
        }
    }

    fn present<'a>(&self, body: &'a Body) -> BodyFrame<'a> {
        let position = body.position;
        let threshold = self.settings.far_field.map(|f| f.threshold_au);
        let presentation = Presentation::classify(&position, threshold);
        let (marker, label_anchor) = match (presentation, &self.settings.far_field) {
            (Presentation::Far, Some(far)) => {
                let (tail, head) = far.indicator(&position, body.bearing_stretch());
                (Marker::Bearing { tail, head }, head)
            }
            _ => {
                let offset = self.settings.label_offset;
                (
                    Marker::Point([position[0], position[1]]),
                    [position[0] + offset, position[1] + offset],
                )
            }
        };
        BodyFrame {
            name: body.name(),
            color: body.color(),
            display_radius: body.display_radius(),
            presentation,
            position,
            marker,
            trajectory: body.trajectory(),
            label_anchor,
            label_align: LabelAlign::for_label(body.name()),
        }
    }
}
