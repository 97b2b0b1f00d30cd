//! Frame consumers and the fixed-length run driver.

use std::convert::Infallible;

use solar_core::vector::Vector3;
use thiserror::Error;
use tracing::info;

use crate::frame::{Frame, Presentation};
use crate::scene::{Scene, SceneError};

/// Anything that consumes frames: renderers, loggers, test recorders.
pub trait FrameSink {
    type Error: std::error::Error + 'static;

    fn write_frame(&mut self, frame: &Frame<'_>) -> Result<(), Self::Error>;

    /// Called once after the last frame.
    fn finish(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    type Error = S::Error;

    fn write_frame(&mut self, frame: &Frame<'_>) -> Result<(), Self::Error> {
        (**self).write_frame(frame)
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        (**self).finish()
    }
}

/// Sink that drops every frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl FrameSink for Discard {
    type Error = Infallible;

    fn write_frame(&mut self, _frame: &Frame<'_>) -> Result<(), Infallible> {
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum RunError<E>
where
    E: std::error::Error + 'static,
{
    #[error("simulation failed before frame {frame}: {source}")]
    Scene {
        frame: u64,
        #[source]
        source: SceneError,
    },
    #[error("frame sink failed on frame {frame}: {source}")]
    Sink {
        frame: u64,
        #[source]
        source: E,
    },
}

/// End-of-run state for one body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyReport {
    pub name: String,
    pub position: Vector3,
    pub velocity: Vector3,
    pub initial_energy: f64,
    pub final_energy: f64,
    /// Frames in which the body was drawn as a bearing indicator.
    pub far_frames: u64,
}

impl BodyReport {
    /// Relative change of specific orbital energy over the run.
    /// Falls back to the absolute change when the initial energy is exactly zero.
    pub fn energy_drift(&self) -> f64 {
        let change = self.final_energy - self.initial_energy;
        if self.initial_energy == 0.0 {
            change.abs()
        } else {
            (change / self.initial_energy).abs()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub frames: u64,
    pub start_time: f64,
    pub end_time: f64,
    pub bodies: Vec<BodyReport>,
}

/// Drive `frames` evolve calls, handing each frame to `sink` in order.
///
/// Stops at the first scene or sink error; `finish` is only called after a
/// complete run.
pub fn run<S>(scene: &mut Scene, frames: u64, sink: &mut S) -> Result<RunReport, RunError<S::Error>>
where
    S: FrameSink + ?Sized,
{
    let gm = scene.settings().gm;
    let start_time = scene.simulation_time();
    let initial_energy: Vec<f64> = scene
        .bodies()
        .iter()
        .map(|b| b.specific_energy(gm))
        .collect();
    let mut far_frames = vec![0u64; scene.bodies().len()];

    info!(
        bodies = scene.bodies().len(),
        frames,
        start_jd = start_time,
        dt = scene.timestep(),
        "starting run"
    );

    for frame_no in 1..=frames {
        let frame = scene.evolve().map_err(|source| RunError::Scene {
            frame: frame_no,
            source,
        })?;
        for (count, body) in far_frames.iter_mut().zip(&frame.bodies) {
            if body.presentation == Presentation::Far {
                *count += 1;
            }
        }
        sink.write_frame(&frame).map_err(|source| RunError::Sink {
            frame: frame_no,
            source,
        })?;
    }
    sink.finish().map_err(|source| RunError::Sink {
        frame: frames,
        source,
    })?;

    let bodies = scene
        .bodies()
        .iter()
        .zip(initial_energy)
        .zip(far_frames)
        .map(|((body, initial_energy), far_frames)| BodyReport {
            name: body.name().to_string(),
            position: body.position(),
            velocity: body.velocity(),
            initial_energy,
            final_energy: body.specific_energy(gm),
            far_frames,
        })
        .collect();

    let report = RunReport {
        frames,
        start_time,
        end_time: scene.simulation_time(),
        bodies,
    };
    info!(frames, end_jd = report.end_time, "run complete");
    Ok(report)
}
