//! Scene integration for the solar animator.
//!
//! A [`Scene`] owns a list of [`Body`] values orbiting an implicit central mass
//! fixed at the origin. Each call to [`Scene::evolve`] advances every body by
//! one fixed timestep and returns a pure-data [`Frame`] that renderers and
//! loggers consume through the [`FrameSink`] trait.

pub mod body;
pub mod frame;
pub mod scene;
pub mod sink;

pub use body::Body;
pub use frame::{BodyFrame, FarField, Frame, LabelAlign, Marker, Presentation, TimestampFormat};
pub use scene::{Scene, SceneError, SceneSettings};
pub use sink::{BodyReport, Discard, FrameSink, RunError, RunReport, run};
