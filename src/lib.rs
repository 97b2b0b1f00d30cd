//! Heliocentric trajectory animator.
//!
//! Bodies are seeded from ephemeris state vectors and advanced around a fixed
//! central mass with a symplectic Euler step. Each step yields a pure-data
//! frame that renderers and loggers consume. The workspace crates are
//! re-exported here so front-ends only need one dependency.

pub mod setup;

pub use solar_config as config;
pub use solar_core as primitives;
pub use solar_ephem as ephemeris;
pub use solar_export as export;
pub use solar_importer as importer;
pub use solar_orbits as orbits;
pub use solar_render as render;
pub use solar_scene as scene;
