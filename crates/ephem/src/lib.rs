//! Ephemeris sources: anything that can hand back a heliocentric state vector
//! for a body identifier at a Julian Date.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use solar_core::vector::Vector3;
use thiserror::Error;

pub mod catalog;

pub use catalog::{CatalogEntry, StateCatalog};

/// Heliocentric Cartesian state in AU and AU/day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    pub position_au: Vector3,
    pub velocity_au_day: Vector3,
}

/// Errors surfaced while looking up initial states.
#[derive(Debug, Error)]
pub enum EphemerisError {
    #[error("no state for body `{id}` at JD {epoch_jd}")]
    NotFound { id: String, epoch_jd: f64 },
    #[error("ephemeris service rejected `{id}`: {message}")]
    Service { id: String, message: String },
    #[error("malformed ephemeris response for `{id}`: {reason}")]
    Malformed { id: String, reason: String },
    #[error("ephemeris transport failed: {0}")]
    Transport(String),
    #[error("failed to access catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Supplier of initial states, consumed once per body before the run starts.
pub trait EphemerisSource {
    fn state_vector(&self, id: &str, epoch_jd: f64) -> Result<StateVector, EphemerisError>;
}

impl<T: EphemerisSource + ?Sized> EphemerisSource for &T {
    fn state_vector(&self, id: &str, epoch_jd: f64) -> Result<StateVector, EphemerisError> {
        (**self).state_vector(id, epoch_jd)
    }
}
