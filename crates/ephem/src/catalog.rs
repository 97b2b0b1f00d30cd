//! Offline state catalogs stored as YAML lists.

use std::fs::{self, File};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{EphemerisError, EphemerisSource, StateVector};

/// Epochs closer than this (days, about 0.1 s) are treated as equal.
pub const EPOCH_TOLERANCE_DAYS: f64 = 1.0e-6;

/// One stored state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub epoch_jd: f64,
    pub position_au: [f64; 3],
    pub velocity_au_day: [f64; 3],
}

impl CatalogEntry {
    pub fn new(id: impl Into<String>, epoch_jd: f64, state: StateVector) -> Self {
        Self {
            id: id.into(),
            epoch_jd,
            position_au: state.position_au,
            velocity_au_day: state.velocity_au_day,
        }
    }

    pub fn state(&self) -> StateVector {
        StateVector {
            position_au: self.position_au,
            velocity_au_day: self.velocity_au_day,
        }
    }
}

/// In-memory set of states keyed by `(id, epoch)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateCatalog {
    entries: Vec<CatalogEntry>,
}

impl StateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing any existing one for the same id and epoch.
    pub fn insert(&mut self, entry: CatalogEntry) {
        match self.entries.iter_mut().find(|e| {
            e.id == entry.id && (e.epoch_jd - entry.epoch_jd).abs() <= EPOCH_TOLERANCE_DAYS
        }) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Whether an entry for `id` exists within the epoch tolerance. Silent on misses.
    pub fn contains(&self, id: &str, epoch_jd: f64) -> bool {
        self.entries
            .iter()
            .any(|e| e.id == id && (e.epoch_jd - epoch_jd).abs() <= EPOCH_TOLERANCE_DAYS)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_yaml(text: &str) -> Result<Self, EphemerisError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EphemerisError> {
        let path = path.as_ref();
        let reader = File::open(path).map_err(|source| EphemerisError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_yaml::from_reader(reader)?)
    }

    /// Write the catalog as YAML, creating parent directories as needed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), EphemerisError> {
        let path = path.as_ref();
        let io_err = |source: std::io::Error| EphemerisError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let file = File::create(path).map_err(io_err)?;
        serde_yaml::to_writer(file, self)?;
        Ok(())
    }
}

impl EphemerisSource for StateCatalog {
    fn state_vector(&self, id: &str, epoch_jd: f64) -> Result<StateVector, EphemerisError> {
        let mut same_id = self.entries.iter().filter(|e| e.id == id).peekable();
        if same_id.peek().is_none() {
            return Err(EphemerisError::NotFound {
                id: id.to_string(),
                epoch_jd,
            });
        }
        let mut nearest: Option<&CatalogEntry> = None;
        for entry in same_id {
            if (entry.epoch_jd - epoch_jd).abs() <= EPOCH_TOLERANCE_DAYS {
                return Ok(entry.state());
            }
            if nearest
                .map(|n| (entry.epoch_jd - epoch_jd).abs() < (n.epoch_jd - epoch_jd).abs())
                .unwrap_or(true)
            {
                nearest = Some(entry);
            }
        }
        if let Some(n) = nearest {
            warn!(id, requested_jd = epoch_jd, nearest_jd = n.epoch_jd, "catalog epoch mismatch");
        }
        Err(EphemerisError::NotFound {
            id: id.to_string(),
            epoch_jd,
        })
    }
}
