//! State-vector import from the JPL Horizons API.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use solar_ephem::{CatalogEntry, EphemerisError, EphemerisSource, StateCatalog, StateVector};
use thiserror::Error;
use tracing::{debug, info};

/// Public Horizons endpoint.
pub const HORIZONS_API_URL: &str = "https://ssd.jpl.nasa.gov/api/horizons.api";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error(transparent)]
    Ephemeris(#[from] EphemerisError),
}

/// Blocking Horizons client returning heliocentric ecliptic vectors in AU, AU/day.
#[derive(Debug, Clone)]
pub struct HorizonsClient {
    client: Client,
    base_url: String,
    center: String,
}

impl HorizonsClient {
    pub fn new() -> Result<Self, ImportError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: HORIZONS_API_URL.to_string(),
            center: "@sun".to_string(),
        })
    }

    /// Point the client at a different endpoint (mirrors, local stubs).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Query parameters for a single geometric state at `epoch_jd`.
    pub fn query_params(&self, id: &str, epoch_jd: f64) -> Vec<(&'static str, String)> {
        vec![
            ("format", "json".to_string()),
            ("COMMAND", format!("'{id}'")),
            ("OBJ_DATA", "'NO'".to_string()),
            ("MAKE_EPHEM", "'YES'".to_string()),
            ("EPHEM_TYPE", "'VECTORS'".to_string()),
            ("CENTER", format!("'{}'", self.center)),
            ("REF_PLANE", "'ECLIPTIC'".to_string()),
            ("TLIST", format!("'{epoch_jd:.9}'")),
            ("TLIST_TYPE", "'JD'".to_string()),
            ("VEC_TABLE", "'2'".to_string()),
            ("VEC_CORR", "'NONE'".to_string()),
            ("VEC_LABELS", "'NO'".to_string()),
            ("OUT_UNITS", "'AU-D'".to_string()),
            ("CSV_FORMAT", "'YES'".to_string()),
        ]
    }
}

impl EphemerisSource for HorizonsClient {
    fn state_vector(&self, id: &str, epoch_jd: f64) -> Result<StateVector, EphemerisError> {
        debug!(id, epoch_jd, url = %self.base_url, "querying Horizons");
        let transport = |e: reqwest::Error| EphemerisError::Transport(e.to_string());
        let body = self
            .client
            .get(&self.base_url)
            .query(&self.query_params(id, epoch_jd))
            .send()
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?
            .text()
            .map_err(transport)?;
        parse_response(id, &body)
    }
}

#[derive(Debug, Deserialize)]
struct HorizonsResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Decode the JSON envelope returned by the API and extract the first state.
pub fn parse_response(id: &str, body: &str) -> Result<StateVector, EphemerisError> {
    let response: HorizonsResponse =
        serde_json::from_str(body).map_err(|e| EphemerisError::Malformed {
            id: id.to_string(),
            reason: e.to_string(),
        })?;
    if let Some(message) = response.error {
        return Err(EphemerisError::Service {
            id: id.to_string(),
            message,
        });
    }
    let result = response.result.ok_or_else(|| EphemerisError::Malformed {
        id: id.to_string(),
        reason: "response has neither `result` nor `error`".to_string(),
    })?;
    parse_vector_table(id, &result)
}

/// Parse the `$$SOE`/`$$EOE` CSV block of a VEC_TABLE=2 vector ephemeris.
///
/// Rows look like `JDTDB, Calendar Date, X, Y, Z, VX, VY, VZ,`.
pub fn parse_vector_table(id: &str, text: &str) -> Result<StateVector, EphemerisError> {
    let Some(start) = text.find("$$SOE") else {
        return Err(EphemerisError::Service {
            id: id.to_string(),
            message: service_message(text),
        });
    };
    let block = &text[start + "$$SOE".len()..];
    let block = block.find("$$EOE").map(|end| &block[..end]).unwrap_or(block);
    let row = block
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| EphemerisError::Malformed {
            id: id.to_string(),
            reason: "empty vector table".to_string(),
        })?;

    let fields: Vec<&str> = row.split(',').map(str::trim).collect();
    if fields.len() < 8 {
        return Err(EphemerisError::Malformed {
            id: id.to_string(),
            reason: format!("expected 8 columns, found {}", fields.len()),
        });
    }
    let mut values = [0.0_f64; 6];
    for (slot, field) in values.iter_mut().zip(&fields[2..8]) {
        *slot = field.parse().map_err(|_| EphemerisError::Malformed {
            id: id.to_string(),
            reason: format!("not a number: `{field}`"),
        })?;
    }
    Ok(StateVector {
        position_au: [values[0], values[1], values[2]],
        velocity_au_day: [values[3], values[4], values[5]],
    })
}

fn service_message(text: &str) -> String {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('*'))
        .take(3)
        .collect();
    if lines.is_empty() {
        "no ephemeris data in response".to_string()
    } else {
        lines.join(" ")
    }
}

/// Outcome of resolving one body while building a catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchStatus {
    Fetched(String),
    AlreadyPresent(String),
}

/// Resolve every id at `epoch_jd` into `catalog`, skipping entries it already holds.
pub fn fetch_catalog<'a, S, I>(
    source: &S,
    ids: I,
    epoch_jd: f64,
    catalog: &mut StateCatalog,
) -> Result<Vec<FetchStatus>, ImportError>
where
    S: EphemerisSource + ?Sized,
    I: IntoIterator<Item = &'a str>,
{
    let mut statuses = Vec::new();
    for id in ids {
        if catalog.contains(id, epoch_jd) {
            statuses.push(FetchStatus::AlreadyPresent(id.to_string()));
            continue;
        }
        let state = source.state_vector(id, epoch_jd)?;
        info!(id, epoch_jd, "fetched initial state");
        catalog.insert(CatalogEntry::new(id, epoch_jd, state));
        statuses.push(FetchStatus::Fetched(id.to_string()));
    }
    Ok(statuses)
}
