//! Run configuration models and loaders for the solar animator.

use std::fs::File;
use std::path::Path;

use serde::Deserialize;
use solar_core::color::Color;
use solar_core::constants::GM_SUN_AU3_DAY2;
use solar_core::time::{self, TimeError};
use thiserror::Error;

/// Days simulated when neither `frames` nor `duration_days` is given.
pub const DEFAULT_DURATION_DAYS: u32 = 30;

/// Top-level run description.
#[derive(Debug, Deserialize, Clone)]
pub struct RunConfig {
    /// Start epoch: `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, or `JD<days>`.
    pub start_date: String,
    #[serde(default = "default_frames_per_day")]
    pub frames_per_day: u32,
    #[serde(default)]
    pub duration_days: Option<u32>,
    /// Explicit frame count; wins over `duration_days`.
    #[serde(default)]
    pub frames: Option<u64>,
    #[serde(default = "default_gm")]
    pub gm_au3_day2: f64,
    #[serde(default)]
    pub far_field: FarFieldConfig,
    #[serde(default = "default_label_offset")]
    pub label_offset_au: f64,
    #[serde(default)]
    pub timestamp: TimestampConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub central_body: CentralBodyConfig,
    pub bodies: Vec<BodyConfig>,
}

/// One integrated body and how to look it up in an ephemeris source.
#[derive(Debug, Deserialize, Clone)]
pub struct BodyConfig {
    /// Ephemeris identifier (e.g. a Horizons ID such as `3` or `-96`).
    pub id: String,
    /// Display label; defaults to the identifier.
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_body_color")]
    pub color: String,
    #[serde(default = "default_body_radius")]
    pub display_radius: f64,
    #[serde(default = "default_stretch")]
    pub bearing_stretch: f64,
}

impl BodyConfig {
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    pub fn color(&self) -> Result<Color, ConfigError> {
        self.color.parse().map_err(|_| ConfigError::UnknownColor {
            body: self.label().to_string(),
            color: self.color.clone(),
        })
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FarFieldConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_threshold")]
    pub threshold_au: f64,
    #[serde(default = "default_bearing_scale")]
    pub bearing_scale: f64,
    #[serde(default = "default_tail_fraction")]
    pub tail_fraction: f64,
}

impl Default for FarFieldConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_au: default_threshold(),
            bearing_scale: default_bearing_scale(),
            tail_fraction: default_tail_fraction(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimestampConfig {
    #[serde(default = "default_timestamp_prefix")]
    pub prefix: String,
    #[serde(default = "default_timestamp_width")]
    pub width: usize,
}

impl Default for TimestampConfig {
    fn default() -> Self {
        Self {
            prefix: default_timestamp_prefix(),
            width: default_timestamp_width(),
        }
    }
}

/// Output canvas settings.
#[derive(Debug, Deserialize, Clone)]
pub struct ViewConfig {
    /// Plot bounds are `±half_width_au` on both axes.
    #[serde(default = "default_half_width")]
    pub half_width_au: f64,
    #[serde(default = "default_canvas_px")]
    pub width_px: u32,
    #[serde(default = "default_canvas_px")]
    pub height_px: u32,
    /// Delay between GIF frames.
    #[serde(default = "default_frame_delay")]
    pub frame_delay_ms: u32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            half_width_au: default_half_width(),
            width_px: default_canvas_px(),
            height_px: default_canvas_px(),
            frame_delay_ms: default_frame_delay(),
        }
    }
}

/// The fixed attractor drawn at the origin. Never integrated.
#[derive(Debug, Deserialize, Clone)]
pub struct CentralBodyConfig {
    #[serde(default = "default_central_name")]
    pub name: String,
    #[serde(default = "default_central_color")]
    pub color: String,
    #[serde(default = "default_central_radius")]
    pub display_radius: f64,
}

impl Default for CentralBodyConfig {
    fn default() -> Self {
        Self {
            name: default_central_name(),
            color: default_central_color(),
            display_radius: default_central_radius(),
        }
    }
}

impl CentralBodyConfig {
    pub fn color(&self) -> Result<Color, ConfigError> {
        self.color.parse().map_err(|_| ConfigError::UnknownColor {
            body: self.name.clone(),
            color: self.color.clone(),
        })
    }
}

/// Errors that can occur while loading or validating configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid start date: {0}")]
    Epoch(#[from] TimeError),
    #[error("body `{body}` uses unknown color `{color}`")]
    UnknownColor { body: String, color: String },
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl RunConfig {
    /// Start epoch as a Julian Date.
    pub fn start_jd(&self) -> Result<f64, ConfigError> {
        Ok(time::parse_epoch(&self.start_date)?)
    }

    /// Step length in days (`1 / frames_per_day`).
    pub fn timestep_days(&self) -> f64 {
        1.0 / f64::from(self.frames_per_day)
    }

    /// Number of frames to render.
    pub fn frame_count(&self) -> u64 {
        self.frames.unwrap_or_else(|| {
            u64::from(self.duration_days.unwrap_or(DEFAULT_DURATION_DAYS))
                * u64::from(self.frames_per_day)
        })
    }

    /// Fail fast on anything the integrator or renderer cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.start_jd()?;
        if self.frames_per_day == 0 {
            return invalid("frames_per_day", "must be at least 1");
        }
        if self.frame_count() == 0 {
            return invalid("frames", "run must render at least one frame");
        }
        if !(self.gm_au3_day2.is_finite() && self.gm_au3_day2 > 0.0) {
            return invalid("gm_au3_day2", "must be a positive number");
        }
        if !self.label_offset_au.is_finite() {
            return invalid("label_offset_au", "must be finite");
        }
        let far = &self.far_field;
        if far.enabled {
            if !(far.threshold_au.is_finite() && far.threshold_au > 0.0) {
                return invalid("far_field.threshold_au", "must be positive");
            }
            if !(far.bearing_scale.is_finite() && far.bearing_scale > 0.0) {
                return invalid("far_field.bearing_scale", "must be positive");
            }
            if !(far.tail_fraction.is_finite() && (0.0..1.0).contains(&far.tail_fraction)) {
                return invalid("far_field.tail_fraction", "must lie in [0, 1)");
            }
        }
        if !(self.view.half_width_au.is_finite() && self.view.half_width_au > 0.0) {
            return invalid("view.half_width_au", "must be positive");
        }
        if self.view.width_px == 0 || self.view.height_px == 0 {
            return invalid("view", "canvas size must be non-zero");
        }
        self.central_body.color()?;
        if self.bodies.is_empty() {
            return invalid("bodies", "at least one body is required");
        }
        for body in &self.bodies {
            body.color()?;
            if !(body.display_radius.is_finite() && body.display_radius >= 0.0) {
                return Err(ConfigError::Invalid {
                    field: "display_radius",
                    reason: format!("body `{}` needs a non-negative radius", body.label()),
                });
            }
            if !(body.bearing_stretch.is_finite() && body.bearing_stretch > 0.0) {
                return Err(ConfigError::Invalid {
                    field: "bearing_stretch",
                    reason: format!("body `{}` needs a positive stretch", body.label()),
                });
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    })
}

/// Load and validate a run configuration from YAML or TOML (by extension).
pub fn load_run_config<P: AsRef<Path>>(path: P) -> Result<RunConfig, ConfigError> {
    let path = path.as_ref();
    let config: RunConfig = if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)?
    } else {
        let reader = File::open(path)?;
        serde_yaml::from_reader(reader)?
    };
    config.validate()?;
    Ok(config)
}

/// Parse and validate a YAML run configuration held in memory.
pub fn parse_run_config(yaml: &str) -> Result<RunConfig, ConfigError> {
    let config: RunConfig = serde_yaml::from_str(yaml)?;
    config.validate()?;
    Ok(config)
}

fn default_frames_per_day() -> u32 {
    6
}

fn default_gm() -> f64 {
    GM_SUN_AU3_DAY2
}

fn default_label_offset() -> f64 {
    0.03
}

fn default_true() -> bool {
    true
}

fn default_threshold() -> f64 {
    2.0
}

fn default_bearing_scale() -> f64 {
    0.6
}

fn default_tail_fraction() -> f64 {
    0.8
}

fn default_timestamp_prefix() -> String {
    "Day: ".to_string()
}

fn default_timestamp_width() -> usize {
    15
}

fn default_half_width() -> f64 {
    1.8
}

fn default_canvas_px() -> u32 {
    600
}

fn default_frame_delay() -> u32 {
    200
}

fn default_central_name() -> String {
    "Sun".to_string()
}

fn default_central_color() -> String {
    "yellow".to_string()
}

fn default_central_radius() -> f64 {
    5.0
}

fn default_body_color() -> String {
    "white".to_string()
}

fn default_body_radius() -> f64 {
    2.0
}

fn default_stretch() -> f64 {
    1.0
}
