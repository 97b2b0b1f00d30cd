//! Core units, constants, and shared primitives for the solar animator workspace.

pub mod color;

/// Physical constants in the AU / day unit system used by the integrator.
pub mod constants {
    /// Heliocentric gravitational parameter (AU³/day²).
    pub const GM_SUN_AU3_DAY2: f64 = 2.959e-4;
    /// Kilometres per astronomical unit.
    pub const AU_KM: f64 = 149_597_870.7;
    /// Seconds per Julian day.
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
    /// Julian Date of the Unix epoch (1970-01-01T00:00:00).
    pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
}

/// Basic unit conversion helpers.
pub mod units {
    use super::constants::{AU_KM, SECONDS_PER_DAY};

    /// Convert astronomical units to kilometres.
    #[inline]
    pub fn au_to_km(v: f64) -> f64 {
        v * AU_KM
    }

    /// Convert AU/day to km/s.
    #[inline]
    pub fn au_per_day_to_km_s(v: f64) -> f64 {
        v * AU_KM / SECONDS_PER_DAY
    }
}

/// Julian-date helpers built on `chrono`.
pub mod time {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use thiserror::Error;

    use super::constants::{SECONDS_PER_DAY, UNIX_EPOCH_JD};

    const MILLIS_PER_DAY: f64 = SECONDS_PER_DAY * 1_000.0;

    #[derive(Debug, Error, PartialEq)]
    pub enum TimeError {
        #[error("unrecognised epoch `{0}` (expected YYYY-MM-DD, YYYY-MM-DD HH:MM:SS, or JD<days>)")]
        Unparseable(String),
        #[error("Julian Date {0} is outside the representable calendar range")]
        OutOfRange(f64),
    }

    /// Convert a UTC calendar instant into a Julian Date.
    pub fn julian_date(datetime: NaiveDateTime) -> f64 {
        let millis = datetime.and_utc().timestamp_millis() as f64;
        UNIX_EPOCH_JD + millis / MILLIS_PER_DAY
    }

    /// Convert a Julian Date back into a calendar instant, rounded to the millisecond.
    pub fn from_julian_date(jd: f64) -> Result<NaiveDateTime, TimeError> {
        if !jd.is_finite() {
            return Err(TimeError::OutOfRange(jd));
        }
        let millis = ((jd - UNIX_EPOCH_JD) * MILLIS_PER_DAY).round();
        if millis.abs() > i64::MAX as f64 {
            return Err(TimeError::OutOfRange(jd));
        }
        DateTime::from_timestamp_millis(millis as i64)
            .map(|dt| dt.naive_utc())
            .ok_or(TimeError::OutOfRange(jd))
    }

    /// Parse an epoch given as a date, a date-time, or a literal `JD` value.
    pub fn parse_epoch(text: &str) -> Result<f64, TimeError> {
        let trimmed = text.trim();
        if let Some(days) = trimmed
            .strip_prefix("JD")
            .or_else(|| trimmed.strip_prefix("jd"))
        {
            return days
                .trim()
                .parse::<f64>()
                .map_err(|_| TimeError::Unparseable(text.to_string()));
        }
        for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
                return Ok(julian_date(dt));
            }
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(julian_date)
            .ok_or_else(|| TimeError::Unparseable(text.to_string()))
    }

    /// ISO-like calendar string (`YYYY-MM-DD HH:MM:SS.fff`) for a Julian Date.
    pub fn format_iso(jd: f64) -> Result<String, TimeError> {
        let dt = from_julian_date(jd)?;
        Ok(dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
    }
}

/// Minimal vector helpers to avoid ad-hoc `[f64; 3]` math everywhere.
pub mod vector {
    /// Alias for a 3D vector in AU or AU/day depending on context.
    pub type Vector3 = [f64; 3];
    /// Planar point used for rendering.
    pub type Point2 = [f64; 2];

    /// Euclidean norm of a vector.
    #[inline]
    pub fn norm(v: &Vector3) -> f64 {
        dot(v, v).sqrt()
    }

    /// Norm of the x/y projection.
    #[inline]
    pub fn planar_norm(v: &Vector3) -> f64 {
        (v[0] * v[0] + v[1] * v[1]).sqrt()
    }

    /// Dot product of two vectors.
    #[inline]
    pub fn dot(a: &Vector3, b: &Vector3) -> f64 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    #[inline]
    pub fn cross(a: &Vector3, b: &Vector3) -> Vector3 {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    /// Scale a vector by a scalar.
    #[inline]
    pub fn scale(v: &Vector3, s: f64) -> Vector3 {
        [v[0] * s, v[1] * s, v[2] * s]
    }

    /// `a + b * s`, the update shape used by every Euler sub-step.
    #[inline]
    pub fn add_scaled(a: &Vector3, b: &Vector3, s: f64) -> Vector3 {
        [a[0] + b[0] * s, a[1] + b[1] * s, a[2] + b[2] * s]
    }

    #[inline]
    pub fn is_finite(v: &Vector3) -> bool {
        v.iter().all(|c| c.is_finite())
    }
}
