//! Export helpers for CSV frame logs and JSON run summaries.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod frames {
    use std::io::{self, Write};
    use std::path::Path;

    use serde::Serialize;
    use solar_scene::{Frame, FrameSink, Marker};

    use super::{ExportError, writer_for_path};

    /// One CSV row per body per frame.
    #[derive(Debug, Serialize)]
    struct Row<'a> {
        frame: u64,
        jd: f64,
        timestamp: &'a str,
        body: &'a str,
        mode: &'static str,
        x_au: f64,
        y_au: f64,
        z_au: f64,
        marker_x: f64,
        marker_y: f64,
        tail_x: Option<f64>,
        tail_y: Option<f64>,
        label_x: f64,
        label_y: f64,
        trajectory_len: usize,
    }

    /// Frame sink that logs every body of every frame as CSV.
    pub struct CsvFrameLog<W: Write> {
        writer: csv::Writer<W>,
    }

    impl CsvFrameLog<Box<dyn Write>> {
        /// Open a log at `path` (`-` for stdout).
        pub fn create(path: &Path) -> Result<Self, ExportError> {
            Ok(Self::new(writer_for_path(path)?))
        }
    }

    impl<W: Write> CsvFrameLog<W> {
        pub fn new(inner: W) -> Self {
            Self {
                writer: csv::Writer::from_writer(inner),
            }
        }

        /// Flush and hand back the underlying writer.
        pub fn into_inner(self) -> Result<W, ExportError> {
            self.writer.into_inner().map_err(|e| {
                ExportError::Io(io::Error::new(e.error().kind(), e.error().to_string()))
            })
        }
    }

    impl<W: Write> FrameSink for CsvFrameLog<W> {
        type Error = ExportError;

        fn write_frame(&mut self, frame: &Frame<'_>) -> Result<(), ExportError> {
            for body in &frame.bodies {
                let (marker, tail) = match body.marker {
                    Marker::Point(p) => (p, None),
                    Marker::Bearing { tail, head } => (head, Some(tail)),
                };
                self.writer.serialize(Row {
                    frame: frame.index,
                    jd: frame.simulation_time,
                    timestamp: &frame.timestamp,
                    body: body.name,
                    mode: body.presentation.as_str(),
                    x_au: body.position[0],
                    y_au: body.position[1],
                    z_au: body.position[2],
                    marker_x: marker[0],
                    marker_y: marker[1],
                    tail_x: tail.map(|t| t[0]),
                    tail_y: tail.map(|t| t[1]),
                    label_x: body.label_anchor[0],
                    label_y: body.label_anchor[1],
                    trajectory_len: body.trajectory.len(),
                })?;
            }
            Ok(())
        }

        fn finish(&mut self) -> Result<(), ExportError> {
            self.writer.flush()?;
            Ok(())
        }
    }
}

pub mod summary {
    use std::io::Write;
    use std::path::Path;

    use serde::Serialize;
    use serde_json::to_writer_pretty;
    use solar_core::{time, units, vector};
    use solar_orbits::period_from_energy;
    use solar_scene::RunReport;

    use super::{ExportError, writer_for_path};

    #[derive(Debug, Serialize)]
    pub struct BodySummary {
        pub name: String,
        pub position_au: [f64; 3],
        pub velocity_au_day: [f64; 3],
        pub distance_km: f64,
        pub speed_km_s: f64,
        /// Keplerian period implied by the final energy; `None` when unbound.
        pub period_days: Option<f64>,
        pub initial_energy: f64,
        pub final_energy: f64,
        pub relative_energy_drift: f64,
        pub far_frames: u64,
    }

    /// JSON envelope describing a finished run.
    #[derive(Debug, Serialize)]
    pub struct RunSummary {
        pub frames: u64,
        pub timestep_days: f64,
        pub start_jd: f64,
        pub end_jd: f64,
        pub start_utc: Option<String>,
        pub end_utc: Option<String>,
        pub bodies: Vec<BodySummary>,
    }

    impl RunSummary {
        pub fn from_report(report: &RunReport, timestep_days: f64, gm: f64) -> Self {
            Self {
                frames: report.frames,
                timestep_days,
                start_jd: report.start_time,
                end_jd: report.end_time,
                start_utc: time::format_iso(report.start_time).ok(),
                end_utc: time::format_iso(report.end_time).ok(),
                bodies: report
                    .bodies
                    .iter()
                    .map(|b| BodySummary {
                        name: b.name.clone(),
                        position_au: b.position,
                        velocity_au_day: b.velocity,
                        distance_km: units::au_to_km(vector::norm(&b.position)),
                        speed_km_s: units::au_per_day_to_km_s(vector::norm(&b.velocity)),
                        period_days: period_from_energy(gm, b.final_energy),
                        initial_energy: b.initial_energy,
                        final_energy: b.final_energy,
                        relative_energy_drift: b.energy_drift(),
                        far_frames: b.far_frames,
                    })
                    .collect(),
            }
        }
    }

    /// Write the run summary as pretty JSON (`-` for stdout).
    pub fn write_summary(path: &Path, summary: &RunSummary) -> Result<(), ExportError> {
        let mut writer = writer_for_path(path)?;
        to_writer_pretty(&mut writer, summary)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}
