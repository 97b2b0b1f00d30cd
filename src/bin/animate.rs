use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use solar_animator::config::load_run_config;
use solar_animator::ephemeris::StateCatalog;
use solar_animator::export::ExportError;
use solar_animator::export::frames::CsvFrameLog;
use solar_animator::export::summary::{RunSummary, write_summary};
use solar_animator::importer::HorizonsClient;
use solar_animator::render::{GifRenderer, PngSequenceRenderer, RenderError};
use solar_animator::scene::{Frame, FrameSink, run};
use solar_animator::setup;
use thiserror::Error;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Animate heliocentric trajectories from a run configuration"
)]
struct Cli {
    /// Run configuration (YAML or TOML)
    #[arg(long)]
    config: PathBuf,

    /// Offline state catalog; JPL Horizons is queried when omitted
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Directory for a numbered PNG sequence
    #[arg(long)]
    png_dir: Option<PathBuf>,

    /// Animated GIF output
    #[arg(long)]
    gif: Option<PathBuf>,

    /// Per-frame CSV log (`-` for stdout)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// JSON run summary (`-` for stdout)
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Override the configured frame count
    #[arg(long)]
    frames: Option<u64>,

    /// Skip labels and the timestamp (no system font required)
    #[arg(long, default_value_t = false)]
    no_text: bool,
}

#[derive(Debug, Error)]
enum OutputError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

enum Output {
    Png(PngSequenceRenderer),
    Gif(GifRenderer),
    Csv(CsvFrameLog<Box<dyn Write>>),
}

#[derive(Default)]
struct Outputs(Vec<Output>);

impl FrameSink for Outputs {
    type Error = OutputError;

    fn write_frame(&mut self, frame: &Frame<'_>) -> Result<(), OutputError> {
        for output in &mut self.0 {
            match output {
                Output::Png(sink) => sink.write_frame(frame)?,
                Output::Gif(sink) => sink.write_frame(frame)?,
                Output::Csv(sink) => sink.write_frame(frame)?,
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), OutputError> {
        for output in &mut self.0 {
            match output {
                Output::Png(sink) => sink.finish()?,
                Output::Gif(sink) => sink.finish()?,
                Output::Csv(sink) => sink.finish()?,
            }
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_run_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(frames) = cli.frames {
        config.frames = Some(frames);
        config.validate()?;
    }

    let mut scene = match &cli.catalog {
        Some(path) => {
            let catalog = StateCatalog::load(path)?;
            setup::build_scene(&config, &catalog)?
        }
        None => {
            let client = HorizonsClient::new()?;
            setup::build_scene(&config, &client)?
        }
    };

    let style = setup::render_style(&config, !cli.no_text)?;
    let mut outputs = Outputs::default();
    if let Some(dir) = &cli.png_dir {
        outputs
            .0
            .push(Output::Png(PngSequenceRenderer::new(dir, style.clone())?));
    }
    if let Some(path) = &cli.gif {
        outputs.0.push(Output::Gif(GifRenderer::new(
            path,
            style.clone(),
            config.view.frame_delay_ms,
        )?));
    }
    if let Some(path) = &cli.csv {
        outputs.0.push(Output::Csv(CsvFrameLog::create(path)?));
    }
    if outputs.0.is_empty() {
        warn!("no frame outputs requested; running headless");
    }

    let frames = config.frame_count();
    let report = run(&mut scene, frames, &mut outputs)?;

    let summary = RunSummary::from_report(&report, config.timestep_days(), config.gm_au3_day2);
    if let Some(path) = &cli.summary {
        write_summary(path, &summary)?;
    }

    if !uses_stdout(&cli.csv) && !uses_stdout(&cli.summary) {
        println!("=== Run Summary ===");
        println!(
            "Frames          : {} ({} per day, dt = {:.5} d)",
            report.frames, config.frames_per_day, summary.timestep_days
        );
        println!(
            "Epochs          : JD {:.4} -> JD {:.4}",
            report.start_time, report.end_time
        );
        for (body, totals) in report.bodies.iter().zip(&summary.bodies) {
            println!(
                "  - {:<24} r = ({:+.4}, {:+.4}, {:+.4}) AU, |v| = {:.2} km/s, drift = {:.2e}, far frames = {}",
                body.name.replace('\n', " "),
                body.position[0],
                body.position[1],
                body.position[2],
                totals.speed_km_s,
                body.energy_drift(),
                body.far_frames
            );
        }
    }

    Ok(())
}

fn uses_stdout(path: &Option<PathBuf>) -> bool {
    path.as_deref() == Some(Path::new("-"))
}
