//! Frame rendering with `plotters`: PNG sequences and animated GIFs.
//!
//! The renderers are [`FrameSink`]s; they only see pure-data frames and never
//! reach into the scene.

use std::fs;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use solar_core::color::Color as BodyColor;
use solar_scene::{Frame, FrameSink, LabelAlign, Marker};
use thiserror::Error;
use tracing::debug;

/// Arrowhead half-angle (radians) for bearing indicators.
const ARROW_HALF_ANGLE: f64 = 0.45;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("drawing failed: {0}")]
    Drawing(String),
    #[error("failed to prepare output {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Marker drawn at the origin for the fixed attractor.
#[derive(Debug, Clone)]
pub struct CentralGlyph {
    pub name: String,
    pub color: BodyColor,
    pub display_radius: f64,
}

impl Default for CentralGlyph {
    fn default() -> Self {
        Self {
            name: "Sun".to_string(),
            color: BodyColor::rgb(255, 255, 0),
            display_radius: 5.0,
        }
    }
}

/// Canvas and glyph settings shared by every renderer.
#[derive(Debug, Clone)]
pub struct RenderStyle {
    /// Plot bounds are `±half_width_au` on both axes.
    pub half_width_au: f64,
    pub width_px: u32,
    pub height_px: u32,
    pub background: BodyColor,
    pub text_color: BodyColor,
    pub arrow_color: BodyColor,
    pub central: CentralGlyph,
    /// Pixels per unit of body `display_radius`.
    pub marker_scale: f64,
    /// Arrowhead wing length in AU.
    pub arrow_head_au: f64,
    pub label_font_px: f64,
    pub timestamp_font_px: f64,
    /// Labels and the timestamp need a system font; turn off for headless hosts.
    pub draw_text: bool,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            half_width_au: 1.8,
            width_px: 600,
            height_px: 600,
            background: BodyColor::rgb(0, 0, 0),
            text_color: BodyColor::WHITE,
            arrow_color: BodyColor::WHITE,
            central: CentralGlyph::default(),
            marker_scale: 1.0,
            arrow_head_au: 0.05,
            label_font_px: 12.0,
            timestamp_font_px: 22.0,
            draw_text: true,
        }
    }
}

impl RenderStyle {
    fn marker_px(&self, display_radius: f64) -> u32 {
        (display_radius * self.marker_scale).round().max(1.0) as u32
    }
}

fn rgb(color: BodyColor) -> RGBColor {
    RGBColor(color.r, color.g, color.b)
}

fn select_font_family() -> FontFamily<'static> {
    if cfg!(target_os = "macos") {
        FontFamily::Name("Helvetica")
    } else if cfg!(target_os = "windows") {
        FontFamily::Name("Arial")
    } else {
        FontFamily::Name("DejaVu Sans")
    }
}

/// Draw one frame onto any plotters backend.
pub fn draw_frame<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    frame: &Frame<'_>,
    style: &RenderStyle,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&rgb(style.background))?;
    let hw = style.half_width_au;
    let mut chart = ChartBuilder::on(root)
        .margin(0)
        .build_cartesian_2d(-hw..hw, -hw..hw)?;

    let label_font = FontDesc::new(select_font_family(), style.label_font_px, FontStyle::Normal)
        .color(&rgb(style.text_color));

    chart.draw_series(std::iter::once(Circle::new(
        (0.0, 0.0),
        style.marker_px(style.central.display_radius),
        rgb(style.central.color).filled(),
    )))?;
    if style.draw_text {
        chart.draw_series(std::iter::once(Text::new(
            style.central.name.clone(),
            (0.0, 0.0),
            label_font.clone(),
        )))?;
    }

    for body in &frame.bodies {
        let color = rgb(body.color);
        if body.trajectory.len() >= 2 {
            chart.draw_series(std::iter::once(PathElement::new(
                body.trajectory.iter().map(|p| (p[0], p[1])).collect::<Vec<_>>(),
                ShapeStyle::from(&color).stroke_width(1),
            )))?;
        }

        match body.marker {
            Marker::Point(p) => {
                chart.draw_series(std::iter::once(Circle::new(
                    (p[0], p[1]),
                    style.marker_px(body.display_radius),
                    color.filled(),
                )))?;
            }
            Marker::Bearing { tail, head } => {
                let arrow = ShapeStyle::from(&rgb(style.arrow_color)).stroke_width(1);
                let mut segments = vec![vec![(tail[0], tail[1]), (head[0], head[1])]];
                segments.extend(
                    arrow_wings(tail, head, style.arrow_head_au)
                        .into_iter()
                        .map(|w| vec![(head[0], head[1]), (w[0], w[1])]),
                );
                chart.draw_series(
                    segments
                        .into_iter()
                        .map(|points| PathElement::new(points, arrow)),
                )?;
            }
        }

        if style.draw_text {
            let lines: Vec<&str> = body.name.lines().collect();
            let line_px = (style.label_font_px * 1.2).round() as i32;
            let block_px = line_px * lines.len() as i32;
            let top = match body.label_align {
                LabelAlign::Baseline => -block_px,
                LabelAlign::Center => -block_px / 2,
            };
            let anchor = (body.label_anchor[0], body.label_anchor[1]);
            chart.draw_series(lines.iter().enumerate().map(|(i, line)| {
                let offset = (0, top + i as i32 * line_px);
                EmptyElement::at(anchor) + Text::new(line.to_string(), offset, label_font.clone())
            }))?;
        }
    }

    if style.draw_text {
        let (w, h) = root.dim_in_pixel();
        let x = (0.03 * f64::from(w)) as i32;
        let y = (0.06 * f64::from(h) - style.timestamp_font_px) as i32;
        let font = FontDesc::new(select_font_family(), style.timestamp_font_px, FontStyle::Normal)
            .color(&rgb(style.text_color));
        root.draw(&Text::new(frame.timestamp.clone(), (x, y.max(0)), font))?;
    }

    Ok(())
}

/// End points of the two arrowhead strokes at `head`, pointing away from `tail`.
pub fn arrow_wings(tail: [f64; 2], head: [f64; 2], length: f64) -> [[f64; 2]; 2] {
    let dx = head[0] - tail[0];
    let dy = head[1] - tail[1];
    let norm = (dx * dx + dy * dy).sqrt();
    if norm == 0.0 {
        return [head, head];
    }
    let (ux, uy) = (dx / norm, dy / norm);
    let wing = |angle: f64| {
        let (s, c) = angle.sin_cos();
        let (rx, ry) = (ux * c - uy * s, ux * s + uy * c);
        [head[0] - rx * length, head[1] - ry * length]
    };
    [wing(ARROW_HALF_ANGLE), wing(-ARROW_HALF_ANGLE)]
}

fn drawing_error<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Drawing(err.to_string())
}

/// Writes one numbered PNG per frame into a directory.
#[derive(Debug)]
pub struct PngSequenceRenderer {
    dir: PathBuf,
    style: RenderStyle,
    written: Vec<PathBuf>,
}

impl PngSequenceRenderer {
    pub fn new(dir: impl Into<PathBuf>, style: RenderStyle) -> Result<Self, RenderError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| RenderError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            style,
            written: Vec::new(),
        })
    }

    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame_{index:05}.png"))
    }

    /// Files produced so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FrameSink for PngSequenceRenderer {
    type Error = RenderError;

    fn write_frame(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
        let path = self.frame_path(frame.index);
        {
            let root = BitMapBackend::new(&path, (self.style.width_px, self.style.height_px))
                .into_drawing_area();
            draw_frame(&root, frame, &self.style).map_err(drawing_error)?;
            root.present().map_err(drawing_error)?;
        }
        debug!(path = %path.display(), "wrote frame");
        self.written.push(path);
        Ok(())
    }
}

/// Appends every frame to a single animated GIF.
pub struct GifRenderer {
    root: DrawingArea<BitMapBackend<'static>, Shift>,
    style: RenderStyle,
    path: PathBuf,
    frames: u64,
}

impl GifRenderer {
    pub fn new(
        path: impl AsRef<Path>,
        style: RenderStyle,
        frame_delay_ms: u32,
    ) -> Result<Self, RenderError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| RenderError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        let root = BitMapBackend::gif(
            path.clone(),
            (style.width_px, style.height_px),
            frame_delay_ms,
        )
        .map_err(drawing_error)?
        .into_drawing_area();
        Ok(Self {
            root,
            style,
            path,
            frames: 0,
        })
    }
}

impl FrameSink for GifRenderer {
    type Error = RenderError;

    fn write_frame(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
        draw_frame(&self.root, frame, &self.style).map_err(drawing_error)?;
        self.root.present().map_err(drawing_error)?;
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), RenderError> {
        debug!(path = %self.path.display(), frames = self.frames, "gif complete");
        Ok(())
    }
}
