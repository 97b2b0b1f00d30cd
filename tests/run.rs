use std::fmt;

use solar_animator::export::frames::CsvFrameLog;
use solar_animator::export::summary::RunSummary;
use solar_animator::primitives::color::Color;
use solar_animator::orbits::circular_speed;
use solar_animator::primitives::constants::GM_SUN_AU3_DAY2;
use solar_animator::render::{PngSequenceRenderer, RenderStyle};
use solar_animator::scene::{
    Body, BodyReport, Discard, Frame, FrameSink, RunError, Scene, SceneError, SceneSettings, run,
};

fn inner_and_outer() -> Scene {
    let mut scene = Scene::new(2459335.5, SceneSettings::default()).expect("scene");
    let v1 = circular_speed(GM_SUN_AU3_DAY2, 1.0);
    let v40 = circular_speed(GM_SUN_AU3_DAY2, 40.0);
    scene
        .add_body(Body::new("Earth", 2.0, Color::WHITE, [1.0, 0.0, 0.0], [0.0, v1, 0.0]))
        .expect("earth");
    scene
        .add_body(
            Body::new("Voyager", 2.0, Color::WHITE, [0.0, 40.0, 1.0], [-v40 * 2.5, 0.0, 0.0])
                .with_bearing_stretch(1.15),
        )
        .expect("voyager");
    scene
}

#[derive(Default)]
struct Recorder {
    indices: Vec<u64>,
    timestamps: Vec<String>,
    finished: bool,
}

impl FrameSink for Recorder {
    type Error = std::convert::Infallible;

    fn write_frame(&mut self, frame: &Frame<'_>) -> Result<(), Self::Error> {
        self.indices.push(frame.index);
        self.timestamps.push(frame.timestamp.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        self.finished = true;
        Ok(())
    }
}

#[derive(Debug)]
struct Full;

impl fmt::Display for Full {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("sink full")
    }
}

impl std::error::Error for Full {}

struct FailAfter(u64);

impl FrameSink for FailAfter {
    type Error = Full;

    fn write_frame(&mut self, frame: &Frame<'_>) -> Result<(), Full> {
        if frame.index > self.0 { Err(Full) } else { Ok(()) }
    }
}

#[test]
fn run_feeds_every_frame_in_order() {
    let mut scene = inner_and_outer();
    let mut recorder = Recorder::default();
    let report = run(&mut scene, 12, &mut recorder).expect("run");

    assert_eq!(recorder.indices, (1..=12).collect::<Vec<_>>());
    assert!(recorder.finished);
    assert_eq!(recorder.timestamps.last().map(String::as_str), Some("Day: 2021-05-03"));
    assert_eq!(report.frames, 12);
    assert_eq!(report.start_time, 2459335.5);
    assert_eq!(report.end_time, 2459335.5 + 12.0 * (1.0 / 6.0));

    let earth = &report.bodies[0];
    assert_eq!(earth.name, "Earth");
    assert_eq!(earth.far_frames, 0);
    assert!(earth.energy_drift() < 1e-6);
    let voyager = &report.bodies[1];
    assert_eq!(voyager.far_frames, 12);
}

#[test]
fn sink_errors_stop_the_run() {
    let mut scene = inner_and_outer();
    let err = run(&mut scene, 10, &mut FailAfter(3)).unwrap_err();
    match err {
        RunError::Sink { frame, .. } => assert_eq!(frame, 4),
        other => panic!("unexpected error {other}"),
    }
    assert_eq!(scene.steps(), 4);
}

#[test]
fn degenerate_scene_aborts_before_sink() {
    let mut scene = Scene::new(2459335.5, SceneSettings::default()).expect("scene");
    scene
        .add_body(Body::new("Runaway", 1.0, Color::WHITE, [1.0, 0.0, 0.0], [0.0, 1.0e308, 0.0]))
        .expect("add");
    let mut recorder = Recorder::default();
    let err = run(&mut scene, 5, &mut recorder).unwrap_err();
    match err {
        RunError::Scene { frame, source } => {
            assert_eq!(frame, 1);
            assert!(matches!(source, SceneError::DegenerateState { .. }));
        }
        other => panic!("unexpected error {other}"),
    }
    assert!(recorder.indices.is_empty());
    assert!(!recorder.finished);
}

#[test]
fn csv_log_records_both_presentations() {
    let mut scene = inner_and_outer();
    let mut log = CsvFrameLog::new(Vec::new());
    run(&mut scene, 3, &mut log).expect("run");
    let bytes = log.into_inner().expect("flush");

    let mut reader = csv::Reader::from_reader(bytes.as_slice());
    let headers = reader.headers().expect("headers").clone();
    assert_eq!(&headers[0], "frame");
    assert_eq!(&headers[4], "mode");
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.expect("row")).collect();
    assert_eq!(rows.len(), 6);
    assert_eq!(&rows[0][3], "Earth");
    assert_eq!(&rows[0][4], "near");
    assert!(rows[0][10].is_empty());
    assert_eq!(&rows[1][3], "Voyager");
    assert_eq!(&rows[1][4], "far");
    assert!(!rows[1][10].is_empty());
    assert_eq!(&rows[5][0], "3");
    assert_eq!(&rows[5][14], "3");
}

#[test]
fn summary_reflects_report() {
    let mut scene = inner_and_outer();
    let report = run(&mut scene, 6, &mut Discard).expect("run");
    let summary = RunSummary::from_report(&report, 1.0 / 6.0, GM_SUN_AU3_DAY2);
    assert_eq!(summary.frames, 6);
    assert_eq!(summary.start_utc.as_deref(), Some("2021-05-01 00:00:00.000"));
    assert_eq!(summary.end_utc.as_deref(), Some("2021-05-02 00:00:00.000"));
    assert_eq!(summary.bodies.len(), 2);
    assert_eq!(summary.bodies[1].far_frames, 6);

    // Circular at 1 AU: about a year, about 29.8 km/s.
    let earth = &summary.bodies[0];
    let period = earth.period_days.expect("bound orbit");
    assert!((period - 365.25).abs() < 1.0, "period {period}");
    assert!((earth.speed_km_s - 29.78).abs() < 0.1, "speed {}", earth.speed_km_s);
    assert!((earth.distance_km - 1.496e8).abs() < 1.0e5);
    // Voyager at 2.5x circular speed is unbound.
    assert!(summary.bodies[1].period_days.is_none());

    let json = serde_json::to_value(&summary).expect("json");
    assert_eq!(json["bodies"][0]["name"], "Earth");
    assert_eq!(json["frames"], 6);
}

#[test]
fn png_sequence_writes_numbered_frames() {
    let dir = tempfile::tempdir().expect("tempdir");
    let style = RenderStyle {
        width_px: 120,
        height_px: 120,
        draw_text: false,
        ..RenderStyle::default()
    };
    let mut renderer = PngSequenceRenderer::new(dir.path().join("frames"), style).expect("renderer");
    let mut scene = inner_and_outer();
    run(&mut scene, 3, &mut renderer).expect("run");

    assert_eq!(renderer.written().len(), 3);
    assert_eq!(renderer.written()[0], renderer.frame_path(1));
    assert!(renderer.frame_path(1).ends_with("frame_00001.png"));
    for path in renderer.written() {
        let meta = std::fs::metadata(path).expect("png metadata");
        assert!(meta.len() > 0, "PNG output should not be empty");
    }
}

#[test]
fn energy_drift_is_finite_for_zero_initial_energy() {
    let mut report = BodyReport {
        name: "Parabolic".to_string(),
        position: [1.0, 0.0, 0.0],
        velocity: [0.0, 0.0, 0.0],
        initial_energy: 0.0,
        final_energy: 1.0e-9,
        far_frames: 0,
    };
    assert_eq!(report.energy_drift(), 1.0e-9);

    report.final_energy = 0.0;
    assert_eq!(report.energy_drift(), 0.0);

    report.initial_energy = -2.0e-4;
    report.final_energy = -1.0e-4;
    assert!((report.energy_drift() - 0.5).abs() < 1e-12);
}
