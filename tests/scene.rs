use solar_animator::orbits::{circular_speed, specific_orbital_energy, symplectic_euler_step};
use solar_animator::primitives::color::Color;
use solar_animator::primitives::constants::GM_SUN_AU3_DAY2;
use solar_animator::scene::{
    Body, FarField, LabelAlign, Marker, Presentation, Scene, SceneError, SceneSettings,
};

const START_JD: f64 = 2459335.5;

fn scene_with(bodies: Vec<Body>) -> Scene {
    let mut scene = Scene::new(START_JD, SceneSettings::default()).expect("scene");
    for body in bodies {
        scene.add_body(body).expect("add body");
    }
    scene
}

fn body(name: &str, position: [f64; 3], velocity: [f64; 3]) -> Body {
    Body::new(name, 2.0, Color::WHITE, position, velocity)
}

fn close(a: f64, b: f64, rel: f64) -> bool {
    (a - b).abs() <= rel * b.abs().max(1e-300)
}

#[test]
fn single_step_matches_hand_computation() {
    let dt = 1.0 / 6.0;
    let step = symplectic_euler_step(&[1.0, 0.0, 0.0], &[0.0, 0.017, 0.0], GM_SUN_AU3_DAY2, dt);

    // Position drifts first, along the initial velocity.
    let y = 0.017 * dt;
    assert_eq!(step.position[0], 1.0);
    assert!(close(step.position[1], y, 1e-12));
    assert_eq!(step.position[2], 0.0);

    let r3 = (1.0 + y * y).powf(1.5);
    let ax = -GM_SUN_AU3_DAY2 / r3;
    let ay = -GM_SUN_AU3_DAY2 * y / r3;
    assert!(close(step.acceleration[0], ax, 1e-6));
    assert!(close(step.acceleration[1], ay, 1e-6));
    assert!(close(step.velocity[0], ax * dt, 1e-6));
    assert!(close(step.velocity[1], 0.017 + ay * dt, 1e-6));

    // Magnitudes quoted for the scenario.
    assert!(close(step.acceleration[0], -2.959e-4, 1e-4));
    assert!(close(step.velocity[0], -4.93e-5, 1e-3));
}

#[test]
fn energy_drift_stays_bounded_on_closed_orbit() {
    let v_circ = circular_speed(GM_SUN_AU3_DAY2, 1.0);
    let position = [1.0, 0.0, 0.0];
    let velocity = [0.0, v_circ * 1.02, 0.0];
    let e0 = specific_orbital_energy(&position, &velocity, GM_SUN_AU3_DAY2);
    let mut scene = scene_with(vec![body("Earth", position, velocity)]);

    let mut worst: f64 = 0.0;
    for _ in 0..180 {
        let presentation = scene.evolve().expect("evolve").bodies[0].presentation;
        assert_eq!(presentation, Presentation::Near);
        let e = scene.bodies()[0].specific_energy(GM_SUN_AU3_DAY2);
        worst = worst.max(((e - e0) / e0).abs());
    }
    assert!(worst < 1e-3, "relative energy drift {worst}");
}

#[test]
fn clock_advances_exactly_by_timestep() {
    let mut scene = scene_with(vec![body("Mars", [1.5, 0.0, 0.0], [0.0, 0.014, 0.0])]);
    let dt = scene.timestep();
    let mut previous = scene.simulation_time();
    assert_eq!(previous, START_JD);
    for k in 1..=50u64 {
        let frame = scene.evolve().expect("evolve");
        assert_eq!(frame.index, k);
        assert_eq!(frame.simulation_time, START_JD + k as f64 * dt);
        assert!(frame.simulation_time > previous);
        previous = frame.simulation_time;
    }
    assert_eq!(scene.steps(), 50);
}

#[test]
fn trajectory_is_append_only() {
    let mut scene = scene_with(vec![body("Venus", [0.72, 0.0, 0.0], [0.0, 0.02, 0.0])]);
    assert!(scene.bodies()[0].trajectory().is_empty());

    let mut history: Vec<[f64; 2]> = Vec::new();
    for k in 1..=12 {
        let frame = scene.evolve().expect("evolve");
        let b = &frame.bodies[0];
        assert_eq!(b.trajectory.len(), k);
        assert_eq!(&b.trajectory[..history.len()], history.as_slice());
        assert_eq!(b.trajectory[k - 1], [b.position[0], b.position[1]]);
        history = b.trajectory.to_vec();
    }
}

#[test]
fn threshold_classifies_with_strict_bound() {
    assert_eq!(
        Presentation::classify(&[1.99, 0.0, 0.0], Some(2.0)),
        Presentation::Near
    );
    assert_eq!(
        Presentation::classify(&[2.01, 0.0, 0.0], Some(2.0)),
        Presentation::Far
    );
    assert_eq!(
        Presentation::classify(&[0.0, -2.0, 0.0], Some(2.0)),
        Presentation::Far
    );
    assert_eq!(
        Presentation::classify(&[50.0, 50.0, 0.0], None),
        Presentation::Near
    );
}

#[test]
fn near_bodies_are_drawn_where_they_are() {
    let mut scene = scene_with(vec![body("Mercury", [0.39, 0.0, 0.0], [0.0, 0.027, 0.0])]);
    let frame = scene.evolve().expect("evolve");
    let b = frame.body("Mercury").expect("mercury");
    assert_eq!(b.presentation, Presentation::Near);
    assert_eq!(b.marker, Marker::Point([b.position[0], b.position[1]]));
    assert_eq!(b.label_anchor, [b.position[0] + 0.03, b.position[1] + 0.03]);
    assert_eq!(b.label_align, LabelAlign::Baseline);
}

#[test]
fn far_bodies_point_along_their_bearing() {
    let far = FarField::default();
    let position = [30.0, 40.0, 2.0];
    let (tail, head) = far.indicator(&position, 1.0);
    // |head| = 1 / 0.6 along (0.6, 0.8).
    assert!(close(head[0], 0.6 / 0.6, 1e-12));
    assert!(close(head[1], 0.8 / 0.6, 1e-12));
    assert!(close(tail[0], head[0] * 0.8, 1e-12));
    assert!(close(tail[1], head[1] * 0.8, 1e-12));

    let (_, stretched) = far.indicator(&position, 1.15);
    assert!(close(stretched[0], head[0] / 1.15, 1e-12));
    assert!(close(stretched[1], head[1] / 1.15, 1e-12));
    // Bearing is unchanged by the stretch.
    assert!(close(stretched[1] / stretched[0], 40.0 / 30.0, 1e-12));
}

#[test]
fn far_field_frame_carries_arrow_and_true_path() {
    let v = circular_speed(GM_SUN_AU3_DAY2, 50.0);
    let mut scene = scene_with(vec![
        body("Voyager", [50.0, 0.0, 0.0], [0.0, v * 2.0, 0.0]).with_bearing_stretch(1.15),
    ]);
    let frame = scene.evolve().expect("evolve");
    let b = &frame.bodies[0];
    assert_eq!(b.presentation, Presentation::Far);
    match b.marker {
        Marker::Bearing { tail, head } => {
            let r = (b.position[0].powi(2) + b.position[1].powi(2)).sqrt();
            let length = 0.6 * r * 1.15;
            assert!(close(head[0], b.position[0] / length, 1e-12));
            assert!(close(head[1], b.position[1] / length, 1e-12));
            assert!(close(tail[0], 0.8 * head[0], 1e-12));
            assert_eq!(b.label_anchor, head);
        }
        other => panic!("expected a bearing marker, got {other:?}"),
    }
    assert_eq!(b.trajectory, &[[b.position[0], b.position[1]]]);
}

#[test]
fn far_field_can_be_disabled() {
    let settings = SceneSettings {
        far_field: None,
        ..SceneSettings::default()
    };
    let mut scene = Scene::new(START_JD, settings).expect("scene");
    scene
        .add_body(body("Juno", [5.0, 0.0, 0.0], [0.0, 0.0076, 0.0]))
        .expect("add");
    let frame = scene.evolve().expect("evolve");
    assert_eq!(frame.bodies[0].presentation, Presentation::Near);
}

#[test]
fn long_labels_are_centred() {
    let name = "L1: 5 missions\nMoon: 5 missions";
    let mut scene = scene_with(vec![body(name, [1.0, 0.0, 0.0], [0.0, 0.017, 0.0])]);
    let frame = scene.evolve().expect("evolve");
    assert_eq!(frame.bodies[0].label_align, LabelAlign::Center);
    assert_eq!(LabelAlign::for_label("Mars: 11 missions"), LabelAlign::Baseline);
}

#[test]
fn add_body_rejects_unusable_states() {
    let mut scene = scene_with(Vec::new());
    assert!(matches!(
        scene.add_body(body("Nan", [f64::NAN, 0.0, 0.0], [0.0, 0.01, 0.0])),
        Err(SceneError::NonFiniteState { .. })
    ));
    assert!(matches!(
        scene.add_body(body("Origin", [0.0, 0.0, 0.0], [0.0, 0.01, 0.0])),
        Err(SceneError::AtOrigin { .. })
    ));
    assert!(matches!(
        scene.add_body(body("Radial", [1.0, 0.0, 0.0], [-0.01, 0.0, 0.0])),
        Err(SceneError::RadialOrbit { .. })
    ));
    assert!(matches!(
        scene.add_body(body("Stretch", [1.0, 0.0, 0.0], [0.0, 0.017, 0.0]).with_bearing_stretch(0.0)),
        Err(SceneError::InvalidStretch { .. })
    ));
    assert!(scene.bodies().is_empty());
}

#[test]
fn degenerate_step_leaves_scene_untouched() {
    // The second body's radius overflows on the first step.
    let mut scene = scene_with(vec![
        body("Earth", [1.0, 0.0, 0.0], [0.0, 0.017, 0.0]),
        body("Runaway", [1.0, 0.0, 0.0], [0.0, 1.0e308, 0.0]),
    ]);
    let before: Vec<_> = scene.bodies().iter().map(|b| b.position()).collect();
    let err = scene.evolve().unwrap_err();
    assert_eq!(
        err,
        SceneError::DegenerateState {
            name: "Runaway".to_string(),
            step: 1
        }
    );
    let after: Vec<_> = scene.bodies().iter().map(|b| b.position()).collect();
    assert_eq!(before, after);
    assert_eq!(scene.steps(), 0);
    assert_eq!(scene.simulation_time(), START_JD);
    assert!(scene.bodies().iter().all(|b| b.trajectory().is_empty()));
}

#[test]
fn timestamp_is_prefixed_and_truncated() {
    let mut scene = scene_with(vec![body("Earth", [1.0, 0.0, 0.0], [0.0, 0.017, 0.0])]);
    assert_eq!(scene.frame().expect("frame").timestamp, "Day: 2021-05-01");
    for _ in 0..6 {
        scene.evolve().expect("evolve");
    }
    assert_eq!(scene.frame().expect("frame").timestamp, "Day: 2021-05-02");
}
