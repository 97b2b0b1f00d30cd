use plotters::prelude::{BitMapBackend, IntoDrawingArea};
use solar_animator::primitives::color::Color;
use solar_animator::render::{GifRenderer, RenderStyle, draw_frame};
use solar_animator::scene::{Body, Scene, SceneSettings, run};

const SIZE: u32 = 180;
const CYAN: Color = Color::rgb(0, 255, 255);

fn style() -> RenderStyle {
    RenderStyle {
        width_px: SIZE,
        height_px: SIZE,
        draw_text: false,
        ..RenderStyle::default()
    }
}

fn scene() -> Scene {
    let mut scene = Scene::new(2459335.5, SceneSettings::default()).expect("scene");
    scene
        .add_body(Body::new("Earth", 2.0, CYAN, [1.0, 0.0, 0.0], [0.0, 0.017, 0.0]))
        .expect("earth");
    scene
        .add_body(Body::new("Voyager 1", 2.0, Color::WHITE, [0.0, 40.0, 0.0], [0.0, 0.0098, 0.001]))
        .expect("voyager");
    scene
}

/// True if any pixel within `radius` of `(cx, cy)` has exactly `color`.
fn painted_near(buf: &[u8], cx: u32, cy: u32, radius: u32, color: Color) -> bool {
    let lo = |c: u32| c.saturating_sub(radius);
    let hi = |c: u32| (c + radius).min(SIZE - 1);
    (lo(cy)..=hi(cy)).any(|y| {
        (lo(cx)..=hi(cx)).any(|x| {
            let i = ((y * SIZE + x) * 3) as usize;
            buf[i] == color.r && buf[i + 1] == color.g && buf[i + 2] == color.b
        })
    })
}

#[test]
fn frame_draws_filled_markers_and_bearing_arrow() {
    let scene = scene();
    let frame = scene.frame().expect("frame");
    let mut buf = vec![0u8; (SIZE * SIZE * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (SIZE, SIZE)).into_drawing_area();
        draw_frame(&root, &frame, &style()).expect("draw");
        root.present().expect("present");
    }

    // Sun at the centre, filled yellow.
    assert!(painted_near(&buf, SIZE / 2, SIZE / 2, 1, Color::rgb(255, 255, 0)));
    // Earth at (1, 0) AU: 2.8 / 3.6 of the way across.
    assert!(painted_near(&buf, 140, SIZE / 2, 2, CYAN));
    // Voyager's arrow runs straight up from y = 1.33 to y = 1.67 AU.
    assert!(painted_near(&buf, SIZE / 2, 15, 2, Color::WHITE));
    // Nothing drawn in the empty lower-left corner.
    assert!(painted_near(&buf, 10, SIZE - 10, 3, Color::rgb(0, 0, 0)));
    assert!(!painted_near(&buf, 10, SIZE - 10, 3, Color::WHITE));
}

#[test]
fn gif_renderer_writes_animation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("anim").join("run.gif");
    let mut gif = GifRenderer::new(&path, style(), 200).expect("gif");
    let mut scene = scene();
    run(&mut scene, 4, &mut gif).expect("run");
    drop(gif);

    let bytes = std::fs::read(&path).expect("gif bytes");
    assert!(bytes.starts_with(b"GIF8"), "not a GIF header");
}
