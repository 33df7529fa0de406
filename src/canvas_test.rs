#![allow(clippy::float_cmp)]

use super::*;
use crate::mock_gl::{Call, CallLog, RecordingGl, draws};

const SCENE: &str = r#"{
    "visuals": [{
        "vertex_shader": "void main() {}",
        "fragment_shader": "void main() {}",
        "bounds": [0, 2],
        "variables": [
            {"name": "position", "shader_type": "attribute", "ndim": 2, "data": [0, 0, 1, 1]},
            {"name": "translation", "shader_type": "uniform", "ndim": 2, "data": [0, 0]},
            {"name": "scale", "shader_type": "uniform", "ndim": 2, "data": [1, 1]}
        ]
    }]
}"#;

/// 200x100 canvas at page offset (10, 20).
fn geometry() -> CanvasGeometry {
    CanvasGeometry::new(200.0, 100.0, Some(Point::new(10.0, 20.0)))
}

fn mount() -> (Canvas<RecordingGl>, CallLog) {
    let gl = RecordingGl::new();
    let log = gl.log();
    let scene = Scene::from_json(SCENE).expect("scene");
    (Canvas::new(gl, &scene, geometry(), NavigationConfig::default()), log)
}

/// Page position of an NDC point on the test canvas.
fn page(x: f64, y: f64) -> Point {
    Point::new(10.0 + (x + 1.0) * 100.0, 20.0 + (1.0 - y) * 50.0)
}

fn draw_count(log: &CallLog) -> usize {
    draws(log).len()
}

#[test]
fn new_draws_once() {
    let (canvas, log) = mount();
    assert_eq!(draw_count(&log), 1);
    assert!(canvas.notices().is_empty());
    assert_eq!(canvas.renderer().size(), (200, 100));
}

#[test]
fn left_drag_pans_and_redraws() {
    let (mut canvas, log) = mount();
    canvas.on_mouse_down(page(0.0, 0.0), 1);
    let action = canvas.on_mouse_move(page(0.5, 0.25));

    assert_eq!(action, Some(Action::LeftDrag));
    let nav = canvas.navigation();
    assert!((nav.tx - 0.5).abs() < 1e-9);
    assert!((nav.ty - 0.25).abs() < 1e-9);
    assert_eq!(draw_count(&log), 2);
}

#[test]
fn click_does_not_redraw() {
    let (mut canvas, log) = mount();
    canvas.on_mouse_down(page(0.0, 0.0), 1);
    let action = canvas.on_mouse_up(page(0.0, 0.0), 1);
    assert_eq!(action, Some(Action::LeftClick));
    assert_eq!(*canvas.navigation(), NavigationTransform::default());
    assert_eq!(draw_count(&log), 1);
}

#[test]
fn wheel_zooms_around_pointer() {
    let (mut canvas, _log) = mount();
    canvas.on_mouse_move(page(0.5, 0.5));
    canvas.on_wheel(1.0);
    let nav = canvas.navigation();
    assert!((nav.sx - 0.2_f64.exp()).abs() < 1e-9);
    assert_eq!(nav.sx, nav.sy);

    // The world point under the pointer stays under it.
    let (x, y) = nav.apply(0.5, 0.5);
    assert!((x - 0.5).abs() < 1e-9 && (y - 0.5).abs() < 1e-9);
}

#[test]
fn reset_key_restores_identity() {
    let (mut canvas, log) = mount();
    canvas.on_wheel(2.0);
    canvas.on_key_down(82);
    assert_eq!(*canvas.navigation(), NavigationTransform::default());
    canvas.on_key_up(82);
    assert_eq!(canvas.interaction().key, None);
    assert_eq!(draw_count(&log), 3);
}

#[test]
fn focus_out_clears_interaction() {
    let (mut canvas, _log) = mount();
    canvas.on_key_down(16);
    canvas.on_mouse_down(page(0.2, 0.2), 3);
    canvas.on_focus_out();
    assert_eq!(canvas.interaction().mouse_button, None);
    assert_eq!(canvas.interaction().key_modifier, None);
}

#[test]
fn double_click_is_classified_without_redraw() {
    let (mut canvas, log) = mount();
    assert_eq!(canvas.on_double_click(), Some(Action::DoubleClick));
    assert_eq!(draw_count(&log), 1);
}

#[test]
fn custom_config_is_honoured() {
    let gl = RecordingGl::new();
    let scene = Scene::from_json(SCENE).expect("scene");
    let config = NavigationConfig { click_threshold: 0.5, reset_key: 27, ..NavigationConfig::default() };
    let mut canvas = Canvas::new(gl, &scene, geometry(), config);

    canvas.on_mouse_down(page(0.0, 0.0), 1);
    assert_eq!(canvas.on_mouse_move(page(0.2, 0.0)), None);

    canvas.on_wheel(1.0);
    canvas.on_key_down(82);
    assert_ne!(*canvas.navigation(), NavigationTransform::default());
    canvas.on_key_down(27);
    assert_eq!(*canvas.navigation(), NavigationTransform::default());
}

#[test]
fn set_geometry_resizes_and_remaps() {
    let (mut canvas, log) = mount();
    canvas.set_geometry(CanvasGeometry::new(400.0, 400.0, Some(Point::new(0.0, 0.0))));
    assert!(log.borrow().iter().any(|c| *c == Call::Viewport(0, 0, 400, 400)));

    canvas.on_mouse_down(Point::new(200.0, 200.0), 1);
    assert_eq!(canvas.interaction().mouse_press_position, Point::new(0.0, 0.0));
}

#[test]
fn viewport_follows_drawing_buffer() {
    let gl = RecordingGl::new();
    let log = gl.log();
    let scene = Scene::from_json(SCENE).expect("scene");
    // A 600x600 buffer shown in a 300x300 CSS box inside a 1px border.
    let geometry = CanvasGeometry::new(300.0, 300.0, Some(Point::new(1.0, 1.0))).with_buffer(600, 600);
    let mut canvas = Canvas::new(gl, &scene, geometry, NavigationConfig::default());

    assert_eq!(canvas.renderer().size(), (600, 600));
    assert!(log.borrow().iter().any(|c| *c == Call::Viewport(0, 0, 600, 600)));
    assert!(!log.borrow().iter().any(|c| matches!(c, Call::Viewport(_, _, 300, 300))));

    canvas.on_mouse_down(Point::new(151.0, 151.0), 1);
    assert_eq!(canvas.interaction().mouse_press_position, Point::new(0.0, 0.0));
}

#[test]
fn set_data_stages_update() {
    let (mut canvas, _log) = mount();
    canvas.set_data(0, "scale", vec![2.0, 2.0]).expect("stage");
    assert!(canvas.set_data(0, "nope", vec![1.0]).is_err());
}

#[test]
fn canvases_are_independent() {
    let (mut first, _) = mount();
    let (second, _) = mount();
    first.on_wheel(1.0);

    assert_ne!(first.id(), second.id());
    assert_ne!(*first.navigation(), NavigationTransform::default());
    assert_eq!(*second.navigation(), NavigationTransform::default());
}
