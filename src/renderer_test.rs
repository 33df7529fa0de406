use super::*;
use crate::mock_gl::{Call, RecordingGl, UniformValue, draws, uploads};
use crate::scene::Primitive;

fn scene_json(transparency: bool, second_fragment: &str) -> String {
    serde_json::json!({
        "renderer_options": { "antialias": true, "transparency": transparency },
        "visuals": [
            {
                "name": "grid",
                "vertex_shader": "void main() {}",
                "fragment_shader": "void main() {}",
                "primitive_type": "LINES",
                "bounds": [0, 4],
                "variables": [
                    { "name": "position", "shader_type": "attribute", "ndim": 2, "data": [0, 0, 1, 1, 0, 1, 1, 0] }
                ]
            },
            {
                "name": "signal",
                "vertex_shader": "void main() {}",
                "fragment_shader": second_fragment,
                "bounds": [0, 3, 6],
                "variables": [
                    { "name": "position", "shader_type": "attribute", "ndim": 2, "data": [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0] },
                    { "name": "scale", "shader_type": "uniform", "ndim": 2, "data": [1, 1] },
                    { "name": "alpha", "shader_type": "uniform", "data": 1.0 }
                ]
            }
        ]
    })
    .to_string()
}

fn scene(transparency: bool, second_fragment: &str) -> Scene {
    Scene::from_json(&scene_json(transparency, second_fragment)).expect("scene")
}

#[test]
fn init_configures_context() {
    let gl = RecordingGl::new();
    let log = gl.log();
    let renderer = SceneRenderer::init(gl, &scene(true, "void main() {}"), 640, 480);

    let calls = log.borrow().clone();
    assert_eq!(calls[0], Call::ClearColor([0.0, 0.0, 0.0, 1.0]));
    assert_eq!(calls[1], Call::EnableBlending);
    assert_eq!(calls.last(), Some(&Call::Viewport(0, 0, 640, 480)));
    assert!(renderer.notices().is_empty());
    assert_eq!(renderer.size(), (640, 480));
}

#[test]
fn blending_off_without_transparency() {
    let gl = RecordingGl::new();
    let log = gl.log();
    SceneRenderer::init(gl, &scene(false, "void main() {}"), 10, 10);
    assert!(!log.borrow().iter().any(|c| *c == Call::EnableBlending));
}

#[test]
fn draw_paints_visuals_in_order() {
    let gl = RecordingGl::new();
    let log = gl.log();
    let mut renderer = SceneRenderer::init(gl, &scene(true, "void main() {}"), 100, 50);
    log.borrow_mut().clear();

    renderer.draw(&NavigationTransform::default());

    let calls = log.borrow().clone();
    assert_eq!(calls[0], Call::Viewport(0, 0, 100, 50));
    assert_eq!(calls[1], Call::Clear);
    assert_eq!(
        draws(&log),
        vec![(Primitive::Lines, 0, 4), (Primitive::LineStrip, 0, 3), (Primitive::LineStrip, 0, 3)]
    );
}

#[test]
fn failing_visual_becomes_notice() {
    let gl = RecordingGl::new();
    let log = gl.log();
    let mut renderer = SceneRenderer::init(gl, &scene(true, "COMPILE_ERROR"), 100, 50);

    assert_eq!(renderer.notices().len(), 1);
    assert!(renderer.visual(0).is_some());
    assert!(renderer.visual(1).is_none());

    log.borrow_mut().clear();
    renderer.draw(&NavigationTransform::default());
    assert_eq!(draws(&log), vec![(Primitive::Lines, 0, 4)]);
}

#[test]
fn navigation_reaches_declaring_visuals() {
    let gl = RecordingGl::new();
    let log = gl.log();
    let mut renderer = SceneRenderer::init(gl, &scene(true, "void main() {}"), 100, 50);
    log.borrow_mut().clear();

    let nav = NavigationTransform { sx: 3.0, ..NavigationTransform::default() };
    renderer.draw(&nav);
    assert_eq!(uploads(&log, "scale"), vec![UniformValue::Float(vec![3.0, 1.0])]);
}

#[test]
fn set_data_forwards_to_visual() {
    let gl = RecordingGl::new();
    let log = gl.log();
    let mut renderer = SceneRenderer::init(gl, &scene(true, "void main() {}"), 100, 50);

    renderer.set_data(1, "alpha", vec![0.5]).expect("stage");
    assert!(renderer.visual(1).is_some_and(|v| v.is_dirty("alpha")));

    log.borrow_mut().clear();
    renderer.draw(&NavigationTransform::default());
    assert_eq!(uploads(&log, "alpha"), vec![UniformValue::Float(vec![0.5])]);
}

#[test]
fn set_data_on_missing_visual_fails() {
    let gl = RecordingGl::new();
    let mut renderer = SceneRenderer::init(gl, &scene(true, "void main() {}"), 100, 50);
    let err = renderer.set_data(7, "alpha", vec![0.5]).expect_err("should fail");
    assert_eq!(err, RenderError::UnknownVariable("visual7.alpha".to_owned()));
}

#[test]
fn resize_applies_at_next_draw() {
    let gl = RecordingGl::new();
    let log = gl.log();
    let mut renderer = SceneRenderer::init(gl, &scene(true, "void main() {}"), 100, 50);
    renderer.set_size(300, 200);
    log.borrow_mut().clear();
    renderer.draw(&NavigationTransform::default());
    assert_eq!(log.borrow()[0], Call::Viewport(0, 0, 300, 200));
}
