//! Browser surface: the WebGL 1 [`GlContext`] and the exported
//! [`SceneCanvas`] a host page drives.
//!
//! The host creates the `<canvas>` element, wires DOM events to the exported
//! `on*` methods, and normalizes wheel deltas to signed notches. Everything
//! else happens here.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    HtmlCanvasElement, WebGlBuffer, WebGlProgram, WebGlRenderingContext as Gl, WebGlShader, WebGlUniformLocation,
};

use crate::canvas::Canvas;
use crate::gl::{GlContext, GlError, ShaderStage};
use crate::input::{CanvasGeometry, Point};
use crate::navigation::NavigationConfig;
use crate::scene::{Primitive, RendererOptions, Scene};

// =============================================================
// WebGL backend
// =============================================================

/// [`GlContext`] over a browser `WebGLRenderingContext`.
pub struct WebGl {
    ctx: Gl,
}

impl WebGl {
    #[must_use]
    pub fn new(ctx: Gl) -> Self {
        Self { ctx }
    }

    #[must_use]
    pub fn context(&self) -> &Gl {
        &self.ctx
    }
}

impl GlContext for WebGl {
    type Shader = WebGlShader;
    type Program = WebGlProgram;
    type Buffer = WebGlBuffer;
    type UniformLocation = WebGlUniformLocation;

    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<WebGlShader, GlError> {
        let kind = match stage {
            ShaderStage::Vertex => Gl::VERTEX_SHADER,
            ShaderStage::Fragment => Gl::FRAGMENT_SHADER,
        };
        let shader = self.ctx.create_shader(kind).ok_or(GlError::Resource("shader"))?;
        self.ctx.shader_source(&shader, source);
        self.ctx.compile_shader(&shader);

        let compiled = self.ctx.get_shader_parameter(&shader, Gl::COMPILE_STATUS).as_bool().unwrap_or(false);
        if compiled {
            return Ok(shader);
        }
        let log = self.ctx.get_shader_info_log(&shader).unwrap_or_default();
        self.ctx.delete_shader(Some(&shader));
        Err(GlError::ShaderCompile { stage, log })
    }

    fn link_program(&self, vertex: &WebGlShader, fragment: &WebGlShader) -> Result<WebGlProgram, GlError> {
        let program = self.ctx.create_program().ok_or(GlError::Resource("program"))?;
        self.ctx.attach_shader(&program, vertex);
        self.ctx.attach_shader(&program, fragment);
        self.ctx.link_program(&program);

        let linked = self.ctx.get_program_parameter(&program, Gl::LINK_STATUS).as_bool().unwrap_or(false);
        if linked {
            return Ok(program);
        }
        let log = self.ctx.get_program_info_log(&program).unwrap_or_default();
        self.ctx.delete_program(Some(&program));
        Err(GlError::Link(log))
    }

    fn use_program(&self, program: &WebGlProgram) {
        self.ctx.use_program(Some(program));
    }

    fn attrib_location(&self, program: &WebGlProgram, name: &str) -> Option<u32> {
        let location = self.ctx.get_attrib_location(program, name);
        (location >= 0).then_some(location.unsigned_abs())
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        self.ctx.enable_vertex_attrib_array(location);
    }

    fn create_buffer(&self) -> Result<WebGlBuffer, GlError> {
        self.ctx.create_buffer().ok_or(GlError::Resource("buffer"))
    }

    fn bind_array_buffer(&self, buffer: &WebGlBuffer) {
        self.ctx.bind_buffer(Gl::ARRAY_BUFFER, Some(buffer));
    }

    fn buffer_data(&self, data: &[f32]) {
        self.ctx.buffer_data_with_u8_array(Gl::ARRAY_BUFFER, bytemuck::cast_slice(data), Gl::STATIC_DRAW);
    }

    fn vertex_attrib_pointer(&self, location: u32, components: i32, offset: i32) {
        self.ctx.vertex_attrib_pointer_with_i32(location, components, Gl::FLOAT, false, 0, offset);
    }

    fn uniform_location(&self, program: &WebGlProgram, name: &str) -> Option<WebGlUniformLocation> {
        self.ctx.get_uniform_location(program, name)
    }

    fn uniform1f(&self, location: &WebGlUniformLocation, x: f32) {
        self.ctx.uniform1f(Some(location), x);
    }

    fn uniform2f(&self, location: &WebGlUniformLocation, x: f32, y: f32) {
        self.ctx.uniform2f(Some(location), x, y);
    }

    fn uniform3f(&self, location: &WebGlUniformLocation, x: f32, y: f32, z: f32) {
        self.ctx.uniform3f(Some(location), x, y, z);
    }

    fn uniform4f(&self, location: &WebGlUniformLocation, x: f32, y: f32, z: f32, w: f32) {
        self.ctx.uniform4f(Some(location), x, y, z, w);
    }

    fn uniform1i(&self, location: &WebGlUniformLocation, x: i32) {
        self.ctx.uniform1i(Some(location), x);
    }

    fn uniform2i(&self, location: &WebGlUniformLocation, x: i32, y: i32) {
        self.ctx.uniform2i(Some(location), x, y);
    }

    fn uniform3i(&self, location: &WebGlUniformLocation, x: i32, y: i32, z: i32) {
        self.ctx.uniform3i(Some(location), x, y, z);
    }

    fn uniform4i(&self, location: &WebGlUniformLocation, x: i32, y: i32, z: i32, w: i32) {
        self.ctx.uniform4i(Some(location), x, y, z, w);
    }

    fn uniform_fv(&self, location: &WebGlUniformLocation, components: u8, data: &[f32]) {
        let location = Some(location);
        match components {
            1 => self.ctx.uniform1fv_with_f32_array(location, data),
            2 => self.ctx.uniform2fv_with_f32_array(location, data),
            3 => self.ctx.uniform3fv_with_f32_array(location, data),
            _ => self.ctx.uniform4fv_with_f32_array(location, data),
        }
    }

    fn uniform_iv(&self, location: &WebGlUniformLocation, components: u8, data: &[i32]) {
        let location = Some(location);
        match components {
            1 => self.ctx.uniform1iv_with_i32_array(location, data),
            2 => self.ctx.uniform2iv_with_i32_array(location, data),
            3 => self.ctx.uniform3iv_with_i32_array(location, data),
            _ => self.ctx.uniform4iv_with_i32_array(location, data),
        }
    }

    fn uniform_matrix_fv(&self, location: &WebGlUniformLocation, dim: u8, data: &[f32]) {
        let location = Some(location);
        match dim {
            2 => self.ctx.uniform_matrix2fv_with_f32_array(location, false, data),
            3 => self.ctx.uniform_matrix3fv_with_f32_array(location, false, data),
            _ => self.ctx.uniform_matrix4fv_with_f32_array(location, false, data),
        }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.ctx.viewport(x, y, width, height);
    }

    fn clear_color(&self, [r, g, b, a]: [f32; 4]) {
        self.ctx.clear_color(r, g, b, a);
    }

    fn clear(&self) {
        self.ctx.clear(Gl::COLOR_BUFFER_BIT);
    }

    fn enable_alpha_blending(&self) {
        self.ctx.enable(Gl::BLEND);
        self.ctx.blend_func(Gl::SRC_ALPHA, Gl::ONE_MINUS_SRC_ALPHA);
    }

    fn draw_arrays(&self, primitive: Primitive, first: i32, count: i32) {
        self.ctx.draw_arrays(primitive_mode(primitive), first, count);
    }
}

fn primitive_mode(primitive: Primitive) -> u32 {
    match primitive {
        Primitive::Points => Gl::POINTS,
        Primitive::Lines => Gl::LINES,
        Primitive::LineStrip => Gl::LINE_STRIP,
        Primitive::LineLoop => Gl::LINE_LOOP,
        Primitive::Triangles => Gl::TRIANGLES,
        Primitive::TriangleStrip => Gl::TRIANGLE_STRIP,
        Primitive::TriangleFan => Gl::TRIANGLE_FAN,
    }
}

/// Obtain a WebGL 1 context, falling back to the legacy context name.
///
/// # Errors
///
/// [`GlError::ContextUnavailable`] when the browser offers neither.
pub fn create_context(canvas: &HtmlCanvasElement, options: &RendererOptions) -> Result<Gl, GlError> {
    let attributes = js_sys::Object::new();
    if let Err(e) = js_sys::Reflect::set(&attributes, &"antialias".into(), &options.antialias.into()) {
        log::warn!("could not set context attributes: {e:?}");
    }

    for name in ["webgl", "experimental-webgl"] {
        match canvas.get_context_with_context_options(name, &attributes) {
            Ok(Some(object)) => match object.dyn_into::<Gl>() {
                Ok(ctx) => return Ok(ctx),
                Err(other) => log::warn!("{name} returned an unexpected object: {other:?}"),
            },
            Ok(None) => log::debug!("{name} context not available"),
            Err(e) => log::warn!("{name} context request failed: {e:?}"),
        }
    }
    Err(GlError::ContextUnavailable)
}

// =============================================================
// Exported surface
// =============================================================

/// Install the console logger and the panic hook. Safe to call repeatedly.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    match console_log::init_with_level(log::Level::Debug) {
        Ok(()) => log::debug!("console logging ready"),
        Err(e) => log::debug!("logger already installed: {e}"),
    }
}

/// A scene mounted on one `<canvas>` element.
#[wasm_bindgen]
pub struct SceneCanvas {
    element: HtmlCanvasElement,
    canvas: Canvas<WebGl>,
}

#[wasm_bindgen]
impl SceneCanvas {
    /// Parse `scene_json`, mount it on `element` and draw the first frame.
    ///
    /// Shader failures are shown to the user and the remaining visuals still
    /// draw; a malformed scene or a missing WebGL context is an error.
    #[wasm_bindgen(constructor)]
    pub fn new(element: HtmlCanvasElement, scene_json: &str) -> Result<SceneCanvas, JsError> {
        let scene = Scene::from_json(scene_json)?;
        let ctx = match create_context(&element, &scene.renderer_options) {
            Ok(ctx) => ctx,
            Err(e) => {
                alert(&e.to_string());
                return Err(e.into());
            }
        };

        let geometry = geometry_of(&element);
        let canvas = Canvas::new(WebGl::new(ctx), &scene, geometry, NavigationConfig::default());
        for notice in canvas.notices() {
            alert(&notice.to_string());
        }
        log::info!("canvas {} mounted", canvas.id());
        Ok(Self { element, canvas })
    }

    #[wasm_bindgen(js_name = onMouseDown)]
    pub fn on_mouse_down(&mut self, page_x: f64, page_y: f64, which: u8) {
        self.canvas.on_mouse_down(Point::new(page_x, page_y), which);
    }

    #[wasm_bindgen(js_name = onMouseMove)]
    pub fn on_mouse_move(&mut self, page_x: f64, page_y: f64) {
        self.canvas.on_mouse_move(Point::new(page_x, page_y));
    }

    #[wasm_bindgen(js_name = onMouseUp)]
    pub fn on_mouse_up(&mut self, page_x: f64, page_y: f64, which: u8) {
        self.canvas.on_mouse_up(Point::new(page_x, page_y), which);
    }

    #[wasm_bindgen(js_name = onDoubleClick)]
    pub fn on_double_click(&mut self) {
        self.canvas.on_double_click();
    }

    #[wasm_bindgen(js_name = onWheel)]
    pub fn on_wheel(&mut self, delta: f64) {
        self.canvas.on_wheel(delta);
    }

    #[wasm_bindgen(js_name = onKeyDown)]
    pub fn on_key_down(&mut self, key_code: u32) {
        self.canvas.on_key_down(key_code);
    }

    #[wasm_bindgen(js_name = onKeyUp)]
    pub fn on_key_up(&mut self, key_code: u32) {
        self.canvas.on_key_up(key_code);
    }

    #[wasm_bindgen(js_name = onFocusOut)]
    pub fn on_focus_out(&mut self) {
        self.canvas.on_focus_out();
    }

    /// Re-read the element's size and page position, then redraw.
    pub fn resize(&mut self) {
        self.canvas.set_geometry(geometry_of(&self.element));
    }

    /// Replace the data of one variable; drawn on the next frame.
    #[wasm_bindgen(js_name = setData)]
    pub fn set_data(&mut self, visual: usize, name: &str, data: Vec<f32>) -> Result<(), JsError> {
        self.canvas.set_data(visual, name, data)?;
        Ok(())
    }

    pub fn draw(&mut self) {
        self.canvas.draw();
    }

    #[wasm_bindgen(getter)]
    pub fn id(&self) -> String {
        self.canvas.id().to_string()
    }
}

/// Content box of the element on the page, plus its drawing-buffer size.
///
/// Borders are excluded: pointer mapping uses the box inside them and the
/// viewport uses the `width`/`height` attributes.
fn geometry_of(element: &HtmlCanvasElement) -> CanvasGeometry {
    let rect = element.get_bounding_client_rect();
    let (scroll_x, scroll_y) = web_sys::window()
        .map(|w| (w.scroll_x().unwrap_or(0.0), w.scroll_y().unwrap_or(0.0)))
        .unwrap_or_default();
    let offset = Point::new(
        rect.left() + f64::from(element.client_left()) + scroll_x,
        rect.top() + f64::from(element.client_top()) + scroll_y,
    );
    CanvasGeometry::new(f64::from(element.client_width()), f64::from(element.client_height()), Some(offset))
        .with_buffer(element.width(), element.height())
}

fn alert(message: &str) {
    log::error!("{message}");
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(e) = window.alert_with_message(message) {
        log::warn!("alert failed: {e:?}");
    }
}
