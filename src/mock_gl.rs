//! Recording [`GlContext`] for tests.
//!
//! Every call is appended to a shared log so tests can assert on the exact
//! upload and draw sequence after the context has been moved into a renderer.
//! Sources containing `COMPILE_ERROR` fail to compile; programs whose sources
//! contain `LINK_ERROR` fail to link.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::gl::{GlContext, GlError, ShaderStage};
use crate::scene::Primitive;

/// Recorded uniform payload.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(Vec<f32>),
    Int(Vec<i32>),
    FloatArray(u8, Vec<f32>),
    IntArray(u8, Vec<i32>),
    Matrix(u8, Vec<f32>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CompileShader(ShaderStage),
    LinkProgram(u32),
    UseProgram(u32),
    EnableAttrib(u32),
    CreateBuffer(u32),
    BindBuffer(u32),
    BufferData(Vec<f32>),
    AttribPointer { location: u32, components: i32, offset: i32 },
    Uniform { program: u32, name: String, value: UniformValue },
    Viewport(i32, i32, i32, i32),
    ClearColor([f32; 4]),
    Clear,
    EnableBlending,
    DrawArrays { primitive: Primitive, first: i32, count: i32 },
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    program: u32,
    name: String,
}

#[derive(Default)]
pub struct RecordingGl {
    log: CallLog,
    shaders: RefCell<Vec<String>>,
    programs: RefCell<u32>,
    buffers: RefCell<u32>,
    attribs: RefCell<HashMap<(u32, String), u32>>,
    missing: HashSet<String>,
}

impl RecordingGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `name` as absent from every program.
    pub fn with_missing(mut self, name: &str) -> Self {
        self.missing.insert(name.to_owned());
        self
    }

    /// Handle on the call log that survives moving the context.
    pub fn log(&self) -> CallLog {
        Rc::clone(&self.log)
    }

    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }

    fn uniform(&self, location: &Location, value: UniformValue) {
        self.record(Call::Uniform { program: location.program, name: location.name.clone(), value });
    }
}

impl GlContext for RecordingGl {
    type Shader = usize;
    type Program = u32;
    type Buffer = u32;
    type UniformLocation = Location;

    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<usize, GlError> {
        self.record(Call::CompileShader(stage));
        if source.contains("COMPILE_ERROR") {
            return Err(GlError::ShaderCompile { stage, log: "syntax error".to_owned() });
        }
        let mut shaders = self.shaders.borrow_mut();
        shaders.push(source.to_owned());
        Ok(shaders.len() - 1)
    }

    fn link_program(&self, vertex: &usize, fragment: &usize) -> Result<u32, GlError> {
        let shaders = self.shaders.borrow();
        if [vertex, fragment].iter().any(|s| shaders[**s].contains("LINK_ERROR")) {
            return Err(GlError::Link("unresolved symbol".to_owned()));
        }
        let mut programs = self.programs.borrow_mut();
        *programs += 1;
        self.record(Call::LinkProgram(*programs));
        Ok(*programs)
    }

    fn use_program(&self, program: &u32) {
        self.record(Call::UseProgram(*program));
    }

    fn attrib_location(&self, program: &u32, name: &str) -> Option<u32> {
        if self.missing.contains(name) {
            return None;
        }
        let mut attribs = self.attribs.borrow_mut();
        let next = u32::try_from(attribs.keys().filter(|(p, _)| p == program).count()).unwrap_or(u32::MAX);
        Some(*attribs.entry((*program, name.to_owned())).or_insert(next))
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        self.record(Call::EnableAttrib(location));
    }

    fn create_buffer(&self) -> Result<u32, GlError> {
        let mut buffers = self.buffers.borrow_mut();
        *buffers += 1;
        self.record(Call::CreateBuffer(*buffers));
        Ok(*buffers)
    }

    fn bind_array_buffer(&self, buffer: &u32) {
        self.record(Call::BindBuffer(*buffer));
    }

    fn buffer_data(&self, data: &[f32]) {
        self.record(Call::BufferData(data.to_vec()));
    }

    fn vertex_attrib_pointer(&self, location: u32, components: i32, offset: i32) {
        self.record(Call::AttribPointer { location, components, offset });
    }

    fn uniform_location(&self, program: &u32, name: &str) -> Option<Location> {
        if self.missing.contains(name) {
            return None;
        }
        Some(Location { program: *program, name: name.to_owned() })
    }

    fn uniform1f(&self, location: &Location, x: f32) {
        self.uniform(location, UniformValue::Float(vec![x]));
    }

    fn uniform2f(&self, location: &Location, x: f32, y: f32) {
        self.uniform(location, UniformValue::Float(vec![x, y]));
    }

    fn uniform3f(&self, location: &Location, x: f32, y: f32, z: f32) {
        self.uniform(location, UniformValue::Float(vec![x, y, z]));
    }

    fn uniform4f(&self, location: &Location, x: f32, y: f32, z: f32, w: f32) {
        self.uniform(location, UniformValue::Float(vec![x, y, z, w]));
    }

    fn uniform1i(&self, location: &Location, x: i32) {
        self.uniform(location, UniformValue::Int(vec![x]));
    }

    fn uniform2i(&self, location: &Location, x: i32, y: i32) {
        self.uniform(location, UniformValue::Int(vec![x, y]));
    }

    fn uniform3i(&self, location: &Location, x: i32, y: i32, z: i32) {
        self.uniform(location, UniformValue::Int(vec![x, y, z]));
    }

    fn uniform4i(&self, location: &Location, x: i32, y: i32, z: i32, w: i32) {
        self.uniform(location, UniformValue::Int(vec![x, y, z, w]));
    }

    fn uniform_fv(&self, location: &Location, components: u8, data: &[f32]) {
        self.uniform(location, UniformValue::FloatArray(components, data.to_vec()));
    }

    fn uniform_iv(&self, location: &Location, components: u8, data: &[i32]) {
        self.uniform(location, UniformValue::IntArray(components, data.to_vec()));
    }

    fn uniform_matrix_fv(&self, location: &Location, dim: u8, data: &[f32]) {
        self.uniform(location, UniformValue::Matrix(dim, data.to_vec()));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(Call::Viewport(x, y, width, height));
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        self.record(Call::ClearColor(rgba));
    }

    fn clear(&self) {
        self.record(Call::Clear);
    }

    fn enable_alpha_blending(&self) {
        self.record(Call::EnableBlending);
    }

    fn draw_arrays(&self, primitive: Primitive, first: i32, count: i32) {
        self.record(Call::DrawArrays { primitive, first, count });
    }
}

/// Draw calls in a log, in order.
pub fn draws(log: &CallLog) -> Vec<(Primitive, i32, i32)> {
    log.borrow()
        .iter()
        .filter_map(|c| match c {
            Call::DrawArrays { primitive, first, count } => Some((*primitive, *first, *count)),
            _ => None,
        })
        .collect()
}

/// Uniform uploads of `name`, in order.
pub fn uploads(log: &CallLog, name: &str) -> Vec<UniformValue> {
    log.borrow()
        .iter()
        .filter_map(|c| match c {
            Call::Uniform { name: n, value, .. } if n == name => Some(value.clone()),
            _ => None,
        })
        .collect()
}
