//! Per-visual GPU state: program, attribute buffers and uniform bindings.
//!
//! A [`VisualRenderer`] is built from one [`Visual`] and owns every handle it
//! creates; nothing is shared across visuals. Data updates are staged with
//! [`VisualRenderer::set_data`] and flushed at the next draw, so several
//! updates in one frame cost one upload each.

#[cfg(test)]
#[path = "visual_test.rs"]
mod visual_test;

use crate::consts::{BYTES_PER_COMPONENT, PRECISION_HEADER, SCALE_UNIFORM, TRANSLATION_UNIFORM};
use crate::gl::{GlContext, GlError, ShaderStage};
use crate::navigation::NavigationTransform;
use crate::scene::{Payload, Primitive, ShaderType, Variable, Visual};
use crate::uniform::UniformKind;

/// Error raised while staging or uploading variable data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("visual has no variable named `{0}`")]
    UnknownVariable(String),
    #[error("uniform `{name}` needs {expected} values, got {got}")]
    ShortData { name: String, expected: usize, got: usize },
    #[error("uniform `{name}` has an unsupported shape")]
    UnsupportedUniform { name: String },
}

struct BoundAttribute<G: GlContext> {
    location: u32,
    components: i32,
    buffer: G::Buffer,
}

struct BoundUniform<G: GlContext> {
    index: usize,
    location: G::UniformLocation,
    kind: UniformKind,
}

/// GPU-side renderer for one visual.
pub struct VisualRenderer<G: GlContext> {
    label: String,
    program: G::Program,
    primitive: Primitive,
    bounds: Vec<i32>,
    visible: bool,
    variables: Vec<Variable>,
    attributes: Vec<BoundAttribute<G>>,
    uniforms: Vec<BoundUniform<G>>,
    dirty: Vec<usize>,
}

impl<G: GlContext> VisualRenderer<G> {
    /// Compile and link the visual's program, bind every attribute and
    /// uniform, and upload their initial data.
    ///
    /// # Errors
    ///
    /// [`GlError::ShaderCompile`] or [`GlError::Link`] when the context
    /// rejects the shaders, [`GlError::Resource`] when a buffer cannot be
    /// allocated.
    pub fn init(gl: &G, visual: &Visual, label: String) -> Result<Self, GlError> {
        let vertex = gl.compile_shader(ShaderStage::Vertex, &with_precision(&visual.vertex_shader))?;
        let fragment = gl.compile_shader(ShaderStage::Fragment, &with_precision(&visual.fragment_shader))?;
        let program = gl.link_program(&vertex, &fragment)?;
        gl.use_program(&program);

        let mut renderer = Self {
            label,
            program,
            primitive: visual.primitive_type,
            bounds: visual.bounds().to_vec(),
            visible: visual.visible,
            variables: visual.variables.clone(),
            attributes: Vec::new(),
            uniforms: Vec::new(),
            dirty: Vec::new(),
        };

        for index in 0..renderer.variables.len() {
            match renderer.variables[index].shader_type {
                ShaderType::Attribute => renderer.init_attribute(gl, index)?,
                ShaderType::Uniform => renderer.init_uniform(gl, index),
                _ => {}
            }
        }
        log::debug!(
            "{}: {} attribute(s), {} uniform(s) bound",
            renderer.label,
            renderer.attributes.len(),
            renderer.uniforms.len()
        );
        Ok(renderer)
    }

    fn init_attribute(&mut self, gl: &G, index: usize) -> Result<(), GlError> {
        let variable = &self.variables[index];
        let Some(location) = gl.attrib_location(&self.program, &variable.name) else {
            log::warn!("{}: attribute `{}` is not used by the program", self.label, variable.name);
            return Ok(());
        };
        gl.enable_vertex_attrib_array(location);

        let buffer = gl.create_buffer()?;
        gl.bind_array_buffer(&buffer);
        gl.buffer_data(variable.values());

        self.attributes.push(BoundAttribute {
            location,
            components: i32::from(variable.ndim.components()),
            buffer,
        });
        Ok(())
    }

    fn init_uniform(&mut self, gl: &G, index: usize) {
        let variable = &self.variables[index];
        let Some(location) = gl.uniform_location(&self.program, &variable.name) else {
            log::warn!("{}: uniform `{}` is not used by the program", self.label, variable.name);
            return;
        };
        let kind = match UniformKind::of(variable) {
            Ok(kind) => kind,
            Err(e) => {
                log::warn!("{}: {e}", self.label);
                return;
            }
        };

        let bound = BoundUniform { index, location, kind };
        self.upload_uniform(gl, &bound);
        self.uniforms.push(bound);
    }

    fn upload_uniform(&self, gl: &G, bound: &BoundUniform<G>) {
        let variable = &self.variables[bound.index];
        if let Err(e) = bound.kind.upload(gl, &bound.location, &variable.name, variable.values()) {
            log::warn!("{}: {e}", self.label);
        }
    }

    /// Stage new data for `name`; it is uploaded at the next draw.
    ///
    /// # Errors
    ///
    /// [`RenderError::UnknownVariable`] when the visual declares no such
    /// variable.
    pub fn set_data(&mut self, name: &str, data: Vec<f32>) -> Result<(), RenderError> {
        let index = self
            .variables
            .iter()
            .position(|v| v.name == name)
            .ok_or_else(|| RenderError::UnknownVariable(name.to_owned()))?;
        self.variables[index].data = Some(Payload::Values(data));
        if !self.dirty.contains(&index) {
            self.dirty.push(index);
        }
        Ok(())
    }

    /// Push navigation, flush staged data and issue the draw calls.
    pub fn draw(&mut self, gl: &G, nav: &NavigationTransform) {
        if !self.visible {
            return;
        }
        gl.use_program(&self.program);

        self.stage_navigation(nav);
        self.flush(gl);
        if !self.bind_buffers(gl, 0) {
            return;
        }

        if self.bounds.len() < 2 {
            log::warn!("{}: bounds {:?} define no draw range", self.label, self.bounds);
            return;
        }
        if self.bounds.len() == 2 {
            self.draw_range(gl, self.bounds[0], self.bounds[1], self.bounds[0]);
            return;
        }
        // No multi-draw entry point: one call per sub-range, each reading the
        // shared buffers from the range start.
        for pair in self.bounds.windows(2) {
            if self.bind_buffers(gl, pair[0]) {
                self.draw_range(gl, pair[0], pair[1], 0);
            }
        }
    }

    fn draw_range(&self, gl: &G, start: i32, end: i32, first: i32) {
        match end.checked_sub(start) {
            Some(count) if count >= 0 => gl.draw_arrays(self.primitive, first, count),
            _ => log::warn!("{}: skipping invalid bounds {start}..{end}", self.label),
        }
    }

    fn stage_navigation(&mut self, nav: &NavigationTransform) {
        for (name, value) in [(TRANSLATION_UNIFORM, nav.translation()), (SCALE_UNIFORM, nav.scale())] {
            if self.variables.iter().any(|v| v.name == name) {
                if let Err(e) = self.set_data(name, value.to_vec()) {
                    log::warn!("{}: {e}", self.label);
                }
            }
        }
    }

    fn flush(&mut self, gl: &G) {
        for index in std::mem::take(&mut self.dirty) {
            let variable = &self.variables[index];
            match variable.shader_type {
                ShaderType::Attribute => {
                    log::warn!("{}: updating attribute `{}` is not implemented", self.label, variable.name);
                }
                ShaderType::Uniform => {
                    if let Some(bound) = self.uniforms.iter().find(|u| u.index == index) {
                        self.upload_uniform(gl, bound);
                    }
                }
                _ => {}
            }
        }
    }

    /// Point every attribute at `first_vertex`. Returns `false` when the byte
    /// offset does not fit the context's offset type.
    fn bind_buffers(&self, gl: &G, first_vertex: i32) -> bool {
        for attribute in &self.attributes {
            let offset = first_vertex
                .checked_mul(attribute.components)
                .and_then(|n| n.checked_mul(BYTES_PER_COMPONENT));
            let Some(offset) = offset else {
                log::warn!("{}: vertex {first_vertex} is beyond the addressable buffer range", self.label);
                return false;
            };
            gl.bind_array_buffer(&attribute.buffer);
            gl.vertex_attrib_pointer(attribute.location, attribute.components, offset);
        }
        true
    }

    // --- Queries ---

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn bounds(&self) -> &[i32] {
        &self.bounds
    }

    /// Currently staged (or last uploaded) data of `name`.
    #[must_use]
    pub fn data(&self, name: &str) -> Option<&[f32]> {
        self.variables.iter().find(|v| v.name == name).map(Variable::values)
    }

    /// Whether `name` has staged data awaiting the next draw.
    #[must_use]
    pub fn is_dirty(&self, name: &str) -> bool {
        self.dirty.iter().any(|i| self.variables[*i].name == name)
    }
}

/// Prefix the GLSL ES default float precision unless the source sets one.
fn with_precision(source: &str) -> String {
    if source.trim_start().starts_with("#version") || source.contains("precision ") {
        source.to_owned()
    } else {
        format!("{PRECISION_HEADER}{source}")
    }
}
