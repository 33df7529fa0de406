//! Graphics-context capability used by the renderers.
//!
//! [`GlContext`] is the narrow slice of a GL ES 2 / WebGL 1 context the scene
//! renderer needs. Handles are associated types so the WebGL backend can use
//! its JS objects directly while tests record calls against plain integers.
//! Every buffer is float32 and bound to the array-buffer target.

use crate::scene::Primitive;

/// Error raised by the graphics context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GlError {
    /// The context rejected a shader source.
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    /// The compiled shaders could not be linked into a program.
    #[error("could not link shader program: {0}")]
    Link(String),
    /// No rendering context could be obtained from the canvas.
    #[error("could not initialise WebGL")]
    ContextUnavailable,
    /// The context refused to allocate an object.
    #[error("could not create {0}")]
    Resource(&'static str),
}

/// Shader pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// The operations the renderer issues against a graphics context.
pub trait GlContext {
    type Shader;
    type Program;
    type Buffer;
    type UniformLocation;

    // --- Programs ---

    /// Compile one shader stage.
    ///
    /// # Errors
    ///
    /// [`GlError::ShaderCompile`] carrying the info log.
    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<Self::Shader, GlError>;

    /// Link a vertex/fragment pair into a program.
    ///
    /// # Errors
    ///
    /// [`GlError::Link`] carrying the info log.
    fn link_program(&self, vertex: &Self::Shader, fragment: &Self::Shader) -> Result<Self::Program, GlError>;

    fn use_program(&self, program: &Self::Program);

    // --- Attributes ---

    /// Attribute slot of `name`, or `None` when the program does not use it.
    fn attrib_location(&self, program: &Self::Program, name: &str) -> Option<u32>;

    fn enable_vertex_attrib_array(&self, location: u32);

    /// Create an array buffer.
    ///
    /// # Errors
    ///
    /// [`GlError::Resource`] when the context cannot allocate one.
    fn create_buffer(&self) -> Result<Self::Buffer, GlError>;

    fn bind_array_buffer(&self, buffer: &Self::Buffer);

    /// Upload `data` into the bound array buffer (static draw).
    fn buffer_data(&self, data: &[f32]);

    /// Point `location` at the bound buffer: `components` floats per vertex,
    /// tightly packed, starting `offset` bytes in.
    fn vertex_attrib_pointer(&self, location: u32, components: i32, offset: i32);

    // --- Uniforms ---

    fn uniform_location(&self, program: &Self::Program, name: &str) -> Option<Self::UniformLocation>;

    fn uniform1f(&self, location: &Self::UniformLocation, x: f32);
    fn uniform2f(&self, location: &Self::UniformLocation, x: f32, y: f32);
    fn uniform3f(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32);
    fn uniform4f(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32, w: f32);
    fn uniform1i(&self, location: &Self::UniformLocation, x: i32);
    fn uniform2i(&self, location: &Self::UniformLocation, x: i32, y: i32);
    fn uniform3i(&self, location: &Self::UniformLocation, x: i32, y: i32, z: i32);
    fn uniform4i(&self, location: &Self::UniformLocation, x: i32, y: i32, z: i32, w: i32);

    /// `uniform{components}fv`.
    fn uniform_fv(&self, location: &Self::UniformLocation, components: u8, data: &[f32]);

    /// `uniform{components}iv`.
    fn uniform_iv(&self, location: &Self::UniformLocation, components: u8, data: &[i32]);

    /// `uniformMatrix{dim}fv`, column-major, not transposed.
    fn uniform_matrix_fv(&self, location: &Self::UniformLocation, dim: u8, data: &[f32]);

    // --- Frame ---

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, rgba: [f32; 4]);
    fn clear(&self);

    /// Enable blending with `SRC_ALPHA, ONE_MINUS_SRC_ALPHA`.
    fn enable_alpha_blending(&self);

    fn draw_arrays(&self, primitive: Primitive, first: i32, count: i32);
}
