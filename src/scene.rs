//! Scene model: visuals, their shader variables, and the wire (de)serializer.
//!
//! A scene arrives from the notebook kernel as JSON. Large numeric arrays
//! (`bounds` and variable `data`) are embedded as base64 strings; small ones
//! may be inline arrays or single numbers. [`Scene::from_json`] parses the
//! payload and decodes every embedded array so the renderer only ever sees
//! flat numeric buffers. [`Scene::to_json`] performs the reverse trip.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use serde::{Deserialize, Serialize};

use crate::codec::{self, DecodeError};

/// Error returned while building a [`Scene`].
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// The payload is not valid scene JSON.
    #[error("malformed scene JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// An embedded base64 array could not be decoded.
    #[error("failed to decode {context}: {source}")]
    Decode {
        /// Which visual/variable carried the payload.
        context: String,
        #[source]
        source: DecodeError,
    },
    /// The scene could not be written back to JSON.
    #[error("failed to serialize scene: {0}")]
    Serialize(serde_json::Error),
}

/// Numeric type of a variable's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarType {
    #[default]
    Float,
    Int,
}

/// Role of a variable in the shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderType {
    /// Per-vertex input backed by a buffer.
    Attribute,
    /// Constant across one draw call.
    Uniform,
    /// Declared for shader generation only; never bound.
    Varying,
    Texture,
    Index,
    Compound,
}

/// GL primitive used by a visual's draw calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Primitive {
    Points,
    Lines,
    #[default]
    LineStrip,
    LineLoop,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

/// Component count of a variable.
///
/// A plain integer is a scalar/vector width; a sequence marks a square
/// matrix uniform whose dimension is the first element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ndim {
    Components(u8),
    Matrix(Vec<u8>),
}

impl Default for Ndim {
    fn default() -> Self {
        Self::Components(1)
    }
}

impl Ndim {
    /// Components per vertex (attributes) or per element (uniforms).
    #[must_use]
    pub fn components(&self) -> u8 {
        match self {
            Self::Components(n) => *n,
            Self::Matrix(dims) => dims.first().copied().unwrap_or(0),
        }
    }

    /// The square matrix dimension, if this marks a matrix uniform.
    #[must_use]
    pub fn matrix_dim(&self) -> Option<u8> {
        match self {
            Self::Components(_) => None,
            Self::Matrix(dims) => dims.first().copied(),
        }
    }
}

/// Variable data, before or after decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    /// Base64 little-endian words, not yet decoded.
    Encoded(String),
    /// Flat float buffer.
    Values(Vec<f32>),
    /// A single inline number.
    Scalar(f32),
    /// Inline rows (e.g. a matrix written as nested lists).
    Rows(Vec<Vec<f32>>),
}

impl Payload {
    /// The flat buffer, once decoded.
    #[must_use]
    pub fn values(&self) -> Option<&[f32]> {
        match self {
            Self::Values(values) => Some(values),
            _ => None,
        }
    }
}

/// Draw bounds, before or after decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bounds {
    Encoded(String),
    Indices(Vec<i32>),
}

/// Declared size of a variable.
///
/// Attributes and uniforms carry an element count; textures carry their
/// `[height, width]` shape, which is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Size {
    Count(usize),
    Shape(Vec<usize>),
}

/// A named shader variable and its data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Shader identifier; unique within its visual.
    pub name: String,
    pub shader_type: ShaderType,
    #[serde(default)]
    pub vartype: VarType,
    #[serde(default)]
    pub ndim: Ndim,
    /// Element count for array forms; `None` or `0` for scalar/vector forms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Payload>,
}

impl Variable {
    /// The decoded data buffer, or an empty slice.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        self.data.as_ref().and_then(Payload::values).unwrap_or(&[])
    }

    /// Element count of an array form, if the variable declares one.
    #[must_use]
    pub fn count(&self) -> Option<usize> {
        match self.size {
            Some(Size::Count(n)) if n > 0 => Some(n),
            _ => None,
        }
    }

    /// Whether this variable uses the array upload form.
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.count().is_some()
    }

    fn is_bound(&self) -> bool {
        matches!(self.shader_type, ShaderType::Attribute | ShaderType::Uniform)
    }
}

/// One drawable unit: a shader pair, its variables and its draw bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visual {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Vertex count; used for the default bounds `[0, size]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    pub vertex_shader: String,
    pub fragment_shader: String,
    #[serde(default)]
    pub primitive_type: Primitive,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    #[serde(default)]
    pub variables: Vec<Variable>,
}

impl Visual {
    /// Decoded draw bounds, or an empty slice when absent or still encoded.
    #[must_use]
    pub fn bounds(&self) -> &[i32] {
        match &self.bounds {
            Some(Bounds::Indices(indices)) => indices,
            _ => &[],
        }
    }

    /// Look up a variable by name.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// All variables of the given shader type, in declaration order.
    pub fn variables_of(&self, shader_type: ShaderType) -> impl Iterator<Item = &Variable> {
        self.variables.iter().filter(move |v| v.shader_type == shader_type)
    }

    fn decode_payloads(&mut self, label: &str) -> Result<(), SceneError> {
        self.bounds = match self.bounds.take() {
            Some(Bounds::Encoded(s)) => {
                let indices = codec::decode_i32(&s).map_err(|source| SceneError::Decode {
                    context: format!("{label}.bounds"),
                    source,
                })?;
                Some(Bounds::Indices(indices))
            }
            Some(indices) => Some(indices),
            None => Some(Bounds::Indices(vec![0, default_end(self.size)])),
        };

        for variable in self.variables.iter_mut().filter(|v| v.is_bound()) {
            variable.data = match variable.data.take() {
                Some(Payload::Encoded(s)) => {
                    let values = codec::decode(&s, variable.vartype).map_err(|source| SceneError::Decode {
                        context: format!("{label}.{}", variable.name),
                        source,
                    })?;
                    Some(Payload::Values(values))
                }
                Some(Payload::Scalar(x)) => Some(Payload::Values(vec![x])),
                Some(Payload::Rows(rows)) => Some(Payload::Values(rows.into_iter().flatten().collect())),
                other => other,
            };
        }
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn encode_payloads(&mut self) {
        if let Some(Bounds::Indices(indices)) = &self.bounds {
            self.bounds = Some(Bounds::Encoded(codec::encode_i32(indices)));
        }
        for variable in self.variables.iter_mut().filter(|v| v.is_bound()) {
            if let Some(Payload::Values(values)) = &variable.data {
                let encoded = match variable.vartype {
                    VarType::Float => codec::encode_f32(values),
                    VarType::Int => {
                        let ints: Vec<i32> = values.iter().map(|v| v.round() as i32).collect();
                        codec::encode_i32(&ints)
                    }
                };
                variable.data = Some(Payload::Encoded(encoded));
            }
        }
    }
}

/// Options applied to the graphics context when a scene is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RendererOptions {
    #[serde(default = "default_true")]
    pub antialias: bool,
    /// Alpha blending; on unless explicitly disabled.
    #[serde(default = "default_true")]
    pub transparency: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self { antialias: true, transparency: true }
    }
}

/// A complete scene: ordered visuals plus renderer options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub visuals: Vec<Visual>,
    #[serde(default)]
    pub renderer_options: RendererOptions,
}

impl Scene {
    /// Parse a scene from its JSON text and decode every embedded array.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Parse`] for malformed JSON and
    /// [`SceneError::Decode`] for a malformed base64 payload. No partial
    /// scene is produced.
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        let scene: Self = serde_json::from_str(json)?;
        scene.decoded()
    }

    /// Build a scene from an already-parsed JSON object.
    ///
    /// # Errors
    ///
    /// Same as [`Scene::from_json`].
    pub fn from_value(value: serde_json::Value) -> Result<Self, SceneError> {
        let scene: Self = serde_json::from_value(value)?;
        scene.decoded()
    }

    /// Serialize the scene, re-encoding every decoded array as base64.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Serialize`] if JSON output fails.
    pub fn to_json(&self) -> Result<String, SceneError> {
        let mut encoded = self.clone();
        for visual in &mut encoded.visuals {
            visual.encode_payloads();
        }
        serde_json::to_string(&encoded).map_err(SceneError::Serialize)
    }

    /// Look up a visual by name.
    #[must_use]
    pub fn visual(&self, name: &str) -> Option<&Visual> {
        self.visuals.iter().find(|v| v.name.as_deref() == Some(name))
    }

    fn decoded(mut self) -> Result<Self, SceneError> {
        for (index, visual) in self.visuals.iter_mut().enumerate() {
            let label = visual.name.clone().unwrap_or_else(|| format!("visual{index}"));
            visual.decode_payloads(&label)?;
        }
        Ok(self)
    }
}

fn default_true() -> bool {
    true
}

fn default_end(size: Option<usize>) -> i32 {
    size.map_or(0, |s| i32::try_from(s).unwrap_or(i32::MAX))
}
