//! Uniform upload dispatch.
//!
//! [`UniformKind`] is derived once from a variable's `(ndim, size, vartype)`
//! and maps onto exactly one [`GlContext`] upload entry point.

#[cfg(test)]
#[path = "uniform_test.rs"]
mod uniform_test;

use crate::gl::GlContext;
use crate::scene::{VarType, Variable};
use crate::visual::RenderError;

/// Upload form of a uniform variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Float1,
    Float2,
    Float3,
    Float4,
    Int1,
    Int2,
    Int3,
    Int4,
    /// `count` float elements of `components` each.
    FloatArray { components: u8, count: usize },
    /// `count` int elements of `components` each.
    IntArray { components: u8, count: usize },
    Matrix2,
    Matrix3,
    Matrix4,
}

impl UniformKind {
    /// Classify a uniform variable.
    ///
    /// # Errors
    ///
    /// [`RenderError::UnsupportedUniform`] for component counts outside 1–4
    /// or matrix dimensions outside 2–4.
    pub fn of(variable: &Variable) -> Result<Self, RenderError> {
        let unsupported = || RenderError::UnsupportedUniform { name: variable.name.clone() };

        if let Some(dim) = variable.ndim.matrix_dim() {
            return match dim {
                2 => Ok(Self::Matrix2),
                3 => Ok(Self::Matrix3),
                4 => Ok(Self::Matrix4),
                _ => Err(unsupported()),
            };
        }

        let components = variable.ndim.components();
        if !(1..=4).contains(&components) {
            return Err(unsupported());
        }
        if let Some(count) = variable.count() {
            return Ok(match variable.vartype {
                VarType::Float => Self::FloatArray { components, count },
                VarType::Int => Self::IntArray { components, count },
            });
        }
        Ok(match (variable.vartype, components) {
            (VarType::Float, 1) => Self::Float1,
            (VarType::Float, 2) => Self::Float2,
            (VarType::Float, 3) => Self::Float3,
            (VarType::Float, _) => Self::Float4,
            (VarType::Int, 1) => Self::Int1,
            (VarType::Int, 2) => Self::Int2,
            (VarType::Int, 3) => Self::Int3,
            (VarType::Int, _) => Self::Int4,
        })
    }

    /// Minimum number of floats an upload reads.
    #[must_use]
    pub fn required_len(self) -> usize {
        match self {
            Self::Float1 | Self::Int1 => 1,
            Self::Float2 | Self::Int2 => 2,
            Self::Float3 | Self::Int3 => 3,
            Self::Float4 | Self::Int4 | Self::Matrix2 => 4,
            Self::FloatArray { components, count } | Self::IntArray { components, count } => {
                usize::from(components).saturating_mul(count)
            }
            Self::Matrix3 => 9,
            Self::Matrix4 => 16,
        }
    }

    /// Upload `data` to `location` through the matching entry point. Array
    /// forms send exactly `count` elements; extra values are ignored.
    ///
    /// # Errors
    ///
    /// [`RenderError::ShortData`] when `data` holds fewer values than the
    /// form requires.
    #[allow(clippy::cast_possible_truncation)]
    pub fn upload<G: GlContext>(
        self,
        gl: &G,
        location: &G::UniformLocation,
        name: &str,
        data: &[f32],
    ) -> Result<(), RenderError> {
        let expected = self.required_len();
        if data.len() < expected {
            return Err(RenderError::ShortData { name: name.to_owned(), expected, got: data.len() });
        }
        let int = |i: usize| data[i] as i32;

        match self {
            Self::Float1 => gl.uniform1f(location, data[0]),
            Self::Float2 => gl.uniform2f(location, data[0], data[1]),
            Self::Float3 => gl.uniform3f(location, data[0], data[1], data[2]),
            Self::Float4 => gl.uniform4f(location, data[0], data[1], data[2], data[3]),
            Self::Int1 => gl.uniform1i(location, int(0)),
            Self::Int2 => gl.uniform2i(location, int(0), int(1)),
            Self::Int3 => gl.uniform3i(location, int(0), int(1), int(2)),
            Self::Int4 => gl.uniform4i(location, int(0), int(1), int(2), int(3)),
            Self::FloatArray { components, .. } => gl.uniform_fv(location, components, &data[..expected]),
            Self::IntArray { components, .. } => {
                let ints: Vec<i32> = data[..expected].iter().map(|v| *v as i32).collect();
                gl.uniform_iv(location, components, &ints);
            }
            Self::Matrix2 => gl.uniform_matrix_fv(location, 2, &data[..4]),
            Self::Matrix3 => gl.uniform_matrix_fv(location, 3, &data[..9]),
            Self::Matrix4 => gl.uniform_matrix_fv(location, 4, &data[..16]),
        }
        Ok(())
    }
}
