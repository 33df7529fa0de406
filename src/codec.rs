//! Base64 payload codec for the typed arrays embedded in a scene.
//!
//! Payloads are little-endian 32-bit words. Float payloads decode directly to
//! `f32`; int payloads decode to `i32` and are then *numerically* widened to
//! `f32`, so every GPU buffer stays float-typed on contexts whose numeric path
//! is float-only.

#[cfg(test)]
#[path = "codec_test.rs"]
mod codec_test;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::scene::VarType;

const WORD: usize = 4;

/// Error returned by [`decode`] and [`decode_i32`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// After stripping non-alphabet characters the payload is not a whole
    /// number of 4-character groups.
    #[error("base64 payload length {0} is not a multiple of 4")]
    Length(usize),
    /// Padding or symbols are misplaced.
    #[error("malformed base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Decode a base64 payload into a flat float buffer.
///
/// # Errors
///
/// Returns [`DecodeError::Length`] when the cleaned payload length is not a
/// multiple of 4 and [`DecodeError::Base64`] for misplaced symbols.
#[allow(clippy::cast_precision_loss)]
pub fn decode(payload: &str, vartype: VarType) -> Result<Vec<f32>, DecodeError> {
    let bytes = decode_bytes(payload)?;
    let words = bytes.chunks_exact(WORD).map(|w| [w[0], w[1], w[2], w[3]]);
    let values = match vartype {
        VarType::Float => words.map(f32::from_le_bytes).collect(),
        VarType::Int => words.map(|w| i32::from_le_bytes(w) as f32).collect(),
    };
    Ok(values)
}

/// Decode a base64 payload into raw `i32` words, without widening.
///
/// # Errors
///
/// Same as [`decode`].
pub fn decode_i32(payload: &str) -> Result<Vec<i32>, DecodeError> {
    let bytes = decode_bytes(payload)?;
    Ok(bytes
        .chunks_exact(WORD)
        .map(|w| i32::from_le_bytes([w[0], w[1], w[2], w[3]]))
        .collect())
}

/// Encode floats as padded base64 of little-endian words.
#[must_use]
pub fn encode_f32(values: &[f32]) -> String {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    STANDARD.encode(bytes)
}

/// Encode ints as padded base64 of little-endian words.
#[must_use]
pub fn encode_i32(values: &[i32]) -> String {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    STANDARD.encode(bytes)
}

fn decode_bytes(payload: &str) -> Result<Vec<u8>, DecodeError> {
    let cleaned: String = payload
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        .collect();
    if cleaned.len() % WORD != 0 {
        return Err(DecodeError::Length(cleaned.len()));
    }
    Ok(STANDARD.decode(cleaned)?)
}
