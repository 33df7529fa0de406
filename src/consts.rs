//! Shared numeric constants for the scene renderer.

// ── Interaction ─────────────────────────────────────────────────

/// Chebyshev distance in normalized device coordinates separating a click
/// from a drag.
pub const CLICK_THRESHOLD_NDC: f64 = 0.01;

/// Right-drag zoom multiplier applied to the pointer delta.
pub const DRAG_ZOOM_FACTOR: f64 = 2.5;

/// Wheel zoom multiplier applied per normalized wheel notch.
pub const WHEEL_ZOOM_FACTOR: f64 = 0.2;

// ── Key codes ───────────────────────────────────────────────────

/// `R`: reset the navigation transform.
pub const KEY_RESET: u32 = 82;

pub const KEY_SHIFT: u32 = 16;
pub const KEY_CTRL: u32 = 17;
pub const KEY_ALT: u32 = 18;

// ── Rendering ───────────────────────────────────────────────────

/// Frame buffer clear color (opaque black).
pub const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Default float precision prepended to shader sources for GLSL ES.
pub const PRECISION_HEADER: &str = "precision mediump float;\n";

/// Bytes per uploaded component; every buffer is float32.
pub const BYTES_PER_COMPONENT: i32 = 4;

/// Uniform receiving the navigation translation.
pub const TRANSLATION_UNIFORM: &str = "translation";

/// Uniform receiving the navigation scale.
pub const SCALE_UNIFORM: &str = "scale";
