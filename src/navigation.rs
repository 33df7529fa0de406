//! Pan/zoom navigation transform and the action-to-navigation dispatcher.
//!
//! The transform reaches the shaders as two uniform vectors, `translation`
//! and `scale`; vertex shaders compute `scale * (position + translation)`.

#[cfg(test)]
#[path = "navigation_test.rs"]
mod navigation_test;

use serde::{Deserialize, Serialize};

use crate::consts::{CLICK_THRESHOLD_NDC, DRAG_ZOOM_FACTOR, KEY_RESET, WHEEL_ZOOM_FACTOR};
use crate::input::{Action, InteractionState};

/// Tunable interaction parameters for one canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// NDC distance separating a click from a drag.
    pub click_threshold: f64,
    /// Multiplier applied to right-drag deltas before zooming.
    pub drag_zoom_factor: f64,
    /// Multiplier applied to wheel notches before zooming.
    pub wheel_zoom_factor: f64,
    /// Key code that resets the view.
    pub reset_key: u32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            click_threshold: CLICK_THRESHOLD_NDC,
            drag_zoom_factor: DRAG_ZOOM_FACTOR,
            wheel_zoom_factor: WHEEL_ZOOM_FACTOR,
            reset_key: KEY_RESET,
        }
    }
}

/// Accumulated translation, scale and rotation.
///
/// `sxl`/`syl` snapshot the scale at the previous zoom step so the next step
/// can re-center proportionally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationTransform {
    pub tx: f64,
    pub ty: f64,
    pub tz: f64,
    pub sx: f64,
    pub sy: f64,
    pub sxl: f64,
    pub syl: f64,
    pub rx: f64,
    pub ry: f64,
}

impl Default for NavigationTransform {
    fn default() -> Self {
        Self { tx: 0.0, ty: 0.0, tz: 0.0, sx: 1.0, sy: 1.0, sxl: 1.0, syl: 1.0, rx: 0.0, ry: 0.0 }
    }
}

impl NavigationTransform {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to identity.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Translate by a screen-space delta; the world-space step shrinks as the
    /// zoom grows so a drag feels the same at any zoom level.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.tx += dx / self.sx;
        self.ty += dy / self.sy;
    }

    pub fn rotate(&mut self, dx: f64, dy: f64) {
        self.rx += dx;
        self.ry += dy;
    }

    /// Multiply the scale by `e^dx`, `e^dy`, keeping `(px, py)` fixed on screen.
    pub fn zoom(&mut self, dx: f64, px: f64, dy: f64, py: f64) {
        self.sx *= dx.exp();
        self.sy *= dy.exp();
        self.tx += -px * (1.0 / self.sxl - 1.0 / self.sx);
        self.ty += -py * (1.0 / self.syl - 1.0 / self.sy);
        self.sxl = self.sx;
        self.syl = self.sy;
    }

    /// Screen position of a world point under this transform.
    #[must_use]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.sx * (x + self.tx), self.sy * (y + self.ty))
    }

    /// Value of the `translation` uniform.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn translation(&self) -> [f32; 2] {
        [self.tx as f32, self.ty as f32]
    }

    /// Value of the `scale` uniform.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn scale(&self) -> [f32; 2] {
        [self.sx as f32, self.sy as f32]
    }

    /// Apply the navigation mapped to the current action.
    ///
    /// Returns `true` when the transform changed and a redraw is due.
    pub fn process(&mut self, input: &InteractionState, config: &NavigationConfig) -> bool {
        match input.action {
            Some(Action::LeftDrag) => {
                self.pan(input.mouse_position_diff.x, input.mouse_position_diff.y);
                true
            }
            Some(Action::RightDrag) => {
                self.zoom(
                    input.mouse_position_diff.x * config.drag_zoom_factor,
                    input.mouse_press_position.x,
                    input.mouse_position_diff.y * config.drag_zoom_factor,
                    input.mouse_press_position.y,
                );
                true
            }
            Some(Action::Wheel) => {
                let step = input.wheel * config.wheel_zoom_factor;
                self.zoom(step, input.mouse_position.x, step, input.mouse_position.y);
                true
            }
            Some(Action::KeyPress) if input.key == Some(config.reset_key) => {
                self.reset();
                true
            }
            _ => false,
        }
    }
}
