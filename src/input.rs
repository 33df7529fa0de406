//! Input model: page-to-NDC mapping and the interaction state machine.
//!
//! Every raw pointer or keyboard event updates [`InteractionState`] and yields
//! at most one classified [`Action`]. States are implicit in the held button
//! and the current action; the navigation dispatcher consumes the action in
//! the same call stack, so nothing here is queued or retained across frames
//! beyond what the next drag/click decision needs.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::consts::{CLICK_THRESHOLD_NDC, KEY_ALT, KEY_CTRL, KEY_SHIFT};

/// A point in page pixels or normalized device coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Chebyshev (L∞) distance to `other`.
    #[must_use]
    pub fn max_norm(self, other: Point) -> f64 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// Canvas placement on the page plus the size of its drawing buffer.
///
/// `width`, `height` and `offset` describe the content box in CSS pixels and
/// drive pointer mapping. The drawing buffer is what the viewport covers; it
/// differs from the CSS size under CSS scaling or a device pixel ratio != 1.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasGeometry {
    pub width: f64,
    pub height: f64,
    /// Top-left corner of the content box in page coordinates; `None` until
    /// the element is mounted.
    pub offset: Option<Point>,
    pub buffer_width: u32,
    pub buffer_height: u32,
}

impl CanvasGeometry {
    /// Geometry whose drawing buffer matches the CSS size.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(width: f64, height: f64, offset: Option<Point>) -> Self {
        let buffer = |css: f64| css.max(0.0).round() as u32;
        Self { width, height, offset, buffer_width: buffer(width), buffer_height: buffer(height) }
    }

    /// Override the drawing-buffer size (the canvas `width`/`height`
    /// attributes).
    #[must_use]
    pub fn with_buffer(mut self, width: u32, height: u32) -> Self {
        self.buffer_width = width;
        self.buffer_height = height;
        self
    }

    /// Drawing-buffer size as viewport dimensions.
    #[must_use]
    pub fn viewport_size(&self) -> (i32, i32) {
        let clamp = |v: u32| i32::try_from(v).unwrap_or(i32::MAX);
        (clamp(self.buffer_width), clamp(self.buffer_height))
    }

    /// Map a page position to normalized device coordinates (Y up).
    ///
    /// Degrades to the origin when the canvas is not mounted or has no area.
    #[must_use]
    pub fn to_ndc(&self, page: Point) -> Point {
        let Some(offset) = self.offset else {
            return Point::default();
        };
        if self.width <= 0.0 || self.height <= 0.0 {
            return Point::default();
        }
        let x = page.x - offset.x;
        let y = page.y - offset.y;
        Point::new(2.0 * x / self.width - 1.0, -(2.0 * y / self.height - 1.0))
    }
}

/// Held mouse button, from the DOM `which` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    /// `1` left, `2` middle, `3` right; anything else is no button.
    #[must_use]
    pub fn from_which(which: u8) -> Option<Self> {
        match which {
            1 => Some(Self::Left),
            2 => Some(Self::Middle),
            3 => Some(Self::Right),
            _ => None,
        }
    }
}

/// Held keyboard modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyModifier {
    Shift,
    Ctrl,
    Alt,
}

impl KeyModifier {
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            KEY_SHIFT => Some(Self::Shift),
            KEY_CTRL => Some(Self::Ctrl),
            KEY_ALT => Some(Self::Alt),
            _ => None,
        }
    }
}

/// A classified user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MouseMove,
    LeftClick,
    MiddleClick,
    RightClick,
    LeftDrag,
    MiddleDrag,
    RightDrag,
    DoubleClick,
    Wheel,
    KeyPress,
}

impl Action {
    fn click(button: MouseButton) -> Self {
        match button {
            MouseButton::Left => Self::LeftClick,
            MouseButton::Middle => Self::MiddleClick,
            MouseButton::Right => Self::RightClick,
        }
    }

    fn drag(button: Option<MouseButton>) -> Self {
        match button {
            Some(MouseButton::Left) => Self::LeftDrag,
            Some(MouseButton::Middle) => Self::MiddleDrag,
            Some(MouseButton::Right) => Self::RightDrag,
            None => Self::MouseMove,
        }
    }
}

/// Interaction state for one canvas.
///
/// Positions are in normalized device coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionState {
    pub action: Option<Action>,
    pub key: Option<u32>,
    pub key_modifier: Option<KeyModifier>,
    pub mouse_button: Option<MouseButton>,
    pub mouse_position: Point,
    pub mouse_position_diff: Point,
    pub mouse_press_position: Point,
    pub wheel: f64,
    threshold: f64,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self::with_threshold(CLICK_THRESHOLD_NDC)
    }
}

impl InteractionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial state with a custom click/drag threshold.
    #[must_use]
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            action: None,
            key: None,
            key_modifier: None,
            mouse_button: None,
            mouse_position: Point::default(),
            mouse_position_diff: Point::default(),
            mouse_press_position: Point::default(),
            wheel: 0.0,
            threshold,
        }
    }

    /// Pointer pressed. Records the press position; no action yet.
    pub fn press(&mut self, pos: Point, which: u8) -> Option<Action> {
        self.action = None;
        self.mouse_button = MouseButton::from_which(which);
        self.mouse_press_position = pos;
        self.mouse_position = pos;
        self.action
    }

    /// Pointer moved. Classifies a drag (or a plain move) once the pointer is
    /// at least the threshold away from the press position.
    pub fn move_to(&mut self, pos: Point) -> Option<Action> {
        self.mouse_position_diff = Point::new(pos.x - self.mouse_position.x, pos.y - self.mouse_position.y);
        self.mouse_position = pos;
        self.action = if self.beyond_threshold() {
            Some(Action::drag(self.mouse_button))
        } else {
            None
        };
        self.action
    }

    /// Pointer released. A release within the threshold of the press is a
    /// click of `which`; the held button is always cleared.
    pub fn release(&mut self, pos: Point, which: u8) -> Option<Action> {
        self.mouse_position = pos;
        self.action = if self.beyond_threshold() {
            None
        } else {
            MouseButton::from_which(which).map(Action::click)
        };
        self.mouse_button = None;
        self.action
    }

    pub fn double_click(&mut self) -> Option<Action> {
        self.action = Some(Action::DoubleClick);
        self.action
    }

    /// Wheel turned by `delta` normalized notches.
    pub fn wheel(&mut self, delta: f64) -> Option<Action> {
        self.wheel = delta;
        self.action = Some(Action::Wheel);
        self.action
    }

    /// Key pressed. Modifier codes only update the held modifier.
    pub fn key_down(&mut self, code: u32) -> Option<Action> {
        if let Some(modifier) = KeyModifier::from_code(code) {
            self.key_modifier = Some(modifier);
            self.action = None;
        } else {
            self.key = Some(code);
            self.action = Some(Action::KeyPress);
        }
        self.action
    }

    pub fn key_up(&mut self, code: u32) -> Option<Action> {
        if KeyModifier::from_code(code).is_some() {
            self.key_modifier = None;
        } else {
            self.key = None;
        }
        self.action = None;
        self.action
    }

    /// Focus lost: back to the initial state.
    pub fn focus_out(&mut self) -> Option<Action> {
        *self = Self::with_threshold(self.threshold);
        self.action
    }

    fn beyond_threshold(&self) -> bool {
        self.mouse_position.max_norm(self.mouse_press_position) >= self.threshold
    }
}
