//! Pointer and keyboard events fed into a canvas session.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// Middle and right always pan, whatever tool is active.
    pub fn is_pan_button(self) -> bool {
        matches!(self, MouseButton::Middle | MouseButton::Right)
    }
}

/// Pointer event type for unified mouse/touch handling.
///
/// Positions are in window pixels; the canvas converts them using its viewport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    Move {
        position: Point,
    },
    Scroll {
        position: Point,
        delta: Vec2,
    },
    /// The pointer left the canvas.
    Leave,
}

/// Keyboard event type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}

/// Named keys the canvas reacts to.
pub mod keys {
    pub const ENTER: &str = "Enter";
    pub const ESCAPE: &str = "Escape";
}
