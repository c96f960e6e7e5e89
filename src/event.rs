//! Input events delivered to a [`Session`](crate::session::Session).
//!
//! Positions are in surface (screen) pixels.

use pglabel_raster::Point;
use serde::{Deserialize, Serialize};

/// Input events the viewport responds to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer button pressed.
    PointerPressed {
        button: PointerButton,
        position: Point,
        modifiers: Modifiers,
    },
    /// Pointer button released.
    PointerReleased {
        button: PointerButton,
        position: Point,
        modifiers: Modifiers,
    },
    /// Pointer moved, with or without a button held.
    PointerMoved { position: Point, modifiers: Modifiers },
    /// Wheel scrolled. Positive delta zooms in.
    Wheel { delta: f32, position: Point },
    /// Keyboard key pressed.
    KeyPressed { key: Key, modifiers: Modifiers },
    /// Rendering surface resized.
    Resized { width: u32, height: u32 },
}

/// Pointer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Keyboard keys (simplified set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    Space,
    Home,
    End,
}

impl Key {
    /// Normalize letters to lowercase so bindings ignore shift/caps.
    pub fn normalized(self) -> Key {
        match self {
            Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
            other => other,
        }
    }
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
        alt: false,
        meta: false,
    };

    /// Whether a click should add to the selection instead of replacing it.
    ///
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn accumulates(&self) -> bool {
        self.ctrl || self.meta
    }
}
