#![forbid(unsafe_code)]

//! Canonical input types.
//!
//! These are the already-normalised events the
//! [`InputStateMachine`](crate::input::InputStateMachine) consumes. Raw
//! terminal reports are decoded by [`crate::input_parser`] and normalised
//! through [`crate::quirks`] before they become an [`InputEvent`].

use bitflags::bitflags;

/// A 0-indexed cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub x: u16,
    pub y: u16,
}

impl Position {
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to `other`.
    #[must_use]
    pub fn manhattan(self, other: Self) -> u32 {
        u32::from(self.x.abs_diff(other.x)) + u32::from(self.y.abs_diff(other.y))
    }
}

/// Mouse buttons that can start a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// Wheel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    /// Away from the user: zooms in.
    Up,
    /// Toward the user: zooms out.
    Down,
}

bitflags! {
    /// Modifier keys held during a key or mouse event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const NONE  = 0b0000;
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

/// Keys the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Enter,
    Escape,
    Tab,
    Backspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }
}

/// A normalised input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    ButtonPress { pos: Position, button: MouseButton },
    ButtonRelease { pos: Position },
    Motion { pos: Position },
    Scroll { direction: ScrollDirection },
    Key(KeyEvent),
}

impl InputEvent {
    /// Whether this is a motion event (the only kind the runtime coalesces).
    #[must_use]
    pub const fn is_motion(&self) -> bool {
        matches!(self, Self::Motion { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_sums_both_axes() {
        let a = Position::new(10, 10);
        assert_eq!(a.manhattan(Position::new(13, 10)), 3);
        assert_eq!(a.manhattan(Position::new(9, 11)), 2);
        assert_eq!(a.manhattan(a), 0);
    }

    #[test]
    fn key_modifiers_builder() {
        let key = KeyEvent::new(KeyCode::Char('c')).with_modifiers(Modifiers::CTRL);
        assert!(key.ctrl());
        assert!(!KeyEvent::new(KeyCode::Char('c')).ctrl());
    }
}
