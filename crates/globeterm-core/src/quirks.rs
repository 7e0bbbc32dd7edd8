#![forbid(unsafe_code)]

//! Mouse button-code normalisation.
//!
//! Terminals disagree on which codes they send for the same gesture. Rather
//! than branching in the decoder, every accepted `(terminal kind, code,
//! release flag)` combination is listed in [`QUIRKS`]; the first matching row
//! wins and anything without a row is dropped.

use bitflags::bitflags;

use crate::event::{InputEvent, MouseButton, ScrollDirection};
use crate::input_parser::{RawInput, RawMouse};
use crate::terminal_kind::TerminalKind;

bitflags! {
    /// Set of terminal kinds a quirk row applies to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct KindSet: u8 {
        const LEGACY      = 0b001;
        const PROGRESSIVE = 0b010;
        const UNKNOWN     = 0b100;
        const ALL = Self::LEGACY.bits() | Self::PROGRESSIVE.bits() | Self::UNKNOWN.bits();
    }
}

impl From<TerminalKind> for KindSet {
    fn from(kind: TerminalKind) -> Self {
        match kind {
            TerminalKind::Legacy => Self::LEGACY,
            TerminalKind::ProgressiveKeyboard => Self::PROGRESSIVE,
            TerminalKind::Unknown => Self::UNKNOWN,
        }
    }
}

/// Which release-flag values a row accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseMatch {
    Pressed,
    Released,
    Either,
}

impl ReleaseMatch {
    const fn accepts(self, released: bool) -> bool {
        match self {
            Self::Pressed => !released,
            Self::Released => released,
            Self::Either => true,
        }
    }
}

/// Canonical meaning of a mouse report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    Press(MouseButton),
    Release,
    Motion,
    Scroll(ScrollDirection),
}

/// One declarative table row. `code: None` matches every code.
#[derive(Debug, Clone, Copy)]
pub struct Quirk {
    pub kinds: KindSet,
    pub code: Option<u16>,
    pub release: ReleaseMatch,
    pub action: MouseAction,
}

const fn row(kinds: KindSet, code: Option<u16>, release: ReleaseMatch, action: MouseAction) -> Quirk {
    Quirk {
        kinds,
        code,
        release,
        action,
    }
}

use MouseAction::{Motion, Press, Release, Scroll};
use ReleaseMatch::{Either, Pressed, Released};

/// Ordered normalisation table; first match wins.
pub const QUIRKS: &[Quirk] = &[
    row(KindSet::ALL, Some(0), Pressed, Press(MouseButton::Left)),
    row(KindSet::ALL, Some(1), Pressed, Press(MouseButton::Middle)),
    row(KindSet::ALL, Some(2), Pressed, Press(MouseButton::Right)),
    // Button-event tracking: motion bit (32) plus the held button.
    row(KindSet::ALL, Some(32), Pressed, Motion),
    row(KindSet::ALL, Some(33), Pressed, Motion),
    row(KindSet::ALL, Some(34), Pressed, Motion),
    // Some legacy terminals lose the held-button bits mid-drag.
    row(
        KindSet::LEGACY.union(KindSet::UNKNOWN),
        Some(35),
        Pressed,
        Motion,
    ),
    // Wheel: the pressed and the clicked (release-final) variants are equivalent.
    row(KindSet::ALL, Some(64), Either, Scroll(ScrollDirection::Up)),
    row(KindSet::ALL, Some(65), Either, Scroll(ScrollDirection::Down)),
    // Wheel reported with the motion bit set.
    row(KindSet::ALL, Some(96), Either, Scroll(ScrollDirection::Up)),
    row(KindSet::ALL, Some(97), Either, Scroll(ScrollDirection::Down)),
    // Every other release-flagged report is a release, never motion.
    row(KindSet::ALL, None, Released, Release),
];

/// Look up the canonical action for a raw mouse report.
#[must_use]
pub fn classify_mouse(kind: TerminalKind, mouse: &RawMouse) -> Option<MouseAction> {
    let kinds = KindSet::from(kind);
    QUIRKS
        .iter()
        .find(|quirk| {
            quirk.kinds.intersects(kinds)
                && quirk.code.is_none_or(|code| code == mouse.code)
                && quirk.release.accepts(mouse.released)
        })
        .map(|quirk| quirk.action)
}

/// Normalise a decoded report into an [`InputEvent`]; `None` means "drop".
#[must_use]
pub fn normalize(kind: TerminalKind, raw: RawInput) -> Option<InputEvent> {
    match raw {
        RawInput::Key(key) => Some(InputEvent::Key(key)),
        RawInput::Mouse(mouse) => {
            let pos = mouse.pos;
            let event = match classify_mouse(kind, &mouse)? {
                MouseAction::Press(button) => InputEvent::ButtonPress { pos, button },
                MouseAction::Release => InputEvent::ButtonRelease { pos },
                MouseAction::Motion => InputEvent::Motion { pos },
                MouseAction::Scroll(direction) => InputEvent::Scroll { direction },
            };
            Some(event)
        }
    }
}
