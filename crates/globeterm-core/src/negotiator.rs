#![forbid(unsafe_code)]

//! Terminal protocol negotiation.
//!
//! | Step | Enable | Disable |
//! |------|--------|---------|
//! | Keyboard stack, progressive terminals only | `CSI > 0 u` (push, legacy encoding) | `CSI < u` (pop) |
//! | SGR extended coordinates | `CSI ? 1006 h` | `CSI ? 1006 l` |
//! | Click reporting | `CSI ? 1000 h` | `CSI ? 1000 l` |
//! | Drag (button-motion) reporting | `CSI ? 1002 h` | `CSI ? 1002 l` |
//!
//! Enabling runs top to bottom; [`ProtocolNegotiator::disable`] undoes the mouse
//! modes in reverse and pops the keyboard stack last, and only if the push
//! went through. Every sequence is written and flushed on its own, so a
//! failing write is logged and the remaining steps still run.
//!
//! The negotiator disables itself on drop.

use std::io::Write;

use crate::error::{Error, ProtocolStep};
use crate::terminal_kind::TerminalKind;

/// Push a keyboard mode with no enhancement flags (legacy encoding).
pub const KEYBOARD_PUSH_LEGACY: &[u8] = b"\x1b[>0u";
/// Pop the most recently pushed keyboard mode.
pub const KEYBOARD_POP: &[u8] = b"\x1b[<u";

/// DEC private mouse modes, in enable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseMode {
    /// 1006: SGR extended coordinates.
    SgrExtended,
    /// 1000: button press and release.
    Click,
    /// 1002: motion while a button is held.
    Drag,
}

impl MouseMode {
    pub const ENABLE_ORDER: [Self; 3] = [Self::SgrExtended, Self::Click, Self::Drag];

    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::SgrExtended => 1006,
            Self::Click => 1000,
            Self::Drag => 1002,
        }
    }

    #[must_use]
    pub fn enable_sequence(self) -> Vec<u8> {
        format!("\x1b[?{}h", self.code()).into_bytes()
    }

    #[must_use]
    pub fn disable_sequence(self) -> Vec<u8> {
        format!("\x1b[?{}l", self.code()).into_bytes()
    }
}

/// Outcome of [`ProtocolNegotiator::enable`].
#[derive(Debug, Default)]
pub struct NegotiationReport {
    pub keyboard_pushed: bool,
    /// All requested mouse modes were enabled.
    pub mouse_active: bool,
    pub failures: Vec<Error>,
}

impl NegotiationReport {
    /// Mouse reporting is unavailable, whether skipped or failed.
    #[must_use]
    pub fn keyboard_only(&self) -> bool {
        !self.mouse_active
    }
}

#[derive(Debug)]
pub struct ProtocolNegotiator<W: Write> {
    writer: W,
    mouse: bool,
    keyboard_pushed: bool,
    /// Mouse modes whose enable write succeeded, in enable order.
    mouse_enabled: Vec<MouseMode>,
}

impl<W: Write> ProtocolNegotiator<W> {
    /// `mouse = false` skips every mouse step (keyboard-only operation).
    pub fn new(writer: W, mouse: bool) -> Self {
        Self {
            writer,
            mouse,
            keyboard_pushed: false,
            mouse_enabled: Vec::with_capacity(MouseMode::ENABLE_ORDER.len()),
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.keyboard_pushed || !self.mouse_enabled.is_empty()
    }

    /// Enable the protocols appropriate for `kind`.
    ///
    /// Never fails: each rejected write is recorded in the report and logged.
    pub fn enable(&mut self, kind: TerminalKind) -> NegotiationReport {
        let mut report = NegotiationReport::default();

        if kind == TerminalKind::ProgressiveKeyboard && !self.keyboard_pushed {
            match self.emit(ProtocolStep::KeyboardPush, KEYBOARD_PUSH_LEGACY) {
                Ok(()) => self.keyboard_pushed = true,
                Err(err) => report.failures.push(err),
            }
        }
        report.keyboard_pushed = self.keyboard_pushed;

        if self.mouse {
            for mode in MouseMode::ENABLE_ORDER {
                if self.mouse_enabled.contains(&mode) {
                    continue;
                }
                match self.emit(ProtocolStep::MouseEnable(mode.code()), &mode.enable_sequence()) {
                    Ok(()) => self.mouse_enabled.push(mode),
                    Err(err) => report.failures.push(err),
                }
            }
            report.mouse_active = self.mouse_enabled.len() == MouseMode::ENABLE_ORDER.len();
        }

        tracing::info!(
            kind = kind.as_str(),
            keyboard_pushed = report.keyboard_pushed,
            mouse_active = report.mouse_active,
            failures = report.failures.len(),
            "terminal protocols negotiated"
        );
        report
    }

    /// Undo everything [`enable`](Self::enable) did, in exact reverse order.
    ///
    /// Idempotent. Write failures are logged and returned, never raised.
    pub fn disable(&mut self) -> Vec<Error> {
        let mut failures = Vec::new();
        while let Some(mode) = self.mouse_enabled.pop() {
            if let Err(err) =
                self.emit(ProtocolStep::MouseDisable(mode.code()), &mode.disable_sequence())
            {
                failures.push(err);
            }
        }
        if self.keyboard_pushed {
            self.keyboard_pushed = false;
            if let Err(err) = self.emit(ProtocolStep::KeyboardPop, KEYBOARD_POP) {
                failures.push(err);
            }
        }
        failures
    }

    fn emit(&mut self, step: ProtocolStep, bytes: &[u8]) -> Result<(), Error> {
        let result = self
            .writer
            .write_all(bytes)
            .and_then(|()| self.writer.flush());
        result.map_err(|source| {
            tracing::warn!(%step, error = %source, "protocol write rejected");
            Error::ProtocolNegotiation { step, source }
        })
    }
}

impl<W: Write> Drop for ProtocolNegotiator<W> {
    fn drop(&mut self) {
        let _ = self.disable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_terminal_never_touches_keyboard_stack() {
        let mut negotiator = ProtocolNegotiator::new(Vec::new(), true);
        let report = negotiator.enable(TerminalKind::Legacy);
        assert!(!report.keyboard_pushed);
        assert!(report.mouse_active);
        negotiator.disable();
        let out = String::from_utf8_lossy(negotiator.get_ref()).into_owned();
        assert!(!out.contains("\x1b[>0u"));
        assert!(!out.contains("\x1b[<u"));
        assert_eq!(
            out,
            "\x1b[?1006h\x1b[?1000h\x1b[?1002h\x1b[?1002l\x1b[?1000l\x1b[?1006l"
        );
    }

    #[test]
    fn mouse_disabled_means_keyboard_only() {
        let mut negotiator = ProtocolNegotiator::new(Vec::new(), false);
        let report = negotiator.enable(TerminalKind::ProgressiveKeyboard);
        assert!(report.keyboard_pushed);
        assert!(report.keyboard_only());
        assert_eq!(negotiator.get_ref().as_slice(), KEYBOARD_PUSH_LEGACY);
    }

    #[test]
    fn disable_is_idempotent() {
        let mut negotiator = ProtocolNegotiator::new(Vec::new(), true);
        negotiator.enable(TerminalKind::ProgressiveKeyboard);
        negotiator.disable();
        let len = negotiator.get_ref().len();
        assert!(negotiator.disable().is_empty());
        assert_eq!(negotiator.get_ref().len(), len);
        assert!(!negotiator.is_active());
    }

    #[test]
    fn enable_twice_does_not_push_twice() {
        let mut negotiator = ProtocolNegotiator::new(Vec::new(), false);
        negotiator.enable(TerminalKind::ProgressiveKeyboard);
        negotiator.enable(TerminalKind::ProgressiveKeyboard);
        assert_eq!(negotiator.get_ref().as_slice(), KEYBOARD_PUSH_LEGACY);
    }
}
