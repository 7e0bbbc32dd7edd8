#![forbid(unsafe_code)]

//! Input byte decoder.
//!
//! Turns terminal input bytes into [`RawInput`] reports. Mouse reports keep the
//! terminal's own button code so quirk normalisation can happen in one
//! declarative place ([`crate::quirks`]) instead of here.
//!
//! Handled:
//! - ASCII characters and control codes
//! - UTF-8 multi-byte characters
//! - CSI and SS3 cursor keys, with xterm modifier parameters
//! - Kitty `CSI code ; mods u` keys
//! - SGR mouse reports (`CSI < b ; x ; y M|m`)
//! - X10 mouse reports (`CSI M cb cx cy`)
//!
//! CSI sequences longer than [`MAX_CSI_LEN`] are discarded up to and
//! including their final byte. A byte that breaks an escape or UTF-8 prefix is
//! decoded again from ground state.

use crate::event::{KeyCode, KeyEvent, Modifiers, Position};

/// Maximum CSI sequence length before the sequence is dropped.
pub const MAX_CSI_LEN: usize = 256;

/// Modifier bits carried inside a mouse button code.
const MOUSE_MODIFIER_BITS: u16 = 4 | 8 | 16;

/// X10 encodes every value with a +32 offset.
const X10_OFFSET: u8 = 32;

/// A mouse report exactly as the terminal sent it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMouse {
    /// Button code with the modifier bits removed.
    pub code: u16,
    /// 0-indexed position.
    pub pos: Position,
    /// Set for SGR `m` reports and for the X10 release code.
    pub released: bool,
    pub modifiers: Modifiers,
}

/// A decoded report, before normalisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInput {
    Key(KeyEvent),
    Mouse(RawMouse),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Ground,
    Escape,
    Csi,
    /// Swallowing the tail of an oversized CSI sequence.
    CsiIgnore,
    Ss3,
    X10 {
        collected: u8,
    },
    Utf8 {
        collected: u8,
        expected: u8,
    },
}

/// Streaming decoder; bytes may be split across calls at any point.
#[derive(Debug, Default)]
pub struct InputParser {
    state: State,
    buffer: Vec<u8>,
    x10: [u8; 3],
    utf8: [u8; 4],
}

impl InputParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(32),
            ..Self::default()
        }
    }

    /// Decode `input`, appending completed reports to `out`.
    pub fn parse_into(&mut self, input: &[u8], out: &mut Vec<RawInput>) {
        for &byte in input {
            if let Some(report) = self.process_byte(byte) {
                out.push(report);
            }
        }
    }

    /// Decode `input` and return the completed reports.
    pub fn parse(&mut self, input: &[u8]) -> Vec<RawInput> {
        let mut out = Vec::new();
        self.parse_into(input, &mut out);
        out
    }

    fn process_byte(&mut self, byte: u8) -> Option<RawInput> {
        match self.state {
            State::Ground => self.ground(byte),
            State::Escape => self.escape(byte),
            State::Csi => self.csi(byte),
            State::CsiIgnore => self.csi_ignore(byte),
            State::Ss3 => self.ss3(byte),
            State::X10 { collected } => self.x10(byte, collected),
            State::Utf8 {
                collected,
                expected,
            } => self.utf8(byte, collected, expected),
        }
    }

    fn ground(&mut self, byte: u8) -> Option<RawInput> {
        let key = match byte {
            0x1B => {
                self.state = State::Escape;
                return None;
            }
            0x09 => KeyEvent::new(KeyCode::Tab),
            0x0D | 0x0A => KeyEvent::new(KeyCode::Enter),
            0x7F | 0x08 => KeyEvent::new(KeyCode::Backspace),
            0x01..=0x1A => {
                KeyEvent::new(KeyCode::Char((byte + b'a' - 1) as char)).with_modifiers(Modifiers::CTRL)
            }
            0x20..=0x7E => KeyEvent::new(KeyCode::Char(byte as char)),
            0xC0..=0xDF => return self.begin_utf8(byte, 2),
            0xE0..=0xEF => return self.begin_utf8(byte, 3),
            0xF0..=0xF7 => return self.begin_utf8(byte, 4),
            _ => return None,
        };
        Some(RawInput::Key(key))
    }

    fn begin_utf8(&mut self, byte: u8, expected: u8) -> Option<RawInput> {
        self.utf8[0] = byte;
        self.state = State::Utf8 {
            collected: 1,
            expected,
        };
        None
    }

    fn escape(&mut self, byte: u8) -> Option<RawInput> {
        match byte {
            b'[' => {
                self.state = State::Csi;
                self.buffer.clear();
                None
            }
            b'O' => {
                self.state = State::Ss3;
                None
            }
            // ESC ESC: report the first as Escape, stay ready for a sequence.
            0x1B => Some(RawInput::Key(KeyEvent::new(KeyCode::Escape))),
            0x20..=0x7E => {
                self.state = State::Ground;
                Some(RawInput::Key(
                    KeyEvent::new(KeyCode::Char(byte as char)).with_modifiers(Modifiers::ALT),
                ))
            }
            _ => {
                self.state = State::Ground;
                self.ground(byte)
            }
        }
    }

    fn csi(&mut self, byte: u8) -> Option<RawInput> {
        if self.buffer.len() >= MAX_CSI_LEN {
            self.buffer.clear();
            tracing::debug!(limit = MAX_CSI_LEN, "discarding oversized CSI sequence");
            self.state = State::CsiIgnore;
            return self.csi_ignore(byte);
        }
        match byte {
            b'0'..=b'9' | b';' | b':' | b'<' | b'=' | b'>' | b'?' => {
                self.buffer.push(byte);
                None
            }
            // Bare `CSI M` introduces three raw X10 bytes.
            b'M' if self.buffer.is_empty() => {
                self.state = State::X10 { collected: 0 };
                None
            }
            b'A'..=b'Z' | b'a'..=b'z' | b'~' => {
                self.state = State::Ground;
                let params = std::mem::take(&mut self.buffer);
                let report = self.dispatch_csi(&params, byte);
                self.buffer = params;
                self.buffer.clear();
                report
            }
            _ => {
                self.state = State::Ground;
                self.buffer.clear();
                None
            }
        }
    }

    fn csi_ignore(&mut self, byte: u8) -> Option<RawInput> {
        match byte {
            0x40..=0x7E => self.state = State::Ground,
            0x1B => self.state = State::Escape,
            _ => {}
        }
        None
    }

    fn dispatch_csi(&self, params: &[u8], final_byte: u8) -> Option<RawInput> {
        if let Some(rest) = params.strip_prefix(b"<")
            && matches!(final_byte, b'M' | b'm')
        {
            return parse_sgr_mouse(rest, final_byte == b'm').map(RawInput::Mouse);
        }
        let code = match final_byte {
            b'A' => KeyCode::Up,
            b'B' => KeyCode::Down,
            b'C' => KeyCode::Right,
            b'D' => KeyCode::Left,
            b'u' => return parse_kitty_key(params).map(RawInput::Key),
            _ => return None,
        };
        Some(RawInput::Key(
            KeyEvent::new(code).with_modifiers(xterm_modifiers(params)),
        ))
    }

    fn ss3(&mut self, byte: u8) -> Option<RawInput> {
        self.state = State::Ground;
        let code = match byte {
            b'A' => KeyCode::Up,
            b'B' => KeyCode::Down,
            b'C' => KeyCode::Right,
            b'D' => KeyCode::Left,
            _ => return None,
        };
        Some(RawInput::Key(KeyEvent::new(code)))
    }

    fn x10(&mut self, byte: u8, collected: u8) -> Option<RawInput> {
        self.x10[usize::from(collected)] = byte;
        if collected < 2 {
            self.state = State::X10 {
                collected: collected + 1,
            };
            return None;
        }
        self.state = State::Ground;
        let [cb, cx, cy] = self.x10;
        let raw = u16::from(cb.checked_sub(X10_OFFSET)?);
        let x = u16::from(cx.checked_sub(X10_OFFSET + 1)?);
        let y = u16::from(cy.checked_sub(X10_OFFSET + 1)?);
        let code = raw & !MOUSE_MODIFIER_BITS;
        Some(RawInput::Mouse(RawMouse {
            code,
            pos: Position::new(x, y),
            // X10 has no release final byte; button 3 means "released".
            released: code == 3,
            modifiers: mouse_modifiers(raw),
        }))
    }

    fn utf8(&mut self, byte: u8, collected: u8, expected: u8) -> Option<RawInput> {
        if byte & 0xC0 != 0x80 {
            self.state = State::Ground;
            return self.ground(byte);
        }
        self.utf8[usize::from(collected)] = byte;
        let collected = collected + 1;
        if collected < expected {
            self.state = State::Utf8 {
                collected,
                expected,
            };
            return None;
        }
        self.state = State::Ground;
        let text = std::str::from_utf8(&self.utf8[..usize::from(expected)]).ok()?;
        let ch = text.chars().next()?;
        Some(RawInput::Key(KeyEvent::new(KeyCode::Char(ch))))
    }
}

fn parse_sgr_mouse(params: &[u8], released: bool) -> Option<RawMouse> {
    let text = std::str::from_utf8(params).ok()?;
    let mut parts = text.split(';');
    let raw: u16 = parts.next()?.parse().ok()?;
    let x: u16 = parts.next()?.parse().ok()?;
    let y: u16 = parts.next()?.parse().ok()?;
    Some(RawMouse {
        code: raw & !MOUSE_MODIFIER_BITS,
        pos: Position::new(x.saturating_sub(1), y.saturating_sub(1)),
        released,
        modifiers: mouse_modifiers(raw),
    })
}

fn mouse_modifiers(raw: u16) -> Modifiers {
    let mut mods = Modifiers::NONE;
    if raw & 4 != 0 {
        mods |= Modifiers::SHIFT;
    }
    if raw & 8 != 0 {
        mods |= Modifiers::ALT;
    }
    if raw & 16 != 0 {
        mods |= Modifiers::CTRL;
    }
    mods
}

/// Decode the xterm modifier parameter (`1 + bitmask`) of `CSI 1 ; m X`.
fn xterm_modifiers(params: &[u8]) -> Modifiers {
    let value = std::str::from_utf8(params)
        .ok()
        .and_then(|s| s.split(';').nth(1))
        .and_then(|m| m.split(':').next())
        .and_then(|m| m.parse::<u8>().ok())
        .unwrap_or(1);
    modifiers_from_mask(value.saturating_sub(1))
}

fn modifiers_from_mask(mask: u8) -> Modifiers {
    let mut mods = Modifiers::NONE;
    if mask & 1 != 0 {
        mods |= Modifiers::SHIFT;
    }
    if mask & 2 != 0 {
        mods |= Modifiers::ALT;
    }
    if mask & 4 != 0 {
        mods |= Modifiers::CTRL;
    }
    if mask & 8 != 0 {
        mods |= Modifiers::SUPER;
    }
    mods
}

fn parse_kitty_key(params: &[u8]) -> Option<KeyEvent> {
    let text = std::str::from_utf8(params).ok()?;
    let mut parts = text.split(';');
    let key_part = parts.next()?;
    let key: u32 = key_part.split(':').next()?.parse().ok()?;
    let mask = parts
        .next()
        .and_then(|m| m.split(':').next())
        .and_then(|m| m.parse::<u8>().ok())
        .unwrap_or(1)
        .saturating_sub(1);
    let code = match key {
        27 => KeyCode::Escape,
        13 => KeyCode::Enter,
        9 => KeyCode::Tab,
        127 => KeyCode::Backspace,
        _ => KeyCode::Char(char::from_u32(key)?),
    };
    Some(KeyEvent::new(code).with_modifiers(modifiers_from_mask(mask)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mouse(report: &[RawInput]) -> RawMouse {
        match report {
            [RawInput::Mouse(m)] => *m,
            other => panic!("expected one mouse report, got {other:?}"),
        }
    }

    #[test]
    fn printable_and_control_keys() {
        let mut parser = InputParser::new();
        let out = parser.parse(b"q+\x03");
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], RawInput::Key(KeyEvent::new(KeyCode::Char('q'))));
        assert_eq!(out[1], RawInput::Key(KeyEvent::new(KeyCode::Char('+'))));
        assert_eq!(
            out[2],
            RawInput::Key(KeyEvent::new(KeyCode::Char('c')).with_modifiers(Modifiers::CTRL))
        );
    }

    #[test]
    fn arrow_keys_csi_and_ss3() {
        let mut parser = InputParser::new();
        let out = parser.parse(b"\x1b[A\x1bOB\x1b[1;5C\x1b[D");
        let codes: Vec<KeyCode> = out
            .iter()
            .map(|r| match r {
                RawInput::Key(k) => k.code,
                RawInput::Mouse(_) => panic!("unexpected mouse report"),
            })
            .collect();
        assert_eq!(
            codes,
            [KeyCode::Up, KeyCode::Down, KeyCode::Right, KeyCode::Left]
        );
        assert!(matches!(out[2], RawInput::Key(k) if k.ctrl()));
    }

    #[test]
    fn sgr_press_and_release() {
        let mut parser = InputParser::new();
        let press = mouse(&parser.parse(b"\x1b[<0;11;11M"));
        assert_eq!(press.code, 0);
        assert_eq!(press.pos, Position::new(10, 10));
        assert!(!press.released);

        let release = mouse(&parser.parse(b"\x1b[<0;14;11m"));
        assert!(release.released);
        assert_eq!(release.pos, Position::new(13, 10));
    }

    #[test]
    fn sgr_modifier_bits_are_stripped() {
        let mut parser = InputParser::new();
        let drag = mouse(&parser.parse(b"\x1b[<48;5;5M"));
        assert_eq!(drag.code, 32);
        assert!(drag.modifiers.contains(Modifiers::CTRL));
    }

    #[test]
    fn x10_click_and_release() {
        let mut parser = InputParser::new();
        // Left press at (0, 0), then the X10 release code.
        let press = mouse(&parser.parse(&[0x1b, b'[', b'M', 32, 33, 33]));
        assert_eq!(press.code, 0);
        assert_eq!(press.pos, Position::new(0, 0));
        assert!(!press.released);

        let release = mouse(&parser.parse(&[0x1b, b'[', b'M', 35, 40, 33]));
        assert_eq!(release.code, 3);
        assert!(release.released);
        assert_eq!(release.pos, Position::new(7, 0));
    }

    #[test]
    fn x10_motion_without_button_is_not_a_release() {
        let mut parser = InputParser::new();
        let motion = mouse(&parser.parse(&[0x1b, b'[', b'M', 32 + 35, 40, 40]));
        assert_eq!(motion.code, 35);
        assert!(!motion.released);
    }

    #[test]
    fn sequences_split_across_reads() {
        let mut parser = InputParser::new();
        assert!(parser.parse(b"\x1b[<64;").is_empty());
        let wheel = mouse(&parser.parse(b"3;4M"));
        assert_eq!(wheel.code, 64);
    }

    #[test]
    fn kitty_keys_decode_to_plain_keys() {
        let mut parser = InputParser::new();
        let out = parser.parse(b"\x1b[113u\x1b[99;5u");
        assert_eq!(out[0], RawInput::Key(KeyEvent::new(KeyCode::Char('q'))));
        assert!(matches!(out[1], RawInput::Key(k) if k.code == KeyCode::Char('c') && k.ctrl()));
    }

    #[test]
    fn utf8_character() {
        let mut parser = InputParser::new();
        let out = parser.parse("é".as_bytes());
        assert_eq!(out, [RawInput::Key(KeyEvent::new(KeyCode::Char('é')))]);
    }

    #[test]
    fn overlong_csi_is_dropped() {
        let mut parser = InputParser::new();
        let mut seq = vec![0x1b, b'['];
        seq.extend(std::iter::repeat_n(b'1', MAX_CSI_LEN + 10));
        seq.push(b'A');
        let _ = parser.parse(&seq);
        assert_eq!(
            parser.parse(b"\x1b[A"),
            [RawInput::Key(KeyEvent::new(KeyCode::Up))]
        );
    }

    #[test]
    fn oversized_csi_tail_is_not_typed() {
        let mut parser = InputParser::new();
        let mut seq = vec![0x1b, b'['];
        seq.extend(std::iter::repeat_n(b'1', 300));
        seq.extend_from_slice(b"Aq");
        assert_eq!(
            parser.parse(&seq),
            [RawInput::Key(KeyEvent::new(KeyCode::Char('q')))]
        );
        assert_eq!(parser.parse(b"x"), [RawInput::Key(KeyEvent::new(KeyCode::Char('x')))]);
    }

    #[test]
    fn broken_utf8_prefix_keeps_next_key() {
        let mut parser = InputParser::new();
        assert_eq!(
            parser.parse(b"\xC3q"),
            [RawInput::Key(KeyEvent::new(KeyCode::Char('q')))]
        );
    }

    #[test]
    fn escape_then_ctrl_c_still_quits() {
        let mut parser = InputParser::new();
        assert_eq!(
            parser.parse(b"\x1b\x03"),
            [RawInput::Key(KeyEvent::new(KeyCode::Char('c')).with_modifiers(Modifiers::CTRL))]
        );
    }

    #[test]
    fn garbage_does_not_panic() {
        let mut parser = InputParser::new();
        let _ = parser.parse(&[0xFF, 0xFE, 0x00, 0x1b, 0x1b, b'[', 0xFF, b'M', 0, 0, 0]);
    }
}
