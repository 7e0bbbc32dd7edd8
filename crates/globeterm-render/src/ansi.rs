#![forbid(unsafe_code)]

//! ANSI escape sequence helpers.
//!
//! Pure byte generation; state tracking lives in the presenter.
//!
//! | Sequence | Meaning |
//! |----------|---------|
//! | `ESC [ n m` | SGR |
//! | `ESC [ row ; col H` | CUP, 1-indexed |
//! | `ESC [ 2 J` | erase display |

use std::io::{self, Write};

use crate::cell::Color;

pub const SGR_RESET: &[u8] = b"\x1b[0m";

#[inline]
pub fn sgr_reset<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(SGR_RESET)
}

/// Foreground color. Indices below 16 use the short 30-37/90-97 forms.
pub fn sgr_fg<W: Write>(w: &mut W, color: Color) -> io::Result<()> {
    match color {
        Color::Default => w.write_all(b"\x1b[39m"),
        Color::Indexed(i @ 0..=7) => write!(w, "\x1b[{}m", 30 + u16::from(i)),
        Color::Indexed(i @ 8..=15) => write!(w, "\x1b[{}m", 90 + u16::from(i) - 8),
        Color::Indexed(i) => write!(w, "\x1b[38;5;{i}m"),
    }
}

/// Background color. Indices below 16 use the short 40-47/100-107 forms.
pub fn sgr_bg<W: Write>(w: &mut W, color: Color) -> io::Result<()> {
    match color {
        Color::Default => w.write_all(b"\x1b[49m"),
        Color::Indexed(i @ 0..=7) => write!(w, "\x1b[{}m", 40 + u16::from(i)),
        Color::Indexed(i @ 8..=15) => write!(w, "\x1b[{}m", 100 + u16::from(i) - 8),
        Color::Indexed(i) => write!(w, "\x1b[48;5;{i}m"),
    }
}

/// CUP: 0-indexed input, 1-indexed on the wire.
pub fn cup<W: Write>(w: &mut W, row: u16, col: u16) -> io::Result<()> {
    write!(
        w,
        "\x1b[{};{}H",
        u32::from(row) + 1,
        u32::from(col) + 1
    )
}

pub fn erase_display<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}
