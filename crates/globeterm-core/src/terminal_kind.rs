#![forbid(unsafe_code)]

//! Terminal kind, mouse availability and color depth detection.
//!
//! Detection reads a handful of environment variables:
//! - `TERM`, `TERM_PROGRAM`: terminal identification
//! - `KITTY_WINDOW_ID`: kitty, even when `TERM` was overridden
//! - `WT_SESSION`: Windows Terminal, which often leaves `TERM` unset
//! - `TMUX`, `STY`: multiplexers
//! - `NO_COLOR`, `COLORTERM`: color depth
//!
//! [`TerminalProbe::detect_from_inputs`] is pure so every rule is testable
//! without touching the process environment.

use std::env;

/// Keyboard protocol family; drives the protocol negotiator and the mouse
/// quirk table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalKind {
    /// xterm-compatible terminals with no keyboard protocol stack.
    Legacy,
    /// Terminals implementing the progressive (kitty) keyboard protocol.
    ProgressiveKeyboard,
    /// Nothing could be inferred.
    Unknown,
}

impl TerminalKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::ProgressiveKeyboard => "progressive-keyboard",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColorDepth {
    /// Color disabled (`NO_COLOR`, dumb terminal).
    None,
    Ansi16,
    Ansi256,
    TrueColor,
}

/// Environment snapshot used for detection.
#[derive(Debug, Clone, Default)]
pub struct DetectInputs {
    pub term: String,
    pub term_program: String,
    pub colorterm: String,
    pub no_color: bool,
    pub in_tmux: bool,
    pub in_screen: bool,
    pub kitty_window_id: bool,
    pub wt_session: bool,
}

impl DetectInputs {
    /// Snapshot the current process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            term: env::var("TERM").unwrap_or_default(),
            term_program: env::var("TERM_PROGRAM").unwrap_or_default(),
            colorterm: env::var("COLORTERM").unwrap_or_default(),
            no_color: env::var_os("NO_COLOR").is_some(),
            in_tmux: env::var_os("TMUX").is_some(),
            in_screen: env::var_os("STY").is_some(),
            kitty_window_id: env::var_os("KITTY_WINDOW_ID").is_some(),
            wt_session: env::var_os("WT_SESSION").is_some(),
        }
    }
}

/// `TERM_PROGRAM` values of terminals that implement the progressive keyboard
/// protocol (compared case-insensitively).
const PROGRESSIVE_PROGRAMS: &[&str] = &["kitty", "wezterm", "ghostty", "foot", "rio"];

/// `TERM` values that identify a progressive keyboard terminal.
const PROGRESSIVE_TERMS: &[&str] = &["xterm-kitty", "xterm-ghostty", "foot", "foot-extra"];

/// `TERM` prefixes of terminals known to report mouse events.
const MOUSE_TERM_PREFIXES: &[&str] = &[
    "xterm", "rxvt", "screen", "tmux", "linux", "vt100", "vt220", "alacritty", "foot", "wezterm",
    "kitty", "ghostty",
];

/// Result of terminal detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalProbe {
    pub kind: TerminalKind,
    /// Whether mouse tracking is expected to work.
    pub mouse: bool,
    pub color_depth: ColorDepth,
    /// Running inside tmux or GNU screen.
    pub multiplexed: bool,
}

impl TerminalProbe {
    /// Detect from the current environment.
    #[must_use]
    pub fn detect() -> Self {
        Self::detect_from_inputs(&DetectInputs::from_env())
    }

    #[must_use]
    pub fn detect_from_inputs(env: &DetectInputs) -> Self {
        let term = env.term.as_str();
        let multiplexed = env.in_tmux || env.in_screen;
        let is_dumb = term == "dumb";
        // Windows Terminal does not always export TERM.
        let has_term = !term.is_empty() || env.wt_session;

        let progressive = env.kitty_window_id
            || PROGRESSIVE_TERMS.contains(&term)
            || PROGRESSIVE_PROGRAMS
                .iter()
                .any(|p| env.term_program.eq_ignore_ascii_case(p));

        // Multiplexers do not reliably forward keyboard protocol pushes.
        let kind = if progressive && !multiplexed {
            TerminalKind::ProgressiveKeyboard
        } else if has_term && !is_dumb {
            TerminalKind::Legacy
        } else {
            TerminalKind::Unknown
        };

        let mouse = multiplexed
            || kind == TerminalKind::ProgressiveKeyboard
            || env.wt_session
            || MOUSE_TERM_PREFIXES.iter().any(|p| term.starts_with(p));

        let color_depth = if env.no_color || is_dumb {
            ColorDepth::None
        } else if env.colorterm.eq_ignore_ascii_case("truecolor")
            || env.colorterm.eq_ignore_ascii_case("24bit")
        {
            ColorDepth::TrueColor
        } else if term.contains("256color") {
            ColorDepth::Ansi256
        } else {
            ColorDepth::Ansi16
        };

        Self {
            kind,
            mouse,
            color_depth,
            multiplexed,
        }
    }
}
