#![forbid(unsafe_code)]

//! Core: terminal lifecycle, protocol negotiation, input decoding and the
//! interaction state machine.
//!
//! Everything in this crate that touches the terminal does so through a
//! `W: Write` seam or an explicit input snapshot, so the interesting logic
//! (negotiation ordering, quirk tables, drag detection) is testable without a
//! TTY. Only [`terminal_session`] talks to the real terminal.

pub mod error;
pub mod event;
pub mod input;
pub mod input_parser;
pub mod negotiator;
pub mod quirks;
pub mod terminal_kind;
pub mod terminal_session;

pub use error::{ConfigError, Error, ProtocolStep};
pub use event::{InputEvent, KeyCode, KeyEvent, Modifiers, MouseButton, Position, ScrollDirection};
pub use input::{Action, Actions, DragState, InputConfig, InputStateMachine};
pub use negotiator::{MouseMode, NegotiationReport, ProtocolNegotiator};
pub use terminal_kind::{ColorDepth, DetectInputs, TerminalKind, TerminalProbe};
pub use terminal_session::{SessionOptions, SignalFlags, TerminalSession};
