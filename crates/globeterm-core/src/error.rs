#![forbid(unsafe_code)]

//! Error types shared by every globeterm crate.
//!
//! Failures only surface at the I/O boundary. Projection and rasterization are
//! total and never produce an [`Error`].

use std::fmt;
use std::io;

/// A single escape-sequence write performed by the protocol negotiator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolStep {
    /// Push the keyboard protocol stack with legacy encoding selected.
    KeyboardPush,
    /// Pop the keyboard protocol stack.
    KeyboardPop,
    /// Enable a mouse reporting mode (DEC private mode number).
    MouseEnable(u16),
    /// Disable a mouse reporting mode (DEC private mode number).
    MouseDisable(u16),
}

impl fmt::Display for ProtocolStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyboardPush => write!(f, "keyboard protocol push"),
            Self::KeyboardPop => write!(f, "keyboard protocol pop"),
            Self::MouseEnable(mode) => write!(f, "mouse mode {mode} enable"),
            Self::MouseDisable(mode) => write!(f, "mouse mode {mode} disable"),
        }
    }
}

/// An out-of-range or unrecognised configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A numeric option outside its accepted range.
    OutOfRange {
        option: &'static str,
        value: String,
        expected: &'static str,
    },
    /// A named option whose value is not one of the accepted names.
    UnknownValue {
        option: &'static str,
        value: String,
        allowed: Vec<String>,
    },
    /// A flag that requires a value was given none.
    MissingValue(&'static str),
    /// An argument that is not a recognised flag.
    UnknownFlag(String),
    /// A theme definition that fails validation.
    InvalidTheme { name: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange {
                option,
                value,
                expected,
            } => write!(f, "invalid {option} value '{value}': expected {expected}"),
            Self::UnknownValue {
                option,
                value,
                allowed,
            } => write!(
                f,
                "unknown {option} '{value}'. Available: {}",
                allowed.join(", ")
            ),
            Self::MissingValue(option) => write!(f, "{option} requires a value"),
            Self::UnknownFlag(flag) => write!(f, "unknown argument: {flag}"),
            Self::InvalidTheme { name, reason } => write!(f, "invalid theme '{name}': {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level error.
#[derive(Debug)]
pub enum Error {
    /// An escape-sequence write during protocol negotiation was rejected.
    ///
    /// Logged and tolerated: negotiation continues with the remaining steps.
    ProtocolNegotiation {
        step: ProtocolStep,
        source: io::Error,
    },
    /// The output sink rejected a write. Fatal for the running loop.
    OutputSink(io::Error),
    /// A configuration value was rejected before the loop started.
    InvalidConfiguration(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProtocolNegotiation { step, source } => {
                write!(f, "terminal protocol negotiation failed at {step}: {source}")
            }
            Self::OutputSink(source) => write!(f, "terminal output failed: {source}"),
            Self::InvalidConfiguration(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ProtocolNegotiation { source, .. } => Some(source),
            Self::OutputSink(source) => Some(source),
            Self::InvalidConfiguration(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::InvalidConfiguration(err)
    }
}
