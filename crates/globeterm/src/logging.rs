#![forbid(unsafe_code)]

//! Diagnostic logging to a file.
//!
//! Stdout is the rendering surface, so logs only go to a file, and only
//! when one is configured. Without a file no subscriber is installed.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info";

/// Build the filter from `GLOBETERM_LOG` directives, falling back to `info`.
#[must_use]
pub fn filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a global subscriber appending to `path`.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened, or if a global
/// subscriber is already installed.
pub fn init(path: &Path, directives: Option<&str>) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter(directives))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_thread_names(true)
        .try_init()
        .map_err(|err| io::Error::other(err.to_string()))?;
    tracing::info!(version = crate::cli::VERSION, "logging started");
    Ok(())
}
