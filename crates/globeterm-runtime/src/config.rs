#![forbid(unsafe_code)]

//! Validated runtime configuration.

use std::time::Duration;

use globeterm_core::ConfigError;
use globeterm_globe::{MAX_ZOOM, MIN_ZOOM};
use globeterm_render::{RenderMode, Theme};

pub const MIN_SPEED: f64 = 0.0;
pub const MAX_SPEED: f64 = 20.0;
pub const MIN_FPS: u32 = 1;
pub const MAX_FPS: u32 = 120;
pub const DEFAULT_FPS: u32 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Auto-rotation speed multiplier.
    pub speed: f64,
    pub theme: Theme,
    pub mode: RenderMode,
    pub monochrome: bool,
    pub initial_zoom: f64,
    pub fps: u32,
    /// Negotiate mouse tracking when the terminal supports it.
    pub mouse: bool,
    /// Quit automatically after this long.
    pub exit_after: Option<Duration>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            theme: Theme::geography(),
            mode: RenderMode::Block,
            monochrome: false,
            initial_zoom: 1.0,
            fps: DEFAULT_FPS,
            mouse: true,
            exit_after: None,
        }
    }
}

impl RuntimeConfig {
    /// Reject out-of-range values before anything touches the terminal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.speed.is_finite() && (MIN_SPEED..=MAX_SPEED).contains(&self.speed)) {
            return Err(ConfigError::OutOfRange {
                option: "speed",
                value: self.speed.to_string(),
                expected: "a number between 0 and 20",
            });
        }
        if !(MIN_FPS..=MAX_FPS).contains(&self.fps) {
            return Err(ConfigError::OutOfRange {
                option: "fps",
                value: self.fps.to_string(),
                expected: "an integer between 1 and 120",
            });
        }
        if !(self.initial_zoom.is_finite() && (MIN_ZOOM..=MAX_ZOOM).contains(&self.initial_zoom)) {
            return Err(ConfigError::OutOfRange {
                option: "zoom",
                value: self.initial_zoom.to_string(),
                expected: "a number between 0.2 and 5",
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps.clamp(MIN_FPS, MAX_FPS)
    }
}
