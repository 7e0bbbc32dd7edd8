#![forbid(unsafe_code)]

//! Runtime: the control loop and the pieces it schedules.

pub mod app;
pub mod config;
pub mod control_loop;
pub mod input_source;
pub mod pacing;
pub mod resize;

pub use app::run;
pub use config::RuntimeConfig;
pub use control_loop::{ControlLoop, ExitReason};
pub use input_source::{ChannelSource, Decoder, EventQueue, EventSource};
pub use pacing::FramePacer;
pub use resize::ResizeDebouncer;
