#![forbid(unsafe_code)]

//! globeterm binary support: argument parsing and logging setup.

pub mod cli;
pub mod logging;
