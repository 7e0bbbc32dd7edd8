#![forbid(unsafe_code)]

//! Wiring: probe the terminal, open the session, run the loop.

use std::io;
use std::time::Instant;

use globeterm_core::{ColorDepth, Error, SessionOptions, TerminalProbe, TerminalSession};
use globeterm_render::Appearance;

use crate::config::RuntimeConfig;
use crate::control_loop::{ControlLoop, ExitReason};
use crate::input_source::ChannelSource;

/// Run the globe on the controlling terminal until it exits.
///
/// The terminal is restored before this returns, on every path: the session
/// guard drops at the end of this function, including after an error.
pub fn run(config: &RuntimeConfig) -> Result<ExitReason, Error> {
    config.validate()?;

    let probe = TerminalProbe::detect();
    tracing::info!(
        kind = probe.kind.as_str(),
        mouse = probe.mouse,
        color = ?probe.color_depth,
        multiplexed = probe.multiplexed,
        "terminal probed"
    );

    let monochrome = config.monochrome || probe.color_depth == ColorDepth::None;
    let appearance = Appearance::new(config.theme.clone(), config.mode, monochrome);

    let session = TerminalSession::new(SessionOptions {
        mouse: config.mouse && probe.mouse,
        kind: probe.kind,
        ..SessionOptions::default()
    })
    .map_err(Error::OutputSink)?;

    let negotiation = session.negotiation();
    for failure in &negotiation.failures {
        tracing::warn!(error = %failure, "continuing without protocol step");
    }
    let keyboard_only = negotiation.keyboard_only();

    let size = session.size().map_err(Error::OutputSink)?;
    let events = ChannelSource::stdin(probe.kind).map_err(Error::OutputSink)?;

    let now = Instant::now();
    let mut control = ControlLoop::new(
        io::stdout(),
        appearance,
        events,
        config,
        size,
        session.signals(),
        now,
    )
    .with_size_probe(Box::new(crossterm::terminal::size));
    if keyboard_only {
        control.show_keyboard_hint(now);
    }

    let result = control.run();
    drop(control);
    drop(session);
    result
}
