#![forbid(unsafe_code)]

//! The per-frame control loop.
//!
//! One iteration, in order:
//!
//! 1. Check for a termination signal and the scripted-exit timer.
//! 2. Feed resize observations to the debouncer; apply a settled size.
//! 3. Take at most one input event and apply its actions.
//! 4. Auto-rotate when the user has been idle long enough.
//! 5. Project, rasterize, overlay, diff and flush (skipped while a resize is
//!    pending).
//!
//! Everything runs on the calling thread. The only suspension point is the
//! pacer's sleep at the end of [`ControlLoop::run`].

use std::f64::consts::TAU;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use globeterm_core::{Action, Error, InputConfig, InputStateMachine, SignalFlags};
use globeterm_globe::{Projector, SphereModel};
use globeterm_render::{Appearance, Color, Renderer, ThemeTable};

use crate::config::RuntimeConfig;
use crate::input_source::EventSource;
use crate::pacing::FramePacer;
use crate::resize::ResizeDebouncer;

/// Radians of rotation per cell of drag or key step.
pub const ROTATION_SENSITIVITY: f64 = 0.01;
/// Auto-rotation at speed 1.0: one revolution every 45 seconds.
pub const AUTO_ROTATE_SPEED: f64 = TAU / 45.0;
/// Longest frame delta fed to auto-rotation, so a stall does not jump.
pub const MAX_FRAME_DT: Duration = Duration::from_millis(250);
/// How often the terminal size is polled in addition to SIGWINCH.
pub const SIZE_POLL_INTERVAL: Duration = Duration::from_millis(250);
/// How long the keyboard-only hint stays on screen.
pub const HINT_DURATION: Duration = Duration::from_secs(3);
pub const MIN_WIDTH: u16 = 20;
pub const MIN_HEIGHT: u16 = 10;

pub const KEYBOARD_HINT: &str = "Mouse not detected: arrows rotate, +/- zoom, q quits";
const TOO_SMALL: &str = "Terminal too small!";

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Quit,
    /// A termination signal (signal number).
    Signal(i32),
    /// The scripted exit timer elapsed.
    Timeout,
}

impl ExitReason {
    /// Conventional process exit status.
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Quit | Self::Timeout => 0,
            Self::Signal(signal) => 128 + signal,
        }
    }
}

pub type SizeProbe = Box<dyn FnMut() -> io::Result<(u16, u16)>>;

pub struct ControlLoop<W: Write, S: EventSource, T: ThemeTable = Appearance> {
    renderer: Renderer<W, T>,
    projector: Projector,
    model: SphereModel,
    machine: InputStateMachine,
    events: S,
    debouncer: ResizeDebouncer,
    flags: Arc<SignalFlags>,
    size_probe: Option<SizeProbe>,
    speed: f64,
    frame_interval: Duration,
    started: Instant,
    exit_after: Option<Duration>,
    hint_until: Option<Instant>,
    last_tick: Instant,
    last_size_poll: Instant,
}

impl<W: Write, S: EventSource, T: ThemeTable> ControlLoop<W, S, T> {
    pub fn new(
        writer: W,
        theme: T,
        events: S,
        config: &RuntimeConfig,
        size: (u16, u16),
        flags: Arc<SignalFlags>,
        now: Instant,
    ) -> Self {
        Self {
            renderer: Renderer::new(writer, theme, size.0, size.1),
            projector: Projector::default(),
            model: SphereModel::new(config.initial_zoom),
            machine: InputStateMachine::new(InputConfig::default(), now),
            events,
            debouncer: ResizeDebouncer::new(size),
            flags,
            size_probe: None,
            speed: config.speed,
            frame_interval: config.frame_interval(),
            started: now,
            exit_after: config.exit_after,
            hint_until: None,
            last_tick: now,
            last_size_poll: now,
        }
    }

    /// Poll the terminal size with `probe` every [`SIZE_POLL_INTERVAL`].
    #[must_use]
    pub fn with_size_probe(mut self, probe: SizeProbe) -> Self {
        self.size_probe = Some(probe);
        self
    }

    /// Show the keyboard-only hint for [`HINT_DURATION`] from `now`.
    pub fn show_keyboard_hint(&mut self, now: Instant) {
        self.hint_until = Some(now + HINT_DURATION);
    }

    pub fn model(&self) -> &SphereModel {
        &self.model
    }

    pub fn machine(&self) -> &InputStateMachine {
        &self.machine
    }

    pub fn renderer(&self) -> &Renderer<W, T> {
        &self.renderer
    }

    /// Record an observed terminal size.
    pub fn notify_size(&mut self, width: u16, height: u16, now: Instant) {
        self.debouncer.handle_resize_at(width, height, now);
    }

    /// Run until quit, signal, timeout or an output failure.
    pub fn run(&mut self) -> Result<ExitReason, Error> {
        tracing::info!(
            width = self.renderer.width(),
            height = self.renderer.height(),
            fps = self.frame_interval.as_secs_f64().recip().round(),
            "control loop started"
        );
        let mut pacer = FramePacer::new(self.frame_interval, Instant::now());
        loop {
            let now = Instant::now();
            pacer.begin(now);
            self.poll_size(now);
            if let Some(reason) = self.step(now)? {
                tracing::info!(?reason, "control loop finished");
                return Ok(reason);
            }
            pacer.wait();
        }
    }

    fn poll_size(&mut self, now: Instant) {
        let signalled = self.flags.take_resize();
        let due = now.saturating_duration_since(self.last_size_poll) >= SIZE_POLL_INTERVAL;
        if !(signalled || due) {
            return;
        }
        self.last_size_poll = now;
        let Some(probe) = self.size_probe.as_mut() else {
            return;
        };
        match probe() {
            Ok((width, height)) => self.debouncer.handle_resize_at(width, height, now),
            Err(err) => tracing::warn!(error = %err, "terminal size query failed"),
        }
    }

    /// One loop iteration at `now`, without sleeping.
    ///
    /// Returns `Some` when the loop should stop.
    pub fn step(&mut self, now: Instant) -> Result<Option<ExitReason>, Error> {
        if let Some(signal) = self.flags.termination() {
            return Ok(Some(ExitReason::Signal(signal)));
        }
        if let Some(limit) = self.exit_after
            && now.saturating_duration_since(self.started) >= limit
        {
            return Ok(Some(ExitReason::Timeout));
        }

        if let Some((width, height)) = self.debouncer.tick_at(now) {
            self.apply_resize(width, height)?;
        }

        if let Some(event) = self.events.poll_event() {
            for action in self.machine.feed(event, now) {
                if self.apply(action) {
                    return Ok(Some(ExitReason::Quit));
                }
            }
        }

        let dt = now.saturating_duration_since(self.last_tick).min(MAX_FRAME_DT);
        self.last_tick = now;
        if self.machine.is_idle(now) {
            let delta = AUTO_ROTATE_SPEED * self.speed * dt.as_secs_f64();
            self.model.apply_rotation_delta(delta, 0.0);
        }

        if self.debouncer.has_pending() {
            return Ok(None);
        }
        self.draw(now)?;
        Ok(None)
    }

    /// Apply one action. Returns `true` on quit.
    fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return true,
            Action::DragStart => tracing::trace!("drag started"),
            Action::Rotate { dx, dy } => self
                .model
                .apply_rotation_delta(dx * ROTATION_SENSITIVITY, dy * ROTATION_SENSITIVITY),
            Action::Zoom(delta) => {
                if self.model.apply_zoom_delta(delta) {
                    tracing::trace!(zoom = self.model.zoom(), "zoom clamped");
                }
            }
        }
        false
    }

    fn apply_resize(&mut self, width: u16, height: u16) -> Result<(), Error> {
        self.renderer.resize(width, height);
        self.machine.invalidate();
        self.renderer.clear_screen()
    }

    fn draw(&mut self, now: Instant) -> Result<(), Error> {
        let (width, height) = (self.renderer.width(), self.renderer.height());
        let _span = tracing::debug_span!("frame", width, height).entered();

        if width < MIN_WIDTH || height < MIN_HEIGHT {
            self.renderer.begin_frame();
            let middle = height / 2;
            self.renderer
                .draw_centered(middle.saturating_sub(1), TOO_SMALL, Color::YELLOW);
            let minimum = format!("Minimum: {MIN_WIDTH}x{MIN_HEIGHT}");
            self.renderer.draw_centered(middle, &minimum, Color::Default);
        } else {
            let points = self.model.project(&mut self.projector, width, height);
            self.renderer.rasterize(points);
            if self.hint_until.is_some_and(|until| now < until) {
                self.renderer
                    .draw_centered(height - 1, KEYBOARD_HINT, Color::YELLOW);
            }
        }

        self.renderer.diff_and_flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use globeterm_core::{InputEvent, KeyCode, KeyEvent, MouseButton, Position};

    use super::*;

    type TestLoop = ControlLoop<Vec<u8>, VecDeque<InputEvent>>;

    fn setup(events: Vec<InputEvent>, size: (u16, u16), now: Instant) -> (TestLoop, Arc<SignalFlags>) {
        let flags = Arc::new(SignalFlags::new());
        let config = RuntimeConfig::default();
        let lp = ControlLoop::new(
            Vec::new(),
            Appearance::default(),
            events.into(),
            &config,
            size,
            Arc::clone(&flags),
            now,
        );
        (lp, flags)
    }

    fn key(c: char) -> InputEvent {
        InputEvent::Key(KeyEvent::new(KeyCode::Char(c)))
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn quit_key_stops_the_loop() {
        let t0 = Instant::now();
        let (mut lp, _) = setup(vec![key('q')], (80, 24), t0);
        assert_eq!(lp.step(t0).unwrap(), Some(ExitReason::Quit));
    }

    #[test]
    fn termination_signal_stops_the_loop() {
        let t0 = Instant::now();
        let (mut lp, flags) = setup(vec![], (80, 24), t0);
        assert_eq!(lp.step(t0).unwrap(), None);
        flags.request_termination(2);
        let reason = lp.step(t0 + ms(33)).unwrap();
        assert_eq!(reason, Some(ExitReason::Signal(2)));
        assert_eq!(reason.map(ExitReason::exit_code), Some(130));
    }

    #[test]
    fn scripted_exit_fires() {
        let t0 = Instant::now();
        let flags = Arc::new(SignalFlags::new());
        let config = RuntimeConfig {
            exit_after: Some(ms(100)),
            ..RuntimeConfig::default()
        };
        let mut lp: TestLoop = ControlLoop::new(
            Vec::new(),
            Appearance::default(),
            VecDeque::new(),
            &config,
            (80, 24),
            flags,
            t0,
        );
        assert_eq!(lp.step(t0 + ms(50)).unwrap(), None);
        assert_eq!(lp.step(t0 + ms(100)).unwrap(), Some(ExitReason::Timeout));
    }

    #[test]
    fn one_event_per_iteration() {
        let t0 = Instant::now();
        let (mut lp, _) = setup(vec![key('+'), key('+'), key('q')], (80, 24), t0);
        assert_eq!(lp.step(t0).unwrap(), None);
        assert!((lp.model().zoom() - 1.1).abs() < 1e-9);
        assert_eq!(lp.step(t0 + ms(1)).unwrap(), None);
        assert!((lp.model().zoom() - 1.2).abs() < 1e-9);
        assert_eq!(lp.step(t0 + ms(2)).unwrap(), Some(ExitReason::Quit));
    }

    #[test]
    fn drag_rotates_by_sensitivity() {
        let t0 = Instant::now();
        let events = vec![
            InputEvent::ButtonPress {
                pos: Position::new(10, 10),
                button: MouseButton::Left,
            },
            InputEvent::Motion {
                pos: Position::new(13, 10),
            },
        ];
        let (mut lp, _) = setup(events, (80, 24), t0);
        let yaw0 = lp.model().orientation().yaw();
        lp.step(t0).unwrap();
        lp.step(t0).unwrap();
        let yaw = lp.model().orientation().yaw();
        assert!((yaw - yaw0 - 0.03).abs() < 1e-9);
    }

    #[test]
    fn auto_rotation_waits_for_idle() {
        let t0 = Instant::now();
        let (mut lp, _) = setup(vec![], (80, 24), t0);
        lp.step(t0 + ms(1000)).unwrap();
        assert_eq!(lp.model().orientation().yaw(), 0.0);

        lp.step(t0 + ms(2500)).unwrap();
        let dt = 0.25; // capped
        let expected = AUTO_ROTATE_SPEED * dt;
        assert!((lp.model().orientation().yaw() - expected).abs() < 1e-9);

        lp.step(t0 + ms(2600)).unwrap();
        let expected = expected + AUTO_ROTATE_SPEED * 0.1;
        assert!((lp.model().orientation().yaw() - expected).abs() < 1e-9);
    }

    #[test]
    fn idle_frames_write_nothing() {
        let t0 = Instant::now();
        let flags = Arc::new(SignalFlags::new());
        let config = RuntimeConfig {
            speed: 0.0,
            ..RuntimeConfig::default()
        };
        let mut lp: TestLoop = ControlLoop::new(
            Vec::new(),
            Appearance::default(),
            VecDeque::new(),
            &config,
            (80, 24),
            flags,
            t0,
        );
        lp.step(t0).unwrap();
        let written = lp.renderer().writer().len();
        assert!(written > 0);
        lp.step(t0 + ms(33)).unwrap();
        lp.step(t0 + ms(66)).unwrap();
        assert_eq!(lp.renderer().writer().len(), written);
    }

    #[test]
    fn resize_is_debounced_and_invalidates_drag() {
        let t0 = Instant::now();
        let events = vec![InputEvent::ButtonPress {
            pos: Position::new(5, 5),
            button: MouseButton::Left,
        }];
        let (mut lp, _) = setup(events, (80, 24), t0);
        lp.step(t0).unwrap();
        assert_ne!(lp.machine().state(), globeterm_core::DragState::Idle);

        lp.notify_size(100, 30, t0 + ms(10));
        let written = lp.renderer().writer().len();
        lp.step(t0 + ms(50)).unwrap();
        // Nothing is drawn while the resize is pending.
        assert_eq!(lp.renderer().writer().len(), written);
        assert_eq!(lp.renderer().width(), 80);

        lp.step(t0 + ms(120)).unwrap();
        assert_eq!((lp.renderer().width(), lp.renderer().height()), (100, 30));
        assert_eq!(lp.machine().state(), globeterm_core::DragState::Idle);
        assert!(!lp.renderer().has_pending_frame());
    }

    #[test]
    fn small_terminal_shows_message() {
        let t0 = Instant::now();
        let (mut lp, _) = setup(vec![], (19, 10), t0);
        lp.step(t0).unwrap();
        let out = String::from_utf8_lossy(lp.renderer().writer()).into_owned();
        assert!(out.contains("Terminal too small!"));
        assert!(out.contains("Minimum: 20x10"));
    }

    #[test]
    fn hint_disappears_after_its_duration() {
        let t0 = Instant::now();
        let (mut lp, _) = setup(vec![], (80, 24), t0);
        lp.show_keyboard_hint(t0);
        lp.step(t0).unwrap();
        let row = lp.renderer().front().row(23);
        let text: String = row.iter().map(|c| c.glyph).collect();
        assert!(text.contains(KEYBOARD_HINT));

        lp.step(t0 + HINT_DURATION).unwrap();
        let row = lp.renderer().front().row(23);
        let text: String = row.iter().map(|c| c.glyph).collect();
        assert!(!text.contains("Mouse not detected"));
    }
}
