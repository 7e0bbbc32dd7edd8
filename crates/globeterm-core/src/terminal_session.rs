#![forbid(unsafe_code)]

//! Terminal session lifecycle guard.
//!
//! [`TerminalSession`] owns every terminal state change the program makes and
//! undoes them in reverse order when dropped:
//!
//! 1. Raw mode (crossterm)
//! 2. Alternate screen (`CSI ? 1049 h`)
//! 3. Hidden cursor (`CSI ? 25 l`)
//! 4. Protocol negotiation (keyboard stack push, mouse modes)
//!
//! # Exit paths
//!
//! - **Quit**: the control loop returns and the session drops.
//! - **Interrupt**: SIGINT/SIGTERM/SIGHUP only set a flag in [`SignalFlags`];
//!   the loop observes it, returns, and the session drops. Both paths share
//!   the same cleanup.
//! - **Panic**: a process-wide hook restores the screen and raw mode before
//!   the panic message is printed; unwinding then drops the session, which
//!   pops the keyboard stack.
//!
//! Cleanup steps are isolated from each other: a failed write never skips
//! the steps after it.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, OnceLock};

use crate::negotiator::{MouseMode, NegotiationReport, ProtocolNegotiator};
use crate::terminal_kind::TerminalKind;

#[cfg(unix)]
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGWINCH};
#[cfg(unix)]
use signal_hook::iterator::Signals;

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub alternate_screen: bool,
    pub hide_cursor: bool,
    /// Negotiate mouse reporting.
    pub mouse: bool,
    pub kind: TerminalKind,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            alternate_screen: true,
            hide_cursor: true,
            mouse: true,
            kind: TerminalKind::Unknown,
        }
    }
}

/// Asynchronous notifications shared between the signal thread and the loop.
#[derive(Debug, Default)]
pub struct SignalFlags {
    terminate: AtomicI32,
    resized: AtomicBool,
}

impl SignalFlags {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal number of a pending termination request.
    #[must_use]
    pub fn termination(&self) -> Option<i32> {
        match self.terminate.load(Ordering::Acquire) {
            0 => None,
            signal => Some(signal),
        }
    }

    pub fn request_termination(&self, signal: i32) {
        self.terminate.store(signal, Ordering::Release);
    }

    /// Returns and clears the "size changed" notification.
    pub fn take_resize(&self) -> bool {
        self.resized.swap(false, Ordering::AcqRel)
    }

    pub fn notify_resize(&self) {
        self.resized.store(true, Ordering::Release);
    }
}

#[derive(Debug)]
pub struct TerminalSession {
    negotiator: ProtocolNegotiator<io::Stdout>,
    negotiation: NegotiationReport,
    alternate_screen_enabled: bool,
    cursor_hidden: bool,
    flags: Arc<SignalFlags>,
    #[cfg(unix)]
    signal_guard: Option<SignalGuard>,
}

impl TerminalSession {
    /// Enter raw mode and apply `options`.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode, the alternate screen, or the signal
    /// handlers cannot be set up. Protocol negotiation failures are not
    /// errors; they are reported through [`Self::negotiation`].
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        install_panic_hook();

        crossterm::terminal::enable_raw_mode()?;
        tracing::info!("terminal raw mode enabled");

        let flags = Arc::new(SignalFlags::new());
        let mut session = Self {
            negotiator: ProtocolNegotiator::new(io::stdout(), options.mouse),
            negotiation: NegotiationReport::default(),
            alternate_screen_enabled: false,
            cursor_hidden: false,
            flags: Arc::clone(&flags),
            #[cfg(unix)]
            signal_guard: None,
        };

        let mut stdout = io::stdout();
        if options.alternate_screen {
            crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
            session.alternate_screen_enabled = true;
            tracing::info!("alternate screen enabled");
        }
        if options.hide_cursor {
            crossterm::execute!(stdout, crossterm::cursor::Hide)?;
            session.cursor_hidden = true;
        }

        session.negotiation = session.negotiator.enable(options.kind);

        #[cfg(unix)]
        {
            session.signal_guard = Some(SignalGuard::new(flags)?);
        }

        Ok(session)
    }

    #[must_use]
    pub fn negotiation(&self) -> &NegotiationReport {
        &self.negotiation
    }

    /// Flags set by the signal thread.
    #[must_use]
    pub fn signals(&self) -> Arc<SignalFlags> {
        Arc::clone(&self.flags)
    }

    /// Current terminal size (columns, rows).
    pub fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    fn cleanup(&mut self) {
        #[cfg(unix)]
        let _ = self.signal_guard.take();

        let failures = self.negotiator.disable();
        if !failures.is_empty() {
            tracing::warn!(count = failures.len(), "protocol cleanup incomplete");
        }

        let mut stdout = io::stdout();
        if self.cursor_hidden {
            let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
            self.cursor_hidden = false;
        }
        if self.alternate_screen_enabled {
            let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
            tracing::info!("alternate screen disabled");
        }
        let _ = crossterm::terminal::disable_raw_mode();
        tracing::info!("terminal raw mode disabled");
        let _ = stdout.flush();
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

/// Restore a readable terminal from a panic. Mouse disables are harmless when
/// the mode was never enabled; the keyboard pop is left to the session's drop
/// so it happens exactly once.
fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    for mode in MouseMode::ENABLE_ORDER.iter().rev() {
        let _ = stdout.write_all(&mode.disable_sequence());
    }
    let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
    let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}

#[cfg(unix)]
#[derive(Debug)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new(flags: Arc<SignalFlags>) -> io::Result<Self> {
        let mut signals =
            Signals::new([SIGINT, SIGTERM, SIGHUP, SIGWINCH]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::Builder::new()
            .name("globeterm-signals".into())
            .spawn(move || {
                for signal in signals.forever() {
                    match signal {
                        SIGWINCH => flags.notify_resize(),
                        SIGINT | SIGTERM | SIGHUP => {
                            tracing::warn!(signal, "termination signal received");
                            flags.request_termination(signal);
                        }
                        _ => {}
                    }
                }
            })?;
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
