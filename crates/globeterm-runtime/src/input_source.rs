#![forbid(unsafe_code)]

//! Non-blocking input.
//!
//! A reader thread blocks on stdin and forwards raw byte chunks over a
//! channel. The control loop drains the channel without blocking, decodes the
//! bytes, normalizes them for the current terminal kind, and takes at most one
//! event per frame from the queue.

use std::collections::VecDeque;
use std::io::{self, Read};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use globeterm_core::input_parser::{InputParser, RawInput};
use globeterm_core::quirks::normalize;
use globeterm_core::{InputEvent, TerminalKind};

/// Where the control loop gets its events from.
pub trait EventSource {
    /// The next pending event, if any. Never blocks.
    fn poll_event(&mut self) -> Option<InputEvent>;
}

/// Pending events with consecutive motion reports collapsed.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<InputEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event. A motion that directly follows another motion
    /// replaces it: only the latest pointer position matters.
    pub fn push(&mut self, event: InputEvent) {
        if event.is_motion()
            && let Some(last) = self.events.back_mut()
            && last.is_motion()
        {
            *last = event;
            return;
        }
        self.events.push_back(event);
    }

    pub fn pop(&mut self) -> Option<InputEvent> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Bytes → events for one terminal kind.
#[derive(Debug)]
pub struct Decoder {
    kind: TerminalKind,
    parser: InputParser,
    raw: Vec<RawInput>,
}

impl Decoder {
    pub fn new(kind: TerminalKind) -> Self {
        Self {
            kind,
            parser: InputParser::new(),
            raw: Vec::new(),
        }
    }

    pub fn decode_into(&mut self, bytes: &[u8], queue: &mut EventQueue) {
        self.raw.clear();
        self.parser.parse_into(bytes, &mut self.raw);
        for raw in self.raw.drain(..) {
            if let Some(event) = normalize(self.kind, raw) {
                queue.push(event);
            }
        }
    }
}

/// Events decoded from bytes arriving on a channel.
#[derive(Debug)]
pub struct ChannelSource {
    rx: Receiver<Vec<u8>>,
    decoder: Decoder,
    queue: EventQueue,
    disconnected: bool,
}

impl ChannelSource {
    pub fn new(rx: Receiver<Vec<u8>>, kind: TerminalKind) -> Self {
        Self {
            rx,
            decoder: Decoder::new(kind),
            queue: EventQueue::new(),
            disconnected: false,
        }
    }

    /// Start a reader thread on stdin and return a source fed by it.
    ///
    /// The thread is detached: it stays blocked in `read` until the process
    /// exits or stdin closes.
    pub fn stdin(kind: TerminalKind) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("globeterm-input".into())
            .spawn(move || {
                let mut stdin = io::stdin().lock();
                let mut buf = [0u8; 1024];
                loop {
                    match stdin.read(&mut buf) {
                        Ok(0) => break,
                        Ok(n) => {
                            if tx.send(buf[..n].to_vec()).is_err() {
                                break;
                            }
                        }
                        Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                        Err(err) => {
                            tracing::warn!(error = %err, "stdin read failed");
                            break;
                        }
                    }
                }
            })?;
        Ok(Self::new(rx, kind))
    }

    fn drain(&mut self) {
        while !self.disconnected {
            match self.rx.try_recv() {
                Ok(bytes) => self.decoder.decode_into(&bytes, &mut self.queue),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::debug!("input channel closed");
                    self.disconnected = true;
                }
            }
        }
    }
}

impl EventSource for ChannelSource {
    fn poll_event(&mut self) -> Option<InputEvent> {
        self.drain();
        self.queue.pop()
    }
}

/// A fixed script of events, for tests and scripted runs.
impl EventSource for VecDeque<InputEvent> {
    fn poll_event(&mut self) -> Option<InputEvent> {
        self.pop_front()
    }
}
