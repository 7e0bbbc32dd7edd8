#![forbid(unsafe_code)]

//! Byte-level negotiation scenarios through the `Write` seam.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use globeterm_core::negotiator::{KEYBOARD_POP, KEYBOARD_PUSH_LEGACY};
use globeterm_core::{Error, MouseMode, ProtocolNegotiator, ProtocolStep, TerminalKind};

/// Records every `write` call as a separate chunk.
#[derive(Clone, Default)]
struct Recorder {
    chunks: Rc<RefCell<Vec<Vec<u8>>>>,
    /// Writes whose payload equals one of these fail.
    reject: Rc<RefCell<Vec<Vec<u8>>>>,
}

impl Recorder {
    fn chunks(&self) -> Vec<Vec<u8>> {
        self.chunks.borrow().clone()
    }

    fn reject(&self, seq: &[u8]) {
        self.reject.borrow_mut().push(seq.to_vec());
    }
}

impl Write for Recorder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.reject.borrow().iter().any(|r| r.as_slice() == buf) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "rejected"));
        }
        self.chunks.borrow_mut().push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn count(chunks: &[Vec<u8>], seq: &[u8]) -> usize {
    chunks.iter().filter(|c| c.as_slice() == seq).count()
}

#[test]
fn progressive_terminal_push_pop_and_reversed_mouse_modes() {
    let recorder = Recorder::default();
    {
        let mut negotiator = ProtocolNegotiator::new(recorder.clone(), true);
        let report = negotiator.enable(TerminalKind::ProgressiveKeyboard);
        assert!(report.keyboard_pushed);
        assert!(report.mouse_active);
        assert!(report.failures.is_empty());
        assert!(negotiator.disable().is_empty());
    }
    let chunks = recorder.chunks();

    assert_eq!(count(&chunks, KEYBOARD_PUSH_LEGACY), 1);
    assert_eq!(count(&chunks, KEYBOARD_POP), 1);
    assert_eq!(chunks.first().map(Vec::as_slice), Some(KEYBOARD_PUSH_LEGACY));
    assert_eq!(chunks.last().map(Vec::as_slice), Some(KEYBOARD_POP));

    let enables: Vec<Vec<u8>> = MouseMode::ENABLE_ORDER
        .iter()
        .map(|m| m.enable_sequence())
        .collect();
    let disables: Vec<Vec<u8>> = MouseMode::ENABLE_ORDER
        .iter()
        .rev()
        .map(|m| m.disable_sequence())
        .collect();

    assert_eq!(&chunks[1..4], enables.as_slice());
    assert_eq!(&chunks[4..7], disables.as_slice());
    assert_eq!(chunks.len(), 8);
}

#[test]
fn drop_runs_disable() {
    let recorder = Recorder::default();
    {
        let mut negotiator = ProtocolNegotiator::new(recorder.clone(), true);
        negotiator.enable(TerminalKind::ProgressiveKeyboard);
    }
    let chunks = recorder.chunks();
    assert_eq!(count(&chunks, KEYBOARD_POP), 1);
    assert_eq!(chunks.len(), 8);
}

#[test]
fn failed_mouse_write_does_not_skip_the_rest() {
    let recorder = Recorder::default();
    recorder.reject(&MouseMode::Click.enable_sequence());

    let mut negotiator = ProtocolNegotiator::new(recorder.clone(), true);
    let report = negotiator.enable(TerminalKind::ProgressiveKeyboard);

    assert!(report.keyboard_pushed);
    assert!(report.keyboard_only());
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0],
        Error::ProtocolNegotiation {
            step: ProtocolStep::MouseEnable(1000),
            ..
        }
    ));

    // Drag mode was still enabled after the click mode failed.
    let chunks = recorder.chunks();
    assert_eq!(count(&chunks, &MouseMode::Drag.enable_sequence()), 1);

    negotiator.disable();
    let chunks = recorder.chunks();
    assert_eq!(count(&chunks, &MouseMode::Click.disable_sequence()), 0);
    assert_eq!(count(&chunks, &MouseMode::Drag.disable_sequence()), 1);
    assert_eq!(count(&chunks, KEYBOARD_POP), 1);
}

#[test]
fn failed_disable_write_still_pops_keyboard() {
    let recorder = Recorder::default();
    let mut negotiator = ProtocolNegotiator::new(recorder.clone(), true);
    negotiator.enable(TerminalKind::ProgressiveKeyboard);

    recorder.reject(&MouseMode::SgrExtended.disable_sequence());
    let failures = negotiator.disable();
    assert_eq!(failures.len(), 1);
    assert_eq!(count(&recorder.chunks(), KEYBOARD_POP), 1);
}

#[test]
fn failed_push_is_never_popped() {
    let recorder = Recorder::default();
    recorder.reject(KEYBOARD_PUSH_LEGACY);
    let mut negotiator = ProtocolNegotiator::new(recorder.clone(), true);
    let report = negotiator.enable(TerminalKind::ProgressiveKeyboard);
    assert!(!report.keyboard_pushed);
    assert!(report.mouse_active);

    negotiator.disable();
    assert_eq!(count(&recorder.chunks(), KEYBOARD_POP), 0);
}

#[test]
fn unknown_terminal_only_negotiates_mouse() {
    let recorder = Recorder::default();
    let mut negotiator = ProtocolNegotiator::new(recorder.clone(), true);
    negotiator.enable(TerminalKind::Unknown);
    negotiator.disable();
    let chunks = recorder.chunks();
    assert_eq!(chunks.len(), 6);
    assert_eq!(count(&chunks, KEYBOARD_PUSH_LEGACY), 0);
}
