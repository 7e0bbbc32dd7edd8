#![forbid(unsafe_code)]

//! State-tracked ANSI emission.
//!
//! The presenter turns a [`BufferDiff`] into terminal output. It tracks the
//! current style and cursor position so that each run costs one cursor move
//! and style sequences are only sent when the style actually changes. All
//! output goes through one buffered writer and is flushed once per frame.

use std::io::{self, BufWriter, Write};

use crate::ansi;
use crate::buffer::Buffer;
use crate::cell::{Cell, Color};
use crate::counting_writer::CountingWriter;
use crate::diff::BufferDiff;

/// Size of the internal write buffer (64KB).
const BUFFER_CAPACITY: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellStyle {
    fg: Color,
    bg: Color,
}

impl CellStyle {
    fn from_cell(cell: &Cell) -> Self {
        Self {
            fg: cell.fg,
            bg: cell.bg,
        }
    }
}

pub struct Presenter<W: Write> {
    writer: CountingWriter<BufWriter<W>>,
    /// None = unknown or reset.
    current_style: Option<CellStyle>,
    cursor_x: Option<u16>,
    cursor_y: Option<u16>,
}

impl<W: Write> Presenter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: CountingWriter::new(BufWriter::with_capacity(BUFFER_CAPACITY, writer)),
            current_style: None,
            cursor_x: None,
            cursor_y: None,
        }
    }

    /// Emit every cell named by `diff` from `buffer` and flush.
    ///
    /// Returns the number of bytes written. An empty diff writes nothing.
    pub fn present(&mut self, buffer: &Buffer, diff: &BufferDiff) -> io::Result<u64> {
        if diff.is_empty() {
            return Ok(0);
        }
        self.writer.reset_counter();

        for run in diff.runs() {
            self.move_cursor_to(run.x0, run.y)?;
            for x in run.x0..=run.x1 {
                self.emit_cell(buffer.get_unchecked(x, run.y))?;
            }
        }

        // Leave the terminal in a clean state between frames.
        ansi::sgr_reset(&mut self.writer)?;
        self.current_style = None;

        self.writer.flush()?;
        let bytes = self.writer.bytes_written();
        tracing::trace!(changes = diff.len(), runs = diff.runs().len(), bytes, "frame presented");
        Ok(bytes)
    }

    fn emit_cell(&mut self, cell: &Cell) -> io::Result<()> {
        self.emit_style_changes(cell)?;
        let glyph = if cell.is_sentinel() { ' ' } else { cell.glyph };
        let mut buf = [0u8; 4];
        self.writer.write_all(glyph.encode_utf8(&mut buf).as_bytes())?;
        if let Some(x) = self.cursor_x {
            self.cursor_x = x.checked_add(1);
        }
        Ok(())
    }

    fn emit_style_changes(&mut self, cell: &Cell) -> io::Result<()> {
        let new_style = CellStyle::from_cell(cell);
        if self.current_style == Some(new_style) {
            return Ok(());
        }
        // Reset then apply; simpler than incremental attribute diffs.
        ansi::sgr_reset(&mut self.writer)?;
        if new_style.fg != Color::Default {
            ansi::sgr_fg(&mut self.writer, new_style.fg)?;
        }
        if new_style.bg != Color::Default {
            ansi::sgr_bg(&mut self.writer, new_style.bg)?;
        }
        self.current_style = Some(new_style);
        Ok(())
    }

    fn move_cursor_to(&mut self, x: u16, y: u16) -> io::Result<()> {
        if self.cursor_x == Some(x) && self.cursor_y == Some(y) {
            return Ok(());
        }
        ansi::cup(&mut self.writer, y, x)?;
        self.cursor_x = Some(x);
        self.cursor_y = Some(y);
        Ok(())
    }

    pub fn clear_screen(&mut self) -> io::Result<()> {
        ansi::sgr_reset(&mut self.writer)?;
        ansi::erase_display(&mut self.writer)?;
        ansi::cup(&mut self.writer, 0, 0)?;
        self.current_style = None;
        self.cursor_x = Some(0);
        self.cursor_y = Some(0);
        self.writer.flush()
    }

    /// Forget tracked state. Used after a resize, when the cursor may have moved.
    pub fn reset(&mut self) {
        self.current_style = None;
        self.cursor_x = None;
        self.cursor_y = None;
    }

    /// The underlying writer. Buffered bytes not yet flushed are not visible.
    pub fn get_ref(&self) -> &W {
        self.writer.inner().get_ref()
    }
}
