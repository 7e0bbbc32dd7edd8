#![forbid(unsafe_code)]

//! Double-buffered renderer.
//!
//! The renderer owns two cell buffers. `rasterize` draws the next frame into
//! the back buffer; `diff_and_flush` writes the cells that differ from the
//! front buffer and swaps the two. The swap is a pointer exchange, so the
//! old front becomes the next back without reallocation.
//!
//! A frame is flushed at most once: a second `diff_and_flush` without a new
//! `rasterize` (or overlay draw) writes nothing.

use std::io::Write;
use std::mem;

use globeterm_core::Error;
use globeterm_globe::ProjectedPoint;
use unicode_width::UnicodeWidthChar;

use crate::buffer::Buffer;
use crate::cell::{Cell, Color};
use crate::diff::BufferDiff;
use crate::presenter::Presenter;
use crate::theme::{Appearance, ThemeTable, light_bucket};

/// Per-flush output statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushStats {
    pub cells: usize,
    pub runs: usize,
    pub bytes: u64,
}

pub struct Renderer<W: Write, T: ThemeTable = Appearance> {
    presenter: Presenter<W>,
    theme: T,
    front: Buffer,
    back: Buffer,
    /// Depth of the winning point per back-buffer cell.
    depth: Vec<f64>,
    diff: BufferDiff,
    /// The back buffer holds a frame not yet flushed.
    pending: bool,
}

impl<W: Write, T: ThemeTable> Renderer<W, T> {
    /// A renderer whose first flush repaints every cell.
    pub fn new(writer: W, theme: T, width: u16, height: u16) -> Self {
        let back = Buffer::new(width, height, Cell::BLANK);
        Self {
            presenter: Presenter::new(writer),
            theme,
            front: Buffer::new(width, height, Cell::SENTINEL),
            depth: vec![f64::NEG_INFINITY; back.len()],
            back,
            diff: BufferDiff::new(),
            pending: true,
        }
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.back.width()
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.back.height()
    }

    pub fn theme(&self) -> &T {
        &self.theme
    }

    /// The frame currently on screen.
    pub fn front(&self) -> &Buffer {
        &self.front
    }

    /// The frame being composed.
    pub fn back(&self) -> &Buffer {
        &self.back
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending
    }

    /// Start a new frame: clear the back buffer to blanks.
    pub fn begin_frame(&mut self) {
        self.back.fill(Cell::BLANK);
        self.depth.fill(f64::NEG_INFINITY);
        self.pending = true;
    }

    /// Draw projected points into a fresh back buffer.
    ///
    /// Off-screen points are dropped. When several points share a cell the
    /// one nearest the viewer (greatest depth) wins, whatever the order.
    pub fn rasterize<I>(&mut self, points: I) -> usize
    where
        I: IntoIterator<Item = ProjectedPoint>,
    {
        self.begin_frame();
        let mut drawn = 0;
        for point in points {
            let Some(index) = self.back.index_signed(point.col, point.row) else {
                continue;
            };
            if point.depth <= self.depth[index] {
                continue;
            }
            self.depth[index] = point.depth;
            let style = self.theme.resolve(point.terrain, light_bucket(point.intensity));
            self.back.set_index(index, Cell::new(style.glyph, style.fg, style.bg));
            drawn += 1;
        }
        drawn
    }

    /// Write `text` at `(x, y)` over the back buffer. Returns the columns used.
    ///
    /// Only single-width characters are drawn; anything else is skipped so the
    /// presenter's one-column-per-cell cursor tracking stays correct.
    pub fn draw_text(&mut self, x: u16, y: u16, text: &str, fg: Color) -> u16 {
        let mut col = x;
        for ch in text.chars() {
            if ch.width() != Some(1) {
                continue;
            }
            if !self.back.set(col, y, Cell::new(ch, fg, Color::Default)) {
                break;
            }
            col += 1;
        }
        self.pending = true;
        col - x
    }

    /// Draw `text` centered horizontally on row `y`.
    pub fn draw_centered(&mut self, y: u16, text: &str, fg: Color) -> u16 {
        let width: usize = text.chars().filter(|c| c.width() == Some(1)).count();
        let width = u16::try_from(width).unwrap_or(u16::MAX);
        let x = self.width().saturating_sub(width) / 2;
        self.draw_text(x, y, text, fg)
    }

    /// Emit the cells that changed since the last flush, then swap buffers.
    pub fn diff_and_flush(&mut self) -> Result<FlushStats, Error> {
        if !self.pending {
            return Ok(FlushStats::default());
        }
        let _span = tracing::debug_span!("diff_flush").entered();

        self.diff.compute_into(&self.front, &self.back);
        let bytes = self
            .presenter
            .present(&self.back, &self.diff)
            .map_err(Error::OutputSink)?;
        mem::swap(&mut self.front, &mut self.back);
        self.pending = false;

        let stats = FlushStats {
            cells: self.diff.len(),
            runs: self.diff.runs().len(),
            bytes,
        };
        tracing::trace!(cells = stats.cells, runs = stats.runs, bytes, "flushed");
        Ok(stats)
    }

    /// Drop both buffers and allocate new ones at the new size.
    ///
    /// The front buffer is filled with [`Cell::SENTINEL`], so the next flush
    /// writes every cell exactly once.
    pub fn resize(&mut self, width: u16, height: u16) {
        tracing::debug!(width, height, "renderer resized");
        self.front = Buffer::new(width, height, Cell::SENTINEL);
        self.back = Buffer::new(width, height, Cell::BLANK);
        self.depth = vec![f64::NEG_INFINITY; self.back.len()];
        self.diff.clear();
        self.presenter.reset();
        self.pending = true;
    }

    /// Clear the terminal and force the next flush to repaint everything.
    pub fn clear_screen(&mut self) -> Result<(), Error> {
        self.presenter.clear_screen().map_err(Error::OutputSink)?;
        self.front.fill(Cell::SENTINEL);
        self.pending = true;
        Ok(())
    }

    pub fn writer(&self) -> &W {
        self.presenter.get_ref()
    }
}
