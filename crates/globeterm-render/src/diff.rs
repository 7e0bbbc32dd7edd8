#![forbid(unsafe_code)]

//! Cell-by-cell diff between the displayed and the next frame.
//!
//! The scan is row-major, so changes come out sorted by `(y, x)` and can be
//! coalesced into runs without sorting. Both vectors are reused across
//! frames; in the steady state computing a diff allocates nothing.

use crate::buffer::Buffer;

/// A contiguous run of changed cells on one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeRun {
    pub y: u16,
    /// Start column (inclusive).
    pub x0: u16,
    /// End column (inclusive).
    pub x1: u16,
}

impl ChangeRun {
    #[inline]
    pub const fn new(y: u16, x0: u16, x1: u16) -> Self {
        debug_assert!(x0 <= x1);
        Self { y, x0, x1 }
    }

    #[inline]
    pub const fn len(&self) -> u16 {
        self.x1 - self.x0 + 1
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.x1 < self.x0
    }
}

#[derive(Debug, Clone, Default)]
pub struct BufferDiff {
    changes: Vec<(u16, u16)>,
    runs: Vec<ChangeRun>,
}

impl BufferDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute a fresh diff.
    pub fn compute(old: &Buffer, new: &Buffer) -> Self {
        let mut diff = Self::new();
        diff.compute_into(old, new);
        diff
    }

    /// Recompute in place, reusing the existing allocations.
    ///
    /// Buffers of different sizes are treated as entirely changed.
    pub fn compute_into(&mut self, old: &Buffer, new: &Buffer) {
        self.changes.clear();
        self.runs.clear();

        let (width, height) = (new.width(), new.height());
        let same_size = old.width() == width && old.height() == height;
        for y in 0..height {
            for x in 0..width {
                if !same_size || old.get_unchecked(x, y) != new.get_unchecked(x, y) {
                    self.changes.push((x, y));
                }
            }
        }
        self.coalesce();
    }

    fn coalesce(&mut self) {
        let mut iter = self.changes.iter().copied();
        let Some((x0, y0)) = iter.next() else {
            return;
        };
        let mut run = ChangeRun::new(y0, x0, x0);
        for (x, y) in iter {
            if y == run.y && x == run.x1 + 1 {
                run.x1 = x;
            } else {
                self.runs.push(run);
                run = ChangeRun::new(y, x, x);
            }
        }
        self.runs.push(run);
    }

    /// Number of changed cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    #[inline]
    pub fn changes(&self) -> &[(u16, u16)] {
        &self.changes
    }

    /// Changed cells grouped into same-row runs, in row-major order.
    #[inline]
    pub fn runs(&self) -> &[ChangeRun] {
        &self.runs
    }

    pub fn clear(&mut self) {
        self.changes.clear();
        self.runs.clear();
    }
}
