#![forbid(unsafe_code)]

//! Render kernel: cells, buffers, diffs, themes and ANSI presentation.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod counting_writer;
pub mod diff;
pub mod presenter;
pub mod renderer;
pub mod theme;

pub use buffer::Buffer;
pub use cell::{Cell, Color};
pub use diff::{BufferDiff, ChangeRun};
pub use presenter::Presenter;
pub use renderer::{FlushStats, Renderer};
pub use theme::{Appearance, LIGHT_BUCKETS, RenderMode, Style, Theme, ThemeTable, light_bucket};
