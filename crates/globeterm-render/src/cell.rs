#![forbid(unsafe_code)]

//! Cell and color primitives.

/// A terminal color: the terminal default or an indexed palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    #[default]
    Default,
    /// ANSI palette index. 0-15 are the base colors, 16-255 the extended cube.
    Indexed(u8),
}

impl Color {
    pub const BLACK: Self = Self::Indexed(0);
    pub const GREEN: Self = Self::Indexed(2);
    pub const YELLOW: Self = Self::Indexed(3);
    pub const BLUE: Self = Self::Indexed(4);
    pub const CYAN: Self = Self::Indexed(6);
    pub const WHITE: Self = Self::Indexed(7);
}

/// One screen position: a glyph plus foreground and background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub glyph: char,
    pub fg: Color,
    pub bg: Color,
}

impl Cell {
    /// Blank space in default colors.
    pub const BLANK: Self = Self {
        glyph: ' ',
        fg: Color::Default,
        bg: Color::Default,
    };

    /// Never produced by rasterization. A front buffer filled with it differs
    /// from every drawable cell, which forces a full repaint.
    pub const SENTINEL: Self = Self {
        glyph: '\0',
        fg: Color::Default,
        bg: Color::Default,
    };

    #[inline]
    #[must_use]
    pub const fn new(glyph: char, fg: Color, bg: Color) -> Self {
        Self { glyph, fg, bg }
    }

    #[inline]
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.glyph == '\0'
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_differs_from_blank() {
        assert_ne!(Cell::SENTINEL, Cell::BLANK);
        assert!(Cell::SENTINEL.is_sentinel());
        assert!(!Cell::BLANK.is_sentinel());
    }

    #[test]
    fn default_is_blank() {
        assert_eq!(Cell::default(), Cell::BLANK);
        assert_eq!(Color::default(), Color::Default);
    }
}
