#![forbid(unsafe_code)]

//! Themes: terrain class + lighting bucket → glyph and colors.
//!
//! [`ThemeTable`] is the only interface the renderer sees. [`Theme`] holds
//! the data for one named palette, [`RenderMode`] picks the glyph set, and
//! [`Appearance`] combines the two with the monochrome switch.

use globeterm_core::ConfigError;
use globeterm_globe::Terrain;

use crate::cell::Color;

/// Number of quantized lighting levels.
pub const LIGHT_BUCKETS: u8 = 8;

/// Quantize an intensity in `[0, 1]` into `0..LIGHT_BUCKETS`.
///
/// Out-of-range and NaN inputs land in the nearest valid bucket (NaN → 0).
#[inline]
#[must_use]
pub fn light_bucket(intensity: f64) -> u8 {
    let scaled = (intensity * f64::from(LIGHT_BUCKETS)).floor();
    // Saturating cast: NaN becomes 0, negatives clamp to 0.
    (scaled as u8).min(LIGHT_BUCKETS - 1)
}

/// What a terrain sample looks like on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub glyph: char,
    pub fg: Color,
    pub bg: Color,
}

/// Resolves a sample's look. Must be total: every terrain class and every
/// bucket, including buckets past [`LIGHT_BUCKETS`], yields a style.
pub trait ThemeTable {
    fn resolve(&self, terrain: Terrain, bucket: u8) -> Style;
}

impl<T: ThemeTable + ?Sized> ThemeTable for &T {
    fn resolve(&self, terrain: Terrain, bucket: u8) -> Style {
        (**self).resolve(terrain, bucket)
    }
}

/// Pick from `ramp` proportionally to `bucket`. Buckets past the top clamp.
fn ramp_glyph(ramp: &[char], bucket: u8) -> char {
    let bucket = usize::from(bucket.min(LIGHT_BUCKETS - 1));
    let top = usize::from(LIGHT_BUCKETS - 1);
    let index = bucket * ramp.len().saturating_sub(1) / top;
    ramp.get(index).copied().unwrap_or(' ')
}

/// Glyph set used for terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    Ascii,
    #[default]
    Block,
    Braille,
    /// The active theme's own shading ramp, for every terrain class.
    Theme,
}

const ASCII_OCEAN: &[char] = &[' ', '.', ':', '-', '~'];
const ASCII_LAND: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];
const ASCII_COAST: &[char] = &['#', '@'];
const ASCII_ICE: &[char] = &['.', ':', '+', '*'];

const BLOCK_OCEAN: &[char] = &[' ', '░', '▒', '▓', '█'];
const BLOCK_LAND: &[char] = &['░', '▒', '▓', '█'];
const BLOCK_COAST: &[char] = &['█'];
const BLOCK_ICE: &[char] = &['░', '▒', '▓'];

const BRAILLE_OCEAN: &[char] = &['⠁', '⠃', '⠇', '⠏', '⠟', '⠿'];
const BRAILLE_LAND: &[char] = &['⡀', '⡄', '⡆', '⡇', '⣇', '⣧', '⣷', '⣿'];
const BRAILLE_COAST: &[char] = &['⣿'];
const BRAILLE_ICE: &[char] = &['⠂', '⠆', '⠖', '⠶'];

impl RenderMode {
    pub const NAMES: [&'static str; 4] = ["ascii", "block", "braille", "theme"];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Block => "block",
            Self::Braille => "braille",
            Self::Theme => "theme",
        }
    }

    /// Case-insensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ascii" => Some(Self::Ascii),
            "block" => Some(Self::Block),
            "braille" => Some(Self::Braille),
            "theme" => Some(Self::Theme),
            _ => None,
        }
    }

    /// The glyph ramp for a terrain class; `None` defers to the theme.
    #[must_use]
    pub fn ramp(self, terrain: Terrain) -> Option<&'static [char]> {
        let ramp = match (self, terrain) {
            (Self::Theme, _) => return None,
            (Self::Ascii, Terrain::Ocean) => ASCII_OCEAN,
            (Self::Ascii, Terrain::Land) => ASCII_LAND,
            (Self::Ascii, Terrain::Coastline) => ASCII_COAST,
            (Self::Ascii, Terrain::Ice) => ASCII_ICE,
            (Self::Block, Terrain::Ocean) => BLOCK_OCEAN,
            (Self::Block, Terrain::Land) => BLOCK_LAND,
            (Self::Block, Terrain::Coastline) => BLOCK_COAST,
            (Self::Block, Terrain::Ice) => BLOCK_ICE,
            (Self::Braille, Terrain::Ocean) => BRAILLE_OCEAN,
            (Self::Braille, Terrain::Land) => BRAILLE_LAND,
            (Self::Braille, Terrain::Coastline) => BRAILLE_COAST,
            (Self::Braille, Terrain::Ice) => BRAILLE_ICE,
        };
        Some(ramp)
    }
}

/// A named palette with its own shading ramp.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    name: String,
    shading: Vec<char>,
    ocean: Color,
    land: Color,
    coastline: Color,
    ice: Color,
    background: Color,
}

/// Name, shading ramp and ocean/land/coastline/ice colors of each built-in theme.
const BUILTIN_THEMES: [(&str, &str, [Color; 4]); 2] = [
    (
        "geography",
        " .:-=+*#%@",
        [Color::BLUE, Color::GREEN, Color::WHITE, Color::WHITE],
    ),
    (
        "matrix",
        " .:;=+01#@",
        [Color::CYAN, Color::GREEN, Color::GREEN, Color::GREEN],
    ),
];

impl Theme {
    pub const BUILTIN: [&'static str; 2] = [BUILTIN_THEMES[0].0, BUILTIN_THEMES[1].0];

    /// Validate and build a theme.
    ///
    /// `colors` is ocean, land, coastline, ice.
    pub(crate) fn new(
        name: impl Into<String>,
        shading: &str,
        colors: [Color; 4],
        background: Color,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::InvalidTheme {
                name,
                reason: "name is empty".into(),
            });
        }
        let shading: Vec<char> = shading.chars().collect();
        if shading.len() < 2 {
            return Err(ConfigError::InvalidTheme {
                name,
                reason: format!("shading needs at least 2 glyphs, got {}", shading.len()),
            });
        }
        let [ocean, land, coastline, ice] = colors;
        Ok(Self {
            name,
            shading,
            ocean,
            land,
            coastline,
            ice,
            background,
        })
    }

    fn builtin(index: usize) -> Self {
        let (name, shading, [ocean, land, coastline, ice]) = BUILTIN_THEMES[index];
        Self {
            name: name.to_owned(),
            shading: shading.chars().collect(),
            ocean,
            land,
            coastline,
            ice,
            background: Color::BLACK,
        }
    }

    #[must_use]
    pub fn geography() -> Self {
        Self::builtin(0)
    }

    #[must_use]
    pub fn matrix() -> Self {
        Self::builtin(1)
    }

    /// Look up and validate a built-in theme, ignoring case.
    pub fn by_name(name: &str) -> Result<Self, ConfigError> {
        let Some((builtin, shading, colors)) = BUILTIN_THEMES
            .iter()
            .find(|(builtin, ..)| builtin.eq_ignore_ascii_case(name))
        else {
            return Err(ConfigError::UnknownValue {
                option: "theme",
                value: name.to_owned(),
                allowed: Self::BUILTIN.iter().map(|s| (*s).to_owned()).collect(),
            });
        };
        Self::new(*builtin, shading, *colors, Color::BLACK)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn shading(&self) -> &[char] {
        &self.shading
    }

    #[must_use]
    pub fn foreground(&self, terrain: Terrain) -> Color {
        match terrain {
            Terrain::Ocean => self.ocean,
            Terrain::Land => self.land,
            Terrain::Coastline => self.coastline,
            Terrain::Ice => self.ice,
        }
    }

    #[must_use]
    pub fn background(&self) -> Color {
        self.background
    }
}

impl ThemeTable for Theme {
    fn resolve(&self, terrain: Terrain, bucket: u8) -> Style {
        Style {
            glyph: ramp_glyph(&self.shading, bucket),
            fg: self.foreground(terrain),
            bg: self.background,
        }
    }
}

/// Theme + glyph set + monochrome switch; what the renderer normally uses.
#[derive(Debug, Clone, PartialEq)]
pub struct Appearance {
    pub theme: Theme,
    pub mode: RenderMode,
    pub monochrome: bool,
}

impl Appearance {
    #[must_use]
    pub fn new(theme: Theme, mode: RenderMode, monochrome: bool) -> Self {
        Self {
            theme,
            mode,
            monochrome,
        }
    }
}

impl Default for Appearance {
    fn default() -> Self {
        Self::new(Theme::geography(), RenderMode::default(), false)
    }
}

impl ThemeTable for Appearance {
    fn resolve(&self, terrain: Terrain, bucket: u8) -> Style {
        let mut style = self.theme.resolve(terrain, bucket);
        if let Some(ramp) = self.mode.ramp(terrain) {
            style.glyph = ramp_glyph(ramp, bucket);
        }
        if self.monochrome {
            style.fg = Color::Default;
            style.bg = Color::Default;
        }
        style
    }
}
