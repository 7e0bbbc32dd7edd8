#![forbid(unsafe_code)]

//! Terrain classification over an embedded one-degree land mask.
//!
//! The mask is 360 x 180 bits, row-major, most significant bit first. Row 0
//! is 90°N and column 0 is 180°W. Lookup is nearest-neighbour.

/// Surface class of a point on the globe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Terrain {
    Ocean,
    Land,
    /// Land with at least one ocean neighbour.
    Coastline,
    /// Polar land.
    Ice,
}

impl Terrain {
    pub const ALL: [Self; 4] = [Self::Ocean, Self::Land, Self::Coastline, Self::Ice];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ocean => "ocean",
            Self::Land => "land",
            Self::Coastline => "coastline",
            Self::Ice => "ice",
        }
    }
}

/// Maps latitude/longitude (degrees) to a terrain class. Must be total.
pub trait TerrainLookup {
    fn classify(&self, latitude: f64, longitude: f64) -> Terrain;
}

static WORLD: &[u8; LandMask::BYTES] = include_bytes!("../assets/world_360x180.bin");

/// Land is treated as ice south of this latitude.
const ICE_SOUTH: f64 = -60.0;
/// Land is treated as ice north of this latitude.
const ICE_NORTH: f64 = 75.0;
/// Latitudes are clamped to keep nearest-neighbour rows inside the grid.
const LAT_LIMIT: f64 = 89.5;

#[derive(Debug, Clone, Copy)]
pub struct LandMask {
    bits: &'static [u8],
}

impl LandMask {
    pub const WIDTH: usize = 360;
    pub const HEIGHT: usize = 180;
    pub const BYTES: usize = Self::WIDTH * Self::HEIGHT / 8;

    /// The built-in world map.
    #[must_use]
    pub fn world() -> Self {
        Self { bits: WORLD }
    }

    /// Whether the grid cell at `(row, col)` is land.
    #[must_use]
    pub fn is_land(&self, row: usize, col: usize) -> bool {
        let bit = row * Self::WIDTH + col;
        self.bits
            .get(bit / 8)
            .is_some_and(|byte| (byte >> (7 - bit % 8)) & 1 == 1)
    }

    /// Nearest grid cell for a coordinate. Longitude wraps, latitude clamps.
    #[must_use]
    pub fn cell(latitude: f64, longitude: f64) -> (usize, usize) {
        let lon = (longitude + 180.0).rem_euclid(360.0) - 180.0;
        let lat = latitude.clamp(-LAT_LIMIT, LAT_LIMIT);
        // Float-to-int casts saturate and map NaN to 0.
        let row = ((90.0 - lat).round() as usize).min(Self::HEIGHT - 1);
        let col = ((lon + 180.0).round() as usize).min(Self::WIDTH - 1);
        (row, col)
    }

    fn is_coastline(&self, row: usize, col: usize) -> bool {
        let west = (col + Self::WIDTH - 1) % Self::WIDTH;
        let east = (col + 1) % Self::WIDTH;
        let north = row.checked_sub(1).map(|r| (r, col));
        let south = (row + 1 < Self::HEIGHT).then_some((row + 1, col));
        [Some((row, west)), Some((row, east)), north, south]
            .into_iter()
            .flatten()
            .any(|(r, c)| !self.is_land(r, c))
    }

    /// Number of land cells; used by tests to sanity-check the asset.
    #[must_use]
    pub fn land_cells(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }
}

impl Default for LandMask {
    fn default() -> Self {
        Self::world()
    }
}

impl TerrainLookup for LandMask {
    fn classify(&self, latitude: f64, longitude: f64) -> Terrain {
        let (row, col) = Self::cell(latitude, longitude);
        if !self.is_land(row, col) {
            Terrain::Ocean
        } else if latitude < ICE_SOUTH || latitude > ICE_NORTH {
            Terrain::Ice
        } else if self.is_coastline(row, col) {
            Terrain::Coastline
        } else {
            Terrain::Land
        }
    }
}
