#![forbid(unsafe_code)]

//! Orthographic projection of the globe onto a character grid.
//!
//! # Sampling grid
//!
//! The sphere is sampled on a latitude/longitude lattice whose density depends
//! only on the projected radius: rings are at most [`SAMPLE_SPACING`] rows
//! apart and samples within a ring at most [`SAMPLE_SPACING`] columns apart,
//! so neighbouring samples never skip a cell. The grid stores one terrain
//! class per sample; positions are regenerated each frame from the ring table
//! with an incremental longitude rotation.
//!
//! # Transform
//!
//! `view = Rx(pitch) · Ry(yaw) · p`. Points with `view.z < 0` face away from
//! the viewer and are culled. Screen coordinates:
//!
//! ```text
//! col = round(width / 2 + x * r * ASPECT_RATIO)
//! row = round(height / 2 - y * r)
//! ```

use std::f64::consts::{PI, TAU};

use crate::sphere::SphereModel;
use crate::terrain::{LandMask, Terrain, TerrainLookup};

/// Terminal cells are roughly twice as tall as they are wide.
pub const ASPECT_RATIO: f64 = 2.0;
/// Fraction of the smaller viewport dimension covered at zoom 1.0.
pub const RADIUS_FILL: f64 = 0.8;
/// Below this radius (rows) nothing is projected.
pub const MIN_RADIUS: f64 = 0.5;
/// Maximum distance in cells between neighbouring samples.
pub const SAMPLE_SPACING: f64 = 0.7;
/// Upper bound on latitude rings.
pub const MAX_RINGS: usize = 512;

/// Projected radius in rows for a viewport and zoom level.
#[must_use]
pub fn sphere_radius(width: u16, height: u16, zoom: f64) -> f64 {
    let w = f64::from(width) / ASPECT_RATIO;
    let h = f64::from(height);
    w.min(h) * 0.5 * RADIUS_FILL * zoom
}

/// Directional light with an ambient floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient: f64,
    /// Unit vector toward the light, in view space.
    pub direction: [f64; 3],
}

impl Default for Lighting {
    /// Light from the viewer: intensity depends on view-space z only.
    fn default() -> Self {
        Self {
            ambient: 0.3,
            direction: [0.0, 0.0, 1.0],
        }
    }
}

impl Lighting {
    /// Intensity in `[0, 1]` for a surface normal.
    #[must_use]
    pub fn intensity(&self, normal: [f64; 3]) -> f64 {
        let lambert = dot(normal, self.direction).max(0.0);
        (self.ambient + (1.0 - self.ambient) * lambert).clamp(0.0, 1.0)
    }
}

/// One visible sample in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    /// May fall outside the viewport; the rasterizer drops those.
    pub col: i32,
    pub row: i32,
    pub terrain: Terrain,
    pub intensity: f64,
    /// View-space z; never negative.
    pub depth: f64,
}

#[derive(Debug, Clone, Copy)]
struct Ring {
    sin_lat: f64,
    cos_lat: f64,
    count: usize,
    step_cos: f64,
    step_sin: f64,
    /// Index of the ring's first sample in `SamplingGrid::terrain`.
    start: usize,
}

/// Latitude/longitude lattice with cached terrain classes.
#[derive(Debug, Clone)]
pub struct SamplingGrid {
    rings: Vec<Ring>,
    terrain: Vec<Terrain>,
}

impl SamplingGrid {
    /// Number of rings needed for a projected radius (rows).
    #[must_use]
    pub fn ring_count_for(radius: f64) -> usize {
        if !(radius >= MIN_RADIUS) {
            return 0;
        }
        let rings = (PI * radius / SAMPLE_SPACING).ceil() as usize + 1;
        rings.clamp(2, MAX_RINGS)
    }

    /// Build a grid with `rings` latitude rings from pole to pole.
    pub fn build(rings: usize, lookup: &impl TerrainLookup) -> Self {
        let mut grid = Self {
            rings: Vec::with_capacity(rings),
            terrain: Vec::new(),
        };
        if rings < 2 {
            return grid;
        }
        // The radius this ring count was sized for.
        let radius = (rings - 1) as f64 * SAMPLE_SPACING / PI;
        let circumference = TAU * radius * ASPECT_RATIO;

        for i in 0..rings {
            let lat = -PI / 2.0 + PI * i as f64 / (rings - 1) as f64;
            let (sin_lat, cos_lat) = lat.sin_cos();
            let count = ((circumference * cos_lat.max(0.0) / SAMPLE_SPACING).ceil() as usize).max(1);
            let step = TAU / count as f64;
            let (step_sin, step_cos) = step.sin_cos();
            let start = grid.terrain.len();
            let lat_deg = lat.to_degrees();
            grid.terrain.extend((0..count).map(|j| {
                let lon_deg = (-PI + step * j as f64).to_degrees();
                lookup.classify(lat_deg, lon_deg)
            }));
            grid.rings.push(Ring {
                sin_lat,
                cos_lat,
                count,
                step_cos,
                step_sin,
                start,
            });
        }
        tracing::debug!(rings, samples = grid.terrain.len(), "sampling grid built");
        grid
    }

    #[must_use]
    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }

    /// Total number of samples on the sphere (visible or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.terrain.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terrain.is_empty()
    }
}

/// Owns the terrain lookup and caches the sampling grid between frames.
#[derive(Debug)]
pub struct Projector<T: TerrainLookup = LandMask> {
    lookup: T,
    lighting: Lighting,
    grid: SamplingGrid,
}

impl Default for Projector<LandMask> {
    fn default() -> Self {
        Self::new(LandMask::world())
    }
}

impl<T: TerrainLookup> Projector<T> {
    pub fn new(lookup: T) -> Self {
        Self {
            lookup,
            lighting: Lighting::default(),
            grid: SamplingGrid {
                rings: Vec::new(),
                terrain: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn grid(&self) -> &SamplingGrid {
        &self.grid
    }

    /// Project `model` onto a `width` x `height` viewport.
    pub fn project(&mut self, model: &SphereModel, width: u16, height: u16) -> Projection<'_> {
        let radius = sphere_radius(width, height, model.zoom());
        let rings = SamplingGrid::ring_count_for(radius);
        if rings != self.grid.ring_count() {
            self.grid = SamplingGrid::build(rings, &self.lookup);
        }

        let orientation = model.orientation();
        let (sa, ca) = orientation.pitch().sin_cos();
        let (sb, cb) = orientation.yaw().sin_cos();
        let rotation = [
            [cb, 0.0, sb],
            [sa * sb, ca, -sa * cb],
            [-ca * sb, sa, ca * cb],
        ];

        Projection {
            grid: &self.grid,
            frame: Frame {
                rotation,
                cx: f64::from(width) / 2.0,
                cy: f64::from(height) / 2.0,
                radius,
                lighting: self.lighting,
            },
            ring: if rings == 0 { self.grid.rings.len() } else { 0 },
            index: 0,
            lon_cos: -1.0,
            lon_sin: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    rotation: [[f64; 3]; 3],
    cx: f64,
    cy: f64,
    radius: f64,
    lighting: Lighting,
}

impl Frame {
    fn project(&self, p: [f64; 3], terrain: Terrain) -> Option<ProjectedPoint> {
        let [r0, r1, r2] = self.rotation;
        let z = dot(r2, p);
        if z < 0.0 {
            return None;
        }
        let v = [dot(r0, p), dot(r1, p), z];
        let col = (self.cx + v[0] * self.radius * ASPECT_RATIO).round();
        let row = (self.cy - v[1] * self.radius).round();
        Some(ProjectedPoint {
            col: col as i32,
            row: row as i32,
            terrain,
            intensity: self.lighting.intensity(v),
            depth: z,
        })
    }
}

/// The visible samples of one frame. Single pass; project again next frame.
#[derive(Debug)]
pub struct Projection<'a> {
    grid: &'a SamplingGrid,
    frame: Frame,
    ring: usize,
    index: usize,
    lon_cos: f64,
    lon_sin: f64,
}

impl Iterator for Projection<'_> {
    type Item = ProjectedPoint;

    fn next(&mut self) -> Option<ProjectedPoint> {
        loop {
            let ring = *self.grid.rings.get(self.ring)?;
            if self.index >= ring.count {
                self.ring += 1;
                self.index = 0;
                // Every ring starts at longitude -180°.
                self.lon_cos = -1.0;
                self.lon_sin = 0.0;
                continue;
            }
            let (c, s) = (self.lon_cos, self.lon_sin);
            self.lon_cos = c * ring.step_cos - s * ring.step_sin;
            self.lon_sin = s * ring.step_cos + c * ring.step_sin;
            let terrain = self.grid.terrain[ring.start + self.index];
            self.index += 1;

            // Longitude 0 faces +z (the viewer) at yaw 0.
            let p = [ring.cos_lat * s, ring.sin_lat, ring.cos_lat * c];
            if let Some(point) = self.frame.project(p, terrain) {
                return Some(point);
            }
        }
    }
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}
