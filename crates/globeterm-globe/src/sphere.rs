#![forbid(unsafe_code)]

//! Orientation and zoom state.

use std::f64::consts::TAU;

use crate::projection::{Projection, Projector};
use crate::terrain::TerrainLookup;

pub const MIN_ZOOM: f64 = 0.2;
pub const MAX_ZOOM: f64 = 5.0;
pub const DEFAULT_ZOOM: f64 = 1.0;
/// Initial tilt; the view centre starts at 15°N.
pub const INITIAL_PITCH: f64 = 15.0 * std::f64::consts::PI / 180.0;

/// Wrap an angle into `[0, 2π)`.
#[must_use]
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Yaw and pitch in radians, each kept in `[0, 2π)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    yaw: f64,
    pitch: f64,
}

impl Orientation {
    #[must_use]
    pub fn new(yaw: f64, pitch: f64) -> Self {
        Self {
            yaw: wrap_angle(yaw),
            pitch: wrap_angle(pitch),
        }
    }

    #[must_use]
    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    #[must_use]
    pub fn pitch(&self) -> f64 {
        self.pitch
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereModel {
    orientation: Orientation,
    zoom: f64,
}

impl Default for SphereModel {
    fn default() -> Self {
        Self::new(DEFAULT_ZOOM)
    }
}

impl SphereModel {
    /// A model at `zoom` (clamped), yaw 0 and the initial tilt.
    #[must_use]
    pub fn new(zoom: f64) -> Self {
        let zoom = if zoom.is_finite() { zoom } else { DEFAULT_ZOOM };
        Self {
            orientation: Orientation::new(0.0, INITIAL_PITCH),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Add signed deltas (radians); each angle wraps modulo 2π.
    /// Non-finite deltas are ignored.
    pub fn apply_rotation_delta(&mut self, d_yaw: f64, d_pitch: f64) {
        if !(d_yaw.is_finite() && d_pitch.is_finite()) {
            tracing::debug!(d_yaw, d_pitch, "ignoring non-finite rotation delta");
            return;
        }
        self.orientation = Orientation::new(
            self.orientation.yaw + d_yaw,
            self.orientation.pitch + d_pitch,
        );
    }

    /// Add a signed delta and clamp to `[MIN_ZOOM, MAX_ZOOM]`.
    ///
    /// Returns `true` when the result had to be clamped. A non-finite delta
    /// leaves the zoom unchanged and also reports `true`.
    pub fn apply_zoom_delta(&mut self, d_zoom: f64) -> bool {
        if !d_zoom.is_finite() {
            return true;
        }
        let target = self.zoom + d_zoom;
        self.zoom = target.clamp(MIN_ZOOM, MAX_ZOOM);
        self.zoom != target
    }

    /// Project onto a `width` x `height` viewport.
    ///
    /// The projector only caches the sampling grid; the returned points are a
    /// function of orientation, zoom and viewport size alone.
    pub fn project<'a, T: TerrainLookup>(
        &self,
        projector: &'a mut Projector<T>,
        width: u16,
        height: u16,
    ) -> Projection<'a> {
        projector.project(self, width, height)
    }
}
