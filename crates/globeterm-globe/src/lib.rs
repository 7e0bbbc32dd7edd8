#![forbid(unsafe_code)]

//! Globe geometry: terrain classification, orientation/zoom state, and the
//! orthographic projector that turns the sphere into screen-space points.

pub mod projection;
pub mod sphere;
pub mod terrain;

pub use projection::{Lighting, ProjectedPoint, Projection, Projector, SamplingGrid, sphere_radius};
pub use sphere::{MAX_ZOOM, MIN_ZOOM, Orientation, SphereModel};
pub use terrain::{LandMask, Terrain, TerrainLookup};
