//! Planar polygon geometry shared by the ray caster and collision detector.

mod polygon;
mod segment;

pub use polygon::{Aabb, Polygon};
pub use segment::{ray_segment_distance, segments_intersect};

/// Tolerance for parallelism and endpoint tests, in meters.
pub(crate) const GEOM_EPS: f64 = 1e-9;
