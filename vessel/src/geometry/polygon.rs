use bevy_math::DVec2;

use super::segment::{ray_segment_distance, segments_intersect};
use super::GEOM_EPS;
use crate::GeometryError;

/// Axis-aligned bounding box used as a broad phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: DVec2,
    pub max: DVec2,
}

impl Aabb {
    pub fn from_points(points: &[DVec2]) -> Self {
        let mut min = DVec2::splat(f64::INFINITY);
        let mut max = DVec2::splat(f64::NEG_INFINITY);
        for p in points {
            min = min.min(*p);
            max = max.max(*p);
        }
        Self { min, max }
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x + GEOM_EPS
            && other.min.x <= self.max.x + GEOM_EPS
            && self.min.y <= other.max.y + GEOM_EPS
            && other.min.y <= self.max.y + GEOM_EPS
    }

    /// Euclidean distance from `p` to the box (zero inside).
    pub fn distance_to_point(&self, p: DVec2) -> f64 {
        let dx = (self.min.x - p.x).max(0.0).max(p.x - self.max.x);
        let dy = (self.min.y - p.y).max(0.0).max(p.y - self.max.y);
        DVec2::new(dx, dy).length()
    }
}

/// Closed simple polygon. Vertices are stored without a repeated closing
/// vertex; the last vertex connects back to the first.
///
/// Construction never fails: unusable input is kept but flagged invalid, and
/// the ray caster and collision detector skip invalid polygons.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<DVec2>,
    aabb: Aabb,
    validity: Result<(), GeometryError>,
}

impl Polygon {
    pub fn new(vertices: impl Into<Vec<DVec2>>) -> Self {
        let vertices = repair(vertices.into());
        let aabb = Aabb::from_points(&vertices);
        let validity = validate(&vertices);
        Self { vertices, aabb, validity }
    }

    /// Like [`Polygon::new`] but reports why the polygon is unusable.
    pub fn try_new(vertices: impl Into<Vec<DVec2>>) -> Result<Self, GeometryError> {
        let polygon = Self::new(vertices);
        polygon.validity?;
        Ok(polygon)
    }

    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices
    }

    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    pub fn is_valid(&self) -> bool {
        self.validity.is_ok()
    }

    pub fn validity(&self) -> Result<(), GeometryError> {
        self.validity
    }

    /// Edges as (start, end) pairs, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Signed shoelace area; positive for counter-clockwise winding.
    pub fn signed_area(&self) -> f64 {
        shoelace(&self.vertices)
    }

    pub fn translated(&self, offset: DVec2) -> Self {
        Self {
            vertices: self.vertices.iter().map(|v| *v + offset).collect(),
            aabb: Aabb { min: self.aabb.min + offset, max: self.aabb.max + offset },
            validity: self.validity,
        }
    }

    /// Even-odd point containment. Points on the boundary count as inside.
    pub fn contains_point(&self, p: DVec2) -> bool {
        if self.vertices.len() < 3 {
            return false;
        }
        let mut inside = false;
        for (a, b) in self.edges() {
            if (b - a).perp_dot(p - a).abs() <= GEOM_EPS
                && p.x >= a.x.min(b.x) - GEOM_EPS
                && p.x <= a.x.max(b.x) + GEOM_EPS
                && p.y >= a.y.min(b.y) - GEOM_EPS
                && p.y <= a.y.max(b.y) + GEOM_EPS
            {
                return true;
            }
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// True when the two closed regions share any point: crossing or
    /// touching edges, or one polygon lying entirely inside the other.
    /// Works for non-convex input.
    pub fn intersects(&self, other: &Polygon) -> bool {
        if self.vertices.is_empty() || other.vertices.is_empty() {
            return false;
        }
        if !self.aabb.overlaps(&other.aabb) {
            return false;
        }
        for (a1, a2) in self.edges() {
            for (b1, b2) in other.edges() {
                if segments_intersect(a1, a2, b1, b2) {
                    return true;
                }
            }
        }
        // No boundary contact: either disjoint or fully nested.
        other.contains_point(self.vertices[0]) || self.contains_point(other.vertices[0])
    }

    /// Distance along a ray to the polygon region, clipped to `max_len`.
    /// A ray starting inside the polygon reports zero.
    pub fn ray_distance(&self, origin: DVec2, dir: DVec2, max_len: f64) -> Option<f64> {
        if self.contains_point(origin) {
            return Some(0.0);
        }
        self.edges()
            .filter_map(|(a, b)| ray_segment_distance(origin, dir, max_len, a, b))
            .min_by(|x, y| x.total_cmp(y))
    }
}

fn shoelace(vertices: &[DVec2]) -> f64 {
    let n = vertices.len();
    let mut twice = 0.0;
    for i in 0..n {
        twice += vertices[i].perp_dot(vertices[(i + 1) % n]);
    }
    0.5 * twice
}

fn repair(mut vertices: Vec<DVec2>) -> Vec<DVec2> {
    vertices.dedup_by(|b, a| a.distance_squared(*b) <= GEOM_EPS * GEOM_EPS);
    while vertices.len() > 1 {
        let first = vertices[0];
        match vertices.last() {
            Some(last) if last.distance_squared(first) <= GEOM_EPS * GEOM_EPS => {
                vertices.pop();
            }
            _ => break,
        }
    }
    vertices
}

fn validate(vertices: &[DVec2]) -> Result<(), GeometryError> {
    if vertices.iter().any(|v| !v.is_finite()) {
        return Err(GeometryError::NonFiniteVertex);
    }
    let n = vertices.len();
    if n < 3 {
        return Err(GeometryError::TooFewVertices);
    }
    if shoelace(vertices).abs() <= GEOM_EPS {
        return Err(GeometryError::Degenerate);
    }
    for i in 0..n {
        let (a1, a2) = (vertices[i], vertices[(i + 1) % n]);
        for j in (i + 1)..n {
            // Neighbouring edges share a vertex by construction.
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            let (b1, b2) = (vertices[j], vertices[(j + 1) % n]);
            if segments_intersect(a1, a2, b1, b2) {
                return Err(GeometryError::SelfIntersecting);
            }
        }
    }
    Ok(())
}
