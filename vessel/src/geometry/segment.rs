use bevy_math::DVec2;

use super::GEOM_EPS;

#[inline]
fn orient(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b - a).perp_dot(c - a)
}

#[inline]
fn on_segment(a: DVec2, b: DVec2, p: DVec2) -> bool {
    p.x >= a.x.min(b.x) - GEOM_EPS
        && p.x <= a.x.max(b.x) + GEOM_EPS
        && p.y >= a.y.min(b.y) - GEOM_EPS
        && p.y <= a.y.max(b.y) + GEOM_EPS
}

#[inline]
fn sign(v: f64) -> i8 {
    if v > GEOM_EPS {
        1
    } else if v < -GEOM_EPS {
        -1
    } else {
        0
    }
}

/// Closed segment test: touching endpoints and collinear overlap count.
pub fn segments_intersect(p1: DVec2, p2: DVec2, q1: DVec2, q2: DVec2) -> bool {
    let d1 = sign(orient(q1, q2, p1));
    let d2 = sign(orient(q1, q2, p2));
    let d3 = sign(orient(p1, p2, q1));
    let d4 = sign(orient(p1, p2, q2));

    if d1 * d2 < 0 && d3 * d4 < 0 {
        return true;
    }
    (d1 == 0 && on_segment(q1, q2, p1))
        || (d2 == 0 && on_segment(q1, q2, p2))
        || (d3 == 0 && on_segment(p1, p2, q1))
        || (d4 == 0 && on_segment(p1, p2, q2))
}

/// Distance along a ray (unit `dir`, clipped to `max_len`) to the segment
/// `a`-`b`, or `None` when the ray misses it.
pub fn ray_segment_distance(
    origin: DVec2,
    dir: DVec2,
    max_len: f64,
    a: DVec2,
    b: DVec2,
) -> Option<f64> {
    let edge = b - a;
    let denom = dir.perp_dot(edge);
    let to_a = a - origin;

    if denom.abs() <= GEOM_EPS {
        // Parallel. Only a collinear edge can be hit, at its nearest endpoint.
        if to_a.perp_dot(dir).abs() > GEOM_EPS {
            return None;
        }
        let ta = to_a.dot(dir);
        let tb = (b - origin).dot(dir);
        let (lo, hi) = if ta <= tb { (ta, tb) } else { (tb, ta) };
        if hi < 0.0 || lo > max_len {
            return None;
        }
        return Some(lo.max(0.0));
    }

    let t = to_a.perp_dot(edge) / denom;
    let s = to_a.perp_dot(dir) / denom;
    if t < -GEOM_EPS || t > max_len + GEOM_EPS || s < -GEOM_EPS || s > 1.0 + GEOM_EPS {
        return None;
    }
    Some(t.clamp(0.0, max_len))
}
