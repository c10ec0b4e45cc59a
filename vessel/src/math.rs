use std::f64::consts::{PI, TAU};

use bevy_math::{DMat3, DVec2};
use serde::{Deserialize, Serialize};

/// Planar pose in the world frame. Heading is measured counter-clockwise
/// from world +X, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: DVec2,
    pub heading: f64,
}

impl Pose {
    pub const fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { position: DVec2::new(x, y), heading }
    }

    /// Map a point from this pose's local frame into the world frame.
    #[inline]
    pub fn transform_point(&self, local: DVec2) -> DVec2 {
        self.position + rotate(local, self.heading)
    }
}

/// Wrap an angle into (−π, π].
pub fn wrap_angle(angle: f64) -> f64 {
    if angle > -PI && angle <= PI {
        return angle;
    }
    let mut a = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid may land on either end of the interval after rounding
    if a <= -PI {
        a += TAU;
    }
    if a > PI {
        a -= TAU;
    }
    a
}

#[inline]
pub(crate) fn rotate(v: DVec2, angle: f64) -> DVec2 {
    let (s, c) = angle.sin_cos();
    DVec2::new(c * v.x - s * v.y, s * v.x + c * v.y)
}

/// Build a matrix from its rows (glam stores columns).
#[inline]
pub(crate) fn mat3_from_rows(r0: [f64; 3], r1: [f64; 3], r2: [f64; 3]) -> DMat3 {
    DMat3::from_cols_array_2d(&[r0, r1, r2]).transpose()
}
