use bevy_math::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::Pose;

/// Kinematic and dynamic state of the vessel.
///
/// Frame conventions:
/// - World: +X east, +Y north, heading ψ counter-clockwise from +X.
/// - Body: +X forward (surge), +Y to port (sway), r positive turning to port.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VesselState {
    pub position: DVec2,
    /// Heading ψ in (−π, π].
    pub heading: f64,
    /// Body-frame velocity ν = (u, v, r).
    pub nu: DVec3,
}

impl VesselState {
    pub fn at_rest(pose: Pose) -> Self {
        Self {
            position: pose.position,
            heading: crate::wrap_angle(pose.heading),
            nu: DVec3::ZERO,
        }
    }

    pub fn pose(&self) -> Pose {
        Pose { position: self.position, heading: self.heading }
    }

    /// Speed over ground (m/s).
    pub fn speed(&self) -> f64 {
        self.nu.truncate().length()
    }

    /// World-frame linear velocity R(ψ)·(u, v).
    pub fn world_velocity(&self) -> DVec2 {
        crate::math::rotate(self.nu.truncate(), self.heading)
    }

    /// Course over ground: heading plus sideslip.
    pub fn course(&self) -> f64 {
        if self.speed() <= f64::EPSILON {
            return self.heading;
        }
        crate::wrap_angle(self.heading + self.nu.y.atan2(self.nu.x))
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.heading.is_finite() && self.nu.is_finite()
    }
}

/// Propeller forces in newtons. Out-of-range values are saturated by the
/// dynamics model, not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ThrusterCommand {
    pub port: f64,
    pub starboard: f64,
}

impl ThrusterCommand {
    pub const fn new(port: f64, starboard: f64) -> Self {
        Self { port, starboard }
    }

    pub const fn both(force: f64) -> Self {
        Self { port: force, starboard: force }
    }
}
