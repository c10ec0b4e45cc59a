use bevy_math::{DMat3, DVec3};

use crate::math::mat3_from_rows;
use crate::{RigidBodyParameters, ThrusterCommand, ThrusterSpec};

// ----- Actuation -----

/// Saturate each propeller to its physical limits.
pub(super) fn clamp_command(thrusters: &ThrusterSpec, cmd: ThrusterCommand) -> ThrusterCommand {
    let lo = -thrusters.max_backward;
    let hi = thrusters.max_forward;
    // NaN inputs fall back to zero thrust
    let sat = |f: f64| if f.is_nan() { 0.0 } else { f.clamp(lo, hi) };
    ThrusterCommand { port: sat(cmd.port), starboard: sat(cmd.starboard) }
}

/// τ = B·f with B = [[1, 1], [0, 0], [−l_p, −l_s]]. A forward force at
/// lateral offset y produces yaw moment −y·F.
pub(super) fn generalized_force(thrusters: &ThrusterSpec, cmd: ThrusterCommand) -> DVec3 {
    DVec3::new(
        cmd.port + cmd.starboard,
        0.0,
        -thrusters.lever_arm_port * cmd.port - thrusters.lever_arm_starboard * cmd.starboard,
    )
}

// ----- Coriolis + damping -----

/// N(ν): linear damping plus the surge-dependent Coriolis coupling. At
/// ν = 0 it is the pure damping matrix.
pub(super) fn coriolis_damping(hull: &RigidBodyParameters, nu: DVec3) -> DMat3 {
    let u = nu.x;
    mat3_from_rows(
        [-hull.X_u, 0.0, 0.0],
        [0.0, -hull.Y_v, hull.m * u - hull.Y_r],
        [0.0, -hull.N_v, hull.m * hull.x_g * u - hull.N_r],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;

    #[test]
    fn saturation_per_propeller() {
        let t = presets::blueboat().thrusters;
        let c = clamp_command(&t, ThrusterCommand::new(1000.0, -1000.0));
        assert_eq!(c.port, t.max_forward);
        assert_eq!(c.starboard, -t.max_backward);
        let nan = clamp_command(&t, ThrusterCommand::new(f64::NAN, 1.0));
        assert_eq!(nan.port, 0.0);
    }

    #[test]
    fn differential_thrust_yaws_toward_weaker_side() {
        let t = presets::blueboat().thrusters;
        // More starboard thrust pushes the bow to port (positive r).
        let tau = generalized_force(&t, ThrusterCommand::new(0.0, 10.0));
        assert!(tau.z > 0.0);
        let tau = generalized_force(&t, ThrusterCommand::both(10.0));
        assert!(tau.z.abs() < 1e-12);
        assert_eq!(tau.y, 0.0);
    }

    #[test]
    fn damping_at_rest_is_linear_damping() {
        let hull = presets::blueboat().hull;
        let n = coriolis_damping(&hull, DVec3::ZERO);
        assert_eq!(n.x_axis.x, -hull.X_u);
        assert_eq!(n.y_axis.y, -hull.Y_v);
        assert_eq!(n.z_axis.z, -hull.N_r);
        // Row 1, column 2 holds −Y_r when u = 0.
        assert_eq!(n.z_axis.y, -hull.Y_r);
    }
}
