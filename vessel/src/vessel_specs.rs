use bevy_math::{DMat3, DVec2};
use serde::{Deserialize, Serialize};

use crate::math::mat3_from_rows;
use crate::{Polygon, Pose};

/// Rigid-body and hydrodynamic coefficients of one vessel class (SI units,
/// Fossen notation). Added-mass and damping derivatives are negative for a
/// physically sensible hull.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidBodyParameters {
    pub m: f64,
    pub x_g: f64,
    pub I_z: f64,
    pub X_udot: f64,
    pub Y_vdot: f64,
    pub N_rdot: f64,
    pub X_u: f64,
    pub Y_v: f64,
    pub N_r: f64,
    pub Y_r: f64,
    pub N_v: f64,
}

impl RigidBodyParameters {
    /// Generalized mass matrix M = M_RB + M_A. Depends only on fixed
    /// parameters, so callers compute it once.
    pub fn mass_matrix(&self) -> DMat3 {
        let mxg = self.m * self.x_g;
        mat3_from_rows(
            [self.m - self.X_udot, 0.0, 0.0],
            [0.0, self.m - self.Y_vdot, mxg],
            [0.0, mxg, self.I_z - self.N_rdot],
        )
    }
}

/// Main particulars of a twin-pontoon hull, used to derive coefficients
/// from rule-of-thumb formulas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HullGeometry {
    pub length: f64,
    pub beam: f64,
    pub mass: f64,
    pub x_g: f64,
    /// Time constants in sway and yaw (s).
    pub t_sway: f64,
    pub t_yaw: f64,
    /// Maximum forward speed (m/s).
    pub u_max: f64,
    pub pontoon_beam: f64,
    pub pontoon_block_coefficient: f64,
    /// Empirical sway/yaw cross damping (N·s, N·m·s/m).
    pub y_r: f64,
    pub n_v: f64,
}

const G: f64 = 9.81;
const RHO: f64 = 1025.0;

impl HullGeometry {
    /// Displaced volume (m³).
    pub fn displacement(&self) -> f64 {
        self.mass / RHO
    }

    /// Draft of the two pontoons (m).
    pub fn draft(&self) -> f64 {
        self.displacement() / (2.0 * self.pontoon_block_coefficient * self.pontoon_beam * self.length)
    }

    #[allow(non_snake_case)]
    pub fn rigid_body_parameters(&self) -> RigidBodyParameters {
        let m = self.mass;
        let L = self.length;
        let nabla = self.displacement();
        let r66 = 0.25 * L;
        let I_z = m * r66 - m * self.x_g * self.x_g;

        let X_udot = -(2.7 * RHO * nabla.powf(5.0 / 3.0)) / (L * L * m);
        let Y_vdot = -1.5 * m;
        let N_rdot = -1.7 * I_z;

        let m22 = m - Y_vdot;
        let m33 = I_z - N_rdot;
        RigidBodyParameters {
            m,
            x_g: self.x_g,
            I_z,
            X_udot,
            Y_vdot,
            N_rdot,
            X_u: -24.4 * G / self.u_max,
            Y_v: -m22 / self.t_sway,
            N_r: -m33 / self.t_yaw,
            Y_r: self.y_r,
            N_v: self.n_v,
        }
    }
}

/// Twin propeller layout. Lever arms are signed lateral offsets from the
/// centerline in the body frame (+Y to port).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThrusterSpec {
    pub max_forward: f64,
    pub max_backward: f64,
    pub lever_arm_port: f64,
    pub lever_arm_starboard: f64,
}

/// Everything the engine needs to know about one vessel class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselSpec {
    pub name: String,
    pub hull: RigidBodyParameters,
    pub thrusters: ThrusterSpec,
    /// Beam used for the collision outline (m).
    pub width: f64,
}

impl VesselSpec {
    /// Hull outline in the body frame: a box with a pointed bow.
    pub fn outline(&self) -> Vec<DVec2> {
        let w = self.width;
        vec![
            DVec2::new(-0.5 * w, -0.5 * w),
            DVec2::new(-0.5 * w, 0.5 * w),
            DVec2::new(0.5 * w, 0.5 * w),
            DVec2::new(1.5 * w, 0.0),
            DVec2::new(0.5 * w, -0.5 * w),
        ]
    }

    pub fn boundary_at(&self, pose: Pose) -> Polygon {
        Polygon::new(self.outline().into_iter().map(|v| pose.transform_point(v)).collect::<Vec<_>>())
    }
}

impl Default for VesselSpec {
    fn default() -> Self {
        presets::blueboat()
    }
}

pub mod presets {
    use super::*;

    /// Twin-hull survey boat, coefficients derived from the hull particulars.
    pub fn blueboat() -> VesselSpec {
        let hull = HullGeometry {
            length: 1.195,
            beam: 0.910,
            mass: 15.0,
            x_g: 0.2,
            t_sway: 1.0,
            t_yaw: 1.0,
            u_max: 6.0 * 0.5144,
            pontoon_beam: 0.170,
            pontoon_block_coefficient: 0.4,
            y_r: -0.1,
            n_v: -0.1,
        };
        VesselSpec {
            name: "blueboat".to_string(),
            hull: hull.rigid_body_parameters(),
            thrusters: ThrusterSpec {
                max_forward: 55.21,
                max_backward: 27.56,
                lever_arm_port: 0.285,
                lever_arm_starboard: -0.285,
            },
            width: hull.beam,
        }
    }

    /// Larger 55 kg catamaran, same derivation.
    pub fn otter() -> VesselSpec {
        let hull = HullGeometry {
            length: 2.0,
            beam: 1.08,
            mass: 55.0,
            x_g: 0.2,
            t_sway: 1.0,
            t_yaw: 1.0,
            u_max: 6.0 * 0.5144,
            pontoon_beam: 0.25,
            pontoon_block_coefficient: 0.4,
            y_r: 0.0,
            n_v: 0.0,
        };
        VesselSpec {
            name: "otter".to_string(),
            hull: hull.rigid_body_parameters(),
            thrusters: ThrusterSpec {
                max_forward: 119.6,
                max_backward: 66.69,
                lever_arm_port: 0.395,
                lever_arm_starboard: -0.395,
            },
            width: hull.beam,
        }
    }

    /// Hand-tuned coefficients of the first simulator model. Thrust is
    /// normalised to ±1 N.
    pub fn legacy_sim() -> VesselSpec {
        VesselSpec {
            name: "legacy_sim".to_string(),
            hull: RigidBodyParameters {
                m: 23.8,
                x_g: 0.046,
                I_z: 1.760,
                X_udot: -1.697,
                Y_vdot: -22.5,
                N_rdot: -6.58,
                X_u: -2.0,
                Y_v: -7.0,
                N_r: -0.5,
                Y_r: -0.1,
                N_v: -0.1,
            },
            thrusters: ThrusterSpec {
                max_forward: 1.0,
                max_backward: 1.0,
                lever_arm_port: 0.285,
                lever_arm_starboard: -0.285,
            },
            width: 0.910,
        }
    }

    pub fn by_name(name: &str) -> Option<VesselSpec> {
        match name {
            "blueboat" => Some(blueboat()),
            "otter" => Some(otter()),
            "legacy_sim" => Some(legacy_sim()),
            _ => None,
        }
    }
}
