use bevy_math::{DMat3, DVec2, DVec3};
use tracing::debug;

use super::terms::{clamp_command, coriolis_damping, generalized_force};
use super::types::{ThrusterCommand, VesselState};
use crate::math::rotate;
use crate::{wrap_angle, ConfigError, Pose, RigidBodyParameters, ThrusterSpec, VesselSpec};

/// Longest explicit Euler sub-step (s). The surge time constant of the
/// small presets is ~0.2 s, so this keeps the update well inside its
/// stability region whatever timestep the episode loop uses.
pub const DEFAULT_MAX_SUBSTEP: f64 = 0.05;

/// Most sub-steps one call to [`DynamicsModel::step`] will run. Longer
/// timesteps are truncated to `MAX_SUBSTEPS · max_substep` seconds.
pub const MAX_SUBSTEPS: usize = 100_000;

/// 3DOF maneuvering model: M·ν̇ + N(ν)·ν = τ, η̇ = R(ψ)·ν.
#[derive(Debug, Clone)]
pub struct DynamicsModel {
    hull: RigidBodyParameters,
    thrusters: ThrusterSpec,
    m_inv: DMat3,
    max_substep: f64,
    state: VesselState,
}

impl DynamicsModel {
    pub fn new(spec: &VesselSpec, initial: Pose) -> Result<Self, ConfigError> {
        Self::with_substep(spec, initial, DEFAULT_MAX_SUBSTEP)
    }

    pub fn with_substep(spec: &VesselSpec, initial: Pose, max_substep: f64) -> Result<Self, ConfigError> {
        if !(max_substep.is_finite() && max_substep > 0.0) {
            return Err(ConfigError::InvalidParameter { field: "max_substep", value: max_substep });
        }
        let t = &spec.thrusters;
        for (field, value) in [("max_forward", t.max_forward), ("max_backward", t.max_backward)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidParameter { field, value });
            }
        }
        let m_inv = invert_mass_matrix(&spec.hull)?;
        Ok(Self {
            hull: spec.hull,
            thrusters: spec.thrusters,
            m_inv,
            max_substep,
            state: VesselState::at_rest(initial),
        })
    }

    pub fn state(&self) -> &VesselState {
        &self.state
    }

    pub fn reset(&mut self, pose: Pose) {
        self.state = VesselState::at_rest(pose);
    }

    /// Accelerations ν̇ = M⁻¹(τ − N(ν)·ν) for a saturated command.
    pub fn acceleration(&self, nu: DVec3, cmd: ThrusterCommand) -> DVec3 {
        let tau = generalized_force(&self.thrusters, clamp_command(&self.thrusters, cmd));
        self.m_inv * (tau - coriolis_damping(&self.hull, nu) * nu)
    }

    /// Advance the state by `dt` seconds. Non-positive or non-finite `dt`
    /// leaves the state untouched.
    pub fn step(&mut self, cmd: ThrusterCommand, dt: f64) -> &VesselState {
        if !(dt.is_finite() && dt > 0.0) {
            return &self.state;
        }
        let horizon = self.max_substep * MAX_SUBSTEPS as f64;
        let dt = if dt > horizon {
            debug!(dt, horizon, "timestep exceeds integration horizon, truncating");
            horizon
        } else {
            dt
        };
        let cmd = clamp_command(&self.thrusters, cmd);
        let substeps = (dt / self.max_substep).ceil().clamp(1.0, MAX_SUBSTEPS as f64) as usize;
        let h = dt / substeps as f64;
        for _ in 0..substeps {
            self.euler_substep(cmd, h);
        }
        if !self.state.is_finite() {
            debug!(state = ?self.state, "non-finite vessel state after step");
        }
        &self.state
    }

    fn euler_substep(&mut self, cmd: ThrusterCommand, h: f64) {
        let tau = generalized_force(&self.thrusters, cmd);
        let s = &mut self.state;
        let nu_dot = self.m_inv * (tau - coriolis_damping(&self.hull, s.nu) * s.nu);
        // Semi-implicit: pose uses the updated velocity and the current heading.
        s.nu += nu_dot * h;
        let v_world: DVec2 = rotate(s.nu.truncate(), s.heading);
        s.position += v_world * h;
        s.heading = wrap_angle(s.heading + s.nu.z * h);
    }
}

fn invert_mass_matrix(hull: &RigidBodyParameters) -> Result<DMat3, ConfigError> {
    let m = hull.mass_matrix();
    let det = m.determinant();
    if !det.is_finite() || det.abs() < 1e-9 {
        return Err(ConfigError::SingularMassMatrix(det));
    }
    Ok(m.inverse())
}
