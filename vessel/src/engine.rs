use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    has_collided, ConfigError, DynamicsModel, Measurement, ObstacleView, Polygon, Pose, SensorArray,
    SensorConfig, ThrusterCommand, VesselSpec, VesselState, DEFAULT_MAX_SUBSTEP,
};

/// Everything fixed for an episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub vessel: VesselSpec,
    pub sensors: SensorConfig,
    /// Longest explicit Euler sub-step of the dynamics (s).
    pub max_substep: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { vessel: VesselSpec::default(), sensors: SensorConfig::default(), max_substep: DEFAULT_MAX_SUBSTEP }
    }
}

/// Per-step bundle handed to reward and termination logic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub step: u64,
    pub time: f64,
    pub state: VesselState,
    pub measurements: Vec<Measurement>,
    pub sectors: Vec<usize>,
    pub collision: bool,
}

/// Dynamics, perception and contact detection for one vessel.
///
/// Stepping is synchronous: [`VesselEngine::step`] fully advances the
/// dynamics, then [`VesselEngine::measure`] fully advances perception.
#[derive(Debug, Clone)]
pub struct VesselEngine {
    spec: VesselSpec,
    dynamics: DynamicsModel,
    sensors: SensorArray,
    step: u64,
    time: f64,
}

impl VesselEngine {
    pub fn new(config: EngineConfig, initial: Pose) -> Result<Self, ConfigError> {
        let spec = config.vessel;
        if !(spec.width.is_finite() && spec.width > 0.0) {
            return Err(ConfigError::InvalidParameter { field: "vessel.width", value: spec.width });
        }
        let dynamics = DynamicsModel::with_substep(&spec, initial, config.max_substep)?;
        let sensors = SensorArray::new(config.sensors)?;
        info!(
            vessel = %spec.name,
            sensors = sensors.len(),
            sectors = sensors.config().n_sectors,
            range = sensors.config().sensor_range,
            "vessel engine ready"
        );
        Ok(Self { spec, dynamics, sensors, step: 0, time: 0.0 })
    }

    pub fn spec(&self) -> &VesselSpec {
        &self.spec
    }

    pub fn state(&self) -> &VesselState {
        self.dynamics.state()
    }

    pub fn sensors(&self) -> &SensorArray {
        &self.sensors
    }

    /// Sector of every sensor, in sensor index order.
    pub fn sectors(&self) -> &[usize] {
        self.sensors.sectors()
    }

    /// Completed dynamics steps this episode.
    pub fn step_index(&self) -> u64 {
        self.step
    }

    /// Simulated time this episode (s).
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn reset(&mut self, pose: Pose) {
        self.dynamics.reset(pose);
        self.sensors.reset();
        self.step = 0;
        self.time = 0.0;
    }

    pub fn step(&mut self, command: ThrusterCommand, dt: f64) -> &VesselState {
        if dt.is_finite() && dt > 0.0 {
            self.step += 1;
            self.time += dt;
        }
        self.dynamics.step(command, dt)
    }

    pub fn measure<O: ObstacleView>(&mut self, obstacles: &[O]) -> &[Measurement] {
        let pose = self.dynamics.state().pose();
        self.sensors.measure(obstacles, pose, self.step, self.time)
    }

    pub fn vessel_boundary(&self) -> Polygon {
        self.spec.boundary_at(self.dynamics.state().pose())
    }

    pub fn has_collided<O: ObstacleView>(&self, obstacles: &[O]) -> bool {
        has_collided(&self.vessel_boundary(), obstacles)
    }

    /// Step, measure and check for contact in one call.
    pub fn advance<O: ObstacleView>(&mut self, command: ThrusterCommand, dt: f64, obstacles: &[O]) -> StepReport {
        self.step(command, dt);
        let measurements = self.measure(obstacles).to_vec();
        StepReport {
            step: self.step,
            time: self.time,
            state: *self.state(),
            measurements,
            sectors: self.sectors().to_vec(),
            collision: self.has_collided(obstacles),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Obstacle;
    use bevy_math::DVec2;

    #[test]
    fn zero_width_is_a_config_error() {
        let mut cfg = EngineConfig::default();
        cfg.vessel.width = 0.0;
        assert!(VesselEngine::new(cfg, Pose::default()).is_err());
    }

    #[test]
    fn sensor_errors_surface_at_construction() {
        let cfg = EngineConfig {
            sensors: SensorConfig { n_sectors: 0, ..SensorConfig::default() },
            ..EngineConfig::default()
        };
        assert_eq!(VesselEngine::new(cfg, Pose::default()).unwrap_err(), ConfigError::NoSectors);
    }

    #[test]
    fn reset_restores_initial_conditions() {
        let mut engine = VesselEngine::new(EngineConfig::default(), Pose::default()).unwrap();
        let obstacles = [Obstacle::circle(DVec2::new(10.0, 0.0), 2.0)];
        for _ in 0..10 {
            engine.advance(ThrusterCommand::both(40.0), 0.1, &obstacles);
        }
        assert!(engine.state().position.x > 0.0);
        engine.reset(Pose::new(1.0, 2.0, 0.5));
        assert_eq!(engine.step_index(), 0);
        assert_eq!(engine.time(), 0.0);
        assert_eq!(engine.state().position, DVec2::new(1.0, 2.0));
        assert_eq!(engine.sensors().real_casts(), 0);
        assert!(engine.sensors().cache().entries().iter().all(|e| e.refreshed_step.is_none()));
    }

    #[test]
    fn report_carries_one_entry_per_sensor() {
        let mut engine = VesselEngine::new(EngineConfig::default(), Pose::default()).unwrap();
        let none: [Obstacle; 0] = [];
        let report = engine.advance(ThrusterCommand::default(), 0.1, &none);
        assert_eq!(report.step, 1);
        assert_eq!(report.measurements.len(), engine.sensors().len());
        assert_eq!(report.sectors.len(), engine.sensors().len());
        assert!(!report.collision);
    }
}
