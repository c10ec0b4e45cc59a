//! Rangefinder array: bearings, sector partition, update scheduling,
//! the virtual obstacle cache and the ray caster itself.

mod array;
mod cache;
mod partition;
mod schedule;

pub use array::SensorArray;
pub use cache::{CacheEntry, VirtualObstacleCache};
pub use partition::SectorPartition;
pub use schedule::{ObservePolicy, SensorSchedule, ROTATION_GROUPS};

use std::f64::consts::{PI, TAU};

use bevy_math::DVec2;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Angular layout of the sensors relative to the bow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorArc {
    /// All-round coverage: θ_i = −π + (i + 1)·2π/n.
    Full,
    /// Evenly spaced over [−span/2, span/2], endpoints included.
    Forward { span: f64 },
}

impl SensorArc {
    pub fn bearings(&self, n: usize) -> Vec<f64> {
        match *self {
            SensorArc::Full => {
                let d = TAU / n as f64;
                (0..n).map(|i| -PI + (i + 1) as f64 * d).collect()
            }
            SensorArc::Forward { span } => {
                if n == 1 {
                    return vec![0.0];
                }
                let d = span / (n - 1) as f64;
                (0..n).map(|i| -0.5 * span + i as f64 * d).collect()
            }
        }
    }
}

/// Static perception configuration, fixed for an episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub n_sectors: usize,
    pub n_sensors_per_sector: usize,
    /// Maximum ray length (m).
    pub sensor_range: f64,
    /// Fraction of steps on which the whole array may cast rays (0..=1).
    pub sensor_frequency: f64,
    pub arc: SensorArc,
    pub partition: SectorPartition,
    pub observe: ObservePolicy,
    /// Report closeness on a logarithmic rather than linear scale.
    pub log_transform: bool,
    /// Only let one of four interleaved sensor groups cast per step.
    pub rotation: bool,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            n_sectors: 9,
            n_sensors_per_sector: 20,
            sensor_range: 50.0,
            sensor_frequency: 1.0,
            arc: SensorArc::Full,
            partition: SectorPartition::default(),
            observe: ObservePolicy::default(),
            log_transform: true,
            rotation: false,
        }
    }
}

impl SensorConfig {
    /// Scenarios with moving obstacles re-measure every sensor every step.
    pub fn moving_obstacles() -> Self {
        Self { observe: ObservePolicy::AlwaysMeasure, ..Self::default() }
    }

    pub fn n_sensors(&self) -> usize {
        self.n_sectors * self.n_sensors_per_sector
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_sectors == 0 {
            return Err(ConfigError::NoSectors);
        }
        if self.n_sensors_per_sector == 0 {
            return Err(ConfigError::NoSensors);
        }
        if !(self.sensor_range.is_finite() && self.sensor_range > 0.0) {
            return Err(ConfigError::InvalidSensorRange(self.sensor_range));
        }
        if !(0.0..=1.0).contains(&self.sensor_frequency) {
            return Err(ConfigError::InvalidSensorFrequency(self.sensor_frequency));
        }
        if let SensorArc::Forward { span } = self.arc {
            if !(span.is_finite() && span > 0.0 && span <= TAU) {
                return Err(ConfigError::InvalidParameter { field: "arc.span", value: span });
            }
        }
        self.partition.validate()?;
        self.observe.validate()
    }

    /// Monotonic compressive map from distance to a [0, 1] closeness score.
    pub fn closeness(&self, distance: f64) -> f64 {
        let range = self.sensor_range;
        let c = if self.log_transform {
            1.0 - (distance + 1.0).ln() / (range + 1.0).ln()
        } else {
            1.0 - distance / range
        };
        c.clamp(0.0, 1.0)
    }
}

/// Obstacle velocity resolved in the ray-aligned frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RelativeVelocity {
    /// Drift across the ray, positive toward the ray's left.
    pub lateral: f64,
    /// Speed toward the sensor along the ray; negative when receding.
    pub closing: f64,
}

impl RelativeVelocity {
    pub fn from_world(velocity: DVec2, world_bearing: f64) -> Self {
        let (s, c) = world_bearing.sin_cos();
        let along = DVec2::new(c, s);
        Self { lateral: velocity.dot(along.perp()), closing: -velocity.dot(along) }
    }

    pub fn as_vec(&self) -> DVec2 {
        DVec2::new(self.lateral, self.closing)
    }

    pub fn is_zero(&self) -> bool {
        self.lateral == 0.0 && self.closing == 0.0
    }
}

/// One sensor reading. `distance` is always the raw metric distance in
/// [0, sensor_range]; `closeness` is its transformed score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub distance: f64,
    pub closeness: f64,
    pub relative_velocity: RelativeVelocity,
    /// Index of the obstacle hit, within the slice that was measured.
    pub obstacle: Option<usize>,
}

impl Measurement {
    /// Reading of a ray that hit nothing.
    pub fn clear(sensor_range: f64) -> Self {
        Self {
            distance: sensor_range,
            closeness: 0.0,
            relative_velocity: RelativeVelocity::default(),
            obstacle: None,
        }
    }

    pub fn is_clear(&self) -> bool {
        self.obstacle.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn full_arc_puts_a_sensor_dead_ahead() {
        let b = SensorArc::Full.bearings(180);
        assert!(b[89].abs() < 1e-12);
        assert!((b[179] - PI).abs() < 1e-12);
        assert!(b.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn forward_arc_is_symmetric() {
        let b = SensorArc::Forward { span: PI }.bearings(5);
        assert_eq!(b.len(), 5);
        assert!((b[0] + FRAC_PI_2).abs() < 1e-12 && (b[4] - FRAC_PI_2).abs() < 1e-12);
        assert!(b[2].abs() < 1e-12);
        assert_eq!(SensorArc::Forward { span: PI }.bearings(1), vec![0.0]);
    }

    #[test]
    fn closeness_is_monotonic_and_bounded() {
        for log_transform in [true, false] {
            let cfg = SensorConfig { log_transform, ..SensorConfig::default() };
            assert_eq!(cfg.closeness(0.0), 1.0);
            assert_eq!(cfg.closeness(cfg.sensor_range), 0.0);
            let mut last = 1.0;
            for k in 1..=50 {
                let c = cfg.closeness(k as f64);
                assert!(c <= last && (0.0..=1.0).contains(&c));
                last = c;
            }
        }
    }

    #[test]
    fn log_closeness_is_compressive() {
        let log = SensorConfig::default();
        let lin = SensorConfig { log_transform: false, ..SensorConfig::default() };
        // Log scale keeps resolution at long range.
        assert!(log.closeness(25.0) < lin.closeness(25.0));
    }

    #[test]
    fn closing_speed_sign() {
        // Ray looks east; obstacle heading west toward the sensor.
        let rv = RelativeVelocity::from_world(DVec2::new(-2.0, 0.0), 0.0);
        assert!((rv.closing - 2.0).abs() < 1e-12 && rv.lateral.abs() < 1e-12);
        // Obstacle heading north crosses the east-looking ray to its left.
        let rv = RelativeVelocity::from_world(DVec2::new(0.0, 1.0), 0.0);
        assert!((rv.lateral - 1.0).abs() < 1e-12 && rv.closing.abs() < 1e-12);
    }

    #[test]
    fn invalid_configs_fail_fast() {
        let bad = [
            SensorConfig { n_sectors: 0, ..SensorConfig::default() },
            SensorConfig { n_sensors_per_sector: 0, ..SensorConfig::default() },
            SensorConfig { sensor_range: 0.0, ..SensorConfig::default() },
            SensorConfig { sensor_range: f64::INFINITY, ..SensorConfig::default() },
            SensorConfig { sensor_frequency: 1.5, ..SensorConfig::default() },
            SensorConfig { arc: SensorArc::Forward { span: -1.0 }, ..SensorConfig::default() },
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err(), "{cfg:?}");
        }
        assert!(SensorConfig::default().validate().is_ok());
    }
}
