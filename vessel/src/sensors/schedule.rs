use serde::{Deserialize, Serialize};

use super::SensorConfig;
use crate::ConfigError;

/// Number of interleaved sensor groups when rotation is enabled.
pub const ROTATION_GROUPS: u64 = 4;

/// Per-sensor policy deciding between a real ray cast and the cached
/// virtual obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservePolicy {
    AlwaysMeasure,
    /// Re-measure once the cached reading is at least
    /// k(d) = ⌊coefficient·d^exponent⌋ + 1 steps old, so far obstacles are
    /// refreshed rarely and near ones almost every step.
    DistanceAdaptive { coefficient: f64, exponent: f64 },
}

impl Default for ObservePolicy {
    fn default() -> Self {
        ObservePolicy::DistanceAdaptive { coefficient: 0.0025, exponent: 1.7 }
    }
}

impl ObservePolicy {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if let ObservePolicy::DistanceAdaptive { coefficient, exponent } = *self {
            if !(coefficient.is_finite() && coefficient >= 0.0) {
                return Err(ConfigError::InvalidParameter { field: "observe.coefficient", value: coefficient });
            }
            if !(exponent.is_finite() && exponent > 0.0) {
                return Err(ConfigError::InvalidParameter { field: "observe.exponent", value: exponent });
            }
        }
        Ok(())
    }

    /// Steps between real measurements for a sensor whose last known
    /// distance is `distance`.
    pub fn interval(&self, distance: f64) -> u64 {
        match *self {
            ObservePolicy::AlwaysMeasure => 1,
            ObservePolicy::DistanceAdaptive { coefficient, exponent } => {
                let k = (coefficient * distance.max(0.0).powf(exponent)).floor();
                // `as` saturates, and NaN maps to zero
                (k as u64).saturating_add(1)
            }
        }
    }

    /// Decide between a real cast and the cached reading. A sensor that
    /// has never measured, or whose step counter went backwards, always
    /// measures.
    pub fn should_measure(
        &self,
        _sensor: usize,
        step: u64,
        nearest_known_distance: f64,
        last_refreshed: Option<u64>,
    ) -> bool {
        match self {
            ObservePolicy::AlwaysMeasure => true,
            ObservePolicy::DistanceAdaptive { .. } => {
                let k = self.interval(nearest_known_distance);
                last_refreshed.and_then(|s| step.checked_sub(s)).map_or(true, |age| age >= k)
            }
        }
    }
}

/// All gates that decide whether a sensor casts a real ray this step:
/// the array-wide frequency, optional group rotation and the per-sensor
/// policy. Every gate must pass.
///
/// Rotation counts array activations rather than raw steps, so each
/// sensor is offered a cast every [`SensorSchedule::gate_span`] steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSchedule {
    pub policy: ObservePolicy,
    /// Steps between array activations; `None` disables real casts.
    period: Option<u64>,
    rotation: bool,
}

impl SensorSchedule {
    pub fn from_config(cfg: &SensorConfig) -> Self {
        let period = if cfg.sensor_frequency <= 0.0 {
            None
        } else {
            Some((1.0 / cfg.sensor_frequency).round().max(1.0) as u64)
        };
        Self { policy: cfg.observe, period, rotation: cfg.rotation }
    }

    pub fn array_active(&self, step: u64) -> bool {
        self.period.is_some_and(|p| step % p == 0)
    }

    pub fn rotation_allows(&self, sensor: usize, step: u64) -> bool {
        if !self.rotation {
            return true;
        }
        let Some(p) = self.period else {
            return false;
        };
        sensor as u64 % ROTATION_GROUPS == (step / p) % ROTATION_GROUPS
    }

    /// Steps between consecutive chances for one sensor to cast.
    pub fn gate_span(&self) -> Option<u64> {
        let groups = if self.rotation { ROTATION_GROUPS } else { 1 };
        self.period.map(|p| p * groups)
    }

    /// Largest staleness a sensor can reach while its cached reading is
    /// `distance`.
    pub fn staleness_bound(&self, distance: f64) -> Option<u64> {
        let span = self.gate_span()?;
        let k = self.policy.interval(distance);
        Some(k.div_ceil(span) * span - 1)
    }

    pub fn should_cast(
        &self,
        sensor: usize,
        step: u64,
        nearest_known_distance: f64,
        last_refreshed: Option<u64>,
    ) -> bool {
        self.array_active(step)
            && self.rotation_allows(sensor, step)
            && self.policy.should_measure(sensor, step, nearest_known_distance, last_refreshed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drive one sensor through `steps` steps with a fixed reading and
    /// return the steps on which it cast.
    fn cast_steps(schedule: &SensorSchedule, sensor: usize, distance: f64, steps: u64) -> Vec<u64> {
        let mut last = None;
        let mut casts = Vec::new();
        for t in 0..steps {
            if schedule.should_cast(sensor, t, distance, last) {
                last = Some(t);
                casts.push(t);
            }
        }
        casts
    }

    fn count_casts(schedule: &SensorSchedule, sensor: usize, distance: f64, steps: u64) -> usize {
        cast_steps(schedule, sensor, distance, steps).len()
    }

    #[test]
    fn always_measure_is_unconditional() {
        let p = ObservePolicy::AlwaysMeasure;
        assert!((0..100).all(|t| p.should_measure(3, t, 1e6, Some(t))));
    }

    #[test]
    fn adaptive_waits_for_reading_to_age() {
        let p = ObservePolicy::default();
        assert!(p.should_measure(0, 17, 50.0, None));
        assert!(!p.should_measure(0, 17, 50.0, Some(16)));
        assert!(p.should_measure(0, 18, 50.0, Some(16)));
        // Counter reset behind the cache: measure rather than wait.
        assert!(p.should_measure(0, 2, 50.0, Some(16)));
    }

    #[test]
    fn adaptive_interval_grows_with_distance() {
        let p = ObservePolicy::default();
        assert_eq!(p.interval(0.0), 1);
        assert_eq!(p.interval(5.0), 1);
        assert_eq!(p.interval(50.0), 2);
        assert!(p.interval(150.0) > p.interval(50.0));
        let mut last = 0;
        for d in 0..400 {
            let k = p.interval(d as f64);
            assert!(k >= last);
            last = k;
        }
        assert_eq!(p.interval(f64::NAN), 1);
    }

    #[test]
    fn far_sensors_are_measured_less_often() {
        let cfg = SensorConfig::default();
        let schedule = SensorSchedule::from_config(&cfg);
        let near = count_casts(&schedule, 0, 5.0, 100);
        let far = count_casts(&schedule, 0, cfg.sensor_range, 100);
        assert_eq!(near, 100);
        assert!(far < near, "far={far} near={near}");
    }

    #[test]
    fn frequency_gates_whole_array() {
        let cfg = SensorConfig {
            sensor_frequency: 0.5,
            observe: ObservePolicy::AlwaysMeasure,
            ..SensorConfig::default()
        };
        let schedule = SensorSchedule::from_config(&cfg);
        assert_eq!(count_casts(&schedule, 7, 1.0, 100), 50);

        let off = SensorSchedule::from_config(&SensorConfig { sensor_frequency: 0.0, ..cfg });
        assert_eq!(count_casts(&off, 7, 1.0, 100), 0);
        assert_eq!(off.gate_span(), None);
    }

    #[test]
    fn frequency_and_policy_compose() {
        let cfg = SensorConfig { sensor_frequency: 0.5, ..SensorConfig::default() };
        let schedule = SensorSchedule::from_config(&cfg);
        // Period 2 from the array gate, interval 2 from the 50 m reading.
        assert_eq!(count_casts(&schedule, 0, 50.0, 100), 50);
        let cfg = SensorConfig { sensor_frequency: 1.0 / 3.0, ..SensorConfig::default() };
        let schedule = SensorSchedule::from_config(&cfg);
        // A 2-step interval is always satisfied by the next activation.
        assert_eq!(count_casts(&schedule, 0, 50.0, 120), 40);
    }

    #[test]
    fn rotation_cycles_through_groups() {
        let cfg = SensorConfig { rotation: true, observe: ObservePolicy::AlwaysMeasure, ..SensorConfig::default() };
        let schedule = SensorSchedule::from_config(&cfg);
        for step in 0..8 {
            let active: Vec<usize> = (0..8).filter(|&i| schedule.should_cast(i, step, 1.0, None)).collect();
            assert_eq!(active.len(), 2);
            assert!(active.iter().all(|i| *i as u64 % ROTATION_GROUPS == step % ROTATION_GROUPS));
        }
    }

    #[test]
    fn rotation_counts_activations_not_steps() {
        let cfg = SensorConfig { rotation: true, sensor_frequency: 0.5, ..SensorConfig::default() };
        let schedule = SensorSchedule::from_config(&cfg);
        assert_eq!(schedule.gate_span(), Some(8));
        // Group 1 gets the second activation (step 2), group 3 the fourth.
        assert_eq!(cast_steps(&schedule, 1, 5.0, 20), vec![2, 10, 18]);
        assert_eq!(cast_steps(&schedule, 3, 5.0, 20), vec![6, 14]);
    }

    #[test]
    fn rotation_with_adaptive_policy_reaches_odd_sensors() {
        let schedule = SensorSchedule::from_config(&SensorConfig { rotation: true, ..SensorConfig::default() });
        for sensor in 0..8 {
            // Starting from an uncached 50 m reading, the interval is 2.
            let casts = cast_steps(&schedule, sensor, 50.0, 40);
            assert_eq!(casts.len(), 10, "sensor {sensor} cast on {casts:?}");
            assert!(casts.windows(2).all(|w| w[1] - w[0] == 4));
        }
    }

    #[test]
    fn staleness_bound_accounts_for_every_gate() {
        let far = SensorSchedule::from_config(&SensorConfig { rotation: true, ..SensorConfig::default() });
        // k(100) = 7 rounds up to two rotation cycles.
        assert_eq!(far.staleness_bound(100.0), Some(7));
        let plain = SensorSchedule::from_config(&SensorConfig::default());
        assert_eq!(plain.staleness_bound(5.0), Some(0));
        assert_eq!(plain.staleness_bound(50.0), Some(1));
    }
}
