use bevy_math::DVec2;
use tracing::debug;

use super::{Measurement, RelativeVelocity, SensorConfig, SensorSchedule, VirtualObstacleCache};
use crate::{ConfigError, ObstacleView, Pose};

/// Rangefinders rigidly mounted on the hull, each with a fixed bearing
/// relative to the bow.
#[derive(Debug, Clone)]
pub struct SensorArray {
    config: SensorConfig,
    bearings: Vec<f64>,
    sectors: Vec<usize>,
    schedule: SensorSchedule,
    cache: VirtualObstacleCache,
    measurements: Vec<Measurement>,
    real_casts: u64,
}

impl SensorArray {
    pub fn new(config: SensorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let n = config.n_sensors();
        let bearings = config.arc.bearings(n);
        let sectors = config.partition.assign(config.n_sectors, config.n_sensors_per_sector);
        let schedule = SensorSchedule::from_config(&config);
        let cache = VirtualObstacleCache::new(n, config.sensor_range);
        let measurements = vec![Measurement::clear(config.sensor_range); n];
        Ok(Self { config, bearings, sectors, schedule, cache, measurements, real_casts: 0 })
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.bearings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bearings.is_empty()
    }

    /// Bearings relative to the bow (rad), in sensor index order.
    pub fn bearings(&self) -> &[f64] {
        &self.bearings
    }

    /// Sector of every sensor, in sensor index order.
    pub fn sectors(&self) -> &[usize] {
        &self.sectors
    }

    pub fn sector_of(&self, sensor: usize) -> Option<usize> {
        self.sectors.get(sensor).copied()
    }

    pub fn schedule(&self) -> &SensorSchedule {
        &self.schedule
    }

    pub fn cache(&self) -> &VirtualObstacleCache {
        &self.cache
    }

    /// Readings handed out by the latest [`SensorArray::measure`].
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// Real ray casts performed since the last reset.
    pub fn real_casts(&self) -> u64 {
        self.real_casts
    }

    /// Index of the sensor looking closest to straight ahead.
    pub fn forward_sensor(&self) -> usize {
        self.bearings
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.abs().total_cmp(&b.abs()))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    pub fn reset(&mut self) {
        self.cache.clear();
        let range = self.config.sensor_range;
        self.measurements.iter_mut().for_each(|m| *m = Measurement::clear(range));
        self.real_casts = 0;
    }

    /// Cast one sensor's ray against the candidate obstacles. Pure: touches
    /// neither the cache nor the counters.
    pub fn cast<O: ObstacleView>(&self, sensor: usize, pose: Pose, obstacles: &[O]) -> Measurement {
        let candidates = self.candidates(pose, obstacles);
        self.cast_against(sensor, pose, obstacles, &candidates)
    }

    /// Produce one reading per sensor. Sensors whose schedule says so cast
    /// a real ray and refresh their cache slot; the rest return their
    /// cached reading unchanged.
    pub fn measure<O: ObstacleView>(
        &mut self,
        obstacles: &[O],
        pose: Pose,
        step: u64,
        time: f64,
    ) -> &[Measurement] {
        let due: Vec<usize> = self
            .cache
            .entries()
            .iter()
            .enumerate()
            .filter(|(i, e)| self.schedule.should_cast(*i, step, e.measurement.distance, e.refreshed_step))
            .map(|(i, _)| i)
            .collect();

        if !due.is_empty() {
            let candidates = self.candidates(pose, obstacles);
            let fresh: Vec<(usize, Measurement)> = due
                .iter()
                .map(|&i| (i, self.cast_against(i, pose, obstacles, &candidates)))
                .collect();
            for (i, m) in fresh {
                self.cache.store(i, m, step, time);
            }
            self.real_casts += due.len() as u64;
        }

        for (slot, entry) in self.measurements.iter_mut().zip(self.cache.entries().iter()) {
            *slot = entry.measurement;
        }
        &self.measurements
    }

    /// Valid obstacles whose bounding box comes within sensor range.
    fn candidates<O: ObstacleView>(&self, pose: Pose, obstacles: &[O]) -> Vec<usize> {
        let range = self.config.sensor_range;
        obstacles
            .iter()
            .enumerate()
            .filter(|(i, o)| {
                let poly = o.boundary();
                if let Err(reason) = poly.validity() {
                    debug!(obstacle = i, %reason, "skipping invalid obstacle boundary");
                    return false;
                }
                poly.aabb().distance_to_point(pose.position) <= range
            })
            .map(|(i, _)| i)
            .collect()
    }

    fn cast_against<O: ObstacleView>(
        &self,
        sensor: usize,
        pose: Pose,
        obstacles: &[O],
        candidates: &[usize],
    ) -> Measurement {
        let range = self.config.sensor_range;
        let Some(bearing) = self.bearings.get(sensor) else {
            return Measurement::clear(range);
        };
        let world_bearing = pose.heading + bearing;
        let (s, c) = world_bearing.sin_cos();
        let dir = DVec2::new(c, s);

        let mut nearest: Option<(usize, f64)> = None;
        for &idx in candidates {
            let Some(d) = obstacles[idx].boundary().ray_distance(pose.position, dir, range) else {
                continue;
            };
            if nearest.map_or(true, |(_, best)| d < best) {
                nearest = Some((idx, d));
            }
        }

        match nearest {
            None => Measurement::clear(range),
            Some((idx, d)) => {
                let distance = d.clamp(0.0, range);
                let relative_velocity = obstacles[idx]
                    .velocity()
                    .map(|v| RelativeVelocity::from_world(v, world_bearing))
                    .unwrap_or_default();
                Measurement {
                    distance,
                    closeness: self.config.closeness(distance),
                    relative_velocity,
                    obstacle: Some(idx),
                }
            }
        }
    }
}
