use serde::Serialize;

use super::Measurement;

/// Last real measurement of one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheEntry {
    pub measurement: Measurement,
    /// Step of the real cast that produced `measurement`; `None` until the
    /// sensor has measured once this episode.
    pub refreshed_step: Option<u64>,
    /// Simulation time (s) of that cast.
    pub refreshed_time: f64,
}

impl CacheEntry {
    fn empty(sensor_range: f64) -> Self {
        Self { measurement: Measurement::clear(sensor_range), refreshed_step: None, refreshed_time: 0.0 }
    }
}

/// Per-sensor virtual obstacles. Each slot is written only by its own
/// sensor, so slots never need coordination with each other.
#[derive(Debug, Clone)]
pub struct VirtualObstacleCache {
    sensor_range: f64,
    entries: Vec<CacheEntry>,
}

impl VirtualObstacleCache {
    pub fn new(n_sensors: usize, sensor_range: f64) -> Self {
        Self { sensor_range, entries: vec![CacheEntry::empty(sensor_range); n_sensors] }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, sensor: usize) -> Option<&CacheEntry> {
        self.entries.get(sensor)
    }

    pub fn entries(&self) -> &[CacheEntry] {
        &self.entries
    }

    pub fn store(&mut self, sensor: usize, measurement: Measurement, step: u64, time: f64) {
        if let Some(entry) = self.entries.get_mut(sensor) {
            *entry = CacheEntry { measurement, refreshed_step: Some(step), refreshed_time: time };
        }
    }

    /// Steps since the sensor last cast a real ray; `None` if it never has.
    pub fn staleness(&self, sensor: usize, step: u64) -> Option<u64> {
        self.entries
            .get(sensor)
            .and_then(|e| e.refreshed_step)
            .map(|s| step.saturating_sub(s))
    }

    /// Forget all readings (episode reset).
    pub fn clear(&mut self) {
        let range = self.sensor_range;
        self.entries.iter_mut().for_each(|e| *e = CacheEntry::empty(range));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_max_range_and_never_refreshed() {
        let cache = VirtualObstacleCache::new(3, 50.0);
        assert_eq!(cache.len(), 3);
        for e in cache.entries() {
            assert_eq!(e.measurement.distance, 50.0);
            assert!(e.measurement.relative_velocity.is_zero());
            assert!(e.refreshed_step.is_none());
        }
        assert_eq!(cache.staleness(0, 10), None);
    }

    #[test]
    fn store_then_clear() {
        let mut cache = VirtualObstacleCache::new(2, 50.0);
        let mut m = Measurement::clear(50.0);
        m.distance = 12.0;
        cache.store(1, m, 4, 0.4);
        assert_eq!(cache.get(1).map(|e| e.measurement.distance), Some(12.0));
        assert_eq!(cache.staleness(1, 9), Some(5));
        // Out-of-range slot is ignored.
        cache.store(7, m, 4, 0.4);

        cache.clear();
        assert_eq!(cache.get(1).map(|e| e.measurement.distance), Some(50.0));
        assert_eq!(cache.staleness(1, 9), None);
    }
}
