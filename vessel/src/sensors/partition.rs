use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Steepness of the logistic sector map when not configured.
pub const DEFAULT_STEEPNESS: f64 = 0.1;

/// Maps sensor indices to logical sectors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorPartition {
    /// Logistic map: narrow sectors around the middle of the index range
    /// (dead ahead for a full arc), wide ones toward the stern.
    ///
    /// Always monotone, but only onto every sector when sectors hold
    /// enough sensors: at the default steepness, three or more sensors
    /// per sector reach all sectors, while one per sector leaves the
    /// upper sectors empty. Results are clamped into [0, n_sectors).
    Logarithmic { steepness: f64 },
    /// Equal-size sectors.
    Linear,
}

impl Default for SectorPartition {
    fn default() -> Self {
        SectorPartition::Logarithmic { steepness: DEFAULT_STEEPNESS }
    }
}

impl SectorPartition {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            SectorPartition::Logarithmic { steepness } if !(steepness.is_finite() && steepness > 0.0) => {
                Err(ConfigError::InvalidParameter { field: "partition.steepness", value: steepness })
            }
            _ => Ok(()),
        }
    }

    /// Sector of `sensor`, always within [0, n_sectors).
    pub fn sector_of(&self, sensor: usize, n_sectors: usize, sensors_per_sector: usize) -> usize {
        let last = n_sectors.saturating_sub(1);
        match *self {
            SectorPartition::Logarithmic { steepness } => {
                let a = (n_sectors * sensors_per_sector) as f64;
                let b = n_sectors as f64;
                let sigma = |x: f64| b / (1.0 + ((-x + 0.5 * a) / (steepness * a)).exp());
                let s = (sigma(sensor as f64) - sigma(0.0)).floor();
                if s.is_nan() || s <= 0.0 {
                    0
                } else {
                    (s as usize).min(last)
                }
            }
            SectorPartition::Linear => (sensor / sensors_per_sector.max(1)).min(last),
        }
    }

    /// Sector of every sensor in index order.
    pub fn assign(&self, n_sectors: usize, sensors_per_sector: usize) -> Vec<usize> {
        (0..n_sectors * sensors_per_sector)
            .map(|i| self.sector_of(i, n_sectors, sensors_per_sector))
            .collect()
    }
}
