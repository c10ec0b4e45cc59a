use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;
use vessel::{SensorConfig, ThrusterCommand, DEFAULT_MAX_SUBSTEP};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Builtin scenario name.
    pub scenario: String,
    /// Episode timestep (s).
    pub dt: f64,
    pub max_steps: u64,
    /// Vessel preset name.
    pub vessel: String,
    /// Constant thruster command held for the whole episode (N).
    pub command: ThrusterCommand,
    pub max_substep: f64,
    pub sensors: SensorConfig,
    /// Steps between progress log lines; 0 disables them.
    pub log_interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scenario: "single_buoy".to_string(),
            dt: 0.1,
            max_steps: 2_000,
            vessel: "blueboat".to_string(),
            command: ThrusterCommand::both(20.0),
            max_substep: DEFAULT_MAX_SUBSTEP,
            sensors: SensorConfig::default(),
            log_interval: 100,
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        info!(path = %path.display(), "config file not found, using defaults");
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg = toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
