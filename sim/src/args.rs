use std::path::PathBuf;

use clap::Parser;

use crate::Config;

#[derive(Parser, Debug, Clone)]
#[command(name = "vessel-sim")]
#[command(about = "Headless surface vessel episode runner", long_about = None)]
pub struct Args {
    /// Path to a TOML config; defaults are used if it does not exist
    #[arg(long, default_value = "sim.toml")]
    pub config: PathBuf,
    /// Override the scenario named in the config
    #[arg(long)]
    pub scenario: Option<String>,
    /// Override the episode step limit
    #[arg(long)]
    pub steps: Option<u64>,
}

impl Args {
    /// Command-line overrides win over the file.
    pub fn apply(&self, mut cfg: Config) -> Config {
        if let Some(scenario) = &self.scenario {
            cfg.scenario = scenario.clone();
        }
        if let Some(steps) = self.steps {
            cfg.max_steps = steps;
        }
        cfg
    }
}
