//! Headless episode runner: drives a [`vessel::VesselEngine`] through a
//! builtin scenario inside a bevy `App`.

use anyhow::{anyhow, bail, Context, Result};
use bevy_app::{App, AppExit, Update};
use bevy_ecs::prelude::*;
use tracing::info;
use vessel::{builtins, presets, EngineConfig, VesselEngine};

mod args;
mod config;
mod systems;

pub use args::Args;
pub use config::{load_config, Config};
pub use systems::{
    advance_obstacles, check_termination, log_progress, step_vessel, EpisodeState, EpisodeSummary,
    ObstacleField, SimEngine, SimSettings,
};

pub fn build_sim_app(cfg: Config) -> Result<App> {
    if !(cfg.dt.is_finite() && cfg.dt > 0.0) {
        bail!("dt must be a positive number of seconds, got {}", cfg.dt);
    }
    let scenario = builtins::by_name(&cfg.scenario).ok_or_else(|| {
        anyhow!("unknown scenario '{}', expected one of {:?}", cfg.scenario, builtins::NAMES)
    })?;
    let vessel = presets::by_name(&cfg.vessel).ok_or_else(|| anyhow!("unknown vessel preset '{}'", cfg.vessel))?;

    let engine_cfg = EngineConfig { vessel, sensors: cfg.sensors.clone(), max_substep: cfg.max_substep };
    let engine = VesselEngine::new(engine_cfg, scenario.initial_pose).context("invalid engine configuration")?;
    info!(
        scenario = scenario.name,
        obstacles = scenario.obstacles.len(),
        dt = cfg.dt,
        max_steps = cfg.max_steps,
        "episode start"
    );

    let mut app = App::new();
    app.insert_resource(EpisodeState::new(cfg.sensors.sensor_range))
        .insert_resource(SimSettings {
            scenario: cfg.scenario,
            dt: cfg.dt,
            max_steps: cfg.max_steps,
            command: cfg.command,
            log_interval: cfg.log_interval,
        })
        .insert_resource(ObstacleField(scenario.obstacles))
        .insert_resource(SimEngine(engine))
        .add_systems(Update, (advance_obstacles, step_vessel, log_progress, check_termination).chain())
        .set_runner(episode_runner);
    Ok(app)
}

/// Update until a system asks to exit.
fn episode_runner(mut app: App) -> AppExit {
    app.finish();
    app.cleanup();
    loop {
        app.update();
        if let Some(exit) = app.should_exit() {
            return exit;
        }
    }
}

/// Run one episode to termination and summarise it.
pub fn run_episode(cfg: Config) -> Result<EpisodeSummary> {
    let mut app = build_sim_app(cfg)?;
    loop {
        app.update();
        let done = app.world().get_resource::<EpisodeState>().is_some_and(|e| e.done);
        if done {
            break;
        }
    }
    EpisodeSummary::from_world(app.world()).context("episode resources missing after run")
}

#[cfg(test)]
mod tests {
    use super::*;
    use vessel::{Pose, ThrusterCommand};

    #[test]
    fn buoy_run_ends_in_collision() {
        let cfg = Config { command: ThrusterCommand::both(40.0), ..Config::default() };
        let summary = run_episode(cfg).unwrap();
        assert!(summary.collided, "full thrust at the buoy should collide: {summary:?}");
        assert!(summary.steps < Config::default().max_steps);
        assert!(summary.final_pose.position.x > 20.0);
        assert!(summary.min_forward_distance < 2.0, "forward sensor should see the buoy up close");
    }

    #[test]
    fn idle_run_hits_step_limit() {
        let cfg = Config { command: ThrusterCommand::default(), max_steps: 25, ..Config::default() };
        let summary = run_episode(cfg).unwrap();
        assert!(!summary.collided);
        assert_eq!(summary.steps, 25);
        assert!((summary.elapsed - 2.5).abs() < 1e-9);
        assert_eq!(summary.final_pose, Pose::default());
        assert!((summary.min_forward_distance - 25.0).abs() < 1e-6);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let bad_scenario = Config { scenario: "kraken".to_string(), ..Config::default() };
        assert!(build_sim_app(bad_scenario).is_err());
        let bad_vessel = Config { vessel: "dinghy".to_string(), ..Config::default() };
        assert!(build_sim_app(bad_vessel).is_err());
        let bad_dt = Config { dt: 0.0, ..Config::default() };
        assert!(build_sim_app(bad_dt).is_err());
    }

    #[test]
    fn invalid_sensor_config_fails_fast() {
        let mut cfg = Config::default();
        cfg.sensors.sensor_range = -1.0;
        let err = build_sim_app(cfg).unwrap_err();
        assert!(format!("{err:#}").contains("invalid engine configuration"));
    }
}
