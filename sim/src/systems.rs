use bevy_app::AppExit;
use bevy_ecs::prelude::*;
use serde::Serialize;
use tracing::{info, warn};
use vessel::{Obstacle, Pose, StepReport, ThrusterCommand, VesselEngine};

#[derive(Resource)]
pub struct SimEngine(pub VesselEngine);

#[derive(Resource, Default)]
pub struct ObstacleField(pub Vec<Obstacle>);

#[derive(Resource, Debug, Clone)]
pub struct SimSettings {
    pub scenario: String,
    pub dt: f64,
    pub max_steps: u64,
    pub command: ThrusterCommand,
    pub log_interval: u64,
}

#[derive(Resource, Debug, Clone)]
pub struct EpisodeState {
    pub steps: u64,
    pub collided: bool,
    pub done: bool,
    pub min_forward_distance: f64,
    pub last_report: Option<StepReport>,
}

impl EpisodeState {
    pub fn new(sensor_range: f64) -> Self {
        Self { steps: 0, collided: false, done: false, min_forward_distance: sensor_range, last_report: None }
    }
}

/// What an episode ended with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeSummary {
    pub scenario: String,
    pub steps: u64,
    pub elapsed: f64,
    pub final_pose: Pose,
    pub collided: bool,
    pub min_forward_distance: f64,
    pub real_casts: u64,
}

impl EpisodeSummary {
    pub fn from_world(world: &World) -> Option<Self> {
        let settings = world.get_resource::<SimSettings>()?;
        let episode = world.get_resource::<EpisodeState>()?;
        let engine = &world.get_resource::<SimEngine>()?.0;
        Some(Self {
            scenario: settings.scenario.clone(),
            steps: episode.steps,
            elapsed: engine.time(),
            final_pose: engine.state().pose(),
            collided: episode.collided,
            min_forward_distance: episode.min_forward_distance,
            real_casts: engine.sensors().real_casts(),
        })
    }
}

pub fn advance_obstacles(settings: Res<SimSettings>, episode: Res<EpisodeState>, mut field: ResMut<ObstacleField>) {
    if episode.done {
        return;
    }
    for obstacle in field.0.iter_mut() {
        obstacle.advance(settings.dt);
    }
}

pub fn step_vessel(
    settings: Res<SimSettings>,
    field: Res<ObstacleField>,
    mut engine: ResMut<SimEngine>,
    mut episode: ResMut<EpisodeState>,
) {
    if episode.done {
        return;
    }
    let report = engine.0.advance(settings.command, settings.dt, &field.0);
    let forward = engine.0.sensors().forward_sensor();
    if let Some(m) = report.measurements.get(forward) {
        episode.min_forward_distance = episode.min_forward_distance.min(m.distance);
    }
    episode.steps = report.step;
    episode.collided |= report.collision;
    episode.last_report = Some(report);
}

pub fn log_progress(settings: Res<SimSettings>, episode: Res<EpisodeState>, engine: Res<SimEngine>) {
    if settings.log_interval == 0 || episode.done || episode.steps % settings.log_interval != 0 {
        return;
    }
    let state = engine.0.state();
    info!(
        step = episode.steps,
        t = engine.0.time(),
        x = state.position.x,
        y = state.position.y,
        heading = state.heading,
        speed = state.speed(),
        min_forward = episode.min_forward_distance,
        "progress"
    );
}

pub fn check_termination(
    settings: Res<SimSettings>,
    engine: Res<SimEngine>,
    mut episode: ResMut<EpisodeState>,
    mut exit: EventWriter<AppExit>,
) {
    if episode.done {
        return;
    }
    if episode.collided {
        let pos = engine.0.state().position;
        warn!(step = episode.steps, x = pos.x, y = pos.y, "vessel collided");
    } else if episode.steps < settings.max_steps {
        return;
    }
    episode.done = true;
    info!(
        scenario = %settings.scenario,
        steps = episode.steps,
        collided = episode.collided,
        real_casts = engine.0.sensors().real_casts(),
        "episode finished"
    );
    exit.write(AppExit::Success);
}
