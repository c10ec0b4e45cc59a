use std::f64::consts::{FRAC_PI_2, PI};

use bevy_math::DVec2;

use crate::{presets, Obstacle, Pose, ShapeTemplate};

/// Obstacle layout plus the vessel's starting pose.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub initial_pose: Pose,
    pub obstacles: Vec<Obstacle>,
}

/// One round buoy dead ahead of a vessel at rest at the origin.
pub fn single_buoy() -> Scenario {
    Scenario {
        name: "single_buoy",
        initial_pose: Pose::new(0.0, 0.0, 0.0),
        obstacles: vec![Obstacle::circle(DVec2::new(30.0, 0.0), 5.0)],
    }
}

/// Berth approach: the dock slot opens toward the vessel, with marker buoys
/// either side of the approach lane.
pub fn docking() -> Scenario {
    Scenario {
        name: "docking",
        initial_pose: Pose::new(0.0, 0.0, FRAC_PI_2),
        obstacles: vec![
            Obstacle::fixed(ShapeTemplate::TetrisDock { width: 16.0, height: 16.0 }, Pose::new(0.0, 50.0, FRAC_PI_2)),
            Obstacle::circle(DVec2::new(-8.0, 25.0), 1.0),
            Obstacle::circle(DVec2::new(8.0, 25.0), 1.0),
        ],
    }
}

/// Another vessel on a reciprocal course, closing at 1.5 m/s.
pub fn head_on() -> Scenario {
    let other = ShapeTemplate::Custom(presets::otter().outline());
    Scenario {
        name: "head_on",
        initial_pose: Pose::new(0.0, 0.0, 0.0),
        obstacles: vec![Obstacle::moving(other, Pose::new(40.0, 0.0, PI), DVec2::new(-1.5, 0.0))],
    }
}

pub fn by_name(name: &str) -> Option<Scenario> {
    match name {
        "single_buoy" => Some(single_buoy()),
        "docking" => Some(docking()),
        "head_on" => Some(head_on()),
        _ => None,
    }
}

pub const NAMES: [&str; 3] = ["single_buoy", "docking", "head_on"];
