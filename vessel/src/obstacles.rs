//! Obstacle boundaries as seen by the engine.
//!
//! Obstacle lifecycle belongs to the caller; the engine only reads a
//! boundary polygon and an optional velocity through [`ObstacleView`].

use std::f64::consts::TAU;

use bevy_math::DVec2;
use serde::{Deserialize, Serialize};

use crate::{Polygon, Pose};

/// Vertices used to approximate circular obstacles. A multiple of four so
/// the polygon touches the true circle on both axes.
pub const CIRCLE_RESOLUTION: usize = 64;

/// Read-only view of an obstacle for one timestep.
pub trait ObstacleView {
    fn boundary(&self) -> &Polygon;
    /// World-frame velocity; `None` for static obstacles.
    fn velocity(&self) -> Option<DVec2>;
}

/// Obstacle outline in its own frame, before placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeTemplate {
    Circle { radius: f64 },
    /// Centered rectangle; `width` along local X.
    Rectangle { width: f64, height: f64 },
    /// Berth-shaped dock: a block with a half-width slot cut into its
    /// local −X face.
    TetrisDock { width: f64, height: f64 },
    Custom(Vec<DVec2>),
}

impl ShapeTemplate {
    pub fn local_vertices(&self) -> Vec<DVec2> {
        match self {
            ShapeTemplate::Circle { radius } => (0..CIRCLE_RESOLUTION)
                .map(|k| {
                    let a = k as f64 * TAU / CIRCLE_RESOLUTION as f64;
                    DVec2::new(radius * a.cos(), radius * a.sin())
                })
                .collect(),
            ShapeTemplate::Rectangle { width, height } => {
                let (hw, hh) = (0.5 * width, 0.5 * height);
                vec![
                    DVec2::new(-hw, -hh),
                    DVec2::new(hw, -hh),
                    DVec2::new(hw, hh),
                    DVec2::new(-hw, hh),
                ]
            }
            ShapeTemplate::TetrisDock { width, height } => {
                let y = 0.25 * height;
                let x = 0.5 * width;
                vec![
                    DVec2::new(0.0, y),
                    DVec2::new(-x, y),
                    DVec2::new(-x, 2.0 * y),
                    DVec2::new(x, 2.0 * y),
                    DVec2::new(x, -2.0 * y),
                    DVec2::new(-x, -2.0 * y),
                    DVec2::new(-x, -y),
                    DVec2::new(0.0, -y),
                ]
            }
            ShapeTemplate::Custom(vertices) => vertices.clone(),
        }
    }
}

/// Rotate the template about its local origin, then translate to the pose.
pub fn place(template: &ShapeTemplate, pose: Pose) -> Polygon {
    let vertices: Vec<DVec2> = template
        .local_vertices()
        .into_iter()
        .map(|v| pose.transform_point(v))
        .collect();
    Polygon::new(vertices)
}

/// Plain boundary + velocity pair, for callers that build polygons
/// themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleBoundary {
    pub polygon: Polygon,
    pub velocity: Option<DVec2>,
}

impl ObstacleBoundary {
    pub fn fixed(polygon: Polygon) -> Self {
        Self { polygon, velocity: None }
    }
}

impl ObstacleView for ObstacleBoundary {
    fn boundary(&self) -> &Polygon {
        &self.polygon
    }
    fn velocity(&self) -> Option<DVec2> {
        self.velocity
    }
}

/// A placed obstacle that keeps its boundary until its pose changes.
#[derive(Debug, Clone)]
pub struct Obstacle {
    template: ShapeTemplate,
    pose: Pose,
    velocity: Option<DVec2>,
    boundary: Polygon,
}

impl Obstacle {
    pub fn fixed(template: ShapeTemplate, pose: Pose) -> Self {
        let boundary = place(&template, pose);
        Self { template, pose, velocity: None, boundary }
    }

    /// Obstacle drifting with a constant world-frame velocity.
    pub fn moving(template: ShapeTemplate, pose: Pose, velocity: DVec2) -> Self {
        let boundary = place(&template, pose);
        Self { template, pose, velocity: Some(velocity), boundary }
    }

    pub fn circle(center: DVec2, radius: f64) -> Self {
        Self::fixed(ShapeTemplate::Circle { radius }, Pose { position: center, heading: 0.0 })
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn template(&self) -> &ShapeTemplate {
        &self.template
    }

    pub fn is_static(&self) -> bool {
        self.velocity.is_none()
    }

    pub fn set_pose(&mut self, pose: Pose) {
        if pose != self.pose {
            self.pose = pose;
            self.boundary = place(&self.template, pose);
        }
    }

    /// Move a drifting obstacle forward in time. Static obstacles keep
    /// their cached boundary.
    pub fn advance(&mut self, dt: f64) {
        if let Some(v) = self.velocity {
            let pose = Pose { position: self.pose.position + v * dt, heading: self.pose.heading };
            self.set_pose(pose);
        }
    }
}

impl ObstacleView for Obstacle {
    fn boundary(&self) -> &Polygon {
        &self.boundary
    }
    fn velocity(&self) -> Option<DVec2> {
        self.velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn circle_touches_axes() {
        let poly = place(&ShapeTemplate::Circle { radius: 5.0 }, Pose::new(30.0, 0.0, 0.0));
        assert!(poly.is_valid());
        assert!((poly.aabb().min.x - 25.0).abs() < 1e-9);
        assert!((poly.aabb().max.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn placement_rotates_before_translating() {
        let rect = ShapeTemplate::Rectangle { width: 4.0, height: 2.0 };
        let poly = place(&rect, Pose::new(10.0, 0.0, FRAC_PI_2));
        let bb = poly.aabb();
        assert!((bb.min.x - 9.0).abs() < 1e-9 && (bb.max.x - 11.0).abs() < 1e-9);
        assert!((bb.min.y + 2.0).abs() < 1e-9 && (bb.max.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn tetris_dock_is_a_valid_non_convex_polygon() {
        let poly = place(&ShapeTemplate::TetrisDock { width: 16.0, height: 16.0 }, Pose::default());
        assert!(poly.is_valid(), "{:?}", poly.validity());
        // Inside the slot cut into the −X face.
        assert!(!poly.contains_point(DVec2::new(-4.0, 0.0)));
        assert!(poly.contains_point(DVec2::new(4.0, 0.0)));
    }

    #[test]
    fn moving_obstacle_rebuilds_boundary() {
        let mut obst = Obstacle::moving(
            ShapeTemplate::Circle { radius: 1.0 },
            Pose::new(0.0, 0.0, 0.0),
            DVec2::new(2.0, 0.0),
        );
        obst.advance(0.5);
        assert!((obst.boundary().aabb().min.x - 0.0).abs() < 1e-9);
        assert!((obst.pose().position.x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn static_obstacle_ignores_advance() {
        let mut obst = Obstacle::circle(DVec2::new(3.0, 3.0), 1.0);
        let before = obst.boundary().clone();
        obst.advance(10.0);
        assert_eq!(&before, obst.boundary());
    }
}
