//! Surface vessel dynamics and rangefinder perception.
//!
//! This crate intentionally avoids any application framework types. It
//! exposes plain, serializable configuration plus a synchronous engine that
//! an episode loop drives one timestep at a time: integrate the 3DOF
//! maneuvering model, cast the rangefinder array against obstacle
//! boundaries, and test the hull outline for contact.

mod error;
pub use error::{ConfigError, GeometryError};

mod math;
pub use math::{wrap_angle, Pose};

pub mod geometry;
pub use geometry::{Aabb, Polygon};

pub mod obstacles;
pub use obstacles::{place, Obstacle, ObstacleBoundary, ObstacleView, ShapeTemplate};

pub mod vessel_physics;
pub use vessel_physics::{DynamicsModel, ThrusterCommand, VesselState, DEFAULT_MAX_SUBSTEP, MAX_SUBSTEPS};

mod vessel_specs;
pub use vessel_specs::{presets, HullGeometry, RigidBodyParameters, ThrusterSpec, VesselSpec};

pub mod sensors;
pub use sensors::{
    CacheEntry, Measurement, ObservePolicy, RelativeVelocity, SectorPartition, SensorArc,
    SensorArray, SensorConfig, VirtualObstacleCache,
};

mod collision;
pub use collision::has_collided;

mod engine;
pub use engine::{EngineConfig, StepReport, VesselEngine};

pub mod builtins;
pub use builtins::Scenario;
