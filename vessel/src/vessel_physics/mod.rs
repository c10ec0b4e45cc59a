mod types;
mod terms;
mod dynamics;

pub use types::{ThrusterCommand, VesselState};
pub use dynamics::{DynamicsModel, DEFAULT_MAX_SUBSTEP, MAX_SUBSTEPS};
