use tracing::debug;

use crate::{ObstacleView, Polygon};

/// True if the hull outline overlaps any valid obstacle boundary, using
/// exact polygon intersection so gaps between sensor rays cannot hide a
/// contact.
pub fn has_collided<O: ObstacleView>(vessel_boundary: &Polygon, obstacles: &[O]) -> bool {
    if !vessel_boundary.is_valid() {
        debug!("vessel boundary is invalid; no collision reported");
        return false;
    }
    obstacles.iter().any(|o| {
        let boundary = o.boundary();
        boundary.is_valid() && vessel_boundary.intersects(boundary)
    })
}
