//! Stateless planar-bearing helpers.
//!
//! Bearings ignore the vertical component entirely: they are angles in the
//! horizontal plane, in degrees. [`angle_to_tag`] works on a body-frame
//! relative position; [`world_angle_to_tag`] points from an arbitrary
//! world-frame position toward a surveyed tag.

use tagnav_types::Position;

use crate::registry::FrameRegistry;

/// Wrap an angle in degrees into the compass range `[0, 360)`.
pub fn wrap_degrees(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}

/// Planar bearing from the vehicle's forward axis to a relative position, in
/// degrees via `atan2(y, x)`. Range `(-180, 180]`; defined for any non-zero
/// horizontal distance, however large the vertical component.
pub fn angle_to_tag(relative: Position) -> f64 {
    relative.y.atan2(relative.x).to_degrees()
}

/// Compass bearing in degrees from `position` (world frame) toward the world
/// position of tag `tag_id`, or `None` when the tag is not in the truth
/// table (an unknown tag is not an error).
pub fn world_angle_to_tag(
    position: Position,
    tag_id: u32,
    registry: &FrameRegistry,
) -> Option<f64> {
    let tag = registry.tag_world_position(tag_id)?;
    Some(wrap_degrees(
        (tag.y - position.y).atan2(tag.x - position.x).to_degrees(),
    ))
}
