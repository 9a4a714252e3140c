//! Tag geometry resolver.
//!
//! Turns one [`RawTagDetection`] (camera frame, metres) into a
//! [`VisibleTag`]: distances, bearing, heading, the vehicle's position
//! relative to the tag, and, when the tag is surveyed, its absolute world
//! position. Each detection is resolved independently; the resolver holds no
//! state of its own and only reads the [`FrameRegistry`].

use nalgebra::{Matrix3, Vector3};
use tagnav_types::{NavError, Position, RawTagDetection, VisibleTag};

use crate::bearing;
use crate::registry::FrameRegistry;
use crate::transform::RigidTransform;

/// The vision stage reports detections in metres; the mount configuration
/// and every output are in centimetres.
const METRES_TO_CM: f64 = 100.0;

/// Resolve one detection against the static frame registry.
///
/// An unknown tag ID is not an error: the record is produced with
/// `absolute_position: None`. A detection carrying non-finite position or
/// rotation entries is malformed and rejected.
///
/// # Errors
///
/// [`NavError::MalformedDetection`] for non-finite input.
pub fn resolve(
    detection: &RawTagDetection,
    registry: &FrameRegistry,
) -> Result<VisibleTag, NavError> {
    let p = detection.position;
    if ![p.x, p.y, p.z].iter().all(|v| v.is_finite()) {
        return Err(NavError::MalformedDetection {
            tag_id: detection.id,
            details: "non-finite position entry".to_string(),
        });
    }
    if !detection
        .rotation
        .iter()
        .flatten()
        .all(|v| v.is_finite())
    {
        return Err(NavError::MalformedDetection {
            tag_id: detection.id,
            details: "non-finite rotation entry".to_string(),
        });
    }

    let r = &detection.rotation;
    let tag_rotation = Matrix3::new(
        r[0][0], r[0][1], r[0][2], //
        r[1][0], r[1][1], r[1][2], //
        r[2][0], r[2][1], r[2][2],
    );
    let tag_position_cm = Vector3::new(p.x, p.y, p.z) * METRES_TO_CM;

    // Camera-to-tag, composed into the body frame. The relative position is
    // the composite's translation; the detection rotation does not enter it.
    let tag_in_camera = RigidTransform::from_parts(tag_rotation, tag_position_cm);
    let tag_in_body = registry.camera_to_body().compose(&tag_in_camera);
    let rel = tag_in_body.translation();
    let relative_position = Position::new(rel.x, rel.y, rel.z);

    let horizontal_distance = rel.x.hypot(rel.y);
    let vertical_distance = rel.z.abs();
    let angle = bearing::angle_to_tag(relative_position);

    // Surveyed tags are laid out world-aligned, so the tag's orientation seen
    // through the mount attitude reads out the vehicle's yaw; compass-wrapped
    // it is the heading.
    let heading_rotation = tag_rotation * registry.mount_attitude();
    let heading = bearing::wrap_degrees(yaw_degrees(&heading_rotation));

    let absolute_position = registry.tag_to_world(detection.id).map(|to_world| {
        let world = to_world.transform_point(rel);
        Position::new(world.x, world.y, world.z)
    });

    Ok(VisibleTag {
        id: detection.id,
        horizontal_distance,
        vertical_distance,
        angle,
        heading,
        relative_position,
        absolute_position,
    })
}

/// Planar yaw of a rotation matrix, degrees: `atan2(m₁₀, m₀₀)`.
fn yaw_degrees(m: &Matrix3<f64>) -> f64 {
    m[(1, 0)].atan2(m[(0, 0)]).to_degrees()
}
