//! Static frame registry.
//!
//! Materialises, once at startup, every static transform the resolver needs:
//! the camera-to-body transform derived from the mount configuration, and the
//! tag-to-world / world-to-tag pair for every surveyed tag. The registry is
//! read-only after construction; a configuration reload builds a fresh
//! registry and swaps it in whole, so concurrent readers never observe a
//! half-built state.

use std::collections::BTreeMap;

use nalgebra::{Matrix3, Vector3};
use tagnav_types::{NavConfig, NavError};

use crate::transform::RigidTransform;

/// Fixed axis remap between camera axes and body axes, a consequence of the
/// sideways, downward-looking mount: camera +x → body −y, camera +y →
/// body +x, camera +z → body −z.
fn camera_axis_remap() -> Matrix3<f64> {
    Matrix3::new(
        0.0, 1.0, 0.0, //
        -1.0, 0.0, 0.0, //
        0.0, 0.0, -1.0,
    )
}

/// Cache of the static transforms built from [`NavConfig`].
#[derive(Debug, Clone)]
pub struct FrameRegistry {
    camera_to_body: RigidTransform,
    mount_attitude: Matrix3<f64>,
    tag_to_world: BTreeMap<u32, RigidTransform>,
    world_to_tag: BTreeMap<u32, RigidTransform>,
}

impl FrameRegistry {
    /// Build every static transform from the configuration.
    ///
    /// # Errors
    ///
    /// [`NavError::Config`] when any mount or tag-truth value is non-finite.
    /// Configuration errors are fatal: they surface before any detection
    /// batch is processed.
    pub fn new(config: &NavConfig) -> Result<Self, NavError> {
        let mount = &config.camera_mount;
        if !mount.position_cm.iter().all(|v| v.is_finite())
            || !mount.attitude_rad.iter().all(|v| v.is_finite())
        {
            return Err(NavError::Config(
                "camera mount contains non-finite values".to_string(),
            ));
        }

        let [roll, pitch, yaw] = mount.attitude_rad;
        let [forward, right, down] = mount.position_cm;
        let mounted = RigidTransform::from_euler(
            roll,
            pitch,
            yaw,
            Vector3::new(forward, right, down),
        );
        let remap = RigidTransform::from_parts(camera_axis_remap(), Vector3::zeros());
        let camera_to_body = remap.compose(&mounted);
        let mount_attitude = mounted.rotation();

        let mut tag_to_world = BTreeMap::new();
        let mut world_to_tag = BTreeMap::new();
        for (&id, pose) in &config.tag_truth {
            if !pose.rpy.iter().all(|v| v.is_finite()) || !pose.xyz.iter().all(|v| v.is_finite())
            {
                return Err(NavError::Config(format!(
                    "tag {id} truth pose contains non-finite values"
                )));
            }
            let [t_roll, t_pitch, t_yaw] = pose.rpy;
            let [x, y, z] = pose.xyz;
            let to_world =
                RigidTransform::from_euler(t_roll, t_pitch, t_yaw, Vector3::new(x, y, z));
            // Orthonormal by construction, so this cannot fail for finite
            // inputs; surface anything unexpected as a config error.
            let to_tag = to_world
                .inverse()
                .map_err(|e| NavError::Config(format!("tag {id} pose: {e}")))?;
            tag_to_world.insert(id, to_world);
            world_to_tag.insert(id, to_tag);
        }

        Ok(Self {
            camera_to_body,
            mount_attitude,
            tag_to_world,
            world_to_tag,
        })
    }

    /// The camera-to-body transform (mount attitude, mount translation, and
    /// the fixed axis remap, composed).
    pub fn camera_to_body(&self) -> &RigidTransform {
        &self.camera_to_body
    }

    /// The mount attitude rotation alone, without the axis remap. The
    /// resolver reads the vehicle heading through it.
    pub fn mount_attitude(&self) -> &Matrix3<f64> {
        &self.mount_attitude
    }

    /// The transform mapping tag-frame coordinates into the world frame, or
    /// `None` for a tag absent from the truth table.
    pub fn tag_to_world(&self, id: u32) -> Option<&RigidTransform> {
        self.tag_to_world.get(&id)
    }

    /// The inverse mapping, world frame into tag frame.
    pub fn world_to_tag(&self, id: u32) -> Option<&RigidTransform> {
        self.world_to_tag.get(&id)
    }

    /// World position of a known tag.
    pub fn tag_world_position(&self, id: u32) -> Option<Vector3<f64>> {
        self.tag_to_world.get(&id).map(|h| h.translation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};
    use tagnav_types::{CameraMount, TagWorldPose};

    fn test_config() -> NavConfig {
        NavConfig {
            camera_mount: CameraMount {
                position_cm: [15.0, 10.0, 10.0],
                attitude_rad: [0.0, 0.0, FRAC_PI_2],
            },
            tag_truth: BTreeMap::from([(0, TagWorldPose::identity())]),
        }
    }

    #[test]
    fn camera_to_body_matches_reference_mount() {
        let registry = FrameRegistry::new(&test_config()).unwrap();
        let h = registry.camera_to_body();

        // Sideways mount yawed 90°: the composite collapses to a z-flip with
        // the mount offset remapped into body axes.
        let expected_rotation = Matrix3::new(
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            0.0, 0.0, -1.0,
        );
        assert_relative_eq!(h.rotation(), expected_rotation, epsilon = 1e-12);
        assert_relative_eq!(
            h.translation(),
            Vector3::new(10.0, -15.0, -10.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn camera_to_body_roundtrips_with_its_inverse() {
        let registry = FrameRegistry::new(&test_config()).unwrap();
        let h = registry.camera_to_body();
        let roundtrip = h.compose(&h.inverse().unwrap());
        assert_relative_eq!(
            *roundtrip.matrix(),
            *RigidTransform::identity().matrix(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn default_mount_offsets_straight_down() {
        let registry = FrameRegistry::new(&NavConfig::default()).unwrap();
        assert_relative_eq!(
            registry.camera_to_body().translation(),
            Vector3::new(0.0, 0.0, -8.5),
            epsilon = 1e-12
        );
    }

    #[test]
    fn identity_tag_pose_yields_identity_transforms() {
        let registry = FrameRegistry::new(&test_config()).unwrap();
        let to_world = registry.tag_to_world(0).unwrap();
        assert_relative_eq!(
            *to_world.matrix(),
            *RigidTransform::identity().matrix(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn unknown_tag_lookup_returns_none() {
        let registry = FrameRegistry::new(&test_config()).unwrap();
        assert!(registry.tag_to_world(2).is_none());
        assert!(registry.world_to_tag(2).is_none());
        assert!(registry.tag_world_position(2).is_none());
    }

    #[test]
    fn tag_transform_pair_are_inverses() {
        let mut config = test_config();
        config.tag_truth.insert(
            7,
            TagWorldPose {
                rpy: [0.0, 0.0, FRAC_PI_2],
                xyz: [100.0, -50.0, 30.0],
            },
        );
        let registry = FrameRegistry::new(&config).unwrap();

        let chain = registry
            .tag_to_world(7)
            .unwrap()
            .compose(registry.world_to_tag(7).unwrap());
        assert_relative_eq!(
            *chain.matrix(),
            *RigidTransform::identity().matrix(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn tag_world_position_reads_translation() {
        let mut config = test_config();
        config.tag_truth.insert(
            3,
            TagWorldPose {
                rpy: [0.0, 0.0, PI],
                xyz: [250.0, 40.0, 0.0],
            },
        );
        let registry = FrameRegistry::new(&config).unwrap();
        assert_relative_eq!(
            registry.tag_world_position(3).unwrap(),
            Vector3::new(250.0, 40.0, 0.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn non_finite_mount_is_a_config_error() {
        let mut config = test_config();
        config.camera_mount.attitude_rad[2] = f64::NAN;
        assert!(matches!(
            FrameRegistry::new(&config),
            Err(NavError::Config(_))
        ));
    }

    #[test]
    fn non_finite_tag_pose_is_a_config_error() {
        let mut config = test_config();
        config.tag_truth.insert(
            9,
            TagWorldPose {
                rpy: [0.0, 0.0, 0.0],
                xyz: [f64::INFINITY, 0.0, 0.0],
            },
        );
        assert!(matches!(
            FrameRegistry::new(&config),
            Err(NavError::Config(_))
        ));
    }
}
