//! Rigid-body transforms.
//!
//! A [`RigidTransform`] is a 4×4 homogeneous matrix combining a 3×3 rotation
//! block and a translation column; it represents the pose of one reference
//! frame expressed in another. Composition is the homogeneous matrix product,
//! and inversion uses the rigid closed form (`Rᵀ`, `−Rᵀt`) whenever the
//! rotation block is detectably orthonormal, falling back to a generic 4×4
//! inverse otherwise.
//!
//! # Example
//!
//! ```rust
//! use nalgebra::Vector3;
//! use tagnav_geometry::transform::RigidTransform;
//!
//! // Camera 10 cm forward of the body origin, no rotation.
//! let h = RigidTransform::from_euler(0.0, 0.0, 0.0, Vector3::new(10.0, 0.0, 0.0));
//! let inv = h.inverse().unwrap();
//! let roundtrip = h.compose(&inv);
//! assert!((roundtrip.translation().norm()) < 1e-12);
//! ```

use nalgebra::{Matrix3, Matrix4, Rotation3, Vector3};
use tagnav_types::NavError;

/// Tolerance for the orthonormality test on the rotation block.
const ORTHONORMAL_TOL: f64 = 1e-9;

/// A 4×4 homogeneous rigid-body transform.
///
/// The bottom row is always `[0, 0, 0, 1]`; for valid rigid inputs the
/// rotation block is orthonormal. All arithmetic is plain `f64`, so outputs
/// are bit-for-bit reproducible for identical inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    matrix: Matrix4<f64>,
}

impl RigidTransform {
    /// The identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Build from a rotation block and a translation.
    pub fn from_parts(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        let mut matrix = Matrix4::identity();
        matrix.fixed_view_mut::<3, 3>(0, 0).copy_from(&rotation);
        matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(&translation);
        Self { matrix }
    }

    /// Build from intrinsic x→y→z euler angles and a translation.
    ///
    /// The rotation is `Rx(roll) · Ry(pitch) · Rz(yaw)`: applied to a vector,
    /// yaw acts first, then pitch, then roll (aerospace convention used by
    /// both the mount attitude and the tag-truth poses).
    pub fn from_euler(roll: f64, pitch: f64, yaw: f64, translation: Vector3<f64>) -> Self {
        let rotation = Rotation3::from_axis_angle(&Vector3::x_axis(), roll)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), pitch)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), yaw);
        Self::from_parts(rotation.into_inner(), translation)
    }

    /// The 3×3 rotation block.
    pub fn rotation(&self) -> Matrix3<f64> {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// The translation column.
    pub fn translation(&self) -> Vector3<f64> {
        self.matrix.fixed_view::<3, 1>(0, 3).into_owned()
    }

    /// The underlying homogeneous matrix.
    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// Compose two transforms: the result applies `other` first, then `self`
    /// (standard homogeneous matrix product `self · other`).
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Map a point through this transform.
    pub fn transform_point(&self, point: Vector3<f64>) -> Vector3<f64> {
        self.rotation() * point + self.translation()
    }

    /// The transform describing the reverse frame relationship.
    ///
    /// Uses the rigid closed form (`Rᵀ`, `−Rᵀt`) when the rotation block is
    /// orthonormal. Non-orthonormal blocks take the generic 4×4 inverse,
    /// a diagnostic path rather than the common case.
    ///
    /// # Errors
    ///
    /// [`NavError::SingularTransform`] when the matrix is not invertible.
    pub fn inverse(&self) -> Result<Self, NavError> {
        let rotation = self.rotation();
        if is_orthonormal(&rotation) {
            let rt = rotation.transpose();
            Ok(Self::from_parts(rt, -(rt * self.translation())))
        } else {
            self.matrix
                .try_inverse()
                .map(|matrix| Self { matrix })
                .ok_or(NavError::SingularTransform)
        }
    }
}

/// `R · Rᵀ ≈ I` within [`ORTHONORMAL_TOL`].
fn is_orthonormal(rotation: &Matrix3<f64>) -> bool {
    let gram = rotation * rotation.transpose();
    (gram - Matrix3::identity()).norm() < ORTHONORMAL_TOL
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn identity_inverse_is_identity() {
        let inv = RigidTransform::identity().inverse().unwrap();
        assert_eq!(inv, RigidTransform::identity());
    }

    #[test]
    fn compose_translations_add() {
        let a = RigidTransform::from_euler(0.0, 0.0, 0.0, Vector3::new(1.0, 0.0, 0.0));
        let b = RigidTransform::from_euler(0.0, 0.0, 0.0, Vector3::new(2.0, 0.0, 0.0));
        let c = a.compose(&b);
        assert_relative_eq!(c.translation().x, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn euler_yaw_rotates_x_to_y() {
        let h = RigidTransform::from_euler(0.0, 0.0, FRAC_PI_2, Vector3::zeros());
        let p = h.transform_point(Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn euler_composition_applies_yaw_first() {
        // Pitch −90° then roll must act on the already-yawed axes: a point on
        // +x, yawed 90° onto +y, is unaffected by the pitch about y.
        let h = RigidTransform::from_euler(0.0, -FRAC_PI_2, FRAC_PI_2, Vector3::zeros());
        let p = h.transform_point(Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn rigid_inverse_matches_closed_form() {
        let h = RigidTransform::from_euler(0.1, -0.2, 0.3, Vector3::new(4.0, -5.0, 6.0));
        let inv = h.inverse().unwrap();

        let r = h.rotation();
        let expected_t = -(r.transpose() * h.translation());
        assert_relative_eq!(inv.translation(), expected_t, epsilon = 1e-12);
        assert_relative_eq!(inv.rotation(), r.transpose(), epsilon = 1e-12);
    }

    #[test]
    fn inverse_roundtrip_laws() {
        let h = RigidTransform::from_euler(0.7, 0.2, -1.1, Vector3::new(12.0, -3.0, 45.0));
        let inv = h.inverse().unwrap();

        let double = inv.inverse().unwrap();
        assert_relative_eq!(*double.matrix(), *h.matrix(), epsilon = 1e-9);

        let roundtrip = h.compose(&inv);
        assert_relative_eq!(
            *roundtrip.matrix(),
            *RigidTransform::identity().matrix(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn non_orthonormal_block_takes_generic_inverse() {
        // Uniform scale by 2 is invertible but not orthonormal.
        let h = RigidTransform::from_parts(
            Matrix3::identity() * 2.0,
            Vector3::new(1.0, 0.0, 0.0),
        );
        let inv = h.inverse().unwrap();
        assert_relative_eq!(inv.rotation(), Matrix3::identity() * 0.5, epsilon = 1e-12);
        assert_relative_eq!(inv.translation(), Vector3::new(-0.5, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn singular_matrix_reports_error() {
        let h = RigidTransform::from_parts(Matrix3::zeros(), Vector3::zeros());
        assert!(matches!(h.inverse(), Err(NavError::SingularTransform)));
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let make = || {
            RigidTransform::from_euler(0.3, -0.4, 2.2, Vector3::new(1.5, 2.5, 3.5))
                .inverse()
                .unwrap()
        };
        assert_eq!(make(), make());
    }
}
