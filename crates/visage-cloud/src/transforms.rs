use glam::DMat3;

use crate::utils::{array33_to_dmat3, array3_to_dvec3, dmat3_to_array33, dvec3_to_array3};

/// A rigid transform mapping source-frame geometry onto reference-frame geometry.
///
/// The rotation is row-major and proper (orthonormal, det = +1); the
/// translation is applied after the rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    /// Row-major rotation matrix.
    pub rotation: [[f64; 3]; 3],
    /// Translation vector in meters.
    pub translation: [f64; 3],
}

impl RigidTransform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        translation: [0.0, 0.0, 0.0],
    };

    /// Create a transform from a row-major rotation and a translation.
    pub fn new(rotation: [[f64; 3]; 3], translation: [f64; 3]) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Invert the transform: `R' = R^T`, `t' = -R^T t`.
    pub fn inverse(&self) -> Self {
        let r_inv = array33_to_dmat3(&self.rotation).transpose();
        let t_inv = -(r_inv * array3_to_dvec3(&self.translation));
        Self {
            rotation: dmat3_to_array33(&r_inv),
            translation: dvec3_to_array3(t_inv),
        }
    }

    /// Determinant of the rotation part.
    pub fn rotation_det(&self) -> f64 {
        array33_to_dmat3(&self.rotation).determinant()
    }

    /// Apply the transform to a single point.
    #[inline]
    pub fn transform_point(&self, point: &[f64; 3]) -> [f64; 3] {
        let p = array33_to_dmat3(&self.rotation) * array3_to_dvec3(point)
            + array3_to_dvec3(&self.translation);
        dvec3_to_array3(p)
    }

    /// Apply only the rotation part, e.g. to a normal vector.
    #[inline]
    pub fn rotate_vector(&self, vector: &[f64; 3]) -> [f64; 3] {
        dvec3_to_array3(array33_to_dmat3(&self.rotation) * array3_to_dvec3(vector))
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Compute a rotation matrix from an axis and angle.
///
/// # Arguments
///
/// * `axis` - The axis of rotation; normalized internally.
/// * `angle` - The angle of rotation in radians.
///
/// # Returns
///
/// The row-major rotation matrix, or an error for a zero-length axis.
pub fn axis_angle_to_rotation_matrix(
    axis: &[f64; 3],
    angle: f64,
) -> Result<[[f64; 3]; 3], &'static str> {
    let axis = array3_to_dvec3(axis);
    if axis.length_squared() < 1e-20 {
        return Err("cannot compute rotation matrix from a zero vector");
    }
    let rotation = DMat3::from_axis_angle(axis.normalize(), angle);
    Ok(dmat3_to_array33(&rotation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_axis_angle_quarter_turn() -> Result<(), Box<dyn std::error::Error>> {
        let rotation = axis_angle_to_rotation_matrix(&[1.0, 0.0, 0.0], std::f64::consts::PI / 2.0)?;
        let expected = [[1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]];
        for (row, expected_row) in rotation.iter().zip(expected.iter()) {
            for (r, e) in row.iter().zip(expected_row.iter()) {
                assert_relative_eq!(r, e, epsilon = 1e-12);
            }
        }
        Ok(())
    }

    #[test]
    fn test_axis_angle_zero_axis() {
        assert!(axis_angle_to_rotation_matrix(&[0.0, 0.0, 0.0], 1.0).is_err());
    }

    #[test]
    fn test_rigid_transform_inverse_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        let rotation = axis_angle_to_rotation_matrix(&[0.3, -0.5, 0.8], 0.7)?;
        let transform = RigidTransform::new(rotation, [0.1, -0.2, 0.05]);

        let p = [0.03, -0.01, 0.4];
        let q = transform.transform_point(&p);
        let p_back = transform.inverse().transform_point(&q);

        for (a, b) in p.iter().zip(p_back.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
        assert_relative_eq!(transform.rotation_det(), 1.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_identity_leaves_points_unchanged() {
        let p = [0.5, -0.25, 0.75];
        assert_eq!(RigidTransform::IDENTITY.transform_point(&p), p);
        assert_eq!(RigidTransform::default().rotate_vector(&p), p);
    }
}
