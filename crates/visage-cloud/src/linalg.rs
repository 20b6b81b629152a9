use crate::pointcloud::PointCloud;
use crate::transforms::RigidTransform;
use crate::utils::{array33_to_dmat3, array3_to_dvec3, dvec3_to_array3};

/// Transform a set of points by a rotation and translation.
///
/// # Arguments
///
/// * `src_points` - The points to transform.
/// * `rotation` - A row-major rotation matrix.
/// * `translation` - A translation vector.
/// * `dst_points` - Pre-allocated output of the same length as `src_points`.
///
/// PRECONDITION: `dst_points` has the same length as `src_points`.
pub fn transform_points(
    src_points: &[[f64; 3]],
    rotation: &[[f64; 3]; 3],
    translation: &[f64; 3],
    dst_points: &mut [[f64; 3]],
) {
    assert_eq!(src_points.len(), dst_points.len());
    let r = array33_to_dmat3(rotation);
    let t = array3_to_dvec3(translation);
    for (src, dst) in src_points.iter().zip(dst_points.iter_mut()) {
        *dst = dvec3_to_array3(r * array3_to_dvec3(src) + t);
    }
}

/// Rotate a set of vectors without translating them.
///
/// Used for normals, which are directions rather than positions.
///
/// PRECONDITION: `dst_vectors` has the same length as `src_vectors`.
pub fn rotate_vectors(
    src_vectors: &[[f64; 3]],
    rotation: &[[f64; 3]; 3],
    dst_vectors: &mut [[f64; 3]],
) {
    assert_eq!(src_vectors.len(), dst_vectors.len());
    let r = array33_to_dmat3(rotation);
    for (src, dst) in src_vectors.iter().zip(dst_vectors.iter_mut()) {
        *dst = dvec3_to_array3(r * array3_to_dvec3(src));
    }
}

/// Apply a rigid transform to a whole cloud, producing a new cloud.
///
/// Positions are rotated and translated; normals are only rotated; colors
/// and the frame id pass through unchanged.
pub fn transform_cloud(cloud: &PointCloud, transform: &RigidTransform) -> PointCloud {
    let mut points = vec![[0.0; 3]; cloud.len()];
    let mut normals = vec![[0.0; 3]; cloud.len()];
    transform_points(
        cloud.points(),
        &transform.rotation,
        &transform.translation,
        &mut points,
    );
    rotate_vectors(cloud.normals(), &transform.rotation, &mut normals);
    PointCloud::new(points, cloud.colors().to_vec(), normals, cloud.frame_id())
}
