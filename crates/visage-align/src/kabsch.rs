use visage_cloud::landmarks::FaceLandmarks3D;
use visage_cloud::linalg::transform_points;
use visage_cloud::transforms::RigidTransform;

use crate::error::AlignmentError;

/// Ratio of the second to the largest singular value of the cross-covariance
/// below which the correspondences are treated as collinear.
const COLLINEARITY_RATIO: f64 = 1e-9;

/// Estimate the rigid transform mapping `source` landmarks onto `reference`
/// landmarks.
///
/// Correspondences are the landmark pairs resolved in *both* records,
/// matched positionally by name. The transform minimizes the mean squared
/// distance between the pairs (Kabsch) and its rotation is always proper:
/// reflections never escape.
///
/// # Arguments
///
/// * `source` - Landmarks of the frame being aligned.
/// * `reference` - Landmarks of the reference frame.
///
/// # Returns
///
/// The transform taking source-frame geometry into the reference frame.
pub fn compute_rigid_transform(
    source: &FaceLandmarks3D,
    reference: &FaceLandmarks3D,
) -> Result<RigidTransform, AlignmentError> {
    let (points_in_src, points_in_ref) = source.resolved_pairs(reference);
    if points_in_src.len() < 3 {
        return Err(AlignmentError::InsufficientCorrespondences {
            found: points_in_src.len(),
        });
    }

    let transform = fit_rigid_transform(&points_in_src, &points_in_ref)?;
    log::debug!(
        "aligned {} landmark pairs, rmsd {:.6} m",
        points_in_src.len(),
        landmark_rmsd(source, reference, &transform)
    );
    Ok(transform)
}

/// Fit the least-squares rigid transform between two corresponding point sets.
///
/// Implements the Kabsch algorithm: center both sets, build the
/// cross-covariance `H = sum (src - src_mean) (ref - ref_mean)^T`, decompose
/// `H = U S V^T` and take `R = V U^T` with the last column of `V` negated
/// when a reflection would otherwise be produced.
///
/// PRECONDITION: both slices have the same length.
pub fn fit_rigid_transform(
    points_in_src: &[[f64; 3]],
    points_in_ref: &[[f64; 3]],
) -> Result<RigidTransform, AlignmentError> {
    assert_eq!(points_in_src.len(), points_in_ref.len());
    if points_in_src.len() < 3 {
        return Err(AlignmentError::InsufficientCorrespondences {
            found: points_in_src.len(),
        });
    }

    // already aligned sets need no decomposition
    if points_in_src == points_in_ref {
        return Ok(RigidTransform::IDENTITY);
    }

    let src_centroid = centroid(points_in_src);
    let ref_centroid = centroid(points_in_ref);

    let mut h = [[0.0; 3]; 3];
    for (p_src, p_ref) in points_in_src.iter().zip(points_in_ref.iter()) {
        let s = [
            p_src[0] - src_centroid[0],
            p_src[1] - src_centroid[1],
            p_src[2] - src_centroid[2],
        ];
        let d = [
            p_ref[0] - ref_centroid[0],
            p_ref[1] - ref_centroid[1],
            p_ref[2] - ref_centroid[2],
        ];
        for (r, h_row) in h.iter_mut().enumerate() {
            for (c, h_val) in h_row.iter_mut().enumerate() {
                *h_val += s[r] * d[c];
            }
        }
    }

    let h_mat = faer::mat![
        [h[0][0], h[0][1], h[0][2]],
        [h[1][0], h[1][1], h[1][2]],
        [h[2][0], h[2][1], h[2][2]],
    ];
    let svd = h_mat.svd();

    // rank < 2 means the pairs sit on a line (or a point) and any rotation
    // about it fits equally well
    let s = svd.s_diagonal();
    if s[0] <= f64::EPSILON || s[1] <= COLLINEARITY_RATIO * s[0] {
        return Err(AlignmentError::SingularAlignment);
    }

    let u = svd.u();
    let mut v = [[0.0; 3]; 3];
    for (i, v_row) in v.iter_mut().enumerate() {
        for (j, v_val) in v_row.iter_mut().enumerate() {
            *v_val = svd.v().read(i, j);
        }
    }

    let mut rotation = v_times_u_transpose(&v, u);
    if det3(&rotation) < 0.0 {
        for v_row in v.iter_mut() {
            v_row[2] = -v_row[2];
        }
        rotation = v_times_u_transpose(&v, u);
    }

    let rotated_centroid = RigidTransform::new(rotation, [0.0; 3]).transform_point(&src_centroid);
    let translation = [
        ref_centroid[0] - rotated_centroid[0],
        ref_centroid[1] - rotated_centroid[1],
        ref_centroid[2] - rotated_centroid[2],
    ];

    Ok(RigidTransform::new(rotation, translation))
}

/// Root-mean-square distance between corresponding point pairs.
///
/// A diagnostic only, never a gating check. Empty input reads as zero.
///
/// PRECONDITION: both slices have the same length.
pub fn rmsd(points_a: &[[f64; 3]], points_b: &[[f64; 3]]) -> f64 {
    assert_eq!(points_a.len(), points_b.len());
    if points_a.is_empty() {
        return 0.0;
    }
    let sum_sq = points_a
        .iter()
        .zip(points_b.iter())
        .map(|(a, b)| {
            (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
        })
        .sum::<f64>();
    (sum_sq / points_a.len() as f64).sqrt()
}

/// Post-alignment RMSD of the landmark pairs resolved in both records.
pub fn landmark_rmsd(
    source: &FaceLandmarks3D,
    reference: &FaceLandmarks3D,
    transform: &RigidTransform,
) -> f64 {
    let (points_in_src, points_in_ref) = source.resolved_pairs(reference);
    let mut aligned = vec![[0.0; 3]; points_in_src.len()];
    transform_points(
        &points_in_src,
        &transform.rotation,
        &transform.translation,
        &mut aligned,
    );
    rmsd(&aligned, &points_in_ref)
}

fn centroid(points: &[[f64; 3]]) -> [f64; 3] {
    let mut acc = [0.0; 3];
    for p in points {
        acc[0] += p[0];
        acc[1] += p[1];
        acc[2] += p[2];
    }
    let n = points.len() as f64;
    [acc[0] / n, acc[1] / n, acc[2] / n]
}

fn v_times_u_transpose(v: &[[f64; 3]; 3], u: faer::MatRef<'_, f64>) -> [[f64; 3]; 3] {
    let mut r = [[0.0; 3]; 3];
    for (i, r_row) in r.iter_mut().enumerate() {
        for (j, r_val) in r_row.iter_mut().enumerate() {
            for (k, v_val) in v[i].iter().enumerate() {
                *r_val += v_val * u.read(j, k);
            }
        }
    }
    r
}

fn det3(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use visage_cloud::transforms::axis_angle_to_rotation_matrix;

    fn face_landmarks() -> FaceLandmarks3D {
        FaceLandmarks3D {
            nose_tip: Some([0.0, 0.0, 0.28]),
            chin: Some([0.0, -0.05, 0.3]),
            left_eye_left_corner: Some([-0.04, 0.03, 0.31]),
            right_eye_right_corner: Some([0.04, 0.03, 0.31]),
            left_mouth_corner: Some([-0.02, -0.03, 0.3]),
            right_mouth_corner: Some([0.02, -0.03, 0.3]),
        }
    }

    fn transform_landmarks(
        landmarks: &FaceLandmarks3D,
        transform: &RigidTransform,
    ) -> FaceLandmarks3D {
        FaceLandmarks3D::from_array(
            landmarks
                .as_array()
                .map(|p| p.map(|p| transform.transform_point(&p))),
        )
    }

    #[test]
    fn test_recovers_known_transform() -> Result<(), Box<dyn std::error::Error>> {
        let rotation = axis_angle_to_rotation_matrix(&[0.1, 1.0, 0.2], 0.35)?;
        let expected = RigidTransform::new(rotation, [0.02, -0.01, 0.05]);

        let source = face_landmarks();
        let reference = transform_landmarks(&source, &expected);

        let estimated = compute_rigid_transform(&source, &reference)?;
        for (row, expected_row) in estimated.rotation.iter().zip(expected.rotation.iter()) {
            for (r, e) in row.iter().zip(expected_row.iter()) {
                assert_relative_eq!(r, e, epsilon = 1e-9);
            }
        }
        for (t, e) in estimated
            .translation
            .iter()
            .zip(expected.translation.iter())
        {
            assert_relative_eq!(t, e, epsilon = 1e-9);
        }

        assert_relative_eq!(estimated.rotation_det(), 1.0, epsilon = 1e-9);
        assert!(landmark_rmsd(&source, &reference, &estimated) < 1e-9);
        Ok(())
    }

    #[test]
    fn test_identity_for_equal_landmarks() -> Result<(), AlignmentError> {
        let landmarks = face_landmarks();
        let transform = compute_rigid_transform(&landmarks, &landmarks)?;
        assert_eq!(transform, RigidTransform::IDENTITY);
        Ok(())
    }

    #[test]
    fn test_too_few_resolved_pairs() {
        let source = face_landmarks();
        let mut reference = face_landmarks();
        reference.chin = None;
        reference.left_eye_left_corner = None;
        reference.right_eye_right_corner = None;
        reference.left_mouth_corner = None;

        let err = compute_rigid_transform(&source, &reference).unwrap_err();
        assert!(matches!(
            err,
            AlignmentError::InsufficientCorrespondences { found: 2 }
        ));
    }

    #[test]
    fn test_collinear_landmarks_are_singular() {
        let line =
            |offset: f64| -> Vec<[f64; 3]> { (0..6).map(|i| [i as f64 * 0.01 + offset, 0.0, 0.3]).collect() };
        let points_in_src = line(0.0);
        let points_in_ref = line(0.05);

        let err = fit_rigid_transform(&points_in_src, &points_in_ref).unwrap_err();
        assert!(matches!(err, AlignmentError::SingularAlignment));
    }

    #[test]
    fn test_reflected_correspondences_still_yield_proper_rotation() {
        // mirror the reference through the xy plane; the best orthogonal fit
        // would be a reflection, which must not be returned
        let source = face_landmarks();
        let mirrored = FaceLandmarks3D::from_array(
            source
                .as_array()
                .map(|p| p.map(|p| [p[0], p[1], -p[2]])),
        );

        let transform = compute_rigid_transform(&source, &mirrored).unwrap();
        assert_relative_eq!(transform.rotation_det(), 1.0, epsilon = 1e-9);
        // the mirror itself is not rigid, so the fit cannot be exact
        assert!(landmark_rmsd(&source, &mirrored, &transform) > 1e-4);
    }

    #[test]
    fn test_pure_translation() -> Result<(), AlignmentError> {
        let points_in_src = vec![
            [0.0, 0.0, 0.3],
            [0.05, 0.0, 0.3],
            [0.0, 0.05, 0.32],
            [-0.03, -0.02, 0.29],
        ];
        let points_in_ref = points_in_src
            .iter()
            .map(|p| [p[0] + 0.1, p[1] - 0.02, p[2] + 0.01])
            .collect::<Vec<_>>();

        let transform = fit_rigid_transform(&points_in_src, &points_in_ref)?;
        for (row, identity_row) in transform
            .rotation
            .iter()
            .zip(RigidTransform::IDENTITY.rotation.iter())
        {
            for (r, e) in row.iter().zip(identity_row.iter()) {
                assert_relative_eq!(r, e, epsilon = 1e-9);
            }
        }
        assert_relative_eq!(transform.translation[0], 0.1, epsilon = 1e-9);
        assert_relative_eq!(transform.translation[1], -0.02, epsilon = 1e-9);
        assert_relative_eq!(transform.translation[2], 0.01, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_rmsd_of_shifted_points() {
        let a = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let b = vec![[0.0, 0.0, 0.1], [1.0, 0.0, 0.1]];
        assert_relative_eq!(rmsd(&a, &b), 0.1, epsilon = 1e-12);
        assert_relative_eq!(rmsd(&[], &[]), 0.0);
    }
}
