use visage_cloud::linalg::transform_cloud;
use visage_cloud::pointcloud::PointCloud;
use visage_cloud::transforms::RigidTransform;

/// Merge per-frame clouds into the reference frame.
///
/// Each cloud is moved by its paired rigid transform (identity for the
/// reference frame) and all clouds are concatenated in order. No
/// deduplication or down-sampling happens here; the merged cloud keeps the
/// frame id of the first entry. An empty list merges to the empty cloud.
pub fn merge(frames: &[(PointCloud, RigidTransform)]) -> PointCloud {
    let Some(((first_cloud, first_transform), rest)) = frames.split_first() else {
        return PointCloud::empty(0);
    };

    let mut merged = transform_cloud(first_cloud, first_transform);
    merged.reserve(rest.iter().map(|(cloud, _)| cloud.len()).sum());
    for (cloud, transform) in rest {
        merged.extend_from(&transform_cloud(cloud, transform));
    }

    log::debug!(
        "merged {} frames into {} points",
        frames.len(),
        merged.len()
    );
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn single_point_cloud(point: [f64; 3], frame_id: usize) -> PointCloud {
        PointCloud::new(
            vec![point],
            vec![[0.5, 0.5, 0.5]],
            vec![[0.0, 0.0, -1.0]],
            frame_id,
        )
    }

    #[test]
    fn test_merge_empty_list() {
        let merged = merge(&[]);
        assert!(merged.is_empty());
    }

    #[test]
    fn test_merge_concatenates_in_order() {
        let frames = vec![
            (single_point_cloud([0.0, 0.0, 0.3], 0), RigidTransform::IDENTITY),
            (single_point_cloud([0.0, 0.0, 0.3], 1), RigidTransform::IDENTITY),
            (single_point_cloud([0.01, 0.0, 0.3], 2), RigidTransform::IDENTITY),
        ];
        let merged = merge(&frames);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged.frame_id(), 0);
        assert_eq!(merged.points()[2], [0.01, 0.0, 0.3]);
        assert_eq!(merged.colors().len(), 3);
        assert_eq!(merged.normals().len(), 3);
    }

    #[test]
    fn test_merge_applies_per_frame_transforms() {
        let shift = RigidTransform::new(
            RigidTransform::IDENTITY.rotation,
            [0.1, 0.0, 0.0],
        );
        let frames = vec![
            (single_point_cloud([0.0, 0.0, 0.3], 0), RigidTransform::IDENTITY),
            (single_point_cloud([0.0, 0.0, 0.3], 1), shift),
        ];
        let merged = merge(&frames);

        assert_relative_eq!(merged.points()[0][0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(merged.points()[1][0], 0.1, epsilon = 1e-12);
        // the reference frame point is untouched
        assert_relative_eq!(merged.points()[0][2], 0.3, epsilon = 1e-12);
    }
}
