/// A colored point cloud with per-point unit normals.
///
/// The three arrays are parallel: index `i` in each of them describes the
/// same point. This invariant is checked at construction and preserved by
/// every operation in this workspace.
#[derive(Debug, Clone)]
pub struct PointCloud {
    // Camera-space positions in meters.
    points: Vec<[f64; 3]>,
    // Linear-space colors, each channel in [0, 1].
    colors: Vec<[f64; 3]>,
    // Unit normals.
    normals: Vec<[f64; 3]>,
    // Identifier of the capture frame this cloud came from.
    frame_id: usize,
}

impl PointCloud {
    /// Create a new point cloud from parallel points, colors and normals arrays.
    ///
    /// PRECONDITION: all three vectors have the same length.
    pub fn new(
        points: Vec<[f64; 3]>,
        colors: Vec<[f64; 3]>,
        normals: Vec<[f64; 3]>,
        frame_id: usize,
    ) -> Self {
        assert_eq!(points.len(), colors.len());
        assert_eq!(points.len(), normals.len());
        Self {
            points,
            colors,
            normals,
            frame_id,
        }
    }

    /// Create an empty point cloud for the given frame.
    pub fn empty(frame_id: usize) -> Self {
        Self {
            points: Vec::new(),
            colors: Vec::new(),
            normals: Vec::new(),
            frame_id,
        }
    }

    /// Get the number of points in the point cloud.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get the identifier of the frame this cloud was reconstructed from.
    #[inline]
    pub fn frame_id(&self) -> usize {
        self.frame_id
    }

    /// Get as reference the points in the point cloud.
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// Get as reference the colors of the points in the point cloud.
    pub fn colors(&self) -> &[[f64; 3]] {
        &self.colors
    }

    /// Get as reference the normals of the points in the point cloud.
    pub fn normals(&self) -> &[[f64; 3]] {
        &self.normals
    }

    /// Append all points of `other` to this cloud, keeping the frame id of `self`.
    pub fn extend_from(&mut self, other: &PointCloud) {
        self.points.extend_from_slice(&other.points);
        self.colors.extend_from_slice(&other.colors);
        self.normals.extend_from_slice(&other.normals);
    }

    /// Reserve capacity for at least `additional` more points.
    pub fn reserve(&mut self, additional: usize) {
        self.points.reserve(additional);
        self.colors.reserve(additional);
        self.normals.reserve(additional);
    }

    /// Get the minimum corner of the axis-aligned bounding box.
    ///
    /// Returns the origin for an empty cloud.
    pub fn min_bound(&self) -> [f64; 3] {
        self.points
            .iter()
            .fold([f64::INFINITY; 3], |mut acc, p| {
                for i in 0..3 {
                    acc[i] = acc[i].min(p[i]);
                }
                acc
            })
            .map(|v| if v.is_finite() { v } else { 0.0 })
    }

    /// Get the maximum corner of the axis-aligned bounding box.
    ///
    /// Returns the origin for an empty cloud.
    pub fn max_bound(&self) -> [f64; 3] {
        self.points
            .iter()
            .fold([f64::NEG_INFINITY; 3], |mut acc, p| {
                for i in 0..3 {
                    acc[i] = acc[i].max(p[i]);
                }
                acc
            })
            .map(|v| if v.is_finite() { v } else { 0.0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointcloud_parallel_arrays() {
        let cloud = PointCloud::new(
            vec![[0.0, 0.0, 0.3], [0.1, -0.1, 0.4]],
            vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0.0, 0.0, -1.0], [0.0, 0.0, -1.0]],
            7,
        );

        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.colors().len(), 2);
        assert_eq!(cloud.normals().len(), 2);
        assert_eq!(cloud.frame_id(), 7);
        assert!(!cloud.is_empty());
    }

    #[test]
    #[should_panic]
    fn test_pointcloud_length_mismatch_panics() {
        let _ = PointCloud::new(
            vec![[0.0, 0.0, 0.3]],
            vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0.0, 0.0, -1.0]],
            0,
        );
    }

    #[test]
    fn test_pointcloud_extend() {
        let mut a = PointCloud::new(
            vec![[0.0, 0.0, 1.0]],
            vec![[0.5, 0.5, 0.5]],
            vec![[0.0, 0.0, -1.0]],
            0,
        );
        let b = PointCloud::new(
            vec![[1.0, 0.0, 1.0], [2.0, 0.0, 1.0]],
            vec![[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]],
            vec![[0.0, 0.0, -1.0], [0.0, 0.0, -1.0]],
            1,
        );

        a.extend_from(&b);
        assert_eq!(a.len(), 3);
        assert_eq!(a.frame_id(), 0);
        assert_eq!(a.points()[2], [2.0, 0.0, 1.0]);
    }

    #[test]
    fn test_pointcloud_bounds() {
        let cloud = PointCloud::new(
            vec![[-1.0, 2.0, 0.5], [3.0, -4.0, 0.1]],
            vec![[0.0; 3]; 2],
            vec![[0.0, 0.0, -1.0]; 2],
            0,
        );
        assert_eq!(cloud.min_bound(), [-1.0, -4.0, 0.1]);
        assert_eq!(cloud.max_bound(), [3.0, 2.0, 0.5]);

        let empty = PointCloud::empty(0);
        assert_eq!(empty.min_bound(), [0.0; 3]);
        assert_eq!(empty.max_bound(), [0.0; 3]);
    }
}
