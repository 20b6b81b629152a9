use serde::{Deserialize, Serialize};

/// Landmark field names in the fixed order used throughout the pipeline.
///
/// The order matters: correspondences between two frames are formed by
/// zipping the two records positionally, never by spatial matching.
pub const LANDMARK_NAMES: [&str; 6] = [
    "noseTip",
    "chin",
    "leftEyeLeftCorner",
    "rightEyeRightCorner",
    "leftMouthCorner",
    "rightMouthCorner",
];

/// Six named facial landmarks as pixel coordinates.
///
/// Supplied by an external 2D face-landmark detector; coordinates live in
/// the depth buffer's pixel grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceLandmarks2D {
    /// Tip of the nose.
    pub nose_tip: [f64; 2],
    /// Bottom of the chin.
    pub chin: [f64; 2],
    /// Outer corner of the left eye.
    pub left_eye_left_corner: [f64; 2],
    /// Outer corner of the right eye.
    pub right_eye_right_corner: [f64; 2],
    /// Left corner of the mouth.
    pub left_mouth_corner: [f64; 2],
    /// Right corner of the mouth.
    pub right_mouth_corner: [f64; 2],
}

impl FaceLandmarks2D {
    /// The six pixel coordinates in the fixed [`LANDMARK_NAMES`] order.
    pub fn as_array(&self) -> [[f64; 2]; 6] {
        [
            self.nose_tip,
            self.chin,
            self.left_eye_left_corner,
            self.right_eye_right_corner,
            self.left_mouth_corner,
            self.right_mouth_corner,
        ]
    }
}

/// The six landmarks projected into camera space.
///
/// A landmark whose depth sample was invalid is explicitly unresolved
/// (`None`), never a default position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FaceLandmarks3D {
    /// Tip of the nose, if its depth sample was valid.
    pub nose_tip: Option<[f64; 3]>,
    /// Bottom of the chin, if its depth sample was valid.
    pub chin: Option<[f64; 3]>,
    /// Outer corner of the left eye, if its depth sample was valid.
    pub left_eye_left_corner: Option<[f64; 3]>,
    /// Outer corner of the right eye, if its depth sample was valid.
    pub right_eye_right_corner: Option<[f64; 3]>,
    /// Left corner of the mouth, if its depth sample was valid.
    pub left_mouth_corner: Option<[f64; 3]>,
    /// Right corner of the mouth, if its depth sample was valid.
    pub right_mouth_corner: Option<[f64; 3]>,
}

impl FaceLandmarks3D {
    /// The six camera-space positions in the fixed [`LANDMARK_NAMES`] order.
    pub fn as_array(&self) -> [Option<[f64; 3]>; 6] {
        [
            self.nose_tip,
            self.chin,
            self.left_eye_left_corner,
            self.right_eye_right_corner,
            self.left_mouth_corner,
            self.right_mouth_corner,
        ]
    }

    /// Build a record from six positions in the fixed [`LANDMARK_NAMES`] order.
    pub fn from_array(positions: [Option<[f64; 3]>; 6]) -> Self {
        Self {
            nose_tip: positions[0],
            chin: positions[1],
            left_eye_left_corner: positions[2],
            right_eye_right_corner: positions[3],
            left_mouth_corner: positions[4],
            right_mouth_corner: positions[5],
        }
    }

    /// Number of landmarks that resolved to a camera-space position.
    pub fn resolved_count(&self) -> usize {
        self.as_array().iter().filter(|p| p.is_some()).count()
    }

    /// Collect the landmark pairs resolved in both `self` and `other`.
    ///
    /// Pairs are matched positionally by landmark name; the two returned
    /// vectors stay parallel.
    pub fn resolved_pairs(&self, other: &FaceLandmarks3D) -> (Vec<[f64; 3]>, Vec<[f64; 3]>) {
        let mut points_in_self = Vec::with_capacity(6);
        let mut points_in_other = Vec::with_capacity(6);
        for (a, b) in self.as_array().iter().zip(other.as_array().iter()) {
            if let (Some(pa), Some(pb)) = (a, b) {
                points_in_self.push(*pa);
                points_in_other.push(*pb);
            }
        }
        (points_in_self, points_in_other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn landmarks_at_depth(z: f64) -> FaceLandmarks3D {
        FaceLandmarks3D {
            nose_tip: Some([0.0, 0.0, z]),
            chin: Some([0.0, -0.05, z]),
            left_eye_left_corner: Some([-0.04, 0.03, z]),
            right_eye_right_corner: Some([0.04, 0.03, z]),
            left_mouth_corner: Some([-0.02, -0.03, z]),
            right_mouth_corner: Some([0.02, -0.03, z]),
        }
    }

    #[test]
    fn test_landmarks2d_json_names() {
        let json = r#"{
            "noseTip": [320.0, 240.0],
            "chin": [320.0, 300.0],
            "leftEyeLeftCorner": [280.0, 200.0],
            "rightEyeRightCorner": [360.0, 200.0],
            "leftMouthCorner": [300.0, 270.0],
            "rightMouthCorner": [340.0, 270.0]
        }"#;
        let landmarks: FaceLandmarks2D = serde_json::from_str(json).unwrap();
        assert_eq!(landmarks.nose_tip, [320.0, 240.0]);
        assert_eq!(landmarks.as_array()[5], [340.0, 270.0]);
    }

    #[test]
    fn test_resolved_pairs_skips_unresolved() {
        let a = landmarks_at_depth(0.3);
        let mut b = landmarks_at_depth(0.35);
        b.chin = None;
        b.left_mouth_corner = None;

        assert_eq!(a.resolved_count(), 6);
        assert_eq!(b.resolved_count(), 4);

        let (pa, pb) = a.resolved_pairs(&b);
        assert_eq!(pa.len(), 4);
        assert_eq!(pb.len(), 4);
        // nose tip survives as the first pair
        assert_eq!(pa[0], [0.0, 0.0, 0.3]);
        assert_eq!(pb[0], [0.0, 0.0, 0.35]);
    }

    #[test]
    fn test_from_array_round_trip() {
        let a = landmarks_at_depth(0.25);
        let b = FaceLandmarks3D::from_array(a.as_array());
        assert_eq!(a, b);
    }
}
