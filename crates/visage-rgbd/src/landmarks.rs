use visage_calib::CameraIntrinsic;
use visage_cloud::landmarks::{FaceLandmarks2D, FaceLandmarks3D, LANDMARK_NAMES};

use crate::frame::DepthRange;
use crate::reconstruct::project_pixel;

/// Project detected 2D landmarks into camera space through the depth plane.
///
/// Each landmark samples the undistorted depth at its nearest pixel and is
/// back-projected with its original fractional coordinates. A landmark
/// outside the frame or over an invalid depth sample resolves to `None`.
///
/// # Arguments
///
/// * `landmarks` - Detector output in the depth plane's pixel grid.
/// * `undistorted_depth` - Row-major depth in meters, `width * height` long.
/// * `width` - Depth plane width in pixels.
/// * `height` - Depth plane height in pixels.
/// * `intrinsic` - Intrinsic already scaled to the frame resolution.
/// * `range` - The depth validity window.
pub fn project_landmarks(
    landmarks: &FaceLandmarks2D,
    undistorted_depth: &[f32],
    width: usize,
    height: usize,
    intrinsic: &CameraIntrinsic,
    range: &DepthRange,
) -> FaceLandmarks3D {
    let mut positions = [None; 6];
    for (i, [x, y]) in landmarks.as_array().into_iter().enumerate() {
        positions[i] = project_landmark(x, y, undistorted_depth, width, height, intrinsic, range);
        if positions[i].is_none() {
            log::debug!(
                "landmark {} unresolved at ({:.1}, {:.1})",
                LANDMARK_NAMES[i],
                x,
                y
            );
        }
    }
    FaceLandmarks3D::from_array(positions)
}

fn project_landmark(
    x: f64,
    y: f64,
    undistorted_depth: &[f32],
    width: usize,
    height: usize,
    intrinsic: &CameraIntrinsic,
    range: &DepthRange,
) -> Option<[f64; 3]> {
    // depth is sampled at the rounded pixel, the projection keeps the
    // fractional detector coordinates
    let px = x.round();
    let py = y.round();
    if !(px >= 0.0 && py >= 0.0 && px < width as f64 && py < height as f64) {
        return None;
    }

    let depth = undistorted_depth[py as usize * width + px as usize];
    if !range.contains(depth) {
        return None;
    }
    Some(project_pixel(x, y, depth as f64, intrinsic))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const WIDTH: usize = 64;
    const HEIGHT: usize = 48;

    fn test_intrinsic() -> CameraIntrinsic {
        CameraIntrinsic {
            fx: 500.0,
            fy: 500.0,
            cx: 32.0,
            cy: 24.0,
        }
    }

    fn face_landmarks() -> FaceLandmarks2D {
        FaceLandmarks2D {
            nose_tip: [32.0, 24.0],
            chin: [32.0, 40.0],
            left_eye_left_corner: [20.0, 16.0],
            right_eye_right_corner: [44.0, 16.0],
            left_mouth_corner: [26.0, 32.0],
            right_mouth_corner: [38.0, 32.0],
        }
    }

    #[test]
    fn test_all_landmarks_resolve_over_valid_depth() {
        let depth = vec![0.3f32; WIDTH * HEIGHT];
        let result = project_landmarks(
            &face_landmarks(),
            &depth,
            WIDTH,
            HEIGHT,
            &test_intrinsic(),
            &DepthRange::default(),
        );

        assert_eq!(result.resolved_count(), 6);
        let nose = result.nose_tip.unwrap();
        assert_relative_eq!(nose[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(nose[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(nose[2], 0.3, epsilon = 1e-6);

        let chin = result.chin.unwrap();
        assert_relative_eq!(chin[1], (40.0 - 24.0) * 0.3 / 500.0, epsilon = 1e-6);
    }

    #[test]
    fn test_out_of_frame_landmark_is_unresolved() {
        let depth = vec![0.3f32; WIDTH * HEIGHT];
        let mut landmarks = face_landmarks();
        landmarks.chin = [32.0, 500.0];
        landmarks.left_mouth_corner = [-3.0, 32.0];

        let result = project_landmarks(
            &landmarks,
            &depth,
            WIDTH,
            HEIGHT,
            &test_intrinsic(),
            &DepthRange::default(),
        );

        assert!(result.chin.is_none());
        assert!(result.left_mouth_corner.is_none());
        assert_eq!(result.resolved_count(), 4);
    }

    #[test]
    fn test_invalid_depth_sample_is_unresolved() {
        let mut depth = vec![0.3f32; WIDTH * HEIGHT];
        depth[24 * WIDTH + 32] = f32::NAN;

        let result = project_landmarks(
            &face_landmarks(),
            &depth,
            WIDTH,
            HEIGHT,
            &test_intrinsic(),
            &DepthRange::default(),
        );

        assert!(result.nose_tip.is_none());
        assert_eq!(result.resolved_count(), 5);
    }

    #[test]
    fn test_depth_sampled_at_rounded_pixel_projection_keeps_fraction() {
        // depth is only valid at the pixel the landmark rounds to
        let mut depth = vec![f32::NAN; WIDTH * HEIGHT];
        depth[24 * WIDTH + 32] = 0.3;

        let mut landmarks = face_landmarks();
        landmarks.nose_tip = [31.6, 23.7];

        let result = project_landmarks(
            &landmarks,
            &depth,
            WIDTH,
            HEIGHT,
            &test_intrinsic(),
            &DepthRange::default(),
        );

        let nose = result.nose_tip.unwrap();
        assert_relative_eq!(nose[0], (31.6 - 32.0) * 0.3 / 500.0, epsilon = 1e-6);
        assert_relative_eq!(nose[1], (23.7 - 24.0) * 0.3 / 500.0, epsilon = 1e-6);
        assert_eq!(result.resolved_count(), 1);
    }
}
