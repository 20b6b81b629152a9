use visage_calib::{CameraIntrinsic, UndistortionMap};
use visage_cloud::normals::{estimate_normals, NormalEstimationParams};
use visage_cloud::pointcloud::PointCloud;

use crate::color::linear_rgb_from_bgra8;
use crate::error::FrameError;
use crate::frame::RgbdFrame;
use crate::resample::{remap_bilinear_rgb, remap_nearest_depth};

/// The output of single-frame reconstruction.
#[derive(Debug, Clone)]
pub struct FrameReconstruction {
    /// The reconstructed point cloud in camera space, normals oriented
    /// toward the camera.
    pub cloud: PointCloud,
    /// Row-major validity mask, 255 where a point was produced and 0
    /// elsewhere.
    pub mask: Vec<u8>,
    /// The undistorted depth plane in meters, consumed by landmark
    /// projection.
    pub undistorted_depth: Vec<f32>,
}

/// Back-project one pixel through the pinhole model.
///
/// # Arguments
///
/// * `x` - Pixel x coordinate, may be fractional.
/// * `y` - Pixel y coordinate, may be fractional.
/// * `depth` - Depth along the optical axis in meters.
/// * `intrinsic` - The scaled camera intrinsic.
///
/// # Returns
///
/// The camera-space position in meters.
#[inline]
pub fn project_pixel(x: f64, y: f64, depth: f64, intrinsic: &CameraIntrinsic) -> [f64; 3] {
    [
        (x - intrinsic.cx) * depth / intrinsic.fx,
        (y - intrinsic.cy) * depth / intrinsic.fy,
        depth,
    ]
}

/// Reconstruct a colored, normal-bearing point cloud from one RGB-D frame.
///
/// The color image is gamma-decoded and undistorted with bilinear
/// interpolation, the depth plane is undistorted with nearest-neighbor
/// sampling, and every pixel whose undistorted depth passes the frame's
/// validity window is back-projected through the pinhole model. Normals are
/// estimated on the resulting cloud and oriented toward the camera origin.
///
/// # Arguments
///
/// * `frame` - The raw frame.
/// * `intrinsic` - Intrinsic already scaled to the frame resolution.
/// * `map` - Undistortion map of the same size as the frame.
/// * `normal_params` - Neighborhood parameters for normal estimation.
///
/// # Returns
///
/// The point cloud together with the validity mask and the undistorted
/// depth plane.
pub fn reconstruct_frame(
    frame: &RgbdFrame,
    intrinsic: &CameraIntrinsic,
    map: &UndistortionMap,
    normal_params: &NormalEstimationParams,
) -> Result<FrameReconstruction, FrameError> {
    let (width, height) = (frame.width(), frame.height());
    if map.width() != width || map.height() != height {
        return Err(FrameError::MapSizeMismatch {
            map_width: map.width(),
            map_height: map.height(),
            width,
            height,
        });
    }

    let pixels = width * height;

    let mut linear_rgb = vec![0.0f64; pixels * 3];
    linear_rgb_from_bgra8(frame.color(), width, &mut linear_rgb);

    let mut undistorted_rgb = vec![0.0f64; pixels * 3];
    remap_bilinear_rgb(&linear_rgb, map, &mut undistorted_rgb)?;

    let mut undistorted_depth = vec![0.0f32; pixels];
    remap_nearest_depth(frame.depth(), map, &mut undistorted_depth)?;

    let range = frame.depth_range();
    let mut mask = vec![0u8; pixels];
    let mut points = Vec::with_capacity(pixels);
    let mut colors = Vec::with_capacity(pixels);

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let depth = undistorted_depth[idx];
            if !range.contains(depth) {
                continue;
            }
            mask[idx] = 255;
            points.push(project_pixel(
                x as f64,
                y as f64,
                depth as f64,
                intrinsic,
            ));
            colors.push([
                undistorted_rgb[idx * 3],
                undistorted_rgb[idx * 3 + 1],
                undistorted_rgb[idx * 3 + 2],
            ]);
        }
    }

    if pixels > 0 {
        log::debug!(
            "frame {}: kept {} of {} pixels ({:.1}%)",
            frame.frame_id(),
            points.len(),
            pixels,
            100.0 * points.len() as f64 / pixels as f64
        );
    }

    // the camera sits at the origin of its own frame
    let normals = estimate_normals(&points, &[0.0, 0.0, 0.0], normal_params);
    let cloud = PointCloud::new(points, colors, normals, frame.frame_id());

    Ok(FrameReconstruction {
        cloud,
        mask,
        undistorted_depth,
    })
}
