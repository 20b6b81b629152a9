//! End-to-end facial reconstruction over a synthetic multi-frame capture.
//!
//! Renders a drifting dome as a stand-in for a slowly moving face, runs the
//! per-frame stage in parallel, aligns every frame onto the first one through
//! the shared landmarks and extracts the merged surface. Two deliberately
//! broken captures show that a bad frame is dropped, not fatal.
//!
//! Run with `RUST_LOG=debug cargo run --example synthetic_scan` to see the
//! per-frame reporting.

use rayon::prelude::*;

use visage::align::{compute_rigid_transform, landmark_rmsd};
use visage::calib::{build_undistortion_map, CalibrationData, UndistortionMap};
use visage::cloud::landmarks::{FaceLandmarks2D, FaceLandmarks3D};
use visage::cloud::normals::NormalEstimationParams;
use visage::cloud::pointcloud::PointCloud;
use visage::cloud::transforms::RigidTransform;
use visage::mesh::{
    merge, reconstruct_surface, remove_long_edges, remove_unreferenced_vertices, PoissonParams,
    DEFAULT_MAX_EDGE,
};
use visage::rgbd::{project_landmarks, reconstruct_frame, DepthRange, FrameError, RgbdFrame};

const WIDTH: usize = 128;
const HEIGHT: usize = 96;

/// A distortion-free record calibrated at 640 px; capturing at 128 px
/// scales the intrinsics by 0.2.
const CALIBRATION_JSON: &str = r#"{
    "lensDistortionLookup": "",
    "inverseLensDistortionLookup": "",
    "intrinsic": [500.0, 0.0, 0.0, 0.0, 500.0, 0.0, 320.0, 240.0, 1.0],
    "intrinsicReferenceDimensionWidth": 640
}"#;

/// One raw capture as it would arrive from the device.
struct Capture {
    color: Vec<u8>,
    depth: Vec<f32>,
    landmarks: FaceLandmarks2D,
    frame_id: usize,
}

fn dome_depth(x: usize, y: usize, center: &[f64; 2]) -> f32 {
    let dx = x as f64 - center[0];
    let dy = y as f64 - center[1];
    (0.32 - 0.03 * (-(dx * dx + dy * dy) / 1800.0).exp()) as f32
}

/// Detector output tracking the dome center with fractional coordinates.
fn detector_landmarks(center: &[f64; 2]) -> FaceLandmarks2D {
    FaceLandmarks2D {
        nose_tip: [center[0], center[1]],
        chin: [center[0], center[1] + 16.5],
        left_eye_left_corner: [center[0] - 13.5, center[1] - 10.0],
        right_eye_right_corner: [center[0] + 13.5, center[1] - 10.0],
        left_mouth_corner: [center[0] - 8.0, center[1] + 10.5],
        right_mouth_corner: [center[0] + 8.0, center[1] + 10.5],
    }
}

fn render_capture(center: &[f64; 2], frame_id: usize) -> Capture {
    let mut color = vec![0u8; WIDTH * HEIGHT * 4];
    let mut depth = vec![0.0f32; WIDTH * HEIGHT];
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let idx = y * WIDTH + x;
            depth[idx] = dome_depth(x, y, center);
            // a warm tone in BGRA byte order
            color[idx * 4] = 150;
            color[idx * 4 + 1] = 180;
            color[idx * 4 + 2] = 220;
            color[idx * 4 + 3] = 255;
        }
    }
    Capture {
        color,
        depth,
        landmarks: detector_landmarks(center),
        frame_id,
    }
}

fn synthesize_captures() -> Vec<Capture> {
    let centers = [
        [64.0, 48.0],
        [61.5, 49.0],
        [66.0, 46.5],
        [63.0, 51.0],
        [67.5, 48.5],
    ];
    let mut captures = centers
        .iter()
        .enumerate()
        .map(|(frame_id, center)| render_capture(center, frame_id))
        .collect::<Vec<_>>();

    // a capture whose depth buffer was truncated upstream
    captures.push(Capture {
        color: vec![0; WIDTH * HEIGHT * 4],
        depth: vec![0.3; WIDTH * HEIGHT - 7],
        landmarks: detector_landmarks(&[64.0, 48.0]),
        frame_id: 5,
    });

    // a capture of an empty scene, everything beyond the far plane
    captures.push(Capture {
        color: vec![0; WIDTH * HEIGHT * 4],
        depth: vec![0.9; WIDTH * HEIGHT],
        landmarks: detector_landmarks(&[64.0, 48.0]),
        frame_id: 6,
    });

    captures
}

/// The per-frame stage: validate the buffers, reconstruct the cloud and
/// resolve the landmarks against the undistorted depth.
fn reconstruct_capture(
    capture: Capture,
    calibration: &CalibrationData,
    map: &UndistortionMap,
    normal_params: &NormalEstimationParams,
) -> Result<(PointCloud, FaceLandmarks3D), FrameError> {
    let frame = RgbdFrame::new(
        capture.color,
        capture.depth,
        WIDTH,
        HEIGHT,
        DepthRange::default(),
        capture.frame_id,
    )?;
    let reconstruction = reconstruct_frame(&frame, calibration.intrinsic(), map, normal_params)?;
    let landmarks = project_landmarks(
        &capture.landmarks,
        &reconstruction.undistorted_depth,
        WIDTH,
        HEIGHT,
        calibration.intrinsic(),
        &frame.depth_range(),
    );
    Ok((reconstruction.cloud, landmarks))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let calibration = CalibrationData::from_json(CALIBRATION_JSON, WIDTH)?;
    let map = build_undistortion_map(&calibration, WIDTH, HEIGHT);
    // tight radius for the synthetic capture density
    let normal_params = NormalEstimationParams {
        radius: 0.02,
        max_neighbors: 30,
    };

    // the per-frame stage runs one job per capture; bad captures drop out
    let frames = synthesize_captures()
        .into_par_iter()
        .filter_map(|capture| {
            let frame_id = capture.frame_id;
            match reconstruct_capture(capture, &calibration, &map, &normal_params) {
                Ok(result) => Some(result),
                Err(err) => {
                    log::warn!("frame {frame_id} dropped: {err}");
                    None
                }
            }
        })
        .collect::<Vec<_>>();
    println!("{} of 7 captures reconstructed", frames.len());

    let Some(((reference_cloud, reference_landmarks), rest)) = frames.split_first() else {
        println!("no capture survived reconstruction");
        return Ok(());
    };

    // align every later frame onto the first through the shared landmarks
    let mut aligned = vec![(reference_cloud.clone(), RigidTransform::IDENTITY)];
    for (cloud, landmarks) in rest {
        match compute_rigid_transform(landmarks, reference_landmarks) {
            Ok(transform) => {
                let rmsd = landmark_rmsd(landmarks, reference_landmarks, &transform);
                println!(
                    "frame {} aligned onto frame {}, landmark rmsd {:.3} mm",
                    cloud.frame_id(),
                    reference_cloud.frame_id(),
                    rmsd * 1e3
                );
                aligned.push((cloud.clone(), transform));
            }
            Err(err) => log::warn!("frame {} dropped: {err}", cloud.frame_id()),
        }
    }

    let merged = merge(&aligned);
    println!(
        "merged {} points from {} aligned frames",
        merged.len(),
        aligned.len()
    );

    let params = PoissonParams {
        depth: 7,
        normals: normal_params,
        ..Default::default()
    };
    let mut mesh = reconstruct_surface(&merged, &params)?;
    println!(
        "reconstructed surface: {} vertices, {} triangles",
        mesh.vertices.len(),
        mesh.triangles.len()
    );

    let trimmed_triangles = remove_long_edges(&mut mesh, DEFAULT_MAX_EDGE);
    let trimmed_vertices = remove_unreferenced_vertices(&mut mesh);
    println!(
        "cleanup trimmed {} triangles and {} vertices; final surface has {} triangles",
        trimmed_triangles,
        trimmed_vertices,
        mesh.triangles.len()
    );

    Ok(())
}
