use std::sync::atomic::{AtomicUsize, Ordering};

use glam::DVec3;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use rayon::prelude::*;

use crate::utils::{array3_to_dvec3, dvec3_to_array3};

/// Parameters for local-plane normal estimation.
#[derive(Debug, Clone, Copy)]
pub struct NormalEstimationParams {
    /// Neighbor search radius in meters.
    pub radius: f64,
    /// Maximum number of neighbors used per plane fit, nearest first.
    pub max_neighbors: usize,
}

impl Default for NormalEstimationParams {
    fn default() -> Self {
        Self {
            radius: 0.1,
            max_neighbors: 30,
        }
    }
}

/// Estimate per-point unit normals and orient them toward a viewpoint.
///
/// For each point, the neighbors within `params.radius` (capped at
/// `params.max_neighbors`, nearest first) are gathered from a k-d tree and a
/// local plane is fit as the smallest-singular-value direction of their
/// covariance. Each normal is flipped so it faces the viewpoint:
/// `normal . (point - viewpoint) < 0`.
///
/// Points with fewer than 3 usable neighbors fall back to the unit vector
/// pointing from the point toward the viewpoint.
///
/// # Arguments
///
/// * `points` - The cloud positions.
/// * `viewpoint` - The capturing viewpoint, usually the camera origin.
/// * `params` - Search radius and neighbor cap.
///
/// # Returns
///
/// One unit normal per input point.
pub fn estimate_normals(
    points: &[[f64; 3]],
    viewpoint: &[f64; 3],
    params: &NormalEstimationParams,
) -> Vec<[f64; 3]> {
    if points.is_empty() {
        return Vec::new();
    }

    let kdtree: ImmutableKdTree<f64, u32, 3, 32> = ImmutableKdTree::new_from_slice(points);
    let radius_sq = params.radius * params.radius;
    let fallbacks = AtomicUsize::new(0);

    let normals = points
        .par_iter()
        .map(|point| {
            let neighbors = kdtree.within::<kiddo::SquaredEuclidean>(point, radius_sq);
            let indices = neighbors
                .iter()
                .take(params.max_neighbors)
                .map(|nn| nn.item as usize)
                .collect::<Vec<_>>();

            match covariance_normal(points, &indices) {
                Some(normal) => orient_toward_viewpoint(normal, point, viewpoint),
                None => {
                    fallbacks.fetch_add(1, Ordering::Relaxed);
                    view_direction_normal(point, viewpoint)
                }
            }
        })
        .collect::<Vec<_>>();

    let fallbacks = fallbacks.load(Ordering::Relaxed);
    if fallbacks > 0 {
        log::debug!(
            "normal estimation: {} of {} points had fewer than 3 neighbors within radius {}",
            fallbacks,
            points.len(),
            params.radius
        );
    }

    normals
}

/// Fit a plane to the indexed points and return its unit normal.
///
/// The normal is the right singular vector of the centered covariance with
/// the smallest singular value. Returns `None` when fewer than 3 points are
/// given or the points coincide.
fn covariance_normal(points: &[[f64; 3]], indices: &[usize]) -> Option<[f64; 3]> {
    if indices.len() < 3 {
        return None;
    }

    let mut mean = DVec3::ZERO;
    for &i in indices {
        mean += array3_to_dvec3(&points[i]);
    }
    mean /= indices.len() as f64;

    let mut cov = [[0.0; 3]; 3];
    for &i in indices {
        let d = array3_to_dvec3(&points[i]) - mean;
        let d = [d.x, d.y, d.z];
        for (r, cov_row) in cov.iter_mut().enumerate() {
            for (c, cov_val) in cov_row.iter_mut().enumerate() {
                *cov_val += d[r] * d[c];
            }
        }
    }

    let cov_mat = faer::Mat::<f64>::from_fn(3, 3, |i, j| cov[i][j]);
    let svd = cov_mat.svd();

    // all neighbors coincide, no plane to fit
    let s = svd.s_diagonal();
    if s[0] <= f64::EPSILON {
        return None;
    }

    let v = svd.v();
    let normal = v.col(2);
    Some([normal[0], normal[1], normal[2]])
}

/// Flip the normal if it points away from the viewpoint.
fn orient_toward_viewpoint(
    normal: [f64; 3],
    point: &[f64; 3],
    viewpoint: &[f64; 3],
) -> [f64; 3] {
    let n = array3_to_dvec3(&normal);
    let to_point = array3_to_dvec3(point) - array3_to_dvec3(viewpoint);
    if n.dot(to_point) >= 0.0 {
        dvec3_to_array3(-n)
    } else {
        normal
    }
}

/// Unit vector from the point toward the viewpoint.
fn view_direction_normal(point: &[f64; 3], viewpoint: &[f64; 3]) -> [f64; 3] {
    let dir = array3_to_dvec3(viewpoint) - array3_to_dvec3(point);
    if dir.length_squared() > 1e-24 {
        dvec3_to_array3(dir.normalize())
    } else {
        [0.0, 0.0, -1.0]
    }
}
