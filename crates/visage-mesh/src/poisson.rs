use visage_cloud::normals::{estimate_normals, NormalEstimationParams};
use visage_cloud::pointcloud::PointCloud;

use crate::error::MeshError;
use crate::marching::{grid_index, marching_cubes};
use crate::mesh::TriangleMesh;

/// Parameters for Poisson surface reconstruction.
#[derive(Debug, Clone)]
pub struct PoissonParams {
    /// Grid resolution exponent; the lattice has `2^depth` cells per axis.
    /// Valid range 1..=8.
    pub depth: u32,
    /// Number of Gauss-Seidel sweeps used to relax the indicator field.
    pub iterations: usize,
    /// Padding added on every side of the bounding box, as a fraction of
    /// its largest extent.
    pub padding: f64,
    /// Neighborhood parameters for the normal re-estimation pass.
    pub normals: NormalEstimationParams,
}

impl Default for PoissonParams {
    fn default() -> Self {
        Self {
            depth: 6,
            iterations: 64,
            padding: 0.1,
            normals: NormalEstimationParams::default(),
        }
    }
}

/// A scalar field sampled on a uniform cubic lattice.
struct LatticeField {
    values: Vec<f64>,
    dims: [usize; 3],
    origin: [f64; 3],
    voxel: f64,
}

impl LatticeField {
    fn zeros(dims: [usize; 3], origin: [f64; 3], voxel: f64) -> Self {
        Self {
            values: vec![0.0; dims[0] * dims[1] * dims[2]],
            dims,
            origin,
            voxel,
        }
    }

    /// Lattice cell containing `p` and the fractional position inside it.
    ///
    /// Positions outside the lattice clamp to the border cells.
    fn locate(&self, p: &[f64; 3]) -> ([usize; 3], [f64; 3]) {
        let mut base = [0usize; 3];
        let mut frac = [0.0; 3];
        for axis in 0..3 {
            let g = (p[axis] - self.origin[axis]) / self.voxel;
            let g = g.clamp(0.0, (self.dims[axis] - 1) as f64);
            let cell = (g.floor() as usize).min(self.dims[axis] - 2);
            base[axis] = cell;
            frac[axis] = g - cell as f64;
        }
        (base, frac)
    }

    /// Scatter `amount` into the eight samples around `p` with trilinear
    /// weights.
    fn splat(&mut self, p: &[f64; 3], amount: f64) {
        let (base, frac) = self.locate(p);
        for dz in 0..2 {
            for dy in 0..2 {
                for dx in 0..2 {
                    let w = corner_weight(frac[0], dx)
                        * corner_weight(frac[1], dy)
                        * corner_weight(frac[2], dz);
                    let idx = grid_index(&self.dims, base[0] + dx, base[1] + dy, base[2] + dz);
                    self.values[idx] += w * amount;
                }
            }
        }
    }

    /// Trilinear interpolation of the field at `p`.
    fn sample(&self, p: &[f64; 3]) -> f64 {
        let (base, frac) = self.locate(p);
        let mut value = 0.0;
        for dz in 0..2 {
            for dy in 0..2 {
                for dx in 0..2 {
                    let w = corner_weight(frac[0], dx)
                        * corner_weight(frac[1], dy)
                        * corner_weight(frac[2], dz);
                    let idx = grid_index(&self.dims, base[0] + dx, base[1] + dy, base[2] + dz);
                    value += w * self.values[idx];
                }
            }
        }
        value
    }
}

#[inline]
fn corner_weight(frac: f64, side: usize) -> f64 {
    if side == 0 {
        1.0 - frac
    } else {
        frac
    }
}

/// Reconstruct a triangle mesh from a merged, oriented point cloud.
///
/// Normals are first re-estimated toward the origin (merging can leave
/// orientation inconsistent across frames), then splatted into a vector
/// field on a uniform lattice over the padded bounding box. The indicator
/// function is relaxed by Gauss-Seidel sweeps of the Poisson equation
/// `laplacian(chi) = div(normal field)` with zero boundary values, and the
/// level set at the mean indicator value over the input samples is
/// extracted with marching cubes. Per-vertex densities are read from the
/// splatted sample-mass field, so low-support regions can be trimmed by
/// the caller.
///
/// # Arguments
///
/// * `cloud` - The merged point cloud in the reference frame.
/// * `params` - Grid resolution, solver sweeps and padding.
///
/// # Returns
///
/// The reconstructed mesh, or an error for degenerate input. No partial
/// mesh is ever returned.
pub fn reconstruct_surface(
    cloud: &PointCloud,
    params: &PoissonParams,
) -> Result<TriangleMesh, MeshError> {
    assert!((1..=8).contains(&params.depth));

    if cloud.is_empty() {
        return Err(MeshError::EmptyCloud);
    }

    let min_bound = cloud.min_bound();
    let max_bound = cloud.max_bound();
    let max_extent = (0..3)
        .map(|axis| max_bound[axis] - min_bound[axis])
        .fold(0.0, f64::max);
    if max_extent <= 0.0 {
        return Err(MeshError::EmptyCloud);
    }

    let normals = estimate_normals(cloud.points(), &[0.0, 0.0, 0.0], &params.normals);

    let cells = 1usize << params.depth;
    let dims = [cells + 1, cells + 1, cells + 1];
    let pad = params.padding * max_extent;
    let voxel = (max_extent + 2.0 * pad) / cells as f64;
    let origin = [
        min_bound[0] - pad,
        min_bound[1] - pad,
        min_bound[2] - pad,
    ];

    // splat the oriented normals and the per-sample mass
    let mut density = LatticeField::zeros(dims, origin, voxel);
    let divergence = {
        let mut field_x = LatticeField::zeros(dims, origin, voxel);
        let mut field_y = LatticeField::zeros(dims, origin, voxel);
        let mut field_z = LatticeField::zeros(dims, origin, voxel);
        for (point, normal) in cloud.points().iter().zip(normals.iter()) {
            field_x.splat(point, normal[0]);
            field_y.splat(point, normal[1]);
            field_z.splat(point, normal[2]);
            density.splat(point, 1.0);
        }
        divergence_of(&field_x, &field_y, &field_z)
    };

    let mut chi = LatticeField::zeros(dims, origin, voxel);
    gauss_seidel(&mut chi, &divergence, params.iterations);

    // the surface sits where the indicator crosses its mean over the samples
    let iso_level = cloud
        .points()
        .iter()
        .map(|p| chi.sample(p))
        .sum::<f64>()
        / cloud.len() as f64;

    let mut mesh = marching_cubes(&chi.values, dims, &origin, voxel, iso_level);
    if mesh.triangles.is_empty() {
        return Err(MeshError::ReconstructionFailed);
    }

    for (vertex, vertex_density) in mesh.vertices.iter().zip(mesh.densities.iter_mut()) {
        *vertex_density = density.sample(vertex);
    }

    log::debug!(
        "reconstructed {} vertices / {} triangles at depth {} (iso {:.3e})",
        mesh.vertices.len(),
        mesh.triangles.len(),
        params.depth,
        iso_level
    );
    Ok(mesh)
}

/// Central-difference divergence of a lattice vector field; boundary
/// samples stay zero.
fn divergence_of(
    field_x: &LatticeField,
    field_y: &LatticeField,
    field_z: &LatticeField,
) -> LatticeField {
    let dims = field_x.dims;
    let mut div = LatticeField::zeros(dims, field_x.origin, field_x.voxel);
    let inv_2h = 1.0 / (2.0 * field_x.voxel);

    for z in 1..dims[2] - 1 {
        for y in 1..dims[1] - 1 {
            for x in 1..dims[0] - 1 {
                let dx = field_x.values[grid_index(&dims, x + 1, y, z)]
                    - field_x.values[grid_index(&dims, x - 1, y, z)];
                let dy = field_y.values[grid_index(&dims, x, y + 1, z)]
                    - field_y.values[grid_index(&dims, x, y - 1, z)];
                let dz = field_z.values[grid_index(&dims, x, y, z + 1)]
                    - field_z.values[grid_index(&dims, x, y, z - 1)];
                div.values[grid_index(&dims, x, y, z)] = (dx + dy + dz) * inv_2h;
            }
        }
    }
    div
}

/// In-place Gauss-Seidel relaxation of `laplacian(chi) = rhs` with zero
/// Dirichlet boundary.
fn gauss_seidel(chi: &mut LatticeField, rhs: &LatticeField, iterations: usize) {
    let dims = chi.dims;
    let h_sq = chi.voxel * chi.voxel;

    for _ in 0..iterations {
        for z in 1..dims[2] - 1 {
            for y in 1..dims[1] - 1 {
                for x in 1..dims[0] - 1 {
                    let neighbor_sum = chi.values[grid_index(&dims, x - 1, y, z)]
                        + chi.values[grid_index(&dims, x + 1, y, z)]
                        + chi.values[grid_index(&dims, x, y - 1, z)]
                        + chi.values[grid_index(&dims, x, y + 1, z)]
                        + chi.values[grid_index(&dims, x, y, z - 1)]
                        + chi.values[grid_index(&dims, x, y, z + 1)];
                    let idx = grid_index(&dims, x, y, z);
                    chi.values[idx] = (neighbor_sum - h_sq * rhs.values[idx]) / 6.0;
                }
            }
        }
    }
}
