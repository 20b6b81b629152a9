/// Long-edge threshold in meters tuned for face scans at arm's length.
pub const DEFAULT_MAX_EDGE: f64 = 0.004893;

/// A triangle mesh with per-vertex reconstruction densities.
///
/// `densities` is parallel to `vertices`; a low density marks a vertex with
/// little sample support, a candidate for trimming by the caller.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions in meters.
    pub vertices: Vec<[f64; 3]>,
    /// Vertex indices of each triangle.
    pub triangles: Vec<[usize; 3]>,
    /// Per-vertex sample-density weight from reconstruction.
    pub densities: Vec<f64>,
}

impl TriangleMesh {
    /// An empty mesh.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Remove every triangle with an edge longer than `max_edge` meters.
///
/// Long edges bridge unrelated surface patches where the reconstruction had
/// no samples. Vertices are untouched; follow up with
/// [`remove_unreferenced_vertices`] to compact them.
///
/// # Returns
///
/// The number of triangles removed.
pub fn remove_long_edges(mesh: &mut TriangleMesh, max_edge: f64) -> usize {
    let max_edge_sq = max_edge * max_edge;
    let vertices = &mesh.vertices;
    let before = mesh.triangles.len();

    mesh.triangles.retain(|triangle| {
        let a = vertices[triangle[0]];
        let b = vertices[triangle[1]];
        let c = vertices[triangle[2]];
        distance_sq(&a, &b) <= max_edge_sq
            && distance_sq(&b, &c) <= max_edge_sq
            && distance_sq(&c, &a) <= max_edge_sq
    });

    let removed = before - mesh.triangles.len();
    if removed > 0 {
        log::debug!("removed {} long-edge triangles of {}", removed, before);
    }
    removed
}

/// Drop vertices referenced by no triangle and remap triangle indices.
///
/// # Returns
///
/// The number of vertices removed.
pub fn remove_unreferenced_vertices(mesh: &mut TriangleMesh) -> usize {
    let mut used = vec![false; mesh.vertices.len()];
    for triangle in &mesh.triangles {
        for &index in triangle {
            used[index] = true;
        }
    }

    let mut remap = vec![usize::MAX; mesh.vertices.len()];
    let mut kept = 0;
    for (index, &is_used) in used.iter().enumerate() {
        if is_used {
            remap[index] = kept;
            kept += 1;
        }
    }
    let removed = mesh.vertices.len() - kept;
    if removed == 0 {
        return 0;
    }

    for index in 0..mesh.vertices.len() {
        if used[index] {
            mesh.vertices[remap[index]] = mesh.vertices[index];
            mesh.densities[remap[index]] = mesh.densities[index];
        }
    }
    mesh.vertices.truncate(kept);
    mesh.densities.truncate(kept);

    for triangle in mesh.triangles.iter_mut() {
        for index in triangle.iter_mut() {
            *index = remap[*index];
        }
    }

    log::debug!("removed {} unreferenced vertices", removed);
    removed
}

fn distance_sq(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}
