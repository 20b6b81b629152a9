/// An error type for surface reconstruction.
///
/// Mesh errors are terminal for a session: no partial mesh is emitted.
#[derive(thiserror::Error, Debug)]
pub enum MeshError {
    /// Error when the merged cloud is empty or has a zero-volume bounding box.
    #[error("Cannot reconstruct a surface from an empty or degenerate point cloud")]
    EmptyCloud,

    /// Error when the indicator field produced no triangles.
    #[error("Surface reconstruction produced no triangles")]
    ReconstructionFailed,
}
