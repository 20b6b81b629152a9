#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the mesh module.
pub mod error;

/// Marching cubes iso-surface extraction.
pub mod marching;

/// Concatenation of aligned point clouds.
pub mod merge;

/// Triangle mesh container and cleanup passes.
pub mod mesh;

/// Poisson surface reconstruction on a uniform lattice.
pub mod poisson;

pub use crate::error::MeshError;
pub use crate::marching::marching_cubes;
pub use crate::merge::merge;
pub use crate::mesh::{
    remove_long_edges, remove_unreferenced_vertices, TriangleMesh, DEFAULT_MAX_EDGE,
};
pub use crate::poisson::{reconstruct_surface, PoissonParams};
