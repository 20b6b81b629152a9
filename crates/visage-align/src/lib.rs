#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the alignment module.
pub mod error;

/// Kabsch rigid-transform estimation over landmark correspondences.
pub mod kabsch;

pub use crate::error::AlignmentError;
pub use crate::kabsch::{compute_rigid_transform, fit_rigid_transform, landmark_rmsd, rmsd};
