#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Fixed six-point facial landmark records in pixel and camera space.
pub mod landmarks;

/// Rigid transforms applied to points, normals and whole clouds.
pub mod linalg;

/// Covariance-based normal estimation over a k-d tree.
pub mod normals;

/// Colored, normal-bearing point cloud container.
pub mod pointcloud;

/// Rotation and rigid-transform construction helpers.
pub mod transforms;

/// Conversions between plain arrays and glam/faer types.
pub mod utils;
