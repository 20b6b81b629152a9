#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Calibration record parsing and intrinsic scaling.
pub mod data;

/// Error types for the calibration module.
pub mod error;

/// Per-pixel undistortion map construction.
pub mod undistort;

pub use crate::data::{CalibrationData, CalibrationRecord, CameraIntrinsic};
pub use crate::error::CalibrationError;
pub use crate::undistort::{build_undistortion_map, UndistortionMap};
