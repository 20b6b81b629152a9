#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// BGRA decoding and sRGB gamma conversion.
pub mod color;

/// Error types for the frame reconstruction module.
pub mod error;

/// Raw RGB-D frame container and depth validity window.
pub mod frame;

/// Projection of 2D facial landmarks into camera space.
pub mod landmarks;

/// The frame-to-point-cloud reconstruction pipeline.
pub mod reconstruct;

/// Map-driven color and depth resampling.
pub mod resample;

pub use crate::error::FrameError;
pub use crate::frame::{DepthRange, RgbdFrame};
pub use crate::landmarks::project_landmarks;
pub use crate::reconstruct::{reconstruct_frame, FrameReconstruction};
