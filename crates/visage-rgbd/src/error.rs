/// An error type for the frame reconstruction module.
///
/// Frame errors isolate a single frame: the caller drops the frame and the
/// session continues.
#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    /// Error when a raw buffer does not match the frame dimensions.
    #[error("Frame buffer length ({found}) does not match the expected {expected} for {width}x{height}")]
    InvalidFrameBuffer {
        /// Frame width in pixels.
        width: usize,
        /// Frame height in pixels.
        height: usize,
        /// Expected buffer length.
        expected: usize,
        /// Actual buffer length.
        found: usize,
    },

    /// Error when the undistortion map size does not match the frame size.
    #[error("Undistortion map ({map_width}x{map_height}) does not match the frame ({width}x{height})")]
    MapSizeMismatch {
        /// Map width in pixels.
        map_width: usize,
        /// Map height in pixels.
        map_height: usize,
        /// Frame width in pixels.
        width: usize,
        /// Frame height in pixels.
        height: usize,
    },
}
