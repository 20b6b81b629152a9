use crate::error::FrameError;

/// The open depth window a sample must fall in to be valid.
///
/// Both bounds are exclusive; NaN depth never validates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthRange {
    /// Minimum valid depth in meters, exclusive.
    pub min: f32,
    /// Maximum valid depth in meters, exclusive.
    pub max: f32,
}

impl DepthRange {
    /// Check whether a depth sample is valid.
    #[inline]
    pub fn contains(&self, depth: f32) -> bool {
        !depth.is_nan() && depth > self.min && depth < self.max
    }
}

impl Default for DepthRange {
    /// The face-capture deployment window: (0.1, 0.5) meters.
    fn default() -> Self {
        Self { min: 0.1, max: 0.5 }
    }
}

/// One captured RGB-D frame, consumed by reconstruction.
///
/// The color buffer is BGRA8 (`width * height * 4` bytes); the depth buffer
/// holds `width * height` f32 meters.
#[derive(Debug, Clone)]
pub struct RgbdFrame {
    color: Vec<u8>,
    depth: Vec<f32>,
    width: usize,
    height: usize,
    depth_range: DepthRange,
    frame_id: usize,
}

impl RgbdFrame {
    /// Create a frame from raw capture buffers.
    ///
    /// # Arguments
    ///
    /// * `color` - BGRA8 bytes, `width * height * 4` long.
    /// * `depth` - Depth in meters, `width * height` long.
    /// * `width` - Frame width in pixels.
    /// * `height` - Frame height in pixels.
    /// * `depth_range` - Valid depth window for this capture.
    /// * `frame_id` - Capture sequence number, carried into the point cloud.
    ///
    /// # Errors
    ///
    /// [`FrameError::InvalidFrameBuffer`] when a buffer length does not
    /// match the dimensions; the frame is skipped, the session continues.
    pub fn new(
        color: Vec<u8>,
        depth: Vec<f32>,
        width: usize,
        height: usize,
        depth_range: DepthRange,
        frame_id: usize,
    ) -> Result<Self, FrameError> {
        if color.len() != width * height * 4 {
            return Err(FrameError::InvalidFrameBuffer {
                width,
                height,
                expected: width * height * 4,
                found: color.len(),
            });
        }
        if depth.len() != width * height {
            return Err(FrameError::InvalidFrameBuffer {
                width,
                height,
                expected: width * height,
                found: depth.len(),
            });
        }
        Ok(Self {
            color,
            depth,
            width,
            height,
            depth_range,
            frame_id,
        })
    }

    /// The raw BGRA8 color buffer.
    pub fn color(&self) -> &[u8] {
        &self.color
    }

    /// The raw depth buffer in meters.
    pub fn depth(&self) -> &[f32] {
        &self.depth
    }

    /// Frame width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Frame height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The valid depth window of this capture.
    #[inline]
    pub fn depth_range(&self) -> DepthRange {
        self.depth_range
    }

    /// The capture sequence number.
    #[inline]
    pub fn frame_id(&self) -> usize {
        self.frame_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_range_is_exclusive() {
        let range = DepthRange::default();
        assert!(range.contains(0.3));
        assert!(!range.contains(0.1));
        assert!(!range.contains(0.5));
        assert!(!range.contains(f32::NAN));
        assert!(!range.contains(-0.2));
        assert!(!range.contains(f32::INFINITY));
    }

    #[test]
    fn test_frame_rejects_short_color_buffer() {
        let err = RgbdFrame::new(
            vec![0u8; 4 * 4 * 4 - 1],
            vec![0.3f32; 4 * 4],
            4,
            4,
            DepthRange::default(),
            0,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FrameError::InvalidFrameBuffer {
                expected: 64,
                found: 63,
                ..
            }
        ));
    }

    #[test]
    fn test_frame_rejects_wrong_depth_buffer() {
        let err = RgbdFrame::new(
            vec![0u8; 4 * 4 * 4],
            vec![0.3f32; 17],
            4,
            4,
            DepthRange::default(),
            0,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FrameError::InvalidFrameBuffer {
                expected: 16,
                found: 17,
                ..
            }
        ));
    }
}
