use crate::data::CalibrationData;

/// A per-pixel map from undistorted pixel coordinates to source sample
/// coordinates.
///
/// Built once from [`CalibrationData`] and shared read-only across all
/// frames of a session; both planes are row-major `width * height`.
#[derive(Debug, Clone)]
pub struct UndistortionMap {
    map_x: Vec<f32>,
    map_y: Vec<f32>,
    width: usize,
    height: usize,
}

impl UndistortionMap {
    /// The identity map: every pixel samples itself.
    ///
    /// Useful for captures without distortion correction and for tests.
    pub fn identity(width: usize, height: usize) -> Self {
        let mut map_x = vec![0.0f32; width * height];
        let mut map_y = vec![0.0f32; width * height];
        for y in 0..height {
            for x in 0..width {
                map_x[y * width + x] = x as f32;
                map_y[y * width + x] = y as f32;
            }
        }
        Self {
            map_x,
            map_y,
            width,
            height,
        }
    }

    /// Build a map from precomputed sample-coordinate planes.
    ///
    /// PRECONDITION: both planes are row-major and `width * height` long.
    pub fn from_planes(map_x: Vec<f32>, map_y: Vec<f32>, width: usize, height: usize) -> Self {
        assert_eq!(map_x.len(), width * height);
        assert_eq!(map_y.len(), width * height);
        Self {
            map_x,
            map_y,
            width,
            height,
        }
    }

    /// The map width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// The map height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major x sample coordinates.
    pub fn map_x(&self) -> &[f32] {
        &self.map_x
    }

    /// Row-major y sample coordinates.
    pub fn map_y(&self) -> &[f32] {
        &self.map_y
    }

    /// The (src_x, src_y) sample coordinate for an output pixel.
    ///
    /// PRECONDITION: `x < width` and `y < height`.
    #[inline]
    pub fn sample_coords(&self, x: usize, y: usize) -> (f32, f32) {
        let idx = y * self.width + x;
        (self.map_x[idx], self.map_y[idx])
    }
}

/// Build the undistortion map for a pixel grid of the given size.
///
/// For every pixel the radial distance from the principal point is
/// normalized by the maximum radius over the whole grid, a correction scale
/// is interpolated from the inverse lens-distortion table at fractional
/// index `normalized_radius * table_len`, and the sample coordinate becomes
/// `delta * (1 + scale) + principal_point`. An empty table produces the
/// identity map.
///
/// # Arguments
///
/// * `calibration` - Parsed calibration whose inverse table drives the map.
/// * `width` - Output grid width in pixels.
/// * `height` - Output grid height in pixels.
///
/// # Returns
///
/// The undistortion map, safe to share across frames.
pub fn build_undistortion_map(
    calibration: &CalibrationData,
    width: usize,
    height: usize,
) -> UndistortionMap {
    let k = calibration.intrinsic();
    let table = calibration.inverse_distortion_lookup();

    // maximum radius over the entire grid sets the normalization scale
    let mut radii = vec![0.0f64; width * height];
    let mut max_r = 0.0f64;
    for y in 0..height {
        for x in 0..width {
            let dx = x as f64 - k.cx;
            let dy = y as f64 - k.cy;
            let r = (dx * dx + dy * dy).sqrt();
            radii[y * width + x] = r;
            if r > max_r {
                max_r = r;
            }
        }
    }

    let mut map_x = vec![0.0f32; width * height];
    let mut map_y = vec![0.0f32; width * height];
    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let norm_r = if max_r > 0.0 { radii[idx] / max_r } else { 0.0 };
            let scale = 1.0 + interpolate_lookup(table, norm_r * table.len() as f64);
            map_x[idx] = ((x as f64 - k.cx) * scale + k.cx) as f32;
            map_y[idx] = ((y as f64 - k.cy) * scale + k.cy) as f32;
        }
    }

    log::debug!(
        "built undistortion map {}x{} (max_r={:.2}, table_len={})",
        width,
        height,
        max_r,
        table.len()
    );

    UndistortionMap {
        map_x,
        map_y,
        width,
        height,
    }
}

/// Linearly interpolate the lookup table at a fractional index.
///
/// Indices outside the table are clamped flat to the first/last entry;
/// an empty table reads as zero correction.
fn interpolate_lookup(table: &[f32], index: f64) -> f64 {
    if table.is_empty() {
        return 0.0;
    }
    let i = index.floor() as isize;
    if i < 0 {
        return table[0] as f64;
    }
    if i as usize >= table.len() - 1 {
        return table[table.len() - 1] as f64;
    }
    let alpha = index - i as f64;
    table[i as usize] as f64 * (1.0 - alpha) + table[i as usize + 1] as f64 * alpha
}
