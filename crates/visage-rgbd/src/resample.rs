use rayon::prelude::*;
use visage_calib::UndistortionMap;

use crate::error::FrameError;

/// Remap a linear-RGB image through an undistortion map with bilinear
/// interpolation.
///
/// Output pixel `(x, y)` samples the source at `map.sample_coords(x, y)`.
/// Sample coordinates are clamped to the image bounds, so border pixels
/// repeat outward. Source and destination share the map's grid size.
///
/// # Arguments
///
/// * `src` - Interleaved RGB, `width * height * 3` long.
/// * `map` - Per-pixel sample coordinates.
/// * `dst` - Output RGB of the same length as `src`.
pub fn remap_bilinear_rgb(
    src: &[f64],
    map: &UndistortionMap,
    dst: &mut [f64],
) -> Result<(), FrameError> {
    check_plane_len(src.len(), map, 3)?;
    check_plane_len(dst.len(), map, 3)?;

    let (width, height) = (map.width(), map.height());
    if width == 0 || height == 0 {
        return Ok(());
    }

    dst.par_chunks_exact_mut(width * 3)
        .zip(map.map_x().par_chunks_exact(width))
        .zip(map.map_y().par_chunks_exact(width))
        .for_each(|((dst_row, map_x_row), map_y_row)| {
            dst_row
                .chunks_exact_mut(3)
                .zip(map_x_row.iter().zip(map_y_row.iter()))
                .for_each(|(dst_pixel, (&x, &y))| {
                    dst_pixel.copy_from_slice(&bilinear_sample_rgb(src, width, height, x, y));
                });
        });

    Ok(())
}

/// Remap a depth plane through an undistortion map with nearest-neighbor
/// sampling.
///
/// Nearest sampling is required for depth so discontinuities at object
/// silhouettes are never blended into phantom surfaces.
pub fn remap_nearest_depth(
    src: &[f32],
    map: &UndistortionMap,
    dst: &mut [f32],
) -> Result<(), FrameError> {
    check_plane_len(src.len(), map, 1)?;
    check_plane_len(dst.len(), map, 1)?;

    let (width, height) = (map.width(), map.height());
    if width == 0 || height == 0 {
        return Ok(());
    }

    dst.par_chunks_exact_mut(width)
        .zip(map.map_x().par_chunks_exact(width))
        .zip(map.map_y().par_chunks_exact(width))
        .for_each(|((dst_row, map_x_row), map_y_row)| {
            dst_row
                .iter_mut()
                .zip(map_x_row.iter().zip(map_y_row.iter()))
                .for_each(|(dst_value, (&x, &y))| {
                    *dst_value = nearest_sample(src, width, height, x, y);
                });
        });

    Ok(())
}

fn check_plane_len(len: usize, map: &UndistortionMap, channels: usize) -> Result<(), FrameError> {
    let expected = map.width() * map.height() * channels;
    if len != expected {
        return Err(FrameError::InvalidFrameBuffer {
            width: map.width(),
            height: map.height(),
            expected,
            found: len,
        });
    }
    Ok(())
}

/// Bilinear sample of an interleaved RGB image at a fractional coordinate.
fn bilinear_sample_rgb(src: &[f64], cols: usize, rows: usize, u: f32, v: f32) -> [f64; 3] {
    let u = (u as f64).clamp(0.0, (cols - 1) as f64);
    let v = (v as f64).clamp(0.0, (rows - 1) as f64);

    let iu0 = u.floor() as usize;
    let iv0 = v.floor() as usize;
    let iu1 = (iu0 + 1).min(cols - 1);
    let iv1 = (iv0 + 1).min(rows - 1);

    let frac_u = u - iu0 as f64;
    let frac_v = v - iv0 as f64;

    let w00 = (1.0 - frac_u) * (1.0 - frac_v);
    let w01 = frac_u * (1.0 - frac_v);
    let w10 = (1.0 - frac_u) * frac_v;
    let w11 = frac_u * frac_v;

    let base00 = (iv0 * cols + iu0) * 3;
    let base01 = (iv0 * cols + iu1) * 3;
    let base10 = (iv1 * cols + iu0) * 3;
    let base11 = (iv1 * cols + iu1) * 3;

    let mut pixel = [0.0; 3];
    for (k, value) in pixel.iter_mut().enumerate() {
        *value = src[base00 + k] * w00
            + src[base01 + k] * w01
            + src[base10 + k] * w10
            + src[base11 + k] * w11;
    }
    pixel
}

/// Nearest-neighbor sample of a single-channel plane.
fn nearest_sample(src: &[f32], cols: usize, rows: usize, u: f32, v: f32) -> f32 {
    let iu = u.round().clamp(0.0, (cols - 1) as f32) as usize;
    let iv = v.round().clamp(0.0, (rows - 1) as f32) as usize;
    src[iv * cols + iu]
}
