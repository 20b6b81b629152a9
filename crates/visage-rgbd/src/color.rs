use rayon::prelude::*;

/// Convert one sRGB-encoded channel value in [0, 1] to linear space.
#[inline]
pub fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Convert one linear channel value in [0, 1] back to sRGB encoding.
///
/// Inverse of [`srgb_to_linear`]; used by exporters.
#[inline]
pub fn linear_to_srgb(c: f64) -> f64 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Decode a BGRA8 buffer into an interleaved linear-RGB f64 image.
///
/// Channels are normalized to [0, 1] and gamma-decoded per channel; the
/// alpha channel is dropped. Rows are processed in parallel.
///
/// # Arguments
///
/// * `src` - BGRA8 bytes, `width * height * 4` long.
/// * `width` - Image width in pixels.
/// * `dst` - Output RGB, `width * height * 3` long.
///
/// PRECONDITION: the slice lengths match and `src` rows are `width * 4`.
pub fn linear_rgb_from_bgra8(src: &[u8], width: usize, dst: &mut [f64]) {
    if src.is_empty() && dst.is_empty() {
        return;
    }
    assert!(width > 0);
    assert_eq!(src.len() % (width * 4), 0);
    assert_eq!(src.len() / 4, dst.len() / 3);

    dst.par_chunks_exact_mut(width * 3)
        .zip(src.par_chunks_exact(width * 4))
        .for_each(|(dst_row, src_row)| {
            dst_row
                .chunks_exact_mut(3)
                .zip(src_row.chunks_exact(4))
                .for_each(|(rgb, bgra)| {
                    rgb[0] = srgb_to_linear(bgra[2] as f64 / 255.0);
                    rgb[1] = srgb_to_linear(bgra[1] as f64 / 255.0);
                    rgb[2] = srgb_to_linear(bgra[0] as f64 / 255.0);
                });
        });
}
