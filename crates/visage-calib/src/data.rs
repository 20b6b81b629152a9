use base64::Engine;
use serde::Deserialize;

use crate::error::CalibrationError;

/// Represents the intrinsic parameters of a pinhole camera.
///
/// # Fields
///
/// * `fx` - The focal length in the x direction
/// * `fy` - The focal length in the y direction
/// * `cx` - The x coordinate of the principal point
/// * `cy` - The y coordinate of the principal point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraIntrinsic {
    /// The focal length in the x direction
    pub fx: f64,
    /// The focal length in the y direction
    pub fy: f64,
    /// The x coordinate of the principal point
    pub cx: f64,
    /// The y coordinate of the principal point
    pub cy: f64,
}

/// The calibration record emitted by the capture device.
///
/// Lookup tables are base64-encoded little-endian f32 arrays. The flat
/// `intrinsic` field is column-major (simd_float3x3 layout), so fx, fy sit
/// at indices 0 and 4 and the principal point at indices 6 and 7.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationRecord {
    /// Forward lens-distortion table, base64 of f32 bytes.
    pub lens_distortion_lookup: String,
    /// Inverse lens-distortion table, base64 of f32 bytes.
    pub inverse_lens_distortion_lookup: String,
    /// Column-major 3x3 intrinsic matrix.
    pub intrinsic: [f64; 9],
    /// Capture width the intrinsic matrix was calibrated at, in pixels.
    pub intrinsic_reference_dimension_width: u32,
}

/// Parsed, capture-scaled calibration for one camera.
///
/// Immutable once loaded; built once per capture session and shared by
/// every frame.
#[derive(Debug, Clone)]
pub struct CalibrationData {
    intrinsic: CameraIntrinsic,
    distortion_lookup: Vec<f32>,
    inverse_distortion_lookup: Vec<f32>,
    reference_width: u32,
    scale: f64,
}

impl CalibrationData {
    /// Parse a JSON calibration record and scale it to the capture width.
    ///
    /// # Arguments
    ///
    /// * `json` - The raw JSON record from the capture device.
    /// * `capture_width` - Width in pixels of the session's frames.
    ///
    /// # Returns
    ///
    /// The parsed calibration, or a [`CalibrationError`] that aborts the
    /// session setup.
    pub fn from_json(json: &str, capture_width: usize) -> Result<Self, CalibrationError> {
        let record: CalibrationRecord = serde_json::from_str(json)?;
        Self::from_record(&record, capture_width)
    }

    /// Build calibration data from an already-parsed record.
    pub fn from_record(
        record: &CalibrationRecord,
        capture_width: usize,
    ) -> Result<Self, CalibrationError> {
        let distortion_lookup = decode_lookup_table(&record.lens_distortion_lookup)?;
        let inverse_distortion_lookup = decode_lookup_table(&record.inverse_lens_distortion_lookup)?;

        if record.intrinsic_reference_dimension_width == 0 {
            return Err(CalibrationError::InvalidReferenceWidth);
        }
        let scale = capture_width as f64 / record.intrinsic_reference_dimension_width as f64;

        // transpose of the column-major record: fx, fy on the diagonal,
        // principal point in the last column; skew and the homogeneous row
        // are never used downstream
        let m = &record.intrinsic;
        let intrinsic = CameraIntrinsic {
            fx: m[0] * scale,
            fy: m[4] * scale,
            cx: m[6] * scale,
            cy: m[7] * scale,
        };

        log::debug!(
            "loaded calibration: fx={:.2} fy={:.2} cx={:.2} cy={:.2} scale={:.4} tables={}(fwd)/{}(inv)",
            intrinsic.fx,
            intrinsic.fy,
            intrinsic.cx,
            intrinsic.cy,
            scale,
            distortion_lookup.len(),
            inverse_distortion_lookup.len()
        );

        Ok(Self {
            intrinsic,
            distortion_lookup,
            inverse_distortion_lookup,
            reference_width: record.intrinsic_reference_dimension_width,
            scale,
        })
    }

    /// The capture-scaled pinhole intrinsics.
    #[inline]
    pub fn intrinsic(&self) -> &CameraIntrinsic {
        &self.intrinsic
    }

    /// Forward lens-distortion lookup table.
    pub fn distortion_lookup(&self) -> &[f32] {
        &self.distortion_lookup
    }

    /// Inverse lens-distortion lookup table, used to build undistortion maps.
    pub fn inverse_distortion_lookup(&self) -> &[f32] {
        &self.inverse_distortion_lookup
    }

    /// Width the intrinsics were calibrated at, in pixels.
    pub fn reference_width(&self) -> u32 {
        self.reference_width
    }

    /// The applied capture-width / reference-width scale factor.
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

/// Decode a base64 lookup-table field into little-endian f32 entries.
fn decode_lookup_table(encoded: &str) -> Result<Vec<f32>, CalibrationError> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(encoded)?;
    if bytes.len() % 4 != 0 {
        return Err(CalibrationError::MalformedLookupTable(bytes.len()));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Base64 of the little-endian bytes of the given floats.
    fn encode_floats(values: &[f32]) -> String {
        let bytes = values
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect::<Vec<_>>();
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    fn record_json(reference_width: u32) -> String {
        // column-major [[500,0,320],[0,500,240],[0,0,1]]
        format!(
            r#"{{
                "lensDistortionLookup": "{}",
                "inverseLensDistortionLookup": "{}",
                "intrinsic": [500.0, 0.0, 0.0, 0.0, 500.0, 0.0, 320.0, 240.0, 1.0],
                "intrinsicReferenceDimensionWidth": {}
            }}"#,
            encode_floats(&[0.0, 0.01]),
            encode_floats(&[0.0, -0.01]),
            reference_width
        )
    }

    #[test]
    fn test_parse_and_scale_unit() {
        let calibration = CalibrationData::from_json(&record_json(640), 640).unwrap();
        let k = calibration.intrinsic();
        assert_relative_eq!(k.fx, 500.0);
        assert_relative_eq!(k.fy, 500.0);
        assert_relative_eq!(k.cx, 320.0);
        assert_relative_eq!(k.cy, 240.0);
        assert_relative_eq!(calibration.scale(), 1.0);
        assert_eq!(calibration.distortion_lookup(), &[0.0, 0.01]);
        assert_eq!(calibration.inverse_distortion_lookup(), &[0.0, -0.01]);
    }

    #[test]
    fn test_parse_scales_by_capture_width() {
        // capture at half the calibrated width
        let calibration = CalibrationData::from_json(&record_json(640), 320).unwrap();
        let k = calibration.intrinsic();
        assert_relative_eq!(k.fx, 250.0);
        assert_relative_eq!(k.fy, 250.0);
        assert_relative_eq!(k.cx, 160.0);
        assert_relative_eq!(k.cy, 120.0);
        assert_relative_eq!(calibration.scale(), 0.5);
    }

    #[test]
    fn test_missing_field_is_parse_error() {
        let err = CalibrationData::from_json(r#"{"intrinsic": []}"#, 640).unwrap_err();
        assert!(matches!(err, CalibrationError::Parse(_)));
    }

    #[test]
    fn test_truncated_table_is_malformed() {
        let bad = base64::engine::general_purpose::STANDARD.encode([0u8, 1, 2, 3, 4, 5]);
        let json = format!(
            r#"{{
                "lensDistortionLookup": "{bad}",
                "inverseLensDistortionLookup": "{bad}",
                "intrinsic": [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
                "intrinsicReferenceDimensionWidth": 640
            }}"#
        );
        let err = CalibrationData::from_json(&json, 640).unwrap_err();
        assert!(matches!(err, CalibrationError::MalformedLookupTable(6)));
    }

    #[test]
    fn test_invalid_base64_is_rejected() {
        let json = r#"{
            "lensDistortionLookup": "not base64!!",
            "inverseLensDistortionLookup": "",
            "intrinsic": [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            "intrinsicReferenceDimensionWidth": 640
        }"#;
        let err = CalibrationData::from_json(json, 640).unwrap_err();
        assert!(matches!(err, CalibrationError::InvalidBase64(_)));
    }

    #[test]
    fn test_zero_reference_width_is_rejected() {
        let err = CalibrationData::from_json(&record_json(0), 640).unwrap_err();
        assert!(matches!(err, CalibrationError::InvalidReferenceWidth));
    }
}
