/// An error type for the calibration module.
///
/// Calibration errors are fatal to the capture session: the undistortion
/// map derived from the calibration is shared by every frame.
#[derive(thiserror::Error, Debug)]
pub enum CalibrationError {
    /// Error when the calibration record is missing fields or malformed.
    #[error("Failed to parse the calibration record")]
    Parse(#[from] serde_json::Error),

    /// Error when a lookup table field is not valid base64.
    #[error("Lookup table is not valid base64")]
    InvalidBase64(#[from] base64::DecodeError),

    /// Error when a decoded lookup table cannot be split into whole floats.
    #[error("Lookup table byte length ({0}) is not a multiple of 4")]
    MalformedLookupTable(usize),

    /// Error when the reference dimension width is zero.
    #[error("Intrinsic reference dimension width must be non-zero")]
    InvalidReferenceWidth,
}
