use glam::{DMat3, DVec3};

/// Convert a 3D array to a glam vector.
#[inline]
pub fn array3_to_dvec3(v: &[f64; 3]) -> DVec3 {
    DVec3::new(v[0], v[1], v[2])
}

/// Convert a glam vector to a 3D array.
#[inline]
pub fn dvec3_to_array3(v: DVec3) -> [f64; 3] {
    [v.x, v.y, v.z]
}

/// Convert a row-major 3x3 array to a glam matrix.
///
/// glam stores columns, so the array is read as the transpose of the
/// column layout.
#[inline]
pub fn array33_to_dmat3(m: &[[f64; 3]; 3]) -> DMat3 {
    DMat3::from_cols_array_2d(m).transpose()
}

/// Convert a glam matrix to a row-major 3x3 array.
#[inline]
pub fn dmat3_to_array33(m: &DMat3) -> [[f64; 3]; 3] {
    m.transpose().to_cols_array_2d()
}
