//! Linear algebra aliases for the orientation pipeline
//!
//! Every rotation in this crate is expressed as a right-handed 3x3 matrix in
//! row-major `mRC` naming (`m13` is row 1, column 3), matching the extraction
//! formulas in `quaternion` and `fusion`.

use nalgebra::{Matrix3, Vector3};

pub type RotationMat = Matrix3<f64>;
pub type Axis = Vector3<f64>;

// ===== Device frame axes =====
// X points to the right edge of the screen, Y to the top edge, Z out of the screen.

/// Lateral axis (beta rotates about it)
pub fn axis_x() -> Axis {
    Vector3::x()
}

/// Device "up" axis (alpha rotates about it after the YXZ remap)
pub fn axis_y() -> Axis {
    Vector3::y()
}

/// Forward axis, out of the screen (screen rotation is applied about it)
pub fn axis_z() -> Axis {
    Vector3::z()
}

/// Read element `mRC` using one-based row/column like the formulas do.
#[inline]
pub fn m(mat: &RotationMat, row: usize, col: usize) -> f64 {
    mat[(row - 1, col - 1)]
}
