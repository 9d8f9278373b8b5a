//! Quaternion utilities for the orientation pipeline
//!
//! Conventions:
//! - Hamilton product, `a * b` applies `b` first in the local frame of `a`,
//!   so `R(a * b) = R(a) · R(b)`.
//! - Euler angles are intrinsic. `EulerOrder::YXZ` means rotate about Y, then
//!   about the new X, then about the new Z, giving `R = Ry · Rx · Rz`.
//! - Angle arguments are always (x, y, z) regardless of order; the order only
//!   decides how the three elemental rotations compose.
//!
//! Construction and extraction are paired per order; `euler_angles(order)`
//! inverts `from_euler_angles(order, ..)` away from the singular pitch.

use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};

use crate::types::{axis_x, axis_y, axis_z, m, Axis, RotationMat};

/// Default gimbal-lock threshold on the sine of the middle angle.
pub const GIMBAL_THRESHOLD: f64 = 0.9999999;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EulerOrder {
    XYZ,
    YXZ,
    ZXY,
    ZYX,
    YZX,
    XZY,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quaternion {
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Rotation of `angle` radians about `axis`. A zero axis yields identity.
    pub fn from_axis_angle(axis: &Axis, angle: f64) -> Self {
        let len = axis.norm();
        if len < 1e-12 {
            return Self::identity();
        }
        let half = 0.5 * angle;
        let s = half.sin() / len;
        Self::new(axis.x * s, axis.y * s, axis.z * s, half.cos())
    }

    /// Build from intrinsic Euler angles (radians) about X, Y and Z.
    pub fn from_euler_angles(order: EulerOrder, x: f64, y: f64, z: f64) -> Self {
        let qx = Self::from_axis_angle(&axis_x(), x);
        let qy = Self::from_axis_angle(&axis_y(), y);
        let qz = Self::from_axis_angle(&axis_z(), z);

        match order {
            EulerOrder::XYZ => qx * qy * qz,
            EulerOrder::YXZ => qy * qx * qz,
            EulerOrder::ZXY => qz * qx * qy,
            EulerOrder::ZYX => qz * qy * qx,
            EulerOrder::YZX => qy * qz * qx,
            EulerOrder::XZY => qx * qz * qy,
        }
    }

    /// Hamilton product `self ⊗ rhs`.
    pub fn multiply(&self, rhs: &Quaternion) -> Quaternion {
        let (a, b) = (self, rhs);
        Quaternion {
            x: a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            y: a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            z: a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
            w: a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
        }
    }

    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    /// Rotation matrix of this (unit) quaternion.
    pub fn to_rotation_matrix(&self) -> RotationMat {
        let Quaternion { x, y, z, w } = *self;
        let (xx, yy, zz) = (x * x, y * y, z * z);
        let (xy, xz, yz) = (x * y, x * z, y * z);
        let (wx, wy, wz) = (w * x, w * y, w * z);

        RotationMat::new(
            1.0 - 2.0 * (yy + zz),
            2.0 * (xy - wz),
            2.0 * (xz + wy),
            2.0 * (xy + wz),
            1.0 - 2.0 * (xx + zz),
            2.0 * (yz - wx),
            2.0 * (xz - wy),
            2.0 * (yz + wx),
            1.0 - 2.0 * (xx + yy),
        )
    }

    /// Extract (x, y, z) Euler angles in radians with the given order.
    pub fn euler_angles(&self, order: EulerOrder) -> (f64, f64, f64) {
        euler_from_matrix(&self.to_rotation_matrix(), order, GIMBAL_THRESHOLD)
    }

    pub fn to_unit(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_quaternion(nalgebra::Quaternion::new(self.w, self.x, self.y, self.z))
    }

    pub fn from_unit(q: &UnitQuaternion<f64>) -> Self {
        let c = q.quaternion().coords;
        Self::new(c.x, c.y, c.z, c.w)
    }

    /// Rotate a vector by this quaternion.
    pub fn rotate(&self, v: &Axis) -> Axis {
        self.to_unit() * v
    }
}

impl std::ops::Mul for Quaternion {
    type Output = Quaternion;

    fn mul(self, rhs: Quaternion) -> Quaternion {
        self.multiply(&rhs)
    }
}

/// Signed sine of the middle angle of `order`, up to the sign convention of
/// its matrix element. Its magnitude reaching 1 is gimbal lock.
pub fn pole_sine(mat: &RotationMat, order: EulerOrder) -> f64 {
    match order {
        EulerOrder::XYZ => m(mat, 1, 3),
        EulerOrder::YXZ => m(mat, 2, 3),
        EulerOrder::ZXY => m(mat, 3, 2),
        EulerOrder::ZYX => m(mat, 3, 1),
        EulerOrder::YZX => m(mat, 2, 1),
        EulerOrder::XZY => m(mat, 1, 2),
    }
}

/// Extract intrinsic Euler angles (x, y, z) from a rotation matrix.
///
/// At the singularity (|sine of middle angle| >= `threshold`) the last angle of
/// the order is pinned to zero and the first absorbs the whole rotation.
pub fn euler_from_matrix(mat: &RotationMat, order: EulerOrder, threshold: f64) -> (f64, f64, f64) {
    let m11 = m(mat, 1, 1);
    let m12 = m(mat, 1, 2);
    let m13 = m(mat, 1, 3);
    let m21 = m(mat, 2, 1);
    let m22 = m(mat, 2, 2);
    let m23 = m(mat, 2, 3);
    let m31 = m(mat, 3, 1);
    let m32 = m(mat, 3, 2);
    let m33 = m(mat, 3, 3);

    match order {
        EulerOrder::XYZ => {
            let y = m13.clamp(-1.0, 1.0).asin();
            if m13.abs() < threshold {
                ((-m23).atan2(m33), y, (-m12).atan2(m11))
            } else {
                (m32.atan2(m22), y, 0.0)
            }
        }
        EulerOrder::YXZ => {
            let x = (-m23.clamp(-1.0, 1.0)).asin();
            if m23.abs() < threshold {
                (x, m13.atan2(m33), m21.atan2(m22))
            } else {
                (x, (-m31).atan2(m11), 0.0)
            }
        }
        EulerOrder::ZXY => {
            let x = m32.clamp(-1.0, 1.0).asin();
            if m32.abs() < threshold {
                (x, (-m31).atan2(m33), (-m12).atan2(m22))
            } else {
                (x, 0.0, m21.atan2(m11))
            }
        }
        EulerOrder::ZYX => {
            let y = (-m31.clamp(-1.0, 1.0)).asin();
            if m31.abs() < threshold {
                (m32.atan2(m33), y, m21.atan2(m11))
            } else {
                (0.0, y, (-m12).atan2(m22))
            }
        }
        EulerOrder::YZX => {
            let z = m21.clamp(-1.0, 1.0).asin();
            if m21.abs() < threshold {
                ((-m23).atan2(m22), (-m31).atan2(m11), z)
            } else {
                (0.0, m13.atan2(m33), z)
            }
        }
        EulerOrder::XZY => {
            let z = (-m12.clamp(-1.0, 1.0)).asin();
            if m12.abs() < threshold {
                (m32.atan2(m22), m13.atan2(m11), z)
            } else {
                ((-m23).atan2(m33), 0.0, z)
            }
        }
    }
}
