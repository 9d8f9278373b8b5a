//! Angle helpers (degrees unless noted)

/// Wrap to [-180, 180).
///
/// `((angle + 180) % 360 + 360) % 360 - 180`; exact ±180 both map to -180.
pub fn normalize_degrees(angle: f64) -> f64 {
    ((angle + 180.0) % 360.0 + 360.0) % 360.0 - 180.0
}

/// Keep gamma continuous across the sensor's ±90° reporting discontinuity.
pub fn unwrap_gamma(gamma: f64) -> f64 {
    if gamma > 90.0 {
        180.0 - gamma
    } else if gamma < -90.0 {
        -180.0 - gamma
    } else {
        gamma
    }
}

/// Map alpha from [0, 360) to (-180, 180].
pub fn wrap_alpha(alpha: f64) -> f64 {
    if alpha > 180.0 {
        alpha - 360.0
    } else {
        alpha
    }
}

/// Signed shortest rotation from `from` to `to`, radians, in [-π, π).
pub fn shortest_delta_rad(from: f64, to: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    ((to - from + PI) % TAU + TAU) % TAU - PI
}

/// Interpolate between two headings (radians) along the shorter arc.
pub fn lerp_angle_rad(from: f64, to: f64, t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    from + shortest_delta_rad(from, to) * t
}
