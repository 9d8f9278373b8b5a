// fusion.rs — Pure orientation kernel
//
// Nothing in here holds state between samples. A raw (alpha, beta, gamma)
// event plus the current screen rotation goes in, a raw yaw/pitch/roll comes
// out. Origin handling and display conventions live in `estimator`.

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

use crate::angles::{unwrap_gamma, wrap_alpha};
use crate::quaternion::{euler_from_matrix, pole_sine, EulerOrder, Quaternion, GIMBAL_THRESHOLD};
use crate::smoothing::PoleBlend;
use crate::types::{axis_y, axis_z, RawSample, RotationMat, ScreenRotation};

/// Intrinsic order shared by attitude construction and extraction.
pub const FUSION_ORDER: EulerOrder = EulerOrder::YXZ;

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// |m23| at or above this is treated as gimbal lock
    pub gimbal_threshold: f64,
    /// Width of the yaw blend band below the threshold (0 = off)
    pub singularity_blend_band: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            gimbal_threshold: GIMBAL_THRESHOLD,
            singularity_blend_band: 0.0,
        }
    }
}

// ─── Output ──────────────────────────────────────────────────────────────────

/// Yaw/pitch/roll in degrees before any origin or display adjustment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Attitude {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
    /// True when the singular branch was taken (roll pinned to 0).
    pub gimbal_locked: bool,
}

// ─── Kernel ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct OrientationFusion {
    blend: PoleBlend,
}

impl Default for OrientationFusion {
    fn default() -> Self {
        Self::new(FusionConfig::default())
    }
}

impl OrientationFusion {
    pub fn new(config: FusionConfig) -> Self {
        Self {
            blend: PoleBlend::new(config.gimbal_threshold, config.singularity_blend_band),
        }
    }

    /// Run the full pipeline. Returns `None` if any angle is missing.
    pub fn compute(&self, sample: &RawSample, screen: ScreenRotation) -> Option<Attitude> {
        let (alpha, beta, gamma) = sample.angles()?;
        let q = attitude_quaternion(alpha, beta, gamma, screen);
        Some(self.extract(&q.to_rotation_matrix()))
    }

    /// Extraction in `FUSION_ORDER` with the gimbal-lock branch and optional
    /// yaw blending. Pitch is the X angle, yaw the Y angle, roll the Z angle.
    pub fn extract(&self, mat: &RotationMat) -> Attitude {
        let threshold = self.blend.threshold();
        let (pitch, nominal_yaw, roll) = euler_from_matrix(mat, FUSION_ORDER, threshold);
        let sine = pole_sine(mat, FUSION_ORDER);
        let gimbal_locked = sine.abs() >= threshold;

        let yaw = if !gimbal_locked && self.blend.is_enabled() {
            // A zero threshold forces the singular branch.
            let (_, fallback_yaw, _) = euler_from_matrix(mat, FUSION_ORDER, 0.0);
            self.blend.yaw(sine, nominal_yaw, fallback_yaw)
        } else {
            nominal_yaw
        };

        Attitude {
            yaw: yaw.to_degrees(),
            pitch: pitch.to_degrees(),
            roll: roll.to_degrees(),
            gimbal_locked,
        }
    }
}

/// Device attitude with camera and screen corrections applied.
///
/// `q = q_dev ⊗ q_axis ⊗ q_screen` where
/// - `q_dev` is YXZ from (beta, alpha, -gamma) after normalization,
/// - `q_axis` is -90° about the device up axis (Y),
/// - `q_screen` is -screen° about the forward axis (Z).
pub fn attitude_quaternion(alpha: f64, beta: f64, gamma: f64, screen: ScreenRotation) -> Quaternion {
    let gamma = unwrap_gamma(gamma);
    let alpha = wrap_alpha(alpha);

    let q_dev = Quaternion::from_euler_angles(
        FUSION_ORDER,
        beta.to_radians(),
        alpha.to_radians(),
        (-gamma).to_radians(),
    );
    let q_axis = Quaternion::from_axis_angle(&axis_y(), -FRAC_PI_2);
    let q_screen = Quaternion::from_axis_angle(&axis_z(), -screen.degrees().to_radians());

    q_dev * q_axis * q_screen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angles::shortest_delta_rad;
    use approx::assert_abs_diff_eq;

    const SCREENS: [ScreenRotation; 4] = [
        ScreenRotation::Portrait,
        ScreenRotation::Landscape,
        ScreenRotation::PortraitFlipped,
        ScreenRotation::LandscapeFlipped,
    ];

    #[test]
    fn test_flat_device() {
        let fusion = OrientationFusion::default();
        let sample = RawSample::new(0.0, 0.0, 0.0);
        let a = fusion.compute(&sample, ScreenRotation::Portrait).unwrap();
        assert_abs_diff_eq!(a.pitch, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(a.roll, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(a.yaw, -90.0, epsilon = 1e-9);
        assert!(!a.gimbal_locked);

        let again = fusion.compute(&sample, ScreenRotation::Portrait).unwrap();
        assert_eq!(a, again);
    }

    #[test]
    fn test_alpha_turns_yaw() {
        let fusion = OrientationFusion::default();
        let a = fusion
            .compute(&RawSample::new(30.0, 0.0, 0.0), ScreenRotation::Portrait)
            .unwrap();
        assert_abs_diff_eq!(a.yaw, -60.0, epsilon = 1e-9);
        assert_abs_diff_eq!(a.pitch, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_alpha_above_180_matches_negative() {
        let fusion = OrientationFusion::default();
        let a = fusion
            .compute(&RawSample::new(350.0, 20.0, 10.0), ScreenRotation::Portrait)
            .unwrap();
        let b = fusion
            .compute(&RawSample::new(-10.0, 20.0, 10.0), ScreenRotation::Portrait)
            .unwrap();
        assert_abs_diff_eq!(a.yaw, b.yaw, epsilon = 1e-9);
        assert_abs_diff_eq!(a.pitch, b.pitch, epsilon = 1e-9);
        assert_abs_diff_eq!(a.roll, b.roll, epsilon = 1e-9);
    }

    #[test]
    fn test_landscape_rotates_roll() {
        let fusion = OrientationFusion::default();
        let a = fusion
            .compute(&RawSample::new(0.0, 0.0, 0.0), ScreenRotation::Landscape)
            .unwrap();
        assert_abs_diff_eq!(a.pitch, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(a.roll, -90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_field_drops_sample() {
        let fusion = OrientationFusion::default();
        let sample = RawSample {
            alpha: Some(0.0),
            beta: None,
            gamma: Some(0.0),
        };
        assert!(fusion.compute(&sample, ScreenRotation::Portrait).is_none());
    }

    #[test]
    fn test_gimbal_lock_pins_roll() {
        let fusion = OrientationFusion::default();
        let a = fusion
            .compute(&RawSample::new(0.0, 0.0, 90.0), ScreenRotation::Portrait)
            .unwrap();
        assert!(a.gimbal_locked);
        assert_eq!(a.roll, 0.0);
        assert_abs_diff_eq!(a.pitch.abs(), 90.0, epsilon = 1e-3);
        assert!(a.yaw.is_finite());
    }

    #[test]
    fn test_beta_90_is_finite() {
        let fusion = OrientationFusion::default();
        for screen in SCREENS {
            let a = fusion.compute(&RawSample::new(0.0, 90.0, 0.0), screen).unwrap();
            assert!(a.yaw.is_finite() && a.pitch.is_finite() && a.roll.is_finite());
        }
    }

    #[test]
    fn test_gamma_wrap_continuity() {
        let fusion = OrientationFusion::default();
        for (alpha, beta) in [(0.0, 0.0), (45.0, 30.0), (200.0, -60.0), (310.0, 120.0)] {
            let over = fusion
                .compute(&RawSample::new(alpha, beta, 91.0), ScreenRotation::Portrait)
                .unwrap();
            let under = fusion
                .compute(&RawSample::new(alpha, beta, 89.0), ScreenRotation::Portrait)
                .unwrap();
            assert!((over.yaw - under.yaw).abs() < 2.0);
            assert!((over.pitch - under.pitch).abs() < 2.0);
            assert!((over.roll - under.roll).abs() < 2.0);
        }
    }

    #[test]
    fn test_outputs_in_range_over_grid() {
        let fusion = OrientationFusion::default();
        let mut alpha = 0.0;
        while alpha < 360.0 {
            let mut beta = -180.0;
            while beta <= 180.0 {
                let mut gamma = -95.0;
                while gamma <= 95.0 {
                    for screen in SCREENS {
                        let a = fusion
                            .compute(&RawSample::new(alpha, beta, gamma), screen)
                            .unwrap();
                        assert!(a.yaw.is_finite() && a.pitch.is_finite() && a.roll.is_finite());
                        assert!((-180.0..=180.0).contains(&a.yaw));
                        assert!((-90.0..=90.0).contains(&a.pitch));
                        assert!((-180.0..=180.0).contains(&a.roll));
                    }
                    gamma += 19.0;
                }
                beta += 30.0;
            }
            alpha += 37.0;
        }
    }

    #[test]
    fn test_attitude_quaternion_is_unit() {
        for screen in SCREENS {
            let q = attitude_quaternion(123.0, -45.0, 67.0, screen);
            assert_abs_diff_eq!(q.norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_extract_uses_fusion_order_extraction() {
        let fusion = OrientationFusion::default();
        for (alpha, beta, gamma) in [(0.0, 0.0, 0.0), (130.0, -40.0, 25.0), (300.0, 75.0, -60.0), (0.0, 0.0, 90.0)] {
            let mat = attitude_quaternion(alpha, beta, gamma, ScreenRotation::Landscape).to_rotation_matrix();
            let (x, y, z) = euler_from_matrix(&mat, FUSION_ORDER, GIMBAL_THRESHOLD);
            let a = fusion.extract(&mat);
            assert_abs_diff_eq!(a.pitch, x.to_degrees(), epsilon = 1e-12);
            assert_abs_diff_eq!(a.yaw, y.to_degrees(), epsilon = 1e-12);
            assert_abs_diff_eq!(a.roll, z.to_degrees(), epsilon = 1e-12);
            assert_eq!(a.gimbal_locked, pole_sine(&mat, FUSION_ORDER).abs() >= GIMBAL_THRESHOLD);
        }
    }

    #[test]
    fn test_blend_smooths_approach_to_pole() {
        let hard = OrientationFusion::default();
        let soft = OrientationFusion::new(FusionConfig {
            singularity_blend_band: 0.05,
            ..FusionConfig::default()
        });

        // Non-singular samples far from the pole are unaffected.
        let sample = RawSample::new(40.0, 10.0, 20.0);
        let a = hard.compute(&sample, ScreenRotation::Portrait).unwrap();
        let b = soft.compute(&sample, ScreenRotation::Portrait).unwrap();
        assert_abs_diff_eq!(a.yaw, b.yaw, epsilon = 1e-9);

        // Inside the band yaw moves from the nominal toward the fallback
        // heading along the shorter arc, and roll is still derived.
        let near = RawSample::new(40.0, 5.0, 88.0);
        let mat = attitude_quaternion(40.0, 5.0, 88.0, ScreenRotation::Portrait).to_rotation_matrix();
        assert!(pole_sine(&mat, FUSION_ORDER).abs() > 0.9999999 - 0.05);

        let nominal = hard.compute(&near, ScreenRotation::Portrait).unwrap();
        let blended = soft.compute(&near, ScreenRotation::Portrait).unwrap();
        assert!(!blended.gimbal_locked);
        assert_abs_diff_eq!(blended.roll, nominal.roll, epsilon = 1e-9);
        assert_abs_diff_eq!(blended.pitch, nominal.pitch, epsilon = 1e-9);

        let (_, fallback, _) = euler_from_matrix(&mat, FUSION_ORDER, 0.0);
        let start = nominal.yaw.to_radians();
        let mid = blended.yaw.to_radians();
        let total = shortest_delta_rad(start, fallback);
        let first_leg = shortest_delta_rad(start, mid);
        let second_leg = shortest_delta_rad(mid, fallback);

        assert!(first_leg.abs() > 1f64.to_radians(), "blend had no effect");
        assert!(first_leg * total >= 0.0 && second_leg * total >= 0.0);
        assert_abs_diff_eq!(first_leg.abs() + second_leg.abs(), total.abs(), epsilon = 1e-9);
    }
}
