use crate::angles::lerp_angle_rad;

/// Yaw blending near the gimbal-lock pole.
///
/// Below the hard threshold the nominal yaw (`atan2(m13, m33)`) is used and at
/// or above it the fallback yaw (`atan2(-m31, m11)`). Inside the band just
/// below the threshold the two are blended along the shorter arc so the
/// handover is not visible as a jump.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoleBlend {
    threshold: f64,
    band: f64,
}

impl PoleBlend {
    /// `band` of 0 disables blending.
    pub fn new(threshold: f64, band: f64) -> Self {
        Self {
            threshold,
            band: band.max(0.0),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_enabled(&self) -> bool {
        self.band > 0.0
    }

    /// Weight of the fallback yaw for a given |m23|: 0 below the band, rising
    /// linearly to 1 at the threshold.
    pub fn weight(&self, pole_sine: f64) -> f64 {
        let s = pole_sine.abs();
        if s >= self.threshold {
            return 1.0;
        }
        if !self.is_enabled() {
            return 0.0;
        }
        let start = self.threshold - self.band;
        if s <= start {
            0.0
        } else {
            (s - start) / self.band
        }
    }

    /// Yaw in radians for the given |m23|.
    pub fn yaw(&self, pole_sine: f64, nominal: f64, fallback: f64) -> f64 {
        let w = self.weight(pole_sine);
        if w <= 0.0 {
            nominal
        } else if w >= 1.0 {
            fallback
        } else {
            lerp_angle_rad(nominal, fallback, w)
        }
    }
}
