use serde::{Deserialize, Serialize};

use crate::angles::normalize_degrees;
use crate::fusion::{Attitude, FusionConfig, OrientationFusion};
use crate::types::{OrientationEstimate, RawSample, ScreenRotation};

/// Sign/offset applied to yaw and roll before display.
///
/// `displayed = normalize(offset + sign * value)`. Signs must be ±1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplayConvention {
    pub yaw_sign: f64,
    pub yaw_offset: f64,
    pub roll_sign: f64,
    pub roll_offset: f64,
}

impl Default for DisplayConvention {
    fn default() -> Self {
        Self::compass()
    }
}

impl DisplayConvention {
    /// Values as computed.
    pub const fn plain() -> Self {
        Self {
            yaw_sign: 1.0,
            yaw_offset: 0.0,
            roll_sign: 1.0,
            roll_offset: 0.0,
        }
    }

    /// Clockwise turns read as positive yaw.
    pub const fn compass() -> Self {
        Self {
            yaw_sign: -1.0,
            ..Self::plain()
        }
    }

    /// `180 - yaw`
    pub const fn mirrored() -> Self {
        Self {
            yaw_sign: -1.0,
            yaw_offset: 180.0,
            ..Self::plain()
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "plain" => Some(Self::plain()),
            "compass" => Some(Self::compass()),
            "mirrored" => Some(Self::mirrored()),
            _ => None,
        }
    }

    pub fn yaw(&self, yaw: f64) -> f64 {
        normalize_degrees(self.yaw_offset + self.yaw_sign * yaw)
    }

    pub fn roll(&self, roll: f64) -> f64 {
        normalize_degrees(self.roll_offset + self.roll_sign * roll)
    }
}

/// Whether a yaw zero-reference has been captured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum YawOrigin {
    #[default]
    NoOrigin,
    HasOrigin(f64),
}

/// Stateful wrapper: yaw origin, display convention and the last estimate.
#[derive(Clone, Debug)]
pub struct OrientationEstimator {
    fusion: OrientationFusion,
    convention: DisplayConvention,
    origin: YawOrigin,
    last_sample: Option<RawSample>,
    last_attitude: Option<Attitude>,
    estimate: OrientationEstimate,
    samples_processed: u64,
    samples_dropped: u64,
}

impl Default for OrientationEstimator {
    fn default() -> Self {
        Self::new(FusionConfig::default(), DisplayConvention::default())
    }
}

impl OrientationEstimator {
    pub fn new(fusion: FusionConfig, convention: DisplayConvention) -> Self {
        Self {
            fusion: OrientationFusion::new(fusion),
            convention,
            origin: YawOrigin::NoOrigin,
            last_sample: None,
            last_attitude: None,
            estimate: OrientationEstimate::default(),
            samples_processed: 0,
            samples_dropped: 0,
        }
    }

    /// Forget the yaw origin. The next accepted sample becomes the new zero.
    pub fn reset(&mut self) {
        if let YawOrigin::HasOrigin(previous) = self.origin {
            log::info!("Yaw origin cleared (was {previous:.2}°)");
        }
        self.origin = YawOrigin::NoOrigin;
    }

    /// Process one sample. Incomplete samples are dropped and change nothing.
    pub fn update(
        &mut self,
        sample: &RawSample,
        screen: ScreenRotation,
    ) -> Option<OrientationEstimate> {
        let Some(attitude) = self.fusion.compute(sample, screen) else {
            self.samples_dropped += 1;
            log::debug!("Dropping incomplete orientation sample: {sample:?}");
            return None;
        };

        let origin = match self.origin {
            YawOrigin::HasOrigin(origin) => origin,
            YawOrigin::NoOrigin => {
                self.origin = YawOrigin::HasOrigin(attitude.yaw);
                log::info!("Yaw origin set to {:.2}°", attitude.yaw);
                attitude.yaw
            }
        };

        let relative_yaw = normalize_degrees(attitude.yaw - origin);
        let roll = normalize_degrees(attitude.roll);

        let estimate = OrientationEstimate {
            yaw: self.convention.yaw(relative_yaw),
            pitch: attitude.pitch,
            roll: self.convention.roll(roll),
        };

        self.last_sample = Some(*sample);
        self.last_attitude = Some(attitude);
        self.estimate = estimate;
        self.samples_processed += 1;

        Some(estimate)
    }

    pub fn estimate(&self) -> OrientationEstimate {
        self.estimate
    }

    pub fn origin(&self) -> YawOrigin {
        self.origin
    }

    pub fn has_origin(&self) -> bool {
        matches!(self.origin, YawOrigin::HasOrigin(_))
    }

    pub fn last_sample(&self) -> Option<RawSample> {
        self.last_sample
    }

    /// Pre-origin attitude of the last accepted sample.
    pub fn last_attitude(&self) -> Option<Attitude> {
        self.last_attitude
    }

    pub fn samples_processed(&self) -> u64 {
        self.samples_processed
    }

    pub fn samples_dropped(&self) -> u64 {
        self.samples_dropped
    }
}
