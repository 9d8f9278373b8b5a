pub mod linalg;

pub use linalg::*;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};

/// One device-orientation event, angles in degrees.
///
/// Sensors may omit any field on a given event, so all three are optional.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    #[serde(default)]
    pub alpha: Option<f64>,
    #[serde(default)]
    pub beta: Option<f64>,
    #[serde(default)]
    pub gamma: Option<f64>,
}

impl RawSample {
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self {
            alpha: Some(alpha),
            beta: Some(beta),
            gamma: Some(gamma),
        }
    }

    /// All three angles, or `None` if any is absent or not finite.
    pub fn angles(&self) -> Option<(f64, f64, f64)> {
        let alpha = self.alpha.filter(|a| a.is_finite())?;
        let beta = self.beta.filter(|b| b.is_finite())?;
        let gamma = self.gamma.filter(|g| g.is_finite())?;
        Some((alpha, beta, gamma))
    }

    pub fn is_complete(&self) -> bool {
        self.angles().is_some()
    }
}

/// Rotation of the screen content relative to the device's natural orientation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenRotation {
    /// 0°
    #[default]
    Portrait,
    /// 90°
    Landscape,
    /// 180°
    PortraitFlipped,
    /// -90°
    LandscapeFlipped,
}

impl ScreenRotation {
    pub fn degrees(self) -> f64 {
        match self {
            ScreenRotation::Portrait => 0.0,
            ScreenRotation::Landscape => 90.0,
            ScreenRotation::PortraitFlipped => 180.0,
            ScreenRotation::LandscapeFlipped => -90.0,
        }
    }

    /// Legacy integer angle. 270 and -180 are accepted as aliases.
    pub fn from_degrees(angle: i32) -> Result<Self> {
        match angle {
            0 => Ok(ScreenRotation::Portrait),
            90 => Ok(ScreenRotation::Landscape),
            180 | -180 => Ok(ScreenRotation::PortraitFlipped),
            -90 | 270 => Ok(ScreenRotation::LandscapeFlipped),
            other => Err(TrackerError::InvalidScreenRotation(other)),
        }
    }

    /// Screen orientation type names as reported by the platform.
    pub fn from_orientation_type(name: &str) -> Result<Self> {
        match name {
            "portrait-primary" => Ok(ScreenRotation::Portrait),
            "landscape-primary" => Ok(ScreenRotation::Landscape),
            "portrait-secondary" => Ok(ScreenRotation::PortraitFlipped),
            "landscape-secondary" => Ok(ScreenRotation::LandscapeFlipped),
            other => Err(TrackerError::UnknownOrientationType(other.to_string())),
        }
    }

    /// Aspect-ratio fallback when the platform reports nothing.
    pub fn from_viewport(width: f64, height: f64) -> Self {
        if width > height {
            ScreenRotation::Landscape
        } else {
            ScreenRotation::Portrait
        }
    }

    /// Query chain: orientation type, then legacy angle, then viewport.
    ///
    /// An unrecognised type or angle falls through to the next source.
    pub fn resolve(
        orientation_type: Option<&str>,
        legacy_angle: Option<i32>,
        viewport: (f64, f64),
    ) -> Self {
        if let Some(rotation) = orientation_type.and_then(|t| Self::from_orientation_type(t).ok()) {
            return rotation;
        }
        if let Some(rotation) = legacy_angle.and_then(|a| Self::from_degrees(a).ok()) {
            return rotation;
        }
        Self::from_viewport(viewport.0, viewport.1)
    }
}

/// Display-ready orientation, degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrientationEstimate {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl OrientationEstimate {
    pub fn is_finite(&self) -> bool {
        self.yaw.is_finite() && self.pitch.is_finite() && self.roll.is_finite()
    }
}
