use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::estimator::DisplayConvention;
use crate::fusion::FusionConfig;

/// When estimates are computed relative to sensor events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cadence {
    /// One estimate per accepted event.
    PerEvent,
    /// One estimate per tick from the latest unconsumed event.
    Fixed(Duration),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub fusion: FusionConfig,
    pub convention: DisplayConvention,
    /// Fixed compute interval in milliseconds; `None` computes per event.
    pub cadence_ms: Option<u64>,
    /// Log a progress line every N processed samples (0 = never).
    pub progress_log_interval: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            fusion: FusionConfig::default(),
            convention: DisplayConvention::default(),
            cadence_ms: None,
            progress_log_interval: 1000,
        }
    }
}

impl TrackerConfig {
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: TrackerConfig =
            serde_json::from_str(json).context("Failed to parse tracker config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json_str(&json)
    }

    pub fn cadence(&self) -> Cadence {
        match self.cadence_ms {
            Some(ms) => Cadence::Fixed(Duration::from_millis(ms)),
            None => Cadence::PerEvent,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let threshold = self.fusion.gimbal_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(TrackerError::InvalidConfig(format!(
                "gimbal_threshold must be in (0, 1], got {threshold}"
            )));
        }

        let band = self.fusion.singularity_blend_band;
        if !band.is_finite() || band < 0.0 || band >= threshold {
            return Err(TrackerError::InvalidConfig(format!(
                "singularity_blend_band must be in [0, gimbal_threshold), got {band}"
            )));
        }

        if self.cadence_ms == Some(0) {
            return Err(TrackerError::InvalidConfig(
                "cadence_ms must be positive".to_string(),
            ));
        }

        let c = &self.convention;
        for (name, sign) in [("yaw_sign", c.yaw_sign), ("roll_sign", c.roll_sign)] {
            if sign != 1.0 && sign != -1.0 {
                return Err(TrackerError::InvalidConfig(format!(
                    "{name} must be 1 or -1, got {sign}"
                )));
            }
        }
        if !c.yaw_offset.is_finite() || !c.roll_offset.is_finite() {
            return Err(TrackerError::InvalidConfig(
                "convention offsets must be finite".to_string(),
            ));
        }

        Ok(())
    }
}
