//! Device-orientation fusion
//!
//! Converts raw (alpha, beta, gamma) orientation events and the current
//! screen rotation into a yaw/pitch/roll estimate with a resettable yaw origin.
//!
//! - `fusion`: pure per-sample kernel (quaternion build, gimbal-aware extraction)
//! - `estimator`: yaw origin and display convention
//! - `session`: async subscription, permission gate, published snapshot

pub mod angles;
pub mod config;
pub mod error;
pub mod estimator;
pub mod fusion;
pub mod host;
pub mod quaternion;
pub mod session;
pub mod smoothing;
pub mod types;

pub use config::{Cadence, TrackerConfig};
pub use error::{Result, TrackerError};
pub use estimator::{DisplayConvention, OrientationEstimator, YawOrigin};
pub use fusion::{Attitude, FusionConfig, OrientationFusion};
pub use host::{OrientationHost, PermissionReply, PermissionState, StaticHost};
pub use quaternion::{EulerOrder, Quaternion};
pub use session::OrientationSession;
pub use types::{OrientationEstimate, RawSample, ScreenRotation};
