use thiserror::Error;

/// Tilt tracker error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    #[error("Sensor permission denied")]
    PermissionDenied,

    #[error("Sensor permission not granted yet")]
    PermissionNotGranted,

    #[error("Sensor permission request failed: {0}")]
    PermissionRequestFailed(String),

    #[error("Invalid screen rotation: {0}")]
    InvalidScreenRotation(i32),

    #[error("Unknown screen orientation type: {0}")]
    UnknownOrientationType(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;
