use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::error::{Result, TrackerError};
use crate::types::ScreenRotation;

/// Outcome of a completed permission prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
}

/// Platform capabilities the tracker needs.
///
/// Screen rotation is read on every sample. The permission request is only
/// issued when `requires_permission` is true; an `Err` means the request
/// mechanism itself failed, not that the user declined.
#[allow(async_fn_in_trait)]
pub trait OrientationHost: Send + Sync + 'static {
    fn current_screen_rotation(&self) -> ScreenRotation;

    fn requires_permission(&self) -> bool;

    async fn request_sensor_permission(&self) -> Result<PermissionState>;
}

/// Scripted reply for `StaticHost`.
#[derive(Clone, Debug, PartialEq)]
pub enum PermissionReply {
    Grant,
    Deny,
    Fail(String),
}

/// Host with fixed answers, for replay and tests.
#[derive(Debug)]
pub struct StaticHost {
    screen: Mutex<ScreenRotation>,
    requires_permission: bool,
    reply: PermissionReply,
    requests: AtomicU32,
}

impl StaticHost {
    /// No permission gate, portrait screen.
    pub fn ungated() -> Self {
        Self::new(ScreenRotation::Portrait, false, PermissionReply::Grant)
    }

    pub fn new(screen: ScreenRotation, requires_permission: bool, reply: PermissionReply) -> Self {
        Self {
            screen: Mutex::new(screen),
            requires_permission,
            reply,
            requests: AtomicU32::new(0),
        }
    }

    pub fn set_screen_rotation(&self, screen: ScreenRotation) {
        if let Ok(mut guard) = self.screen.lock() {
            *guard = screen;
        }
    }

    /// Number of permission requests issued so far.
    pub fn permission_requests(&self) -> u32 {
        self.requests.load(Ordering::SeqCst)
    }
}

impl OrientationHost for StaticHost {
    fn current_screen_rotation(&self) -> ScreenRotation {
        self.screen.lock().map(|s| *s).unwrap_or_default()
    }

    fn requires_permission(&self) -> bool {
        self.requires_permission
    }

    async fn request_sensor_permission(&self) -> Result<PermissionState> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            PermissionReply::Grant => Ok(PermissionState::Granted),
            PermissionReply::Deny => Ok(PermissionState::Denied),
            PermissionReply::Fail(reason) => {
                Err(TrackerError::PermissionRequestFailed(reason.clone()))
            }
        }
    }
}
