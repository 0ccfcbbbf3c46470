//! Shared-storage permission verification
//!
//! Called from request workers while the actual platform query runs on the
//! UI thread (see [`crate::shell`]). The wait is bounded: a wedged UI thread
//! must not stall a worker forever, so on timeout the gate fails open and
//! setup proceeds. Must never be invoked *from* the UI thread itself; that
//! would deadlock the round-trip.

use std::sync::Arc;
use std::time::Duration;

use crate::platform::Platform;
use crate::shell::ShellHandle;

/// How long a worker waits for the UI thread to answer a permission check.
pub const DEFAULT_PERMISSION_WAIT: Duration = Duration::from_secs(10);

pub struct PermissionGate {
    shell: ShellHandle,
    platform: Arc<dyn Platform>,
    wait: Duration,
}

impl PermissionGate {
    pub fn new(shell: ShellHandle, platform: Arc<dyn Platform>) -> Self {
        Self {
            shell,
            platform,
            wait: DEFAULT_PERMISSION_WAIT,
        }
    }

    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    /// Check the shared-storage grant, triggering the platform's settings
    /// surface when it is missing.
    ///
    /// Returns `false` only when the UI thread positively reports the grant
    /// absent. Every failure path (shell gone, reply dropped, timeout)
    /// fails open: blocking setup forever is worse than a potentially
    /// under-privileged storage directory.
    pub async fn check_and_request(&self) -> bool {
        if !self.platform.requires_shared_permission() {
            return true;
        }

        let Some(reply) = self.shell.submit_permission_check() else {
            tracing::warn!("shell gone; permission check fails open");
            return true;
        };

        match tokio::time::timeout(self.wait, reply).await {
            Ok(Ok(granted)) => granted,
            Ok(Err(_)) => {
                tracing::warn!("permission reply dropped; failing open");
                true
            }
            Err(_) => {
                tracing::warn!(wait = ?self.wait, "permission check timed out; failing open");
                true
            }
        }
    }
}
