//! Platform facts: where private and shared storage live, and whether the
//! OS gates shared storage behind a runtime-granted permission.

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::{CoreError, Result};

/// Platform identity as seen by the storage locator and permission gate.
pub trait Platform: Send + Sync {
    /// The app's private data area. Always available.
    fn private_data_dir(&self) -> PathBuf;

    /// The OS-reported public documents directory, if the platform has one.
    fn shared_documents_dir(&self) -> Option<PathBuf>;

    /// Whether writing to shared storage needs a runtime-granted
    /// authorization (true on mobile platforms with scoped storage).
    fn requires_shared_permission(&self) -> bool {
        false
    }
}

/// The host desktop platform: private data under the per-user project
/// directory, shared data under the user's Documents folder, no permission
/// gating.
pub struct HostPlatform {
    data_dir: PathBuf,
}

impl HostPlatform {
    pub fn new() -> Result<Self> {
        let dirs =
            ProjectDirs::from("com", "lifemonitor", "LifeMonitor").ok_or(CoreError::NoDataDir)?;
        Ok(Self {
            data_dir: dirs.data_dir().to_path_buf(),
        })
    }
}

impl Platform for HostPlatform {
    fn private_data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }

    fn shared_documents_dir(&self) -> Option<PathBuf> {
        dirs::document_dir()
    }
}

/// Fixed-path platform, used for `--data-dir` overrides and in tests.
pub struct StaticPlatform {
    private: PathBuf,
    shared: Option<PathBuf>,
    needs_permission: bool,
}

impl StaticPlatform {
    pub fn new(private: impl Into<PathBuf>) -> Self {
        Self {
            private: private.into(),
            shared: None,
            needs_permission: false,
        }
    }

    pub fn with_shared(mut self, shared: impl Into<PathBuf>) -> Self {
        self.shared = Some(shared.into());
        self
    }

    pub fn with_permission_required(mut self, required: bool) -> Self {
        self.needs_permission = required;
        self
    }
}

impl Platform for StaticPlatform {
    fn private_data_dir(&self) -> PathBuf {
        self.private.clone()
    }

    fn shared_documents_dir(&self) -> Option<PathBuf> {
        self.shared.clone()
    }

    fn requires_shared_permission(&self) -> bool {
        self.needs_permission
    }
}
