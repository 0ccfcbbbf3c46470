//! Shared bootstrap state
//!
//! [`BootState`] is the single state-holder injected into both the request
//! router and the mode controller. The mode cell and the downstream-handler
//! snapshot are the only state shared across the UI thread, the request
//! workers, and the background initializer; both publish with atomic
//! visibility so no thread sees a torn or stale value.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwapOption;
use axum::Router;
use lifemon_core::{
    ModeCell, PermissionGate, Platform, RuntimeMode, ShellHandle, StorageLocator,
};
use tokio::sync::Mutex;

/// The downstream application, as seen by the bootstrap core: a one-time
/// persistence-preparation step that may fail, yielding the request handler.
pub trait AppFactory: Send + Sync + 'static {
    fn prepare(&self, data_dir: &Path) -> anyhow::Result<Router>;
}

impl<F> AppFactory for F
where
    F: Fn(&Path) -> anyhow::Result<Router> + Send + Sync + 'static,
{
    fn prepare(&self, data_dir: &Path) -> anyhow::Result<Router> {
        self(data_dir)
    }
}

pub struct BootState {
    pub(crate) mode: ModeCell,
    /// READY implies this is non-null; the router only ever loads a
    /// snapshot, never mutates it.
    pub(crate) downstream: ArcSwapOption<Router>,
    /// Diagnostic recorded by a failed background init, shown on the
    /// ERROR page.
    pub(crate) init_failure: ArcSwapOption<String>,
    /// Resolved storage path, stable for the lifetime of one run.
    pub(crate) data_dir: OnceLock<PathBuf>,
    pub(crate) shell: ShellHandle,
    pub(crate) gate: PermissionGate,
    pub(crate) locator: StorageLocator,
    pub(crate) factory: Arc<dyn AppFactory>,
    /// Serializes concurrent SETUP submissions; the loser observes the
    /// advanced mode and becomes a no-op.
    pub(crate) setup_lock: Mutex<()>,
}

impl BootState {
    pub(crate) fn new(
        initial: RuntimeMode,
        platform: Arc<dyn Platform>,
        factory: Arc<dyn AppFactory>,
        shell: ShellHandle,
    ) -> Self {
        Self {
            mode: ModeCell::new(initial),
            downstream: ArcSwapOption::empty(),
            init_failure: ArcSwapOption::empty(),
            data_dir: OnceLock::new(),
            gate: PermissionGate::new(shell.clone(), Arc::clone(&platform)),
            shell,
            locator: StorageLocator::new(platform),
            factory,
            setup_lock: Mutex::new(()),
        }
    }

    /// Current mode. Request handlers read this exactly once per request.
    pub fn mode(&self) -> RuntimeMode {
        self.mode.load()
    }

    /// Snapshot of the downstream handler, if constructed.
    pub fn downstream_snapshot(&self) -> Option<Arc<Router>> {
        self.downstream.load_full()
    }

    /// Diagnostic from a failed background init, if any.
    pub fn failure_detail(&self) -> Option<Arc<String>> {
        self.init_failure.load_full()
    }

    /// The resolved storage path for this run, once setup has completed.
    pub fn data_dir(&self) -> Option<&PathBuf> {
        self.data_dir.get()
    }
}
