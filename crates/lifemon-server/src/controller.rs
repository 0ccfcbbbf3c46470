//! Mode controller: the only writer of the runtime mode.
//!
//! Orchestrates SETUP -> LOADING -> READY | ERROR. Transitions are totally
//! ordered: setup completion runs under the single-flight lock and the
//! background initializer is the sole writer afterwards. Persistence of the
//! storage choice is best-effort: a failed save is logged and the resolved
//! path stays in effect for this run.

use std::sync::Arc;

use lifemon_core::{Platform, RuntimeMode, ShellHandle, StorageChoice};

use crate::state::{AppFactory, BootState};

impl BootState {
    /// Construct the bootstrap state and start the pipeline. Invoked once at
    /// process start, inside a tokio runtime.
    ///
    /// A persisted storage choice moves the process straight into LOADING
    /// and schedules background init; otherwise the run begins in SETUP.
    pub fn bootstrap(
        platform: Arc<dyn Platform>,
        factory: Arc<dyn AppFactory>,
        shell: ShellHandle,
    ) -> Arc<Self> {
        let locator_probe = lifemon_core::StorageLocator::new(Arc::clone(&platform));
        let persisted = locator_probe.load_config();

        let initial = match persisted {
            Some(_) => RuntimeMode::Loading,
            None => RuntimeMode::Setup,
        };
        let state = Arc::new(BootState::new(initial, platform, factory, shell));

        if let Some(choice) = persisted {
            tracing::info!(%choice, "persisted storage choice found; skipping setup");
            state.resolve_and_publish(choice);
            state.spawn_background_init();
        } else {
            tracing::info!("no storage choice persisted; entering setup");
        }
        state
    }

    /// Complete first-run setup with the user's storage choice.
    ///
    /// Runs under the setup lock so racing submissions serialize; a loser
    /// re-observes the mode and returns without effect. Never blocks the
    /// caller on downstream initialization.
    pub async fn complete_setup(self: &Arc<Self>, choice: StorageChoice) {
        let _flight = self.setup_lock.lock().await;
        if self.mode.load() != RuntimeMode::Setup {
            tracing::debug!(%choice, "setup already completed; ignoring repeat submission");
            return;
        }
        tracing::info!(%choice, "setup completed");

        self.resolve_and_publish(choice);
        if let Err(e) = self.locator.save_config(choice) {
            tracing::error!(error = %e, "could not persist storage choice");
        }
        if let Err(e) = self.mode.advance(RuntimeMode::Loading) {
            tracing::error!(error = %e, "setup transition rejected");
            return;
        }
        self.shell.request_reload();
        self.spawn_background_init();
    }

    /// Resolve the storage path and pin it for the rest of the run. A
    /// resolution failure is non-fatal: the private area is the fallback.
    fn resolve_and_publish(&self, choice: StorageChoice) {
        let path = match self.locator.resolve(choice) {
            Ok(path) => path,
            Err(e) => {
                tracing::error!(error = %e, %choice, "storage resolution failed; using private area");
                let fallback = self.locator.private_path();
                if let Err(e) = std::fs::create_dir_all(&fallback) {
                    tracing::error!(error = %e, "private fallback unavailable");
                }
                fallback
            }
        };
        let _ = self.data_dir.set(path);
    }

    /// Launch downstream initialization on the blocking pool. Terminal on
    /// failure: the mode moves to ERROR and stays there until restart.
    pub(crate) fn spawn_background_init(self: &Arc<Self>) {
        let state = Arc::clone(self);
        tokio::spawn(async move {
            tracing::info!("background init starting");
            let factory = Arc::clone(&state.factory);
            let data_dir = state
                .data_dir
                .get()
                .cloned()
                .unwrap_or_else(|| state.locator.private_path());

            let prepared =
                tokio::task::spawn_blocking(move || factory.prepare(&data_dir)).await;
            match prepared {
                Ok(Ok(router)) => {
                    // Publish the handler before READY so a reader that
                    // observes READY always finds a snapshot.
                    state.downstream.store(Some(Arc::new(router)));
                    match state.mode.advance(RuntimeMode::Ready) {
                        Ok(()) => {
                            tracing::info!("downstream application ready");
                            state.shell.request_reload();
                        }
                        Err(e) => tracing::error!(error = %e, "ready transition rejected"),
                    }
                }
                Ok(Err(e)) => state.fail_init(format!("{e:#}")),
                Err(e) => state.fail_init(format!("init task panicked: {e}")),
            }
        });
    }

    fn fail_init(&self, detail: String) {
        tracing::error!(detail = %detail, "background init failed; restart required");
        self.init_failure.store(Some(Arc::new(detail)));
        if let Err(e) = self.mode.advance(RuntimeMode::Error) {
            tracing::error!(error = %e, "error transition rejected");
        }
        self.shell.request_reload();
    }
}
