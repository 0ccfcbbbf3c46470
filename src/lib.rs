//! LifeMonitor: personal life-tracking app with an embedded bootstrap server.
//!
//! Facade over the workspace crates; see `lifemon-core` for the runtime-mode
//! state machine, `lifemon-server` for the master router and listener, and
//! `lifemon-app` for the downstream tracker application.

pub use lifemon_app::MonitorApp;
pub use lifemon_core::{
    HostPlatform, ModeCell, PermissionGate, Platform, RuntimeMode, ShellEvent, ShellHandle,
    StaticPlatform, StorageChoice, StorageLocator, DATA_PATH_ENV,
};
pub use lifemon_server::{build_router, AppFactory, BootState, EmbeddedServer};
