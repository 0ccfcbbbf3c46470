//! lifemon-core: Bootstrap state machine and storage resolution for LifeMonitor
//!
//! This crate defines the process-local state that governs the embedded
//! server before and during hand-off to the main application:
//! - [`RuntimeMode`] / [`ModeCell`]: the SETUP → LOADING → READY | ERROR
//!   lifecycle, shared across request workers with atomic visibility
//! - [`StorageLocator`]: maps the user's storage choice (private app area vs
//!   shared documents) to a concrete, existing directory
//! - [`ShellHandle`]: message-passing bridge from worker threads to the UI
//!   event loop (forced reloads, permission round-trips)
//! - [`PermissionGate`]: bounded call-and-wait permission verification for
//!   platforms that gate shared-storage access
//!
//! No HTTP types live here; the server crate layers routing on top.

mod error;
pub mod mode;
pub mod permission;
pub mod platform;
pub mod shell;
pub mod storage;

pub use error::{CoreError, Result};
pub use mode::{IllegalTransition, ModeCell, RuntimeMode};
pub use permission::{PermissionGate, DEFAULT_PERMISSION_WAIT};
pub use platform::{HostPlatform, Platform, StaticPlatform};
pub use shell::{ShellEvent, ShellHandle};
pub use storage::{StorageChoice, StorageConfig, StorageLocator, DATA_PATH_ENV};
