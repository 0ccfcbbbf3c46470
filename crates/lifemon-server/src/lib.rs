//! lifemon-server: Embedded bootstrap server for LifeMonitor
//!
//! Hosts the master request router in front of the downstream application:
//! every inbound request is dispatched purely on the current
//! [`lifemon_core::RuntimeMode`]. SETUP serves the storage-choice flow,
//! LOADING serves a self-polling placeholder, READY forwards verbatim to the
//! downstream handler, ERROR serves a diagnostic page. The mode controller
//! living on [`BootState`] owns every transition.

pub mod controller;
pub mod error;
pub mod pages;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{Result, ServerError};
pub use routes::build_router;
pub use server::EmbeddedServer;
pub use state::{AppFactory, BootState};
