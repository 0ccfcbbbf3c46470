//! Runtime-mode state machine
//!
//! One [`ModeCell`] exists per running process. Request workers read it once
//! per request; only the mode controller writes it, always along the fixed
//! transition order:
//!
//! ```text
//! SETUP --complete_setup--> LOADING --init ok--> READY   (terminal)
//!                           LOADING --init err-> ERROR   (terminal)
//! ```
//!
//! READY and ERROR are never left within a process run.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use thiserror::Error;

/// Current phase of the bootstrap state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RuntimeMode {
    /// First run: waiting for the user to pick a storage location.
    Setup = 0,
    /// Storage resolved; the downstream application is initializing.
    Loading = 1,
    /// Downstream handler constructed; all requests are delegated to it.
    Ready = 2,
    /// Background initialization failed; terminal for this run.
    Error = 3,
}

impl RuntimeMode {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => RuntimeMode::Setup,
            1 => RuntimeMode::Loading,
            2 => RuntimeMode::Ready,
            _ => RuntimeMode::Error,
        }
    }

    /// Whether the state machine permits moving from `self` to `next`.
    pub fn can_advance_to(self, next: RuntimeMode) -> bool {
        matches!(
            (self, next),
            (RuntimeMode::Setup, RuntimeMode::Loading)
                | (RuntimeMode::Loading, RuntimeMode::Ready)
                | (RuntimeMode::Loading, RuntimeMode::Error)
        )
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuntimeMode::Setup => "SETUP",
            RuntimeMode::Loading => "LOADING",
            RuntimeMode::Ready => "READY",
            RuntimeMode::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// Transition rejected by the state machine.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("illegal mode transition: {from} -> {to}")]
pub struct IllegalTransition {
    pub from: RuntimeMode,
    pub to: RuntimeMode,
}

/// Atomic holder for the process-wide [`RuntimeMode`].
///
/// Loads use `Acquire` and transitions use `AcqRel` compare-exchange, so a
/// mode published on one thread is visible to readers on every other thread
/// without torn or stale reads.
pub struct ModeCell(AtomicU8);

impl ModeCell {
    pub fn new(initial: RuntimeMode) -> Self {
        Self(AtomicU8::new(initial as u8))
    }

    /// Snapshot the current mode. Callers handling a request must call this
    /// exactly once and dispatch on the result, so a single response never
    /// observes two different modes.
    pub fn load(&self) -> RuntimeMode {
        RuntimeMode::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Advance to `next`, failing if the state machine forbids it from the
    /// currently observed mode. Losing a race against another legal writer
    /// surfaces as `IllegalTransition` from the newly observed mode.
    pub fn advance(&self, next: RuntimeMode) -> Result<(), IllegalTransition> {
        let mut current = self.load();
        loop {
            if !current.can_advance_to(next) {
                return Err(IllegalTransition {
                    from: current,
                    to: next,
                });
            }
            match self.0.compare_exchange(
                current as u8,
                next as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    tracing::info!(from = %current, to = %next, "mode transition");
                    return Ok(());
                }
                Err(observed) => current = RuntimeMode::from_u8(observed),
            }
        }
    }
}
