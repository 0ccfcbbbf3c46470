//! Cross-thread signaling toward the UI shell
//!
//! Worker threads never touch the native window directly; they push
//! [`ShellEvent`]s onto an unbounded channel whose receiver is drained by
//! the UI event loop. Reload requests are fire-and-forget: if the shell is
//! gone the event is dropped and logged, and the LOADING page's self-poll
//! converges the view anyway.

use tokio::sync::{mpsc, oneshot};

/// Event consumed by the UI event loop.
pub enum ShellEvent {
    /// Force the web view to reload the listener URL. Sent after every mode
    /// transition so the user sees the new phase without waiting for the
    /// client-side poll.
    Reload,
    /// Run the platform permission query on the UI thread and report the
    /// grant status back through `reply`. Certain OS APIs are only valid
    /// from the main thread, so the check cannot run on a request worker.
    CheckStoragePermission { reply: oneshot::Sender<bool> },
}

/// Cloneable sender half handed to the mode controller and permission gate.
#[derive(Clone)]
pub struct ShellHandle {
    tx: mpsc::UnboundedSender<ShellEvent>,
}

impl ShellHandle {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ShellEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Ask the shell to reload the web view. Failure to deliver is logged
    /// and swallowed.
    pub fn request_reload(&self) {
        if self.tx.send(ShellEvent::Reload).is_err() {
            tracing::warn!("shell gone; reload signal dropped");
        }
    }

    /// Submit a permission check to the UI thread. Returns the receiver the
    /// caller awaits, or `None` if the shell is gone.
    pub fn submit_permission_check(&self) -> Option<oneshot::Receiver<bool>> {
        let (reply, rx) = oneshot::channel();
        match self.tx.send(ShellEvent::CheckStoragePermission { reply }) {
            Ok(()) => Some(rx),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reload_reaches_the_receiver() {
        let (shell, mut rx) = ShellHandle::channel();
        shell.request_reload();
        assert!(matches!(rx.recv().await, Some(ShellEvent::Reload)));
    }

    #[test]
    fn reload_with_dropped_receiver_does_not_panic() {
        let (shell, rx) = ShellHandle::channel();
        drop(rx);
        shell.request_reload();
    }

    #[tokio::test]
    async fn permission_check_round_trips() {
        let (shell, mut rx) = ShellHandle::channel();
        let pending = shell.submit_permission_check().unwrap();
        match rx.recv().await {
            Some(ShellEvent::CheckStoragePermission { reply }) => {
                reply.send(true).unwrap();
            }
            _ => panic!("expected permission check"),
        }
        assert!(pending.await.unwrap());
    }
}
