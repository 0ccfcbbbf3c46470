//! Embedded HTTP listener
//!
//! Bound to `127.0.0.1` on an OS-assigned ephemeral port, discovered after
//! bind and handed only to the UI shell. The listener lives for the whole
//! process; shutdown does not drain in-flight requests.

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::error::Result;
use crate::routes::build_router;
use crate::state::BootState;

pub struct EmbeddedServer {
    local_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl EmbeddedServer {
    /// Bind and start serving in a background task.
    pub async fn start(state: Arc<BootState>) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let addr = listener.local_addr()?;
        let local_url = format!("http://{addr}/");
        let app = build_router(state);

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "embedded listener exited");
            }
        });
        tracing::info!(url = %local_url, "embedded listener running");

        Ok(Self { local_url, handle })
    }

    /// The listener's URL, for the UI shell's web view only.
    pub fn local_url(&self) -> &str {
        &self.local_url
    }

    /// Tear the listener down without draining.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}
