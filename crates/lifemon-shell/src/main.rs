//! LifeMonitor application shell
//!
//! Owns the three threads of control: the tokio runtime driving the
//! embedded listener and background init, the UI event loop (with the
//! `webview` feature: a native window hosting a web view at the listener
//! URL), and the bridge that delivers shell events from worker threads onto
//! the UI thread.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use lifemon_app::MonitorApp;
use lifemon_core::{HostPlatform, Platform, ShellEvent, ShellHandle, StaticPlatform};
use lifemon_server::{BootState, EmbeddedServer};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lifemonitor", about = "Personal life-tracking app")]
struct Args {
    /// Override the private data directory (development use).
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let platform: Arc<dyn Platform> = match args.data_dir {
        Some(dir) => Arc::new(StaticPlatform::new(dir)),
        None => Arc::new(HostPlatform::new()?),
    };

    let (shell, shell_rx) = ShellHandle::channel();
    let runtime = tokio::runtime::Runtime::new()?;
    let (state, server) = runtime.block_on(async {
        let state = BootState::bootstrap(platform, Arc::new(MonitorApp), shell);
        let server = EmbeddedServer::start(Arc::clone(&state)).await?;
        anyhow::Ok((state, server))
    })?;
    let url = server.local_url().to_string();
    tracing::info!(%url, mode = %state.mode(), "lifemonitor up");

    #[cfg(feature = "webview")]
    {
        ui::run(url, shell_rx, runtime)
    }
    #[cfg(not(feature = "webview"))]
    {
        runtime.block_on(run_headless(url, shell_rx))
    }
}

/// Event servicing without a native window: reloads are left to the pages'
/// self-poll and permission checks answer per the host platform (desktop
/// never gates shared storage).
#[cfg(not(feature = "webview"))]
async fn run_headless(url: String, mut shell_rx: UnboundedReceiver<ShellEvent>) -> Result<()> {
    tracing::info!(%url, "running headless; open the URL in a browser");
    while let Some(event) = shell_rx.recv().await {
        match event {
            ShellEvent::Reload => {
                tracing::info!("mode changed; clients converge via the loading page self-poll");
            }
            ShellEvent::CheckStoragePermission { reply } => {
                let _ = reply.send(true);
            }
        }
    }
    Ok(())
}

#[cfg(feature = "webview")]
mod ui {
    use super::*;
    use tao::event::{Event, WindowEvent};
    use tao::event_loop::{ControlFlow, EventLoopBuilder};
    use tao::window::WindowBuilder;
    use tokio::sync::oneshot;
    use wry::WebViewBuilder;

    enum UiEvent {
        Reload,
        CheckStoragePermission(oneshot::Sender<bool>),
    }

    /// Run the native window on the main thread. Consumes the runtime so
    /// the listener stays alive for the life of the window.
    pub fn run(
        url: String,
        mut shell_rx: UnboundedReceiver<ShellEvent>,
        runtime: tokio::runtime::Runtime,
    ) -> Result<()> {
        let event_loop = EventLoopBuilder::<UiEvent>::with_user_event().build();
        let proxy = event_loop.create_proxy();

        // Bridge worker-thread shell events onto the UI event loop.
        runtime.spawn(async move {
            while let Some(event) = shell_rx.recv().await {
                let forwarded = match event {
                    ShellEvent::Reload => proxy.send_event(UiEvent::Reload),
                    ShellEvent::CheckStoragePermission { reply } => {
                        proxy.send_event(UiEvent::CheckStoragePermission(reply))
                    }
                };
                if forwarded.is_err() {
                    break;
                }
            }
        });

        let window = WindowBuilder::new()
            .with_title("LifeMonitor")
            .build(&event_loop)?;
        let webview = WebViewBuilder::new(&window).with_url(&url).build()?;

        event_loop.run(move |event, _target, control_flow| {
            // Moving the runtime in keeps the listener alive with the loop.
            let _runtime = &runtime;
            *control_flow = ControlFlow::Wait;
            match event {
                Event::UserEvent(UiEvent::Reload) => {
                    // Re-setting the URL forces a reload.
                    if let Err(e) = webview.load_url(&url) {
                        tracing::error!(error = %e, "web view refresh failed");
                    }
                }
                Event::UserEvent(UiEvent::CheckStoragePermission(reply)) => {
                    // Desktop platforms never gate the documents folder.
                    let _ = reply.send(true);
                }
                Event::WindowEvent {
                    event: WindowEvent::CloseRequested,
                    ..
                } => *control_flow = ControlFlow::Exit,
                _ => {}
            }
        });
    }
}
