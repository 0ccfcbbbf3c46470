//! The master request router
//!
//! One fallback handler covers the whole path space. It reads the runtime
//! mode exactly once per request and dispatches on that snapshot, so a
//! single response never mixes two modes. In READY the request is forwarded
//! verbatim to the downstream handler; a momentarily-null handler at the
//! transition boundary degrades to the loading page instead of faulting.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use lifemon_core::{RuntimeMode, StorageChoice};
use tower::ServiceExt;

use crate::pages;
use crate::state::BootState;

/// Build the embedded listener's router around the bootstrap state.
pub fn build_router(state: Arc<BootState>) -> Router {
    Router::new().fallback(dispatch).with_state(state)
}

async fn dispatch(State(state): State<Arc<BootState>>, req: Request) -> Response {
    match state.mode() {
        RuntimeMode::Setup => handle_setup(&state, req).await,
        RuntimeMode::Loading => pages::loading(),
        RuntimeMode::Ready => forward_downstream(&state, req).await,
        RuntimeMode::Error => pages::error_page(state.failure_detail()),
    }
}

/// SETUP sub-routing: a `mode` query parameter drives completion, anything
/// else serves the storage-choice page.
async fn handle_setup(state: &Arc<BootState>, req: Request) -> Response {
    match req.uri().query().and_then(mode_param) {
        Some(Ok(StorageChoice::Private)) => {
            state.complete_setup(StorageChoice::Private).await;
            redirect_home()
        }
        Some(Ok(StorageChoice::Public)) => {
            if state.gate.check_and_request().await {
                state.complete_setup(StorageChoice::Public).await;
                redirect_home()
            } else {
                pages::permission()
            }
        }
        Some(Err(e)) => {
            tracing::warn!(error = %e, "rejecting setup submission");
            pages::setup()
        }
        None => pages::setup(),
    }
}

async fn forward_downstream(state: &Arc<BootState>, req: Request) -> Response {
    match state.downstream_snapshot() {
        Some(router) => {
            let router: Router = router.as_ref().clone();
            match router.oneshot(req).await {
                Ok(resp) => resp,
                Err(infallible) => match infallible {},
            }
        }
        None => {
            // READY published a hair before the handler became visible to
            // this thread; degrade rather than fault.
            tracing::warn!("READY with no downstream snapshot; serving loading page");
            pages::loading()
        }
    }
}

/// Redirect back to `/` so the choice query parameter is cleared.
fn redirect_home() -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, "/")],
        "Redirecting...",
    )
        .into_response()
}

fn mode_param(query: &str) -> Option<Result<StorageChoice, lifemon_core::CoreError>> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == "mode").then(|| value.parse())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppFactory;
    use axum::body::Body;
    use axum::routing::get;
    use lifemon_core::{ShellEvent, ShellHandle, StaticPlatform};
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Factory that blocks until the test releases it, so LOADING can be
    /// observed deterministically. Sending `Err` makes init fail.
    struct GatedFactory(Mutex<std::sync::mpsc::Receiver<anyhow::Result<()>>>);

    impl GatedFactory {
        fn pair() -> (std::sync::mpsc::Sender<anyhow::Result<()>>, Arc<Self>) {
            let (tx, rx) = std::sync::mpsc::channel();
            (tx, Arc::new(Self(Mutex::new(rx))))
        }
    }

    impl AppFactory for GatedFactory {
        fn prepare(&self, _data_dir: &Path) -> anyhow::Result<Router> {
            let rx = self.0.lock().unwrap();
            match rx.recv_timeout(Duration::from_secs(10)) {
                Ok(Ok(())) => Ok(Router::new().route("/", get(|| async { "downstream home" }))),
                Ok(Err(e)) => Err(e),
                Err(_) => anyhow::bail!("release signal never arrived"),
            }
        }
    }

    fn fresh_state(factory: Arc<dyn AppFactory>) -> (TempDir, Arc<BootState>) {
        let tmp = TempDir::new().unwrap();
        let platform = Arc::new(StaticPlatform::new(tmp.path().join("private")));
        let (shell, _rx) = ShellHandle::channel();
        let state = BootState::bootstrap(platform, factory, shell);
        (tmp, state)
    }

    async fn get_path(state: &Arc<BootState>, path: &str) -> Response {
        let req = Request::builder().uri(path).body(Body::empty()).unwrap();
        build_router(Arc::clone(state)).oneshot(req).await.unwrap()
    }

    async fn body_text(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn wait_for(state: &Arc<BootState>, mode: RuntimeMode) {
        for _ in 0..500 {
            if state.mode() == mode {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("mode never reached {mode}, stuck at {}", state.mode());
    }

    #[tokio::test]
    async fn fresh_process_serves_storage_choice_page() {
        let (release, factory) = GatedFactory::pair();
        let (_tmp, state) = fresh_state(factory);

        let resp = get_path(&state, "/").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_text(resp).await;
        assert!(body.contains("Internal Storage"));
        assert!(body.contains("Documents Folder"));
        drop(release);
    }

    #[tokio::test]
    async fn private_choice_redirects_then_serves_loading() {
        let (release, factory) = GatedFactory::pair();
        let (_tmp, state) = fresh_state(factory);

        let resp = get_path(&state, "/?mode=private").await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()[header::LOCATION], "/");

        // Init is gated, so the follow-up request observes LOADING.
        let resp = get_path(&state, "/").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("Starting LifeMonitor"));

        release.send(Ok(())).unwrap();
        wait_for(&state, RuntimeMode::Ready).await;
        let body = body_text(get_path(&state, "/").await).await;
        assert_eq!(body, "downstream home");
    }

    #[tokio::test]
    async fn failed_init_serves_diagnostic_page() {
        let (release, factory) = GatedFactory::pair();
        let (_tmp, state) = fresh_state(factory);

        get_path(&state, "/?mode=private").await;
        release
            .send(Err(anyhow::anyhow!("migration failed: table corrupt")))
            .unwrap();
        wait_for(&state, RuntimeMode::Error).await;

        let resp = get_path(&state, "/").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_text(resp).await;
        assert!(body.contains("Startup Failed"));
        assert!(body.contains("migration failed"));
    }

    #[tokio::test]
    async fn denied_permission_keeps_setup_mode() {
        let tmp = TempDir::new().unwrap();
        let platform = Arc::new(
            StaticPlatform::new(tmp.path().join("private"))
                .with_shared(tmp.path().join("Documents"))
                .with_permission_required(true),
        );
        let (shell, mut shell_rx) = ShellHandle::channel();
        // Fake UI loop that reports the grant missing.
        tokio::spawn(async move {
            while let Some(event) = shell_rx.recv().await {
                if let ShellEvent::CheckStoragePermission { reply } = event {
                    let _ = reply.send(false);
                }
            }
        });
        let (release, factory) = GatedFactory::pair();
        let state = BootState::bootstrap(platform, factory, shell);

        let resp = get_path(&state, "/?mode=public").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_text(resp).await;
        assert!(body.contains("Permission Required"));
        assert!(body.contains("/?mode=public"));
        assert_eq!(state.mode(), RuntimeMode::Setup);
        drop(release);
    }

    #[tokio::test]
    async fn granted_permission_completes_public_setup() {
        let tmp = TempDir::new().unwrap();
        let platform = Arc::new(
            StaticPlatform::new(tmp.path().join("private"))
                .with_shared(tmp.path().join("Documents"))
                .with_permission_required(true),
        );
        let (shell, mut shell_rx) = ShellHandle::channel();
        tokio::spawn(async move {
            while let Some(event) = shell_rx.recv().await {
                if let ShellEvent::CheckStoragePermission { reply } = event {
                    let _ = reply.send(true);
                }
            }
        });
        let (release, factory) = GatedFactory::pair();
        let state = BootState::bootstrap(platform, factory, shell);

        let resp = get_path(&state, "/?mode=public").await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_ne!(state.mode(), RuntimeMode::Setup);
        release.send(Ok(())).unwrap();
        wait_for(&state, RuntimeMode::Ready).await;
    }

    #[tokio::test]
    async fn unknown_mode_value_reshows_chooser() {
        let (release, factory) = GatedFactory::pair();
        let (_tmp, state) = fresh_state(factory);

        let resp = get_path(&state, "/?mode=documents").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("Internal Storage"));
        assert_eq!(state.mode(), RuntimeMode::Setup);
        drop(release);
    }

    #[tokio::test]
    async fn ready_with_null_downstream_degrades_to_loading() {
        let (release, factory) = GatedFactory::pair();
        let (_tmp, state) = fresh_state(factory);

        // Force the boundary condition the state machine normally prevents.
        state.mode.advance(RuntimeMode::Loading).unwrap();
        state.mode.advance(RuntimeMode::Ready).unwrap();
        assert!(state.downstream_snapshot().is_none());

        let resp = get_path(&state, "/anything").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("Starting LifeMonitor"));
        drop(release);
    }

    #[tokio::test]
    async fn requests_racing_the_ready_transition_stay_well_formed() {
        let (release, factory) = GatedFactory::pair();
        let (_tmp, state) = fresh_state(factory);

        get_path(&state, "/?mode=private").await;

        let mut clients = Vec::new();
        for _ in 0..16 {
            let state = Arc::clone(&state);
            clients.push(tokio::spawn(async move {
                get_path(&state, "/").await.status()
            }));
        }
        release.send(Ok(())).unwrap();

        for client in clients {
            let status = client.await.unwrap();
            assert_eq!(status, StatusCode::OK);
        }
    }
}
