//! Static bootstrap pages served before the downstream application exists.
//!
//! These are the only pages the core renders itself; everything else comes
//! from the downstream handler once READY. The loading page self-refreshes
//! as an at-least-once convergence backstop in case a forced reload signal
//! is lost.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

/// Client-side poll interval of the loading page, in milliseconds.
pub const LOADING_POLL_MS: u32 = 2500;

const SETUP_HTML: &str = r#"<!DOCTYPE html><html lang="en"><head><meta name="viewport" content="width=device-width, initial-scale=1.0">
<style>
  body { font-family: -apple-system, sans-serif; background: #F2F2F7; padding: 20px; display: flex; flex-direction: column; align-items: center; justify-content: center; min-height: 100vh; margin: 0; }
  .card { background: white; border-radius: 18px; padding: 24px; margin-bottom: 20px; width: 100%; max-width: 400px; box-shadow: 0 4px 15px rgba(0,0,0,0.05); cursor: pointer; text-decoration: none; color: black; display: block; }
  .card:active { transform: scale(0.98); }
  h3 { margin: 0 0 5px 0; } p { margin: 0; color: #8E8E93; font-size: 14px; }
  .badge { display: inline-block; padding: 4px 8px; border-radius: 6px; font-size: 11px; font-weight: bold; text-transform: uppercase; margin-bottom: 10px; }
</style></head><body>
  <h1 style="margin-bottom: 30px;">Where to save data?</h1>

  <a href="/?mode=private" class="card">
    <span class="badge" style="background:rgba(142,142,147,0.2);color:#3A3A3C;">Private</span>
    <h3>Internal Storage</h3>
    <p>Secure. Stored inside the app. Best if you don't plan to move files manually.</p>
  </a>

  <a href="/?mode=public" class="card">
    <span class="badge" style="background:rgba(0,122,255,0.15);color:#007AFF;">Shared</span>
    <h3>Documents Folder</h3>
    <p>Accessible. Saved as 'LifeMonitor' in Documents. Easy to back up.</p>
  </a>
</body></html>"#;

const PERMISSION_HTML: &str = r#"<!DOCTYPE html><html><body style="font-family:-apple-system,sans-serif;padding:40px;text-align:center;">
<h2 style="color:#007AFF;">Permission Required</h2>
<p>To save data in "Shared Documents", this device requires special access.</p>
<p>We have opened the Settings page.</p>
<ol style="text-align:left;display:inline-block;">
  <li>Find <b>LifeMonitor</b></li>
  <li>Turn <b>ON</b> "Allow access to all files"</li>
  <li>Press Back to return here</li>
</ol>
<br><br>
<a href="/?mode=public" style="background:#007AFF;color:white;padding:15px 30px;text-decoration:none;border-radius:12px;font-weight:bold;">I Have Enabled It</a>
<br><br><a href="/" style="color:#888;">Cancel</a>
</body></html>"#;

/// Storage-choice selection page (SETUP, no query parameters).
pub fn setup() -> Response {
    Html(SETUP_HTML).into_response()
}

/// Instructional page when the shared-storage grant is missing.
pub fn permission() -> Response {
    Html(PERMISSION_HTML).into_response()
}

/// Self-refreshing placeholder served during LOADING (and whenever the
/// downstream handler is momentarily unavailable).
pub fn loading() -> Response {
    let html = format!(
        r#"<!DOCTYPE html><html><body style="display:flex;justify-content:center;align-items:center;height:100vh;margin:0;">
<div style="text-align:center;font-family:sans-serif;">
  <div style="width:50px;height:50px;border:5px solid #eee;border-top:5px solid #007AFF;border-radius:50%;animation:s 1s infinite linear;margin:0 auto 20px;"></div>
  <h2>Starting LifeMonitor...</h2>
  <p style="color:#888;">Initializing Database...</p>
</div><style>@keyframes s{{to{{transform:rotate(360deg)}}}}</style>
<script>setTimeout(function(){{ window.location.reload(); }}, {LOADING_POLL_MS});</script>
</body></html>"#
    );
    Html(html).into_response()
}

/// Diagnostic page for the terminal ERROR mode. Always renders something;
/// the only recovery is a full restart.
pub fn error_page(detail: Option<Arc<String>>) -> Response {
    let detail = detail
        .map(|d| escape(&d))
        .unwrap_or_else(|| "No diagnostic recorded.".to_string());
    let html = format!(
        r#"<!DOCTYPE html><html><body style="font-family:-apple-system,sans-serif;padding:40px;text-align:center;">
<h2 style="color:#FF3B30;">Startup Failed</h2>
<p>LifeMonitor could not initialize its database.</p>
<pre style="text-align:left;display:inline-block;background:#F2F2F7;padding:16px;border-radius:12px;max-width:90%;overflow:auto;">{detail}</pre>
<p style="color:#888;">Restart the app to try again.</p>
</body></html>"#
    );
    (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response()
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_page_offers_both_locations() {
        assert!(SETUP_HTML.contains("Internal Storage"));
        assert!(SETUP_HTML.contains("Documents Folder"));
        assert!(SETUP_HTML.contains("/?mode=private"));
        assert!(SETUP_HTML.contains("/?mode=public"));
    }

    #[test]
    fn permission_page_links_back_to_retry() {
        assert!(PERMISSION_HTML.contains("/?mode=public"));
    }

    #[test]
    fn error_detail_is_escaped() {
        let detail = Arc::new("<script>boom()</script>".to_string());
        assert!(!escape(&detail).contains('<'));
    }
}
