//! lifemon-app: The downstream tracking application
//!
//! The collaborator the bootstrap core hands off to once storage is
//! resolved: a one-time persistence preparation (schema migration) plus the
//! request handler. Only a dashboard and a health route live here; the full
//! forms-over-data CRUD surface is out of the bootstrap core's scope.

pub mod schema;

use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use lifemon_server::AppFactory;
use rusqlite::Connection;
use serde::Serialize;
use thiserror::Error;

/// Database file name inside the resolved storage directory.
pub const DB_FILE: &str = "lifemonitor.db";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = match self {
            AppError::Db(_) => "DB_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        };
        let body = ErrorResponse {
            error: self.to_string(),
            code,
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

struct AppDb {
    conn: Mutex<Connection>,
}

#[derive(Debug, Default)]
struct Stats {
    habits: i64,
    entries: i64,
    quotes: i64,
    open_tasks: i64,
}

impl AppDb {
    fn stats(&self) -> Result<Stats, AppError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Internal("database lock poisoned".to_string()))?;
        let count = |sql: &str| -> rusqlite::Result<i64> {
            conn.query_row(sql, [], |row| row.get(0))
        };
        Ok(Stats {
            habits: count("SELECT COUNT(*) FROM habit WHERE is_active = 1")?,
            entries: count("SELECT COUNT(*) FROM daily_entry")?,
            quotes: count("SELECT COUNT(*) FROM quote")?,
            open_tasks: count("SELECT COUNT(*) FROM task WHERE done = 0")?,
        })
    }
}

/// The downstream application as a whole.
pub struct MonitorApp;

impl AppFactory for MonitorApp {
    fn prepare(&self, data_dir: &Path) -> anyhow::Result<Router> {
        let db_path = data_dir.join(DB_FILE);
        let conn = Connection::open(&db_path)?;
        schema::migrate(&conn)?;
        tracing::info!(db = %db_path.display(), "tracker database ready");

        let db = Arc::new(AppDb {
            conn: Mutex::new(conn),
        });
        Ok(Router::new()
            .route("/", get(dashboard))
            .route("/health", get(health))
            .with_state(db))
    }
}

async fn dashboard(State(db): State<Arc<AppDb>>) -> Result<Html<String>, AppError> {
    let stats = db.stats()?;
    Ok(Html(format!(
        r#"<!DOCTYPE html><html><head><meta name="viewport" content="width=device-width, initial-scale=1.0"></head>
<body style="font-family:-apple-system,sans-serif;padding:24px;">
<h1>LifeMonitor</h1>
<ul>
  <li>Habits tracked: {habits}</li>
  <li>Daily entries: {entries}</li>
  <li>Quotes: {quotes}</li>
  <li>Open tasks: {open_tasks}</li>
</ul>
</body></html>"#,
        habits = stats.habits,
        entries = stats.entries,
        quotes = stats.quotes,
        open_tasks = stats.open_tasks,
    )))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
