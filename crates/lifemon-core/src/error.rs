//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No private data directory available on this platform")]
    NoDataDir,

    #[error("Invalid storage choice: {0:?} (expected \"private\" or \"public\")")]
    InvalidChoice(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
