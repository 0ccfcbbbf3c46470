//! Server error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Core error: {0}")]
    Core(#[from] lifemon_core::CoreError),
}

pub type Result<T> = std::result::Result<T, ServerError>;
