//! Error type for engine setup and local persistence.
//!
//! Sync runs never return these: a run's failures end up inside its
//! [`bricksync_types::SyncReport`].

use bricksync_types::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CoreError {
    /// Inventory database could not be opened or queried (SQLite).
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// HTTP client could not be constructed.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Report or config file I/O failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Other(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
