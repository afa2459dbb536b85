//! Failures loading, validating or storing `bricksync.json`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ConfigError {
    /// The data directory could not be resolved or created
    #[error("Data directory unavailable: {message}")]
    DataDir { message: String },

    #[error("Cannot read config at {path}: {message}")]
    Read { path: String, message: String },

    /// Not valid JSON, or JSON that does not describe a config
    #[error("Config parse error: {message}")]
    Parse { message: String },

    /// A value is out of range. `field` is the dotted key, e.g. `sets.interval_minutes`
    #[error("Invalid config value for {field}: {message}")]
    Invalid { field: String, message: String },

    #[error("Cannot write config at {path}: {message}")]
    Write { path: String, message: String },
}

impl ConfigError {
    pub fn parse(e: &serde_json::Error) -> Self {
        Self::Parse { message: e.to_string() }
    }

    pub fn read(path: &Path, e: &std::io::Error) -> Self {
        Self::Read { path: path.display().to_string(), message: e.to_string() }
    }

    pub fn write(path: &Path, e: &std::io::Error) -> Self {
        Self::Write { path: path.display().to_string(), message: e.to_string() }
    }

    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::Invalid { field: field.to_string(), message: message.into() }
    }

    /// The dotted key of the offending value, for validation failures.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Invalid { field, .. } => Some(field),
            _ => None,
        }
    }
}
