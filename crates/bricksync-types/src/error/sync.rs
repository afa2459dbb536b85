//! Errors raised while reading, planning or applying a sync run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum SyncError {
    /// Required credentials are missing
    #[error("Sync not configured: missing {missing}")]
    NotConfigured {
        /// Which credential was absent
        missing: String,
    },

    /// Network failure that persisted through every retry
    #[error("Transport failed after {attempts} attempts: {message}")]
    Transport { attempts: u32, message: String },

    /// Remote rejected the request for rate limiting (or the local throttle is active)
    #[error("Rate limited by remote")]
    RateLimited,

    /// Remote answered with an unexpected status
    #[error("Remote returned HTTP {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    /// Remote payload could not be decoded
    #[error("Failed to decode remote payload: {message}")]
    Decode { message: String },

    /// The local store could not be read
    #[error("Local store error: {message}")]
    LocalStore { message: String },

    /// The target list could neither be found nor created
    #[error("List '{name}' unavailable: {reason}")]
    ListUnavailable { name: String, reason: String },

    #[error("Sync cancelled")]
    Cancelled,
}

impl SyncError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }

    /// Truncates long response bodies so error strings stay loggable.
    pub fn remote_status(status: u16, body: &str) -> Self {
        const MAX_BODY: usize = 200;
        let body = match body.char_indices().nth(MAX_BODY) {
            Some((idx, _)) => format!("{}...", &body[..idx]),
            None => body.to_string(),
        };
        Self::RemoteStatus { status, body }
    }
}
