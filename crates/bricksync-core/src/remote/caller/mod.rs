//! Resilient remote caller.
//!
//! Wraps every HTTP request with the shared throttle check, a per-request
//! timeout and exponential backoff on 429 and transport failures. The final
//! outcome of each call is fed back into the [`RateLimitTracker`] exactly
//! once.

mod retry;


pub use retry::{parse_retry_after, RetryPolicy};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bricksync_types::{SyncConfig, SyncError};
use bytes::Bytes;
use reqwest::header::RETRY_AFTER;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use super::client_builder::build_http_client;
use super::rate_limit::RateLimitTracker;
use crate::error::{CoreError, CoreResult};

/// A request described independently of the HTTP client so it can be
/// rebuilt for every attempt.
#[derive(Debug, Clone)]
pub struct RemoteRequest {
    pub method: Method,
    /// Path relative to the caller's base URL
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<serde_json::Value>,
    pub timeout: Option<Duration>,
}

impl RemoteRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::POST, path).json(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone)]
pub struct RemoteResponse {
    pub status: StatusCode,
    pub body: Bytes,
    pub retry_after: Option<Duration>,
    /// Produced locally by the throttle; no request was sent.
    pub synthetic: bool,
}

impl RemoteResponse {
    /// Stand-in for a 429 while the tracker is throttling.
    pub fn throttled() -> Self {
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: Bytes::new(),
            retry_after: None,
            synthetic: true,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == StatusCode::TOO_MANY_REQUESTS
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, SyncError> {
        serde_json::from_slice(&self.body).map_err(|e| SyncError::Decode { message: e.to_string() })
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The error to report for a response the adapter did not expect.
    pub fn to_error(&self) -> SyncError {
        if self.is_rate_limited() {
            SyncError::RateLimited
        } else {
            SyncError::remote_status(self.status.as_u16(), &self.text())
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CallError {
    /// Connection, timeout or body read failures persisted through every retry
    #[error("transport failed after {attempts} attempts: {message}")]
    Transport { attempts: u32, message: String },

    #[error("invalid request path '{path}': {message}")]
    InvalidRequest { path: String, message: String },

    #[error("call cancelled")]
    Cancelled,
}

impl From<CallError> for SyncError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Transport { attempts, message } => SyncError::Transport { attempts, message },
            CallError::InvalidRequest { path, message } => {
                SyncError::Transport { attempts: 0, message: format!("{path}: {message}") }
            },
            CallError::Cancelled => SyncError::Cancelled,
        }
    }
}

#[derive(Debug)]
pub struct ResilientCaller {
    http: reqwest::Client,
    base_url: Url,
    tracker: Arc<RateLimitTracker>,
    policy: RetryPolicy,
    cancel: CancellationToken,
    requests_issued: AtomicU64,
}

impl ResilientCaller {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        tracker: Arc<RateLimitTracker>,
        policy: RetryPolicy,
        cancel: CancellationToken,
    ) -> CoreResult<Self> {
        // Url::join drops the last segment unless the base ends with '/'
        let normalized =
            if base_url.ends_with('/') { base_url.to_string() } else { format!("{base_url}/") };
        let base_url = Url::parse(&normalized)
            .map_err(|e| CoreError::Other(format!("Invalid base URL '{}': {}", base_url, e)))?;

        Ok(Self { http, base_url, tracker, policy, cancel, requests_issued: AtomicU64::new(0) })
    }

    pub fn from_config(
        config: &SyncConfig,
        tracker: Arc<RateLimitTracker>,
        cancel: CancellationToken,
    ) -> CoreResult<Self> {
        config.validate()?;
        let http = build_http_client(&config.remote)?;
        Self::new(http, &config.remote.base_url, tracker, RetryPolicy::from(config.retry), cancel)
    }

    pub fn tracker(&self) -> &Arc<RateLimitTracker> {
        &self.tracker
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// HTTP requests actually sent, retries included.
    pub fn requests_issued(&self) -> u64 {
        self.requests_issued.load(Ordering::Relaxed)
    }

    /// Issue `request`, retrying 429s and transport failures.
    ///
    /// A 429 that survives every retry is returned as a response, not an
    /// error. Other non-success statuses are returned untouched on the first
    /// attempt.
    pub async fn call(&self, request: &RemoteRequest) -> Result<RemoteResponse, CallError> {
        if self.cancel.is_cancelled() {
            return Err(CallError::Cancelled);
        }

        if self.tracker.should_throttle() {
            debug!(path = %request.path, "Throttle active, skipping remote call");
            self.tracker.record_outcome(true);
            return Ok(RemoteResponse::throttled());
        }

        let url = self.base_url.join(request.path.trim_start_matches('/')).map_err(|e| {
            CallError::InvalidRequest { path: request.path.clone(), message: e.to_string() }
        })?;

        let max_attempts = self.policy.max_attempts();
        let mut last_error = String::new();

        for attempt in 0..max_attempts {
            let is_last = attempt + 1 >= max_attempts;
            self.requests_issued.fetch_add(1, Ordering::Relaxed);

            match self.send_once(&url, request).await {
                Ok(response) if response.is_rate_limited() => {
                    if is_last {
                        debug!(
                            method = %request.method,
                            path = %request.path,
                            attempts = max_attempts,
                            "Rate limited after all attempts, giving up"
                        );
                        self.tracker.record_outcome(true);
                        return Ok(response);
                    }
                    let delay = self.policy.delay_for(attempt, response.retry_after);
                    debug!(
                        method = %request.method,
                        path = %request.path,
                        attempt = attempt + 1,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Rate limited, backing off"
                    );
                    self.pause(delay).await?;
                },
                Ok(response) => {
                    self.tracker.record_outcome(false);
                    return Ok(response);
                },
                Err(e) => {
                    last_error = e.to_string();
                    if is_last {
                        break;
                    }
                    let delay = self.policy.delay_for(attempt, None);
                    debug!(
                        method = %request.method,
                        path = %request.path,
                        attempt = attempt + 1,
                        error = %e,
                        "Request failed, retrying"
                    );
                    self.pause(delay).await?;
                },
            }
        }

        warn!(
            method = %request.method,
            path = %request.path,
            attempts = max_attempts,
            error = %last_error,
            "Request failed after all attempts"
        );
        self.tracker.record_outcome(false);
        Err(CallError::Transport { attempts: max_attempts, message: last_error })
    }

    async fn send_once(
        &self,
        url: &Url,
        request: &RemoteRequest,
    ) -> Result<RemoteResponse, reqwest::Error> {
        let mut builder = self
            .http
            .request(request.method.clone(), url.clone())
            .header(reqwest::header::ACCEPT, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let retry_after =
            parse_retry_after(response.headers().get(RETRY_AFTER).and_then(|v| v.to_str().ok()));
        let body = response.bytes().await?;

        Ok(RemoteResponse { status, body, retry_after, synthetic: false })
    }

    async fn pause(&self, delay: Duration) -> Result<(), CallError> {
        if delay.is_zero() {
            return Ok(());
        }
        tokio::select! {
            () = self.cancel.cancelled() => Err(CallError::Cancelled),
            () = tokio::time::sleep(delay) => Ok(()),
        }
    }
}
