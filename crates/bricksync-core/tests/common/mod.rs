//! Shared fixtures for the mock-server tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::sync::Arc;
use std::time::Duration;

use bricksync_core::remote::rebrickable::RebrickableApi;
use bricksync_core::remote::{RateLimitTracker, ResilientCaller, RetryPolicy};
use bricksync_types::{RemoteConfig, SyncConfig};
use tokio_util::sync::CancellationToken;
use wiremock::MockServer;

pub const API_KEY: &str = "test-key";
pub const USER_TOKEN: &str = "tok";

pub fn base_url(server: &MockServer) -> String {
    format!("{}/api/v3/", server.uri())
}

/// Millisecond backoff so retry tests finish quickly.
pub fn fast_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(20),
    }
}

pub fn caller_for(base_url: &str, max_retries: u32) -> Arc<ResilientCaller> {
    caller_with_tracker(base_url, max_retries, Arc::new(RateLimitTracker::new()))
}

pub fn caller_with_tracker(
    base_url: &str,
    max_retries: u32,
    tracker: Arc<RateLimitTracker>,
) -> Arc<ResilientCaller> {
    let http = reqwest::Client::new();
    let caller = ResilientCaller::new(
        http,
        base_url,
        tracker,
        fast_policy(max_retries),
        CancellationToken::new(),
    )
    .expect("valid base url");
    Arc::new(caller)
}

pub fn api_for(server: &MockServer) -> Arc<RebrickableApi> {
    let caller = caller_for(&base_url(server), 2);
    Arc::new(RebrickableApi::new(caller, API_KEY, USER_TOKEN, &RemoteConfig::default()))
}

/// Config pointing at the mock server with fast retries.
pub fn config_for(server: &MockServer) -> SyncConfig {
    let mut config = SyncConfig::default();
    config.remote.base_url = base_url(server);
    config.retry.max_retries = 2;
    config.retry.base_delay_ms = 1;
    config.retry.max_delay_ms = 20;
    config
}

pub fn page(results: serde_json::Value, next: Option<&str>) -> serde_json::Value {
    let count = results.as_array().map_or(0, Vec::len);
    serde_json::json!({
        "count": count,
        "next": next,
        "previous": null,
        "results": results,
    })
}
