use std::time::Duration;

use bricksync_types::RemoteConfig;

const USER_AGENT: &str = concat!("bricksync/", env!("CARGO_PKG_VERSION"));

/// Build the shared HTTP client. Per-request timeouts override the default
/// set here.
pub fn build_http_client(config: &RemoteConfig) -> Result<reqwest::Client, reqwest::Error> {
    let default_timeout = config.timeout_secs.max(config.bulk_timeout_secs).max(5);

    reqwest::Client::builder()
        .timeout(Duration::from_secs(default_timeout))
        .connect_timeout(Duration::from_secs(10))
        .tcp_nodelay(true)
        .user_agent(USER_AGENT)
        .build()
}

