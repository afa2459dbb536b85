//! Subscriber setup for the binary.

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// Install the global fmt subscriber, filtered by `RUST_LOG` (default `info`).
///
/// Calling it twice is harmless: the second install is ignored.
pub fn init_tracing() {
    init_tracing_with(None);
}

/// Like [`init_tracing`], with an explicit filter taking precedence over `RUST_LOG`.
pub fn init_tracing_with(filter: Option<&str>) {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };

    let result = fmt().with_env_filter(filter).with_target(false).try_init();
    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
