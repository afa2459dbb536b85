use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bricksync_core::modules::{config as core_config, get_data_dir};
use bricksync_core::store::SqliteStore;
use bricksync_core::{ConfigCredentials, RateLimitTracker, SyncEngine};
use bricksync_types::SyncConfig;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Everything a command needs to run syncs.
pub struct Runtime {
    pub engine: Arc<SyncEngine>,
    pub data_dir: PathBuf,
    pub cancel: CancellationToken,
}

pub fn data_dir() -> Result<PathBuf> {
    get_data_dir().map_err(|e| anyhow::anyhow!("Failed to get data directory: {}", e))
}

/// Load config, open the inventory database and assemble the engine.
pub fn build_runtime() -> Result<Runtime> {
    let data_dir = data_dir()?;
    let config = core_config::load_config()?;

    let store = open_store(&config)?;
    let credentials = Arc::new(ConfigCredentials::new(&config.remote));
    let tracker = Arc::new(RateLimitTracker::with_config(config.throttle));
    let cancel = CancellationToken::new();

    let engine = SyncEngine::from_config(config, store, credentials, tracker, cancel.clone())?;
    Ok(Runtime { engine: Arc::new(engine), data_dir, cancel })
}

fn open_store(config: &SyncConfig) -> Result<Arc<SqliteStore>> {
    let path = config.database_path.as_deref().context(
        "No inventory database configured; set 'database_path' or BRICKSYNC_DATABASE",
    )?;
    let store = SqliteStore::open(path)
        .with_context(|| format!("Failed to open inventory database at {}", path))?;
    info!("📦 Using inventory database {}", path);
    Ok(Arc::new(store))
}

/// Cancel `token` on the first Ctrl+C or SIGTERM.
pub fn cancel_on_shutdown(token: CancellationToken) {
    tokio::spawn(async move {
        shutdown_signal().await;
        token.cancel();
    });
}

#[allow(
    clippy::expect_used,
    reason = "Signal handlers are critical infrastructure, panic is appropriate on failure"
)]
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("🛑 Received Ctrl+C, stopping..."),
        () = terminate => info!("🛑 Received SIGTERM, stopping..."),
    }

    info!("⏳ Cancelling pending waits, in-flight runs will report what they finished");
}
