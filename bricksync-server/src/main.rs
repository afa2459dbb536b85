//! Bricksync - headless sync daemon and CLI
//!
//! Mirrors a local LEGO inventory into Rebrickable:
//! - owned sets into a set list
//! - missing parts into the lost-parts collection (or a part list)
//!
//! Run `bricksync daemon` for scheduled syncs, `bricksync sync <domain>`
//! for a one-shot run.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

use anyhow::Result;
use clap::Parser;
use tracing::info;

mod cli;
mod commands;
mod config_commands;
mod scheduler;
mod server_utils;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    bricksync_core::logging::init_tracing_with(Some(cli.log_level.as_str()));

    match cli.command {
        Commands::Sync { domain, json } => commands::handle_sync(domain, json).await,
        Commands::Daemon { now } => run_daemon(now).await,
        Commands::Config(cmd) => commands::handle_config_command(cmd),
        Commands::Status { json } => commands::handle_status(json),
    }
}

async fn run_daemon(run_now: bool) -> Result<()> {
    let runtime = server_utils::build_runtime()?;
    info!("🚀 Bricksync daemon starting (v{})...", env!("CARGO_PKG_VERSION"));

    let handles = scheduler::start(
        runtime.engine.clone(),
        runtime.data_dir.clone(),
        runtime.cancel.clone(),
        run_now,
    );
    if handles.is_empty() {
        anyhow::bail!("No sync domain is enabled; enable one with 'bricksync config set <domain>.enabled true'");
    }
    info!("✅ Scheduler running for {} domains", handles.len());

    server_utils::shutdown_signal().await;
    runtime.cancel.cancel();

    for handle in handles {
        if let Err(e) = handle.await {
            tracing::warn!("Scheduler task ended abnormally: {}", e);
        }
    }
    info!("👋 Bricksync daemon stopped");
    Ok(())
}
