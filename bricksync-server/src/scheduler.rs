//! Periodic sync scheduler
//!
//! One background task per enabled domain, all sharing a single engine and
//! therefore a single rate-limit tracker.
//!
//! - First run after `offset_minutes`, then every `interval_minutes`
//! - Missed ticks are skipped rather than burst
//! - Every report is logged and persisted as the domain's last report
//! - Cancellation ends the waits; a run in progress finishes its report

use std::path::PathBuf;
use std::sync::Arc;

use bricksync_core::modules::config::save_report;
use bricksync_core::SyncEngine;
use bricksync_types::{Domain, DomainSettings, SyncOutcome, SyncReport};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Lower bound for the period between runs.
const MIN_INTERVAL_MINUTES: u64 = 5;
/// Used when the configured interval is below the lower bound.
const FALLBACK_INTERVAL_MINUTES: u64 = 360;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub offset: Duration,
    pub period: Duration,
}

impl Schedule {
    pub fn for_settings(settings: &DomainSettings, run_now: bool) -> Self {
        let interval_minutes = if settings.interval_minutes < MIN_INTERVAL_MINUTES {
            FALLBACK_INTERVAL_MINUTES
        } else {
            settings.interval_minutes
        };
        let offset_minutes = if run_now { 0 } else { settings.offset_minutes };
        Self {
            offset: Duration::from_secs(offset_minutes * 60),
            period: Duration::from_secs(interval_minutes * 60),
        }
    }
}

/// Start one task per enabled domain. Returns their handles.
pub fn start(
    engine: Arc<SyncEngine>,
    data_dir: PathBuf,
    cancel: CancellationToken,
    run_now: bool,
) -> Vec<JoinHandle<()>> {
    let config = engine.config().clone();
    Domain::ALL
        .into_iter()
        .filter(|domain| config.domain(*domain).enabled)
        .map(|domain| {
            let schedule = Schedule::for_settings(config.domain(domain), run_now);
            tracing::info!(
                "🗓️ [Scheduler] {} every {} min, first run in {} min",
                domain,
                schedule.period.as_secs() / 60,
                schedule.offset.as_secs() / 60
            );
            tokio::spawn(domain_loop(
                Arc::clone(&engine),
                domain,
                schedule,
                data_dir.clone(),
                cancel.clone(),
            ))
        })
        .collect()
}

async fn domain_loop(
    engine: Arc<SyncEngine>,
    domain: Domain,
    schedule: Schedule,
    data_dir: PathBuf,
    cancel: CancellationToken,
) {
    let mut ticker = interval_at(Instant::now() + schedule.offset, schedule.period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {},
        }

        tracing::info!("[Scheduler] 🔄 Running {} sync", domain);
        let report = engine.sync(domain).await;
        log_report(&report);

        if let Err(e) = save_report(&data_dir, &report) {
            tracing::warn!("[Scheduler] Failed to persist {} report: {}", domain, e);
        }
    }

    tracing::info!("[Scheduler] {} task stopped", domain);
}

pub fn log_report(report: &SyncReport) {
    match &report.outcome {
        SyncOutcome::Completed if report.errors.is_empty() => {
            tracing::info!("[Scheduler] ✅ {}: {}", report.domain, report.message);
        },
        SyncOutcome::Completed => {
            tracing::warn!(
                "[Scheduler] ⚠️ {}: {} ({} errors)",
                report.domain,
                report.message,
                report.errors.len()
            );
        },
        SyncOutcome::Skipped { reason } => {
            tracing::info!("[Scheduler] ⏭️ {} skipped: {}", report.domain, reason);
        },
        SyncOutcome::ReadFailed { reason } => {
            tracing::error!("[Scheduler] ❌ {} failed: {}", report.domain, reason);
        },
    }
}
