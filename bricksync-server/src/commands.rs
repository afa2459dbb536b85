use anyhow::Result;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};

use bricksync_core::modules::config::{load_config, load_report, save_report};
use bricksync_types::{Domain, SyncOutcome, SyncReport};

use crate::cli::ConfigCommands;
use crate::config_commands;
use crate::server_utils::{build_runtime, cancel_on_shutdown, data_dir};

pub async fn handle_sync(domain: Domain, json: bool) -> Result<()> {
    let runtime = build_runtime()?;
    cancel_on_shutdown(runtime.cancel.clone());

    let report = runtime.engine.sync(domain).await;
    if let Err(e) = save_report(&runtime.data_dir, &report) {
        tracing::warn!("Failed to persist report for {}: {}", domain, e);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if let SyncOutcome::ReadFailed { reason } = &report.outcome {
        anyhow::bail!("{} sync failed: {}", domain, reason);
    }
    Ok(())
}

pub fn handle_config_command(cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Show { json } => config_commands::show_config(json),
        ConfigCommands::Get { key } => config_commands::get_config_value(&key),
        ConfigCommands::Set { key, value } => config_commands::set_config_value(&key, &value),
    }
}

pub fn handle_status(json: bool) -> Result<()> {
    let dir = data_dir()?;
    let config = load_config()?;

    let mut reports = Vec::with_capacity(Domain::ALL.len());
    for domain in Domain::ALL {
        reports.push((domain, load_report(&dir, domain)?));
    }

    if json {
        let last: Vec<&SyncReport> = reports.iter().filter_map(|(_, r)| r.as_ref()).collect();
        println!("{}", serde_json::to_string_pretty(&last)?);
        return Ok(());
    }

    println!("{}", "Bricksync Status".cyan().bold());
    println!("  Version: {}", env!("CARGO_PKG_VERSION"));
    println!("  Data dir: {}", dir.display());
    println!(
        "  Database: {}",
        config.database_path.as_deref().unwrap_or("(not configured)")
    );

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Domain", "Enabled", "Last run", "Outcome", "Added", "Updated", "Removed", "Rate limited",
        "Errors",
    ]);

    for (domain, report) in &reports {
        let enabled = if config.domain(*domain).enabled {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no").fg(Color::DarkGrey)
        };
        let Some(report) = report else {
            table.add_row(vec![
                Cell::new(domain),
                enabled,
                Cell::new("never"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
            ]);
            continue;
        };
        table.add_row(vec![
            Cell::new(domain),
            enabled,
            Cell::new(report.finished_at.format("%Y-%m-%d %H:%M UTC")),
            outcome_cell(&report.outcome),
            Cell::new(report.added),
            Cell::new(report.updated),
            Cell::new(report.removed),
            Cell::new(report.rate_limited),
            Cell::new(report.errors.len()),
        ]);
    }

    println!("{table}");
    Ok(())
}

fn outcome_cell(outcome: &SyncOutcome) -> Cell {
    match outcome {
        SyncOutcome::Completed => Cell::new("completed").fg(Color::Green),
        SyncOutcome::Skipped { .. } => Cell::new("skipped").fg(Color::Yellow),
        SyncOutcome::ReadFailed { .. } => Cell::new("read failed").fg(Color::Red),
    }
}

pub fn print_report(report: &SyncReport) {
    let headline = match &report.outcome {
        SyncOutcome::Completed => format!("{} {}", "✓".green(), report.message),
        SyncOutcome::Skipped { .. } => format!("{} {}", "-".yellow(), report.message),
        SyncOutcome::ReadFailed { .. } => format!("{} {}", "✗".red(), report.message),
    };
    println!("{} {}", format!("[{}]", report.domain).cyan().bold(), headline);

    if !report.is_completed() {
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Local", "Remote", "Added", "Updated", "Removed", "Rate limited", "Deferred", "Unresolved"]);
    table.add_row(vec![
        Cell::new(report.total_local),
        Cell::new(report.total_remote),
        Cell::new(report.added),
        Cell::new(report.updated),
        Cell::new(report.removed),
        Cell::new(report.rate_limited),
        Cell::new(report.deferred),
        Cell::new(report.unresolved),
    ]);
    println!("{table}");

    for error in &report.errors {
        println!("  {} {}", "!".red(), error);
    }
}
