use anyhow::Result;
use colored::Colorize;
use serde_json::Value;

use bricksync_core::modules::config as core_config;
use bricksync_types::{Domain, SyncConfig};

use crate::server_utils::data_dir;

const SECRET_KEYS: &[&str] = &["remote.api_key", "remote.user_token"];

pub fn show_config(json: bool) -> Result<()> {
    let config = core_config::load_config()?;

    if json {
        let mut value = serde_json::to_value(&config)?;
        for key in SECRET_KEYS {
            if let Some(Value::String(secret)) = lookup_mut(&mut value, key) {
                *secret = mask_key(secret);
            }
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "Remote:".cyan().bold());
    println!("  Base URL: {}", config.remote.base_url);
    println!("  API Key: {}", mask_optional(config.remote.api_key.as_deref()));
    println!("  User Token: {}", mask_optional(config.remote.user_token.as_deref()));
    println!(
        "  Retries: {} (backoff {}ms..{}ms)",
        config.retry.max_retries, config.retry.base_delay_ms, config.retry.max_delay_ms
    );
    println!(
        "  Throttle: {} hits, {}s cooldown",
        config.throttle.hit_threshold, config.throttle.cooldown_secs
    );
    println!("  Batch size: {}", config.batch_size);
    println!("  Database: {}", config.database_path.as_deref().unwrap_or("(not configured)"));

    for domain in Domain::ALL {
        let settings = config.domain(domain);
        println!("{}", format!("{}:", domain).cyan().bold());
        println!("  Enabled: {}", settings.enabled);
        println!("  List: {}", settings.list_name);
        println!(
            "  Every {} min, first run after {} min",
            settings.interval_minutes, settings.offset_minutes
        );
        println!("  Batch size: {}", config.batch_size_for(domain));
    }
    Ok(())
}

pub fn get_config_value(key: &str) -> Result<()> {
    let config = core_config::load_config()?;
    println!("{}", config_value(&config, key)?);
    Ok(())
}

/// Printable value at dotted `key`, with secrets masked.
fn config_value(config: &SyncConfig, key: &str) -> Result<String> {
    let value = serde_json::to_value(config)?;
    let secret = SECRET_KEYS.contains(&key);

    Ok(match lookup(&value, key) {
        Some(Value::String(s)) if secret => mask_optional(Some(s)),
        Some(Value::Null) if secret => mask_optional(None),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) => String::new(),
        Some(other) => other.to_string(),
        None => anyhow::bail!("Unknown config key: {}", key),
    })
}

pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let dir = data_dir()?;
    // Stored values only, so environment overrides are never written back
    let stored = core_config::load_config_from(&dir)?;
    let updated = with_value(&stored, key, value)?;
    core_config::update_config_in(&dir, |config| *config = updated)?;

    let shown = if SECRET_KEYS.contains(&key) { mask_key(value) } else { value.to_string() };
    println!("{} Config updated: {} = {}", "✓".green(), key, shown);
    Ok(())
}

/// Replace the value at dotted `key`, keeping the result a valid config.
///
/// The raw text is tried as a JSON literal first (numbers, booleans,
/// `null`) and as a plain string otherwise.
fn with_value(config: &SyncConfig, key: &str, raw: &str) -> Result<SyncConfig> {
    let original = serde_json::to_value(config)?;
    match lookup(&original, key) {
        Some(Value::Object(_)) => anyhow::bail!("'{}' is a section, not a value", key),
        Some(_) => {},
        None => anyhow::bail!("Unknown config key: {}", key),
    }

    let candidates = serde_json::from_str::<Value>(raw)
        .ok()
        .into_iter()
        .chain(std::iter::once(Value::String(raw.to_string())));

    let mut last_error = None;
    for candidate in candidates {
        let mut value = original.clone();
        if let Some(slot) = lookup_mut(&mut value, key) {
            *slot = candidate;
        }
        match serde_json::from_value::<SyncConfig>(value) {
            Ok(updated) => return Ok(updated),
            Err(e) => last_error = Some(e),
        }
    }

    match last_error {
        Some(e) => anyhow::bail!("Invalid value '{}' for {}: {}", raw, key, e),
        None => anyhow::bail!("Invalid value '{}' for {}", raw, key),
    }
}

fn lookup<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(value, |node, part| node.get(part))
}

fn lookup_mut<'a>(value: &'a mut Value, key: &str) -> Option<&'a mut Value> {
    key.split('.').try_fold(value, |node, part| node.get_mut(part))
}

fn mask_optional(key: Option<&str>) -> String {
    match key {
        Some(key) if !key.is_empty() => mask_key(key),
        _ => "(not set)".to_string(),
    }
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars.iter().take(4).collect();
    let tail: String = chars.iter().skip(chars.len() - 4).collect();
    format!("{}...{}", head, tail)
}
