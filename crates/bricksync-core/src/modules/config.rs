use std::fs;
use std::path::{Path, PathBuf};

use bricksync_types::{ConfigError, Domain, SyncConfig, SyncReport};

use super::paths::{get_data_dir, report_file_name};
use crate::error::CoreResult;

pub const CONFIG_FILE: &str = "bricksync.json";
pub const DATABASE_ENV: &str = "BRICKSYNC_DATABASE";

fn data_dir() -> Result<PathBuf, ConfigError> {
    get_data_dir().map_err(|message| ConfigError::DataDir { message })
}

/// Load the configuration with environment overrides applied.
///
/// A missing file yields the defaults.
pub fn load_config() -> Result<SyncConfig, ConfigError> {
    let mut config = load_config_from(&data_dir()?)?;
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Load `bricksync.json` from `dir` as stored, without environment overrides.
pub fn load_config_from(dir: &Path) -> Result<SyncConfig, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(SyncConfig::default());
    }

    let content =
        fs::read_to_string(&config_path).map_err(|e| ConfigError::read(&config_path, &e))?;
    let config: SyncConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::parse(&e))?;
    Ok(config)
}

pub fn apply_env_overrides(config: &mut SyncConfig) {
    if let Ok(path) = std::env::var(DATABASE_ENV) {
        if !path.trim().is_empty() {
            config.database_path = Some(path);
        }
    }
}

pub fn save_config(config: &SyncConfig) -> Result<(), ConfigError> {
    save_config_to(&data_dir()?, config)
}

/// Validate, then write through a temp file and rename.
pub fn save_config_to(dir: &Path, config: &SyncConfig) -> Result<(), ConfigError> {
    config.validate()?;

    let config_path = dir.join(CONFIG_FILE);
    let temp_path = dir.join(format!("{CONFIG_FILE}.tmp"));
    let content =
        serde_json::to_string_pretty(config).map_err(|e| ConfigError::parse(&e))?;

    fs::write(&temp_path, content).map_err(|e| ConfigError::write(&temp_path, &e))?;
    fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::write(&config_path, &e))
}

/// Update specific fields in the stored config.
///
/// Environment overrides are not written back.
pub fn update_config<F>(updater: F) -> Result<SyncConfig, ConfigError>
where
    F: FnOnce(&mut SyncConfig),
{
    update_config_in(&data_dir()?, updater)
}

pub fn update_config_in<F>(dir: &Path, updater: F) -> Result<SyncConfig, ConfigError>
where
    F: FnOnce(&mut SyncConfig),
{
    let mut config = load_config_from(dir)?;
    updater(&mut config);
    save_config_to(dir, &config)?;
    Ok(config)
}

pub fn save_report(dir: &Path, report: &SyncReport) -> CoreResult<()> {
    let path = dir.join(report_file_name(report.domain));
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, serde_json::to_string_pretty(report)?)?;
    fs::rename(&temp_path, &path)?;
    Ok(())
}

/// Last persisted report for `domain`, if any run has been recorded.
pub fn load_report(dir: &Path, domain: Domain) -> CoreResult<Option<SyncReport>> {
    let path = dir.join(report_file_name(domain));
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bricksync_types::SyncOutcome;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(dir.path()).unwrap();
        assert_eq!(config, SyncConfig::default());
    }

    #[test]
    fn update_persists_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let updated = update_config_in(dir.path(), |c| {
            c.batch_size = 25;
            c.sets.list_name = "Shelf".to_string();
        })
        .unwrap();

        let reloaded = load_config_from(dir.path()).unwrap();
        assert_eq!(reloaded, updated);
        assert_eq!(reloaded.batch_size, 25);
        assert_eq!(reloaded.sets.list_name, "Shelf");
        assert!(!dir.path().join(format!("{CONFIG_FILE}.tmp")).exists());
    }

    #[test]
    fn invalid_config_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let err = update_config_in(dir.path(), |c| c.batch_size = 0).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(!dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn garbage_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{not json").unwrap();
        let err = load_config_from(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn reports_are_stored_per_domain() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_report(dir.path(), Domain::Sets).unwrap().is_none());

        let report = SyncReport::skipped(Domain::Sets, "no credentials");
        save_report(dir.path(), &report).unwrap();

        let loaded = load_report(dir.path(), Domain::Sets).unwrap().unwrap();
        assert_eq!(loaded.run_id, report.run_id);
        assert!(matches!(loaded.outcome, SyncOutcome::Skipped { .. }));
        assert!(load_report(dir.path(), Domain::MissingParts).unwrap().is_none());
        assert!(dir.path().join("last_sync_sets.json").exists());
    }
}
