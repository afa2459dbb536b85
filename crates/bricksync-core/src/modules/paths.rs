use std::fs;
use std::path::PathBuf;

use bricksync_types::Domain;

pub const DATA_DIR_ENV: &str = "BRICKSYNC_DATA_DIR";
const DATA_DIR: &str = ".bricksync";

/// Resolve the data directory, creating it if needed.
///
/// `BRICKSYNC_DATA_DIR` wins over `~/.bricksync`.
pub fn get_data_dir() -> Result<PathBuf, String> {
    let data_dir = match std::env::var(DATA_DIR_ENV) {
        Ok(custom_dir) if !custom_dir.trim().is_empty() => PathBuf::from(custom_dir),
        _ => {
            let home = dirs::home_dir().ok_or("Cannot get home directory")?;
            home.join(DATA_DIR)
        },
    };

    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)
            .map_err(|e| format!("Failed to create data directory: {e}"))?;
    }

    Ok(data_dir)
}

pub fn report_file_name(domain: Domain) -> String {
    format!("last_sync_{}.json", domain.as_str())
}
