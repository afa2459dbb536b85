//! Files under the data directory: configuration and last run reports.

pub mod config;
pub mod paths;

pub use config::{load_config, save_config, update_config};
pub use paths::get_data_dir;
