//! Persisted engine configuration.

use serde::{Deserialize, Serialize};

use super::domain::Domain;
use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://rebrickable.com/api/v3/";

/// Remote endpoint and credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub user_token: Option<String>,
    /// Timeout for page reads and single-item writes
    pub timeout_secs: u64,
    /// Timeout for bulk submissions and set inventory reads
    pub bulk_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            user_token: None,
            timeout_secs: 20,
            bulk_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_retries: 3, base_delay_ms: 1_000, max_delay_ms: 60_000 }
    }
}

/// Client-side throttle that stops calling the remote after repeated 429s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Consecutive rate-limit hits before throttling
    pub hit_threshold: u32,
    /// Seconds without a hit after which the count resets
    pub cooldown_secs: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self { hit_threshold: 3, cooldown_secs: 30 }
    }
}

/// Per-domain scheduling and target list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSettings {
    pub enabled: bool,
    /// Remote list name used for find-or-create
    pub list_name: String,
    pub interval_minutes: u64,
    /// Delay before the first scheduled run
    pub offset_minutes: u64,
    #[serde(default)]
    pub batch_size: Option<usize>,
    /// Count spare parts as missing
    #[serde(default)]
    pub include_spare: bool,
}

impl DomainSettings {
    fn new(enabled: bool, list_name: &str, offset_minutes: u64) -> Self {
        Self {
            enabled,
            list_name: list_name.to_string(),
            interval_minutes: 360,
            offset_minutes,
            batch_size: None,
            include_spare: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub throttle: ThrottleConfig,
    pub batch_size: usize,
    /// SQLite database of the inventory application
    #[serde(default)]
    pub database_path: Option<String>,
    pub sets: DomainSettings,
    pub missing_parts: DomainSettings,
    pub part_list: DomainSettings,
}

impl SyncConfig {
    pub fn new() -> Self {
        Self {
            remote: RemoteConfig::default(),
            retry: RetryConfig::default(),
            throttle: ThrottleConfig::default(),
            batch_size: 100,
            database_path: None,
            sets: DomainSettings::new(true, "Brick_Manager", 35),
            missing_parts: DomainSettings::new(true, "Lost Parts", 30),
            part_list: DomainSettings::new(false, "Brick_Manager-Missing_Parts", 30),
        }
    }

    pub fn domain(&self, domain: Domain) -> &DomainSettings {
        match domain {
            Domain::Sets => &self.sets,
            Domain::MissingParts => &self.missing_parts,
            Domain::MissingPartList => &self.part_list,
        }
    }

    pub fn domain_mut(&mut self, domain: Domain) -> &mut DomainSettings {
        match domain {
            Domain::Sets => &mut self.sets,
            Domain::MissingParts => &mut self.missing_parts,
            Domain::MissingPartList => &mut self.part_list,
        }
    }

    pub fn batch_size_for(&self, domain: Domain) -> usize {
        self.domain(domain).batch_size.unwrap_or(self.batch_size)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::invalid("batch_size", "must be at least 1"));
        }
        if !self.remote.base_url.starts_with("http://")
            && !self.remote.base_url.starts_with("https://")
        {
            return Err(ConfigError::invalid("remote.base_url", "must be an http(s) URL"));
        }
        for domain in Domain::ALL {
            let settings = self.domain(domain);
            if settings.interval_minutes < 5 {
                return Err(ConfigError::invalid(
                    &format!("{}.interval_minutes", domain.as_str()),
                    "must be at least 5",
                ));
            }
            if settings.batch_size == Some(0) {
                return Err(ConfigError::invalid(
                    &format!("{}.batch_size", domain.as_str()),
                    "must be at least 1",
                ));
            }
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}
