//! Throttle state types

use std::time::{Duration, Instant};

use bricksync_types::ThrottleConfig;

/// Throttle settings in runtime units
#[derive(Debug, Clone, Copy)]
pub struct ThrottleSettings {
    /// Consecutive rate-limit hits before throttling kicks in
    pub hit_threshold: u32,
    /// Quiet period after the last hit that clears the state
    pub cooldown: Duration,
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self::from(ThrottleConfig::default())
    }
}

impl From<ThrottleConfig> for ThrottleSettings {
    fn from(config: ThrottleConfig) -> Self {
        Self {
            hit_threshold: config.hit_threshold.max(1),
            cooldown: Duration::from_secs(config.cooldown_secs),
        }
    }
}

/// Observable tracker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// No recent rate limiting
    Normal,
    /// Some consecutive hits, below the threshold
    Warning { hits: u32 },
    /// Remote calls are being short-circuited
    Throttled { hits: u32 },
}

#[derive(Debug, Default)]
pub(crate) struct ThrottleState {
    pub consecutive_hits: u32,
    pub last_hit_time: Option<Instant>,
    pub throttled: bool,
}

impl ThrottleState {
    pub fn reset(&mut self) {
        self.consecutive_hits = 0;
        self.throttled = false;
    }
}
