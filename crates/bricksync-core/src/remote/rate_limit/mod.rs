//! Shared rate-limit tracker.
//!
//! Counts consecutive rate-limited outcomes across every remote call of the
//! process. Once the count reaches the threshold the tracker reports
//! `should_throttle() == true` and callers stop hitting the remote until a
//! successful call or a quiet cool-down clears it.
//!
//! States:
//! - Normal: no consecutive hits
//! - Warning: hits recorded, below threshold
//! - Throttled: calls are short-circuited

mod state;


pub use state::{ThrottleSettings, TrackerState};
use state::ThrottleState;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use bricksync_types::ThrottleConfig;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct RateLimitTracker {
    settings: ThrottleSettings,
    state: Mutex<ThrottleState>,
    total_hits: AtomicU64,
}

impl Default for RateLimitTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimitTracker {
    pub fn new() -> Self {
        Self::with_settings(ThrottleSettings::default())
    }

    pub fn with_config(config: ThrottleConfig) -> Self {
        Self::with_settings(ThrottleSettings::from(config))
    }

    pub fn with_settings(settings: ThrottleSettings) -> Self {
        Self { settings, state: Mutex::new(ThrottleState::default()), total_hits: AtomicU64::new(0) }
    }

    /// Record the final outcome of one remote call.
    pub fn record_outcome(&self, was_rate_limited: bool) {
        self.record_outcome_at(was_rate_limited, Instant::now());
    }

    pub fn record_outcome_at(&self, was_rate_limited: bool, now: Instant) {
        let mut state = self.state.lock();

        if !was_rate_limited {
            if state.throttled {
                info!(hits = state.consecutive_hits, "[RateLimit] Remote call succeeded, throttle lifted");
            }
            state.reset();
            return;
        }

        self.total_hits.fetch_add(1, Ordering::Relaxed);
        state.consecutive_hits = state.consecutive_hits.saturating_add(1);
        state.last_hit_time = Some(now);

        if state.consecutive_hits >= self.settings.hit_threshold && !state.throttled {
            state.throttled = true;
            warn!(
                hits = state.consecutive_hits,
                cooldown_secs = self.settings.cooldown.as_secs(),
                "[RateLimit] Consecutive rate limits reached threshold, throttling remote calls"
            );
        } else {
            debug!(hits = state.consecutive_hits, "[RateLimit] Rate-limited outcome recorded");
        }
    }

    /// True while remote calls should be skipped.
    ///
    /// A cool-down longer than the configured window since the last hit
    /// clears the state, whatever the count was.
    pub fn should_throttle(&self) -> bool {
        self.should_throttle_at(Instant::now())
    }

    pub fn should_throttle_at(&self, now: Instant) -> bool {
        let mut state = self.state.lock();

        if let Some(last_hit) = state.last_hit_time {
            if now.saturating_duration_since(last_hit) > self.settings.cooldown {
                if state.throttled {
                    info!("[RateLimit] Cool-down elapsed, throttle lifted");
                }
                state.reset();
                state.last_hit_time = None;
            }
        }

        state.throttled
    }

    pub fn state(&self) -> TrackerState {
        let state = self.state.lock();
        match (state.throttled, state.consecutive_hits) {
            (true, hits) => TrackerState::Throttled { hits },
            (false, 0) => TrackerState::Normal,
            (false, hits) => TrackerState::Warning { hits },
        }
    }

    /// Rate-limited outcomes recorded since startup
    pub fn total_hits(&self) -> u64 {
        self.total_hits.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.reset();
        state.last_hit_time = None;
    }
}
