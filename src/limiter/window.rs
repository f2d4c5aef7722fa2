use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Per-client consumption window for fixed-window rate limiting.
///
/// One window exists per client key. The window holds the request count for
/// the current cycle and the cycle's start time; all decision logic is pure
/// and does no I/O. Serialized as-is for the Redis record format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLimitWindow {
    /// Opaque client identifier; not validated for format
    pub client_key: String,
    /// Requests consumed within the current cycle
    pub request_count: u32,
    /// Maximum requests allowed per cycle
    pub max_requests: u32,
    /// Cycle length in minutes
    pub cycle_duration_mins: u32,
    /// When the current cycle began
    pub cycle_start: DateTime<Utc>,
}

impl RateLimitWindow {
    /// Create a fresh window starting now with zero consumption
    pub fn new(client_key: impl Into<String>, max_requests: u32, cycle_duration_mins: u32) -> Self {
        Self {
            client_key: client_key.into(),
            request_count: 0,
            max_requests,
            cycle_duration_mins,
            cycle_start: Utc::now(),
        }
    }

    /// The cycle length as a duration
    pub fn cycle_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.cycle_duration_mins))
    }

    /// Decide admission for one request, lazily resetting the window first.
    ///
    /// If the cycle has elapsed, the count is reset to zero and the cycle
    /// restarts now as a side effect of the check. This is the only reset
    /// mechanism in the system; there is no background sweep.
    pub fn is_allowed(&mut self) -> bool {
        let now = Utc::now();

        if now - self.cycle_start >= self.cycle_duration() {
            self.cycle_start = now;
            self.request_count = 0;
        }

        self.request_count < self.max_requests
    }

    /// Record one admitted request. Call only after `is_allowed` returned true.
    pub fn increment(&mut self) {
        self.request_count += 1;
    }

    /// Requests left in the current cycle, never negative
    pub fn remaining_requests(&self) -> u32 {
        self.max_requests.saturating_sub(self.request_count)
    }

    /// When the current cycle ends and the count resets
    pub fn reset_time(&self) -> DateTime<Utc> {
        self.cycle_start + self.cycle_duration()
    }
}
