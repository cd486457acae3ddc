//! Delay calculations for standard backoff and quota cooldown.
//!
//! Both schedules grow linearly and are capped:
//! - standard backoff after attempt `k`: `min(base_delay * k, max_delay)`
//! - quota cooldown after `f` consecutive quota failures: `min(quota_wait * f, quota_wait_cap)`

use crate::CallConfig;
use std::time::Duration;

/// Default upper bound on quota cooldown.
pub const QUOTA_WAIT_CAP_SECONDS: f64 = 1800.0;

impl CallConfig {
    /// Standard backoff delay after failed attempt `attempt` (1-based).
    ///
    /// # Example
    ///
    /// ```
    /// use spark_resilience::CallConfig;
    /// use std::time::Duration;
    ///
    /// let config = CallConfig::default(); // 30s base, 300s cap
    /// assert_eq!(config.backoff_delay(1), Duration::from_secs(30));
    /// assert_eq!(config.backoff_delay(4), Duration::from_secs(120));
    /// assert_eq!(config.backoff_delay(50), Duration::from_secs(300));
    /// ```
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let raw = self.base_delay_seconds() * f64::from(attempt);
        seconds(raw.min(*self.max_delay_seconds()))
    }

    /// Quota cooldown after `consecutive_failures` quota failures in a row.
    ///
    /// # Example
    ///
    /// ```
    /// use spark_resilience::CallConfig;
    /// use std::time::Duration;
    ///
    /// let config = CallConfig::default(); // 300s step, 1800s cap
    /// assert_eq!(config.quota_cooldown(2), Duration::from_secs(600));
    /// assert_eq!(config.quota_cooldown(9), Duration::from_secs(1800));
    /// ```
    pub fn quota_cooldown(&self, consecutive_failures: u32) -> Duration {
        let raw = self.quota_wait_seconds() * f64::from(consecutive_failures);
        seconds(raw.min(*self.quota_wait_cap_seconds()))
    }

    /// Per-attempt timeout, or `None` when disabled.
    pub fn attempt_timeout(&self) -> Option<Duration> {
        let limit = *self.attempt_timeout_seconds();
        (limit > 0.0).then(|| seconds(limit))
    }
}

/// Apply full jitter to a backoff delay, never exceeding it.
pub fn jittered(delay: Duration) -> Duration {
    tokio_retry2::strategy::jitter(delay).min(delay)
}

pub(crate) fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value.max(0.0)).unwrap_or(Duration::MAX)
}
