//! Quota bookkeeping.
//!
//! [`QuotaState`] is the per-call-site counter the wrapper mutates across
//! attempts. It approximates the remote quota from local observations only;
//! call sites sharing one remote bucket do not see each other's failures.
//!
//! [`QuotaGate`] sits one level up, across the call sites of a batch: once a
//! site gives up on quota the gate stays closed for a reset interval.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Consecutive quota failures observed at one call site.
///
/// Owned by exactly one call site and borrowed mutably by the wrapper for
/// the duration of a call, so it cannot be shared between concurrent sites.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct QuotaState {
    consecutive_failures: u32,
}

impl QuotaState {
    /// Fresh state with no failures recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Quota failures since the last success.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Record one quota-classified failure and return the new count.
    pub fn record_quota_failure(&mut self) -> u32 {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_failures
    }

    /// Clear the counter after a successful call.
    pub fn reset(&mut self) {
        if self.consecutive_failures > 0 {
            debug!(
                previous = self.consecutive_failures,
                "Resetting consecutive quota failures"
            );
        }
        self.consecutive_failures = 0;
    }

    /// Whether the count has reached `threshold`.
    pub fn has_reached(&self, threshold: u32) -> bool {
        self.consecutive_failures >= threshold
    }
}

/// Batch-level switch closed after a call site exhausts its quota budget.
///
/// # Example
///
/// ```
/// use spark_resilience::QuotaGate;
/// use std::time::Duration;
/// use tokio::time::Instant;
///
/// let mut gate = QuotaGate::new(Duration::from_secs(3600));
/// let now = Instant::now();
/// assert!(gate.is_open(now));
///
/// gate.trip(now);
/// assert!(!gate.is_open(now + Duration::from_secs(60)));
/// assert!(gate.is_open(now + Duration::from_secs(3600)));
/// ```
#[derive(Debug, Clone)]
pub struct QuotaGate {
    reset_interval: Duration,
    tripped_at: Option<Instant>,
}

impl QuotaGate {
    /// Create an open gate that stays closed for `reset_interval` once tripped.
    pub fn new(reset_interval: Duration) -> Self {
        Self {
            reset_interval,
            tripped_at: None,
        }
    }

    /// Close the gate starting at `now`.
    pub fn trip(&mut self, now: Instant) {
        warn!(
            reset_interval_secs = self.reset_interval.as_secs_f64(),
            "Quota exhausted, skipping further calls until reset"
        );
        self.tripped_at = Some(now);
    }

    /// Whether calls may proceed at `now`, reopening once the interval elapsed.
    pub fn is_open(&mut self, now: Instant) -> bool {
        match self.remaining(now) {
            Some(remaining) => {
                debug!(
                    remaining_secs = remaining.as_secs_f64(),
                    "Quota gate still closed"
                );
                false
            }
            None => {
                if self.tripped_at.take().is_some() {
                    info!("Quota reset interval elapsed, reopening gate");
                }
                true
            }
        }
    }

    /// Time left until the gate reopens, or `None` if it is open.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let tripped_at = self.tripped_at?;
        let elapsed = now.saturating_duration_since(tripped_at);
        (elapsed < self.reset_interval).then(|| self.reset_interval - elapsed)
    }
}
