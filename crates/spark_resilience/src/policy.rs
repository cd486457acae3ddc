//! Decides what happens after a failed attempt.

use crate::{CallConfig, CallState, QuotaState};
use spark_error::FailureKind;
use std::time::Duration;

/// Why the wrapper stops retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiveUp {
    /// The failure kind cannot be fixed by retrying
    NonRetryable,
    /// Consecutive quota failures reached the threshold
    QuotaThreshold {
        /// Count at the time of abandonment
        consecutive_failures: u32,
    },
    /// No attempts remain
    Exhausted,
}

/// Next step after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Sleep for standard backoff, then attempt again
    BackOff(Duration),
    /// Sleep for a quota cooldown, then attempt again
    QuotaCooldown(Duration),
    /// Stop with a terminal failure
    GiveUp(GiveUp),
}

impl Step {
    /// State the call moves into with this step.
    pub fn state(&self) -> CallState {
        match self {
            Step::BackOff(_) => CallState::BackingOff,
            Step::QuotaCooldown(_) => CallState::QuotaCooldown,
            Step::GiveUp(_) => CallState::FailedTerminal,
        }
    }
}

/// Choose the next step after attempt `attempt` (1-based) failed with `kind`.
///
/// Quota failures increment `quota` before anything else, so a quota failure
/// on the very first attempt already counts toward the threshold. The
/// threshold is checked before the remaining-attempts check: reaching it
/// abandons the call even when attempts remain.
///
/// # Example
///
/// ```
/// use spark_error::FailureKind;
/// use spark_resilience::{next_step, CallConfig, GiveUp, QuotaState, Step};
/// use std::time::Duration;
///
/// let config = CallConfig::default();
/// let mut quota = QuotaState::new();
///
/// let step = next_step(&config, &mut quota, FailureKind::QuotaExceeded, 1);
/// assert_eq!(step, Step::QuotaCooldown(Duration::from_secs(300)));
/// assert_eq!(quota.consecutive_failures(), 1);
///
/// let step = next_step(&config, &mut quota, FailureKind::AuthFailure, 2);
/// assert_eq!(step, Step::GiveUp(GiveUp::NonRetryable));
/// ```
pub fn next_step(
    config: &CallConfig,
    quota: &mut QuotaState,
    kind: FailureKind,
    attempt: u32,
) -> Step {
    if !kind.is_retryable() {
        return Step::GiveUp(GiveUp::NonRetryable);
    }

    let attempts_remain = attempt < config.max_attempts();

    if kind.is_quota() {
        let consecutive_failures = quota.record_quota_failure();
        if quota.has_reached(*config.consecutive_failure_threshold()) {
            return Step::GiveUp(GiveUp::QuotaThreshold {
                consecutive_failures,
            });
        }
        if !attempts_remain {
            return Step::GiveUp(GiveUp::Exhausted);
        }
        return Step::QuotaCooldown(config.quota_cooldown(consecutive_failures));
    }

    if attempts_remain {
        Step::BackOff(config.backoff_delay(attempt))
    } else {
        Step::GiveUp(GiveUp::Exhausted)
    }
}
