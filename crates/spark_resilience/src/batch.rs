//! Sequential generation of many shots through one wrapper.
//!
//! Each shot is its own call site with its own [`QuotaState`]. Shots run one
//! after another and a short pause follows every successful shot. Once a
//! shot reaches the quota threshold, or enough shots in a row fail on quota,
//! the [`QuotaGate`] skips every later shot, in this run and in later runs of
//! the same [`ShotBatch`], until the reset interval has passed.
//!
//! Cancelling a batch keeps the reports of shots that already finished and
//! marks the rest as skipped.

use crate::{
    BatchConfig, CallSuccess, MockPayload, QuotaGate, QuotaState, ResilientCaller, backoff,
    cancellable_sleep,
};
use derive_getters::Getters;
use serde::Serialize;
use spark_error::{ClassifiedError, FailureKind, ResilienceError};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Message recorded for shots skipped while the quota gate is closed.
pub const QUOTA_SKIP_MESSAGE: &str = "skipped due to quota exhaustion";

/// Message recorded for shots interrupted or never started because the batch
/// was cancelled.
pub const CANCEL_SKIP_MESSAGE: &str = "skipped due to cancellation";

impl BatchConfig {
    /// Pause after a successful shot.
    pub fn success_wait(&self) -> Duration {
        backoff::seconds(*self.success_wait_seconds())
    }

    /// How long the quota gate stays closed.
    pub fn quota_reset_interval(&self) -> Duration {
        backoff::seconds(*self.quota_reset_interval_seconds())
    }
}

/// Final status of one shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShotStatus {
    /// The call returned a response
    Completed,
    /// The call failed terminally
    Failed,
    /// The call never finished because the quota gate was closed or the
    /// batch was cancelled
    Skipped,
}

/// What happened to one shot.
#[derive(Debug, Clone, Serialize, Getters)]
pub struct ShotReport<T> {
    call_site: String,
    status: ShotStatus,
    attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure_kind: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip)]
    response: Option<T>,
}

impl<T> ShotReport<T> {
    fn completed(call_site: &str, success: CallSuccess<T>) -> Self {
        let attempts = *success.attempts();
        Self {
            call_site: call_site.to_string(),
            status: ShotStatus::Completed,
            attempts,
            failure_kind: None,
            message: None,
            response: Some(success.into_response()),
        }
    }

    fn failed(call_site: &str, err: &ResilienceError) -> Self {
        Self {
            call_site: call_site.to_string(),
            status: ShotStatus::Failed,
            attempts: err.attempts(),
            failure_kind: err.failure_kind(),
            message: Some(err.kind().to_string()),
            response: None,
        }
    }

    fn skipped(call_site: &str, attempts: u32, message: &str) -> Self {
        Self {
            call_site: call_site.to_string(),
            status: ShotStatus::Skipped,
            attempts,
            failure_kind: None,
            message: Some(message.to_string()),
            response: None,
        }
    }

    /// Attempts beyond the first.
    pub fn retries(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }

    /// Take the response of a completed shot.
    pub fn into_response(self) -> Option<T> {
        self.response
    }
}

/// Totals across a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct BatchSummary {
    total: usize,
    completed: usize,
    failed: usize,
    skipped: usize,
    /// Failed shots whose last failure was quota-related
    quota_issues: usize,
    total_retries: u32,
    /// Completed shots as a fraction of all shots (0.0 for an empty batch)
    success_rate: f64,
}

impl BatchSummary {
    /// Summarise a set of reports.
    pub fn from_reports<T>(reports: &[ShotReport<T>]) -> Self {
        let count = |status: ShotStatus| reports.iter().filter(|r| r.status == status).count();
        let total = reports.len();
        let completed = count(ShotStatus::Completed);
        let quota_issues = reports
            .iter()
            .filter(|r| r.status == ShotStatus::Failed)
            .filter(|r| r.failure_kind.is_some_and(|k| k.is_quota()))
            .count();

        Self {
            total,
            completed,
            failed: count(ShotStatus::Failed),
            skipped: count(ShotStatus::Skipped),
            quota_issues,
            total_retries: reports.iter().map(ShotReport::retries).sum(),
            success_rate: if total == 0 {
                0.0
            } else {
                completed as f64 / total as f64
            },
        }
    }
}

/// Reports for every shot plus their summary.
///
/// A cancelled batch still carries one report per call site.
#[derive(Debug, Clone, Serialize, Getters)]
pub struct BatchOutcome<T> {
    reports: Vec<ShotReport<T>>,
    summary: BatchSummary,
    /// Whether the batch stopped early on cancellation
    cancelled: bool,
}

impl<T> BatchOutcome<T> {
    /// Take the per-shot reports.
    pub fn into_reports(self) -> Vec<ShotReport<T>> {
        self.reports
    }
}

/// Drives a list of call sites through a [`ResilientCaller`], one at a time.
///
/// # Example
///
/// ```
/// use spark_error::CallError;
/// use spark_resilience::{BatchConfig, CallConfig, ResilientCaller, ShotBatch};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let caller = ResilientCaller::new(CallConfig::default().with_mock_mode(true));
/// let batch = ShotBatch::new(&caller, BatchConfig::default());
///
/// let outcome = batch
///     .run(&["shot-1", "shot-2"], |_site, _attempt| async {
///         Err::<String, _>(CallError::from_message("never called in mock mode"))
///     })
///     .await;
///
/// assert_eq!(*outcome.summary().completed(), 2);
/// # }
/// ```
#[derive(Debug)]
pub struct ShotBatch<'a> {
    caller: &'a ResilientCaller,
    config: BatchConfig,
    gate: Mutex<QuotaGate>,
    cancel: CancellationToken,
}

impl<'a> ShotBatch<'a> {
    /// Create a batch driver.
    pub fn new(caller: &'a ResilientCaller, config: BatchConfig) -> Self {
        let gate = Mutex::new(QuotaGate::new(config.quota_reset_interval()));
        Self {
            caller,
            config,
            gate,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop the batch when `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run every call site in order.
    ///
    /// `op` receives the call site and the 1-based attempt number. Per-shot
    /// failures are recorded in the reports. On cancellation the interrupted
    /// shot and every shot after it are reported as skipped with
    /// [`CANCEL_SKIP_MESSAGE`], and the outcome is flagged as cancelled.
    #[instrument(skip(self, sites, op), fields(shots = sites.len()))]
    pub async fn run<S, T, E, F, Fut>(&self, sites: &[S], mut op: F) -> BatchOutcome<T>
    where
        S: AsRef<str>,
        T: MockPayload,
        E: ClassifiedError + Display,
        F: FnMut(&str, u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let threshold = *self.caller.config().consecutive_failure_threshold();
        let mut reports = Vec::with_capacity(sites.len());
        let mut cancelled = false;
        // Consecutive shots that ended on a quota failure
        let mut quota_failed_shots = 0u32;

        for (index, site) in sites.iter().enumerate() {
            let site = site.as_ref();
            if cancelled {
                reports.push(ShotReport::skipped(site, 0, CANCEL_SKIP_MESSAGE));
                continue;
            }
            info!(shot = index + 1, total = sites.len(), call_site = site, "Generating shot");

            if !self.gate.lock().await.is_open(Instant::now()) {
                warn!(call_site = site, "Quota gate closed, skipping shot");
                reports.push(ShotReport::skipped(site, 0, QUOTA_SKIP_MESSAGE));
                continue;
            }

            let mut quota = QuotaState::new();
            let result = self
                .caller
                .call_with_cancel(site, &mut quota, &self.cancel, |attempt| op(site, attempt))
                .await;

            match result {
                Ok(success) => {
                    quota_failed_shots = 0;
                    let mocked = *success.mocked();
                    reports.push(ShotReport::completed(site, success));
                    let is_last = index + 1 == sites.len();
                    if !mocked
                        && !is_last
                        && cancellable_sleep(self.config.success_wait(), &self.cancel)
                            .await
                            .is_err()
                    {
                        warn!(call_site = site, "Batch cancelled during success pause");
                        cancelled = true;
                    }
                }
                Err(err) if err.is_cancelled() => {
                    warn!(call_site = site, attempts = err.attempts(), "Batch cancelled");
                    reports.push(ShotReport::skipped(site, err.attempts(), CANCEL_SKIP_MESSAGE));
                    cancelled = true;
                }
                Err(err) => {
                    if err.failure_kind().is_some_and(|k| k.is_quota()) {
                        quota_failed_shots += 1;
                    } else {
                        quota_failed_shots = 0;
                    }
                    if err.is_quota_threshold() || quota_failed_shots >= threshold {
                        warn!(
                            call_site = site,
                            quota_failed_shots, "Quota exhausted, closing gate"
                        );
                        self.gate.lock().await.trip(Instant::now());
                        quota_failed_shots = 0;
                    }
                    reports.push(ShotReport::failed(site, &err));
                }
            }
        }

        let summary = BatchSummary::from_reports(&reports);
        info!(
            completed = summary.completed,
            failed = summary.failed,
            skipped = summary.skipped,
            success_rate = summary.success_rate,
            cancelled,
            "Batch finished"
        );
        BatchOutcome {
            reports,
            summary,
            cancelled,
        }
    }
}
