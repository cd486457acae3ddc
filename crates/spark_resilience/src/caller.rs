//! The resilient call wrapper.
//!
//! [`ResilientCaller`] invokes a caller-supplied operation up to
//! `max_retries + 1` times. Failures are routed by [`FailureKind`]:
//! - transient network/server failures back off linearly up to a cap
//! - quota failures cool down and count toward a consecutive-failure threshold
//! - everything else fails immediately
//!
//! In mock mode the operation is never invoked and a deterministic
//! placeholder is returned instead, so every pipeline stage can run without
//! live credentials.

use crate::{
    AttemptFailure, CallAttemptResult, CallConfig, CallState, CallSuccess, GiveUp, MockPayload,
    QuotaState, Step, backoff, cancellable_sleep, next_step,
};
use spark_error::{ClassifiedError, FailureKind, ResilienceError, ResilienceErrorKind};
use std::fmt::Display;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Wraps external calls with retry, backoff, quota cooldown and mock mode.
///
/// Holds only the immutable [`CallConfig`]; per-site state lives in the
/// [`QuotaState`] each caller passes in, so one `ResilientCaller` can serve
/// many call sites concurrently.
///
/// # Example
///
/// ```
/// use spark_error::{CallError, FailureKind};
/// use spark_resilience::{CallConfig, QuotaState, ResilientCaller};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let config = CallConfig::builder().base_delay_seconds(0.5).max_delay_seconds(1.0).build().unwrap();
/// let caller = ResilientCaller::new(config);
/// let mut quota = QuotaState::new();
///
/// let outcome = caller
///     .call("story-outline", &mut quota, |attempt| async move {
///         if attempt == 1 {
///             Err(CallError::new(FailureKind::TransientServer, "503"))
///         } else {
///             Ok("Once upon a time".to_string())
///         }
///     })
///     .await
///     .unwrap();
///
/// assert_eq!(outcome.response(), "Once upon a time");
/// assert_eq!(*outcome.attempts(), 2);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ResilientCaller {
    config: CallConfig,
}

impl ResilientCaller {
    /// Create a wrapper around an already validated configuration.
    pub fn new(config: CallConfig) -> Self {
        Self { config }
    }

    /// The configuration this wrapper runs with.
    pub fn config(&self) -> &CallConfig {
        &self.config
    }

    /// Run `op` with retries; it cannot be cancelled from outside.
    ///
    /// `op` receives the 1-based attempt number.
    ///
    /// # Errors
    ///
    /// Returns a [`ResilienceError`] carrying the last failure kind, its
    /// message and the number of attempts made.
    pub async fn call<T, E, F, Fut>(
        &self,
        call_site: &str,
        quota: &mut QuotaState,
        op: F,
    ) -> Result<CallSuccess<T>, ResilienceError>
    where
        T: MockPayload,
        E: ClassifiedError + Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.call_with_cancel(call_site, quota, &CancellationToken::new(), op)
            .await
    }

    /// Run `op` with retries, aborting if `cancel` fires.
    ///
    /// Cancellation is observed while waiting between attempts and before
    /// each invocation; an attempt already in flight runs to completion.
    /// A cancelled call returns [`ResilienceErrorKind::Cancelled`] with the
    /// number of attempts completed and never invokes `op` again.
    #[instrument(skip(self, call_site, quota, cancel, op), fields(call_site = %call_site))]
    pub async fn call_with_cancel<T, E, F, Fut>(
        &self,
        call_site: &str,
        quota: &mut QuotaState,
        cancel: &CancellationToken,
        mut op: F,
    ) -> Result<CallSuccess<T>, ResilienceError>
    where
        T: MockPayload,
        E: ClassifiedError + Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if *self.config.mock_mode() {
            info!("Mock mode enabled, returning placeholder response");
            return Ok(CallSuccess::from_mock(T::mock(call_site)));
        }

        let max_attempts = self.config.max_attempts();
        let mut attempt = 1;

        loop {
            if cancel.is_cancelled() {
                info!(attempts = attempt - 1, "Call cancelled before attempt");
                return Err(cancelled(attempt - 1));
            }

            debug!(attempt, max_attempts, state = %CallState::Attempting, "Invoking call");
            let record = self.attempt(&mut op, attempt).await;

            let failure = match record.into_outcome() {
                Ok(response) => {
                    quota.reset();
                    info!(attempt, state = %CallState::Succeeded, "Call succeeded");
                    return Ok(CallSuccess::new(response, attempt));
                }
                Err(failure) => failure,
            };

            let step = next_step(&self.config, quota, *failure.kind(), attempt);
            match step {
                Step::BackOff(delay) => {
                    let delay = if *self.config.jitter() {
                        backoff::jittered(delay)
                    } else {
                        delay
                    };
                    warn!(
                        attempt,
                        kind = %failure.kind(),
                        error = %failure.message(),
                        delay_secs = delay.as_secs_f64(),
                        state = %step.state(),
                        "Transient failure, backing off"
                    );
                    self.wait(delay, cancel, attempt).await?;
                }
                Step::QuotaCooldown(delay) => {
                    warn!(
                        attempt,
                        consecutive_failures = quota.consecutive_failures(),
                        error = %failure.message(),
                        delay_secs = delay.as_secs_f64(),
                        state = %step.state(),
                        "Quota exceeded, cooling down"
                    );
                    self.wait(delay, cancel, attempt).await?;
                }
                Step::GiveUp(reason) => {
                    let err = terminal(reason, failure, attempt);
                    error!(error = %err, state = %step.state(), "Call failed");
                    return Err(err);
                }
            }

            attempt += 1;
        }
    }

    async fn attempt<T, E, F, Fut>(&self, op: &mut F, attempt: u32) -> CallAttemptResult<T>
    where
        E: ClassifiedError + Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let future = op(attempt);
        let outcome = match self.config.attempt_timeout() {
            Some(limit) => match tokio::time::timeout(limit, future).await {
                Ok(result) => result.map_err(|e| AttemptFailure::from_error(&e)),
                Err(_) => Err(AttemptFailure::new(
                    FailureKind::TransientNetwork,
                    format!("attempt timed out after {:.1}s", limit.as_secs_f64()),
                )),
            },
            None => future.await.map_err(|e| AttemptFailure::from_error(&e)),
        };

        match outcome {
            Ok(response) => CallAttemptResult::success(attempt, response),
            Err(failure) => CallAttemptResult::failure(attempt, failure),
        }
    }

    async fn wait(
        &self,
        delay: std::time::Duration,
        cancel: &CancellationToken,
        attempts: u32,
    ) -> Result<(), ResilienceError> {
        cancellable_sleep(delay, cancel).await.map_err(|_| {
            info!(attempts, "Call cancelled while waiting to retry");
            cancelled(attempts)
        })
    }
}

fn cancelled(attempts: u32) -> ResilienceError {
    ResilienceError::new(ResilienceErrorKind::Cancelled { attempts })
}

fn terminal(reason: GiveUp, failure: AttemptFailure, attempts: u32) -> ResilienceError {
    let kind = *failure.kind();
    let message = failure.message().clone();
    let error_kind = match reason {
        GiveUp::NonRetryable => ResilienceErrorKind::NonRetryable {
            kind,
            attempts,
            message,
        },
        GiveUp::QuotaThreshold {
            consecutive_failures,
        } => ResilienceErrorKind::QuotaThreshold {
            consecutive_failures,
            attempts,
            message,
        },
        GiveUp::Exhausted => ResilienceErrorKind::Exhausted {
            kind,
            attempts,
            message,
        },
    };
    ResilienceError::new(error_kind)
}
