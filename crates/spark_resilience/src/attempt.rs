//! Per-attempt records and the successful outcome of a call.

use derive_getters::Getters;
use spark_error::{ClassifiedError, FailureKind};
use std::fmt::Display;

/// Why a single attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct AttemptFailure {
    kind: FailureKind,
    message: String,
}

impl AttemptFailure {
    /// Create a failure record.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Record a failure reported by the call function.
    pub fn from_error<E>(err: &E) -> Self
    where
        E: ClassifiedError + Display,
    {
        Self::new(err.failure_kind(), err.to_string())
    }
}

/// Result of one invocation of the call function.
///
/// A response is present exactly when the attempt succeeded, an error kind
/// exactly when it failed.
///
/// # Example
///
/// ```
/// use spark_error::FailureKind;
/// use spark_resilience::{AttemptFailure, CallAttemptResult};
///
/// let failed: CallAttemptResult<String> = CallAttemptResult::failure(
///     2,
///     AttemptFailure::new(FailureKind::TransientServer, "503"),
/// );
/// assert!(!failed.succeeded());
/// assert_eq!(failed.error_kind(), Some(FailureKind::TransientServer));
/// assert_eq!(failed.response(), None);
/// assert_eq!(failed.attempt_number(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CallAttemptResult<T> {
    attempt_number: u32,
    outcome: Result<T, AttemptFailure>,
}

impl<T> CallAttemptResult<T> {
    /// Record a successful attempt.
    pub fn success(attempt_number: u32, response: T) -> Self {
        Self {
            attempt_number,
            outcome: Ok(response),
        }
    }

    /// Record a failed attempt.
    pub fn failure(attempt_number: u32, failure: AttemptFailure) -> Self {
        Self {
            attempt_number,
            outcome: Err(failure),
        }
    }

    /// Whether the attempt succeeded.
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The response payload, present iff the attempt succeeded.
    pub fn response(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    /// The failure kind, present iff the attempt failed.
    pub fn error_kind(&self) -> Option<FailureKind> {
        self.outcome.as_ref().err().map(|f| f.kind)
    }

    /// 1-based attempt number.
    pub fn attempt_number(&self) -> u32 {
        self.attempt_number
    }

    /// Consume the record into its payload or failure.
    pub fn into_outcome(self) -> Result<T, AttemptFailure> {
        self.outcome
    }
}

/// Successful outcome of a wrapped call.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct CallSuccess<T> {
    /// Payload returned by the successful attempt (or the mock payload)
    response: T,
    /// Attempts made, including the successful one
    attempts: u32,
    /// Whether the payload was fabricated in mock mode
    mocked: bool,
}

impl<T> CallSuccess<T> {
    pub(crate) fn new(response: T, attempts: u32) -> Self {
        Self {
            response,
            attempts,
            mocked: false,
        }
    }

    pub(crate) fn from_mock(response: T) -> Self {
        Self {
            response,
            attempts: 1,
            mocked: true,
        }
    }

    /// Take the payload.
    pub fn into_response(self) -> T {
        self.response
    }
}

/// States of a single wrapped call.
///
/// ```text
/// ATTEMPTING -> SUCCEEDED
/// ATTEMPTING -> BACKING_OFF -> ATTEMPTING
/// ATTEMPTING -> QUOTA_COOLDOWN -> ATTEMPTING
/// ATTEMPTING -> FAILED_TERMINAL
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CallState {
    /// Invoking the call function
    Attempting,
    /// Waiting out standard backoff
    BackingOff,
    /// Waiting out a quota cooldown
    QuotaCooldown,
    /// Finished with a response
    Succeeded,
    /// Finished without a response
    FailedTerminal,
}

impl CallState {
    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CallState::Succeeded | CallState::FailedTerminal)
    }
}
