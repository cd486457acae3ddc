//! Terminal outcomes of the resilient call wrapper.

use crate::FailureKind;

/// Why the wrapper stopped without a successful response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ResilienceErrorKind {
    /// The call failed with a kind that retrying cannot fix
    #[display("{} after {} attempt(s), not retrying: {}", kind, attempts, message)]
    NonRetryable {
        /// Failure kind of the last attempt
        kind: FailureKind,
        /// Attempts made
        attempts: u32,
        /// Last error message
        message: String,
    },
    /// Consecutive quota failures reached the configured threshold
    #[display(
        "Quota exhausted after {} consecutive failure(s) in {} attempt(s): {}",
        consecutive_failures,
        attempts,
        message
    )]
    QuotaThreshold {
        /// Consecutive quota failures at the time of abandonment
        consecutive_failures: u32,
        /// Attempts made
        attempts: u32,
        /// Last error message
        message: String,
    },
    /// Every permitted attempt failed
    #[display("{} on all {} attempt(s): {}", kind, attempts, message)]
    Exhausted {
        /// Failure kind of the last attempt
        kind: FailureKind,
        /// Attempts made
        attempts: u32,
        /// Last error message
        message: String,
    },
    /// The caller cancelled while the wrapper was waiting between attempts
    #[display("Cancelled after {} attempt(s)", attempts)]
    Cancelled {
        /// Attempts completed before cancellation
        attempts: u32,
    },
}

/// Terminal wrapper failure with location tracking.
///
/// # Examples
///
/// ```
/// use spark_error::{FailureKind, ResilienceError, ResilienceErrorKind};
///
/// let err = ResilienceError::new(ResilienceErrorKind::Exhausted {
///     kind: FailureKind::TransientNetwork,
///     attempts: 4,
///     message: "connection reset".to_string(),
/// });
/// assert_eq!(err.attempts(), 4);
/// assert_eq!(err.failure_kind(), Some(FailureKind::TransientNetwork));
/// assert!(!err.is_cancelled());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Resilience Error: {} at line {} in {}", kind, line, file)]
pub struct ResilienceError {
    kind: ResilienceErrorKind,
    line: u32,
    file: &'static str,
}

impl ResilienceError {
    /// Create a new resilience error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ResilienceErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ResilienceErrorKind {
        &self.kind
    }

    /// Failure kind of the last observed attempt, if any attempt failed.
    ///
    /// Cancellation is not a call failure and returns `None`.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match &self.kind {
            ResilienceErrorKind::NonRetryable { kind, .. }
            | ResilienceErrorKind::Exhausted { kind, .. } => Some(*kind),
            ResilienceErrorKind::QuotaThreshold { .. } => Some(FailureKind::QuotaExceeded),
            ResilienceErrorKind::Cancelled { .. } => None,
        }
    }

    /// Total attempts made before stopping.
    pub fn attempts(&self) -> u32 {
        match &self.kind {
            ResilienceErrorKind::NonRetryable { attempts, .. }
            | ResilienceErrorKind::QuotaThreshold { attempts, .. }
            | ResilienceErrorKind::Exhausted { attempts, .. }
            | ResilienceErrorKind::Cancelled { attempts } => *attempts,
        }
    }

    /// Last error message reported by the call function.
    pub fn message(&self) -> Option<&str> {
        match &self.kind {
            ResilienceErrorKind::NonRetryable { message, .. }
            | ResilienceErrorKind::QuotaThreshold { message, .. }
            | ResilienceErrorKind::Exhausted { message, .. } => Some(message),
            ResilienceErrorKind::Cancelled { .. } => None,
        }
    }

    /// Whether the wrapper stopped because the caller cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, ResilienceErrorKind::Cancelled { .. })
    }

    /// Whether the wrapper stopped on the consecutive quota threshold.
    pub fn is_quota_threshold(&self) -> bool {
        matches!(self.kind, ResilienceErrorKind::QuotaThreshold { .. })
    }
}
