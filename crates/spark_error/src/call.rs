//! Errors returned by a single external call attempt.

use crate::FailureKind;

/// A classified failure from one invocation of a remote call.
///
/// Pipeline stages return this from the closure they hand to the call
/// wrapper. The wrapper only looks at [`CallError::kind`]; the message is
/// carried through for diagnostics.
///
/// # Examples
///
/// ```
/// use spark_error::{CallError, FailureKind};
///
/// let err = CallError::from_status(503, "model overloaded");
/// assert_eq!(err.kind, FailureKind::TransientServer);
/// assert!(format!("{}", err).contains("model overloaded"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Call Error ({}): {} at line {} in {}", kind, message, line, file)]
pub struct CallError {
    /// Classified failure kind
    pub kind: FailureKind,
    /// Provider or transport message
    pub message: String,
    /// Line number where the error was created
    pub line: u32,
    /// File where the error was created
    pub file: &'static str,
}

impl CallError {
    /// Create a call error with an explicit kind.
    #[track_caller]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Create a call error from an HTTP status and response body.
    #[track_caller]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self::new(FailureKind::from_status(status), message)
    }

    /// Create a call error by scanning a provider message for known indicators.
    #[track_caller]
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(FailureKind::from_message(&message), message)
    }
}

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for CallError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        Self::new(FailureKind::from_reqwest(&err), err.to_string())
    }
}

/// Errors that can tell the call wrapper how they should be handled.
///
/// Implement this for a stage's own error type to hand it straight to the
/// wrapper without converting to [`CallError`] first.
pub trait ClassifiedError {
    /// The failure kind driving retry decisions.
    fn failure_kind(&self) -> FailureKind;
}

impl ClassifiedError for CallError {
    fn failure_kind(&self) -> FailureKind {
        self.kind
    }
}

impl ClassifiedError for FailureKind {
    fn failure_kind(&self) -> FailureKind {
        *self
    }
}
