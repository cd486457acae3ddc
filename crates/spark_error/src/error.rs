//! Top-level error wrapper types.

use crate::{CallError, ConfigError, OutputError, ResilienceError};

/// Every error the Spark call layer can produce.
///
/// # Examples
///
/// ```
/// use spark_error::{SparkError, ConfigError};
///
/// let err: SparkError = ConfigError::invalid("max_retries", "too large").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum SparkErrorKind {
    /// A single call attempt failed
    #[from(CallError)]
    Call(CallError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// The call wrapper gave up
    #[from(ResilienceError)]
    Resilience(ResilienceError),
    /// Command output could not be rendered or written
    #[from(OutputError)]
    Output(OutputError),
}

/// Spark error with kind discrimination.
///
/// # Examples
///
/// ```
/// use spark_error::{SparkResult, ConfigError};
///
/// fn might_fail() -> SparkResult<()> {
///     Err(ConfigError::invalid("mock_mode", "expected a boolean"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Spark Error: {}", _0)]
pub struct SparkError(Box<SparkErrorKind>);

impl SparkError {
    /// Create a new error from a kind.
    pub fn new(kind: SparkErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &SparkErrorKind {
        &self.0
    }
}

impl<T> From<T> for SparkError
where
    T: Into<SparkErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Spark operations.
pub type SparkResult<T> = std::result::Result<T, SparkError>;
