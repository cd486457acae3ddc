//! Errors rendering or writing command output.

/// Serialization or write failure in an operator command.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Output Error: {} at line {} in {}", message, line, file)]
pub struct OutputError {
    /// The underlying error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl OutputError {
    /// Create a new OutputError with the given message at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use spark_error::OutputError;
    ///
    /// let err = OutputError::new("failed to serialize summary");
    /// assert!(err.message.contains("summary"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
