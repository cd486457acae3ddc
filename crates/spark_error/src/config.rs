//! Configuration error types.

/// Specific configuration error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConfigErrorKind {
    /// Configuration sources could not be read or merged
    #[display("Failed to load configuration: {}", _0)]
    Load(String),
    /// Merged configuration did not deserialize
    #[display("Failed to parse configuration: {}", _0)]
    Parse(String),
    /// A field holds a value outside its allowed range
    #[display("Invalid value for '{}': {}", field, reason)]
    InvalidField {
        /// The field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Configuration error with source location.
///
/// # Examples
///
/// ```
/// use spark_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::invalid("max_delay_seconds", "must be >= base_delay_seconds");
/// assert!(matches!(err.kind(), ConfigErrorKind::InvalidField { .. }));
/// assert!(format!("{}", err).contains("max_delay_seconds"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    kind: ConfigErrorKind,
    line: u32,
    file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError at the current location.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for an [`ConfigErrorKind::InvalidField`] error.
    #[track_caller]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::InvalidField {
            field: field.into(),
            reason: reason.into(),
        })
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ConfigErrorKind {
        &self.kind
    }
}
