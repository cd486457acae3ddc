//! Error types for the Spark call layer.
//!
//! # Error Hierarchy
//!
//! Errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - Constructors use `#[track_caller]` for automatic location capture
//!
//! [`FailureKind`] is the retry taxonomy shared by every pipeline stage.
//!
//! # Examples
//!
//! ```
//! use spark_error::{CallError, FailureKind, SparkResult};
//!
//! fn generate_clip() -> SparkResult<String> {
//!     Err(CallError::new(FailureKind::QuotaExceeded, "429 RESOURCE_EXHAUSTED"))?
//! }
//!
//! assert!(generate_clip().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod call;
mod config;
mod error;
mod failure;
mod output;
mod resilience;

pub use call::{CallError, ClassifiedError};
pub use config::{ConfigError, ConfigErrorKind};
pub use error::{SparkError, SparkErrorKind, SparkResult};
pub use failure::FailureKind;
pub use output::OutputError;
pub use resilience::{ResilienceError, ResilienceErrorKind};
