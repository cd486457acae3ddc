//! Spark - resilient external calls for AI video pipelines.
//!
//! Every stage of the pipeline (story outline, scene images, video clips)
//! talks to a remote generation API that can be slow, rate limited or
//! briefly unavailable. Spark wraps each of those calls with retry, linear
//! backoff, quota cooldown and a mock mode.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use spark::{CallConfig, CallError, QuotaState, ResilientCaller};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let caller = ResilientCaller::new(CallConfig::load()?);
//!     let mut quota = QuotaState::new();
//!
//!     let clip = caller
//!         .call("scene-1/shot-1", &mut quota, |_attempt| async {
//!             let response = reqwest::get("https://video.example/generate").await?;
//!             let status = response.status();
//!             if !status.is_success() {
//!                 return Err(CallError::from_status(status.as_u16(), response.text().await?));
//!             }
//!             Ok(response.bytes().await?.to_vec())
//!         })
//!         .await?;
//!
//!     println!("{} bytes after {} attempt(s)", clip.response().len(), clip.attempts());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `spark_error` - failure taxonomy and error types
//! - `spark_resilience` - configuration, retry policy, call wrapper, shot batches
//!
//! This crate re-exports both and adds the `spark` operator binary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod observability;
mod render;
mod simulate;

pub use render::{config_toml, env_template};
pub use simulate::{Simulation, scale_delays};

pub use spark_error::{
    CallError, ClassifiedError, ConfigError, ConfigErrorKind, FailureKind, OutputError,
    ResilienceError, ResilienceErrorKind, SparkError, SparkErrorKind, SparkResult,
};
pub use spark_resilience::{
    AttemptFailure, BatchConfig, BatchOutcome, BatchSummary, CANCEL_SKIP_MESSAGE,
    CallAttemptResult, CallConfig, CallConfigBuilder, CallState, CallSuccess, ConfigSources, ENV_PREFIX, GiveUp,
    MOCK_VIDEO_MARKER, MockPayload, QUOTA_SKIP_MESSAGE, QUOTA_WAIT_CAP_SECONDS, QuotaGate,
    QuotaState, ResilientCaller, ShotBatch, ShotReport, ShotStatus, Step, WaitCancelled,
    cancellable_sleep, jittered, next_step,
};
