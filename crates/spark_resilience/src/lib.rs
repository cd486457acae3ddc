//! Resilient invocation of external AI generation endpoints.
//!
//! Every call to a text, image or video endpoint goes through one
//! [`ResilientCaller`]. It classifies each failure, backs off on transient
//! network and server errors, cools down on quota errors, gives up
//! immediately on everything else, and can fabricate placeholder responses
//! in mock mode.
//!
//! ## Layers
//!
//! - [`CallConfig`] / [`BatchConfig`] - settings, loaded once and passed explicitly
//! - [`next_step`] - the retry decision for one failed attempt
//! - [`ResilientCaller`] - the attempt loop for one call site
//! - [`ShotBatch`] - sequential shots with a batch-wide [`QuotaGate`]

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod attempt;
mod backoff;
mod batch;
mod caller;
mod config;
mod mock;
mod policy;
mod quota;
mod wait;

pub use attempt::{AttemptFailure, CallAttemptResult, CallState, CallSuccess};
pub use backoff::{QUOTA_WAIT_CAP_SECONDS, jittered};
pub use batch::{
    BatchOutcome, BatchSummary, CANCEL_SKIP_MESSAGE, QUOTA_SKIP_MESSAGE, ShotBatch, ShotReport,
    ShotStatus,
};
pub use caller::ResilientCaller;
pub use config::{BatchConfig, CallConfig, CallConfigBuilder, ConfigSources, ENV_PREFIX};
pub use mock::{MOCK_VIDEO_MARKER, MockPayload};
pub use policy::{GiveUp, Step, next_step};
pub use quota::{QuotaGate, QuotaState};
pub use wait::{WaitCancelled, cancellable_sleep};
