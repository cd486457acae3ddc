//! Failure taxonomy for external calls.
//!
//! Every failed call to a chat, image, or video endpoint is reduced to one
//! [`FailureKind`]. The kind alone decides what the call wrapper does next:
//! back off and retry, cool down for quota, or give up.

use serde::{Deserialize, Serialize};

/// Classified reason an external call failed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum FailureKind {
    /// Connection reset, timeout, DNS failure
    TransientNetwork,
    /// Remote 5xx-equivalent
    TransientServer,
    /// Remote rate-limit or quota rejection
    QuotaExceeded,
    /// Invalid or expired credential
    AuthFailure,
    /// Malformed payload or content-policy rejection
    InvalidRequest,
    /// Anything we could not classify
    Unknown,
}

const QUOTA_INDICATORS: &[&str] = &[
    "429",
    "resource_exhausted",
    "quota",
    "rate limit",
    "ratelimit",
    "too many requests",
    "exceeded",
    "billing",
];

const AUTH_INDICATORS: &[&str] = &[
    "401",
    "403",
    "unauthorized",
    "unauthenticated",
    "permission denied",
    "permission_denied",
    "invalid api key",
    "api key not valid",
];

const INVALID_INDICATORS: &[&str] = &[
    "400",
    "invalid argument",
    "invalid_argument",
    "content policy",
    "safety",
    "malformed",
];

const SERVER_INDICATORS: &[&str] = &[
    "500",
    "502",
    "503",
    "504",
    "internal error",
    "internal server error",
    "unavailable",
    "bad gateway",
];

const NETWORK_INDICATORS: &[&str] = &[
    "timeout",
    "timed out",
    "connection",
    "network",
    "dns",
    "reset",
    "broken pipe",
];

impl FailureKind {
    /// Whether the wrapper may try again after this failure.
    ///
    /// `Unknown` is not retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FailureKind::TransientNetwork | FailureKind::TransientServer | FailureKind::QuotaExceeded
        )
    }

    /// Whether this failure goes through quota cooldown instead of standard backoff.
    pub fn is_quota(&self) -> bool {
        matches!(self, FailureKind::QuotaExceeded)
    }

    /// Classify an HTTP status code.
    ///
    /// # Examples
    ///
    /// ```
    /// use spark_error::FailureKind;
    ///
    /// assert_eq!(FailureKind::from_status(429), FailureKind::QuotaExceeded);
    /// assert_eq!(FailureKind::from_status(503), FailureKind::TransientServer);
    /// assert_eq!(FailureKind::from_status(401), FailureKind::AuthFailure);
    /// ```
    pub fn from_status(status: u16) -> Self {
        match status {
            408 => FailureKind::TransientNetwork,
            429 => FailureKind::QuotaExceeded,
            401 | 403 => FailureKind::AuthFailure,
            400..=499 => FailureKind::InvalidRequest,
            500..=599 => FailureKind::TransientServer,
            _ => FailureKind::Unknown,
        }
    }

    /// Classify a free-form provider error message.
    ///
    /// Providers often surface failures as strings only (SDK exceptions,
    /// long-running operation errors). Matching is case-insensitive and the
    /// first matching family wins, quota indicators first.
    ///
    /// # Examples
    ///
    /// ```
    /// use spark_error::FailureKind;
    ///
    /// let kind = FailureKind::from_message("429 RESOURCE_EXHAUSTED: quota exceeded");
    /// assert_eq!(kind, FailureKind::QuotaExceeded);
    /// assert_eq!(FailureKind::from_message("connection reset by peer"), FailureKind::TransientNetwork);
    /// assert_eq!(FailureKind::from_message("something odd"), FailureKind::Unknown);
    /// ```
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        let matches_any = |indicators: &[&str]| indicators.iter().any(|i| lower.contains(i));

        if matches_any(QUOTA_INDICATORS) {
            FailureKind::QuotaExceeded
        } else if matches_any(AUTH_INDICATORS) {
            FailureKind::AuthFailure
        } else if matches_any(INVALID_INDICATORS) {
            FailureKind::InvalidRequest
        } else if matches_any(SERVER_INDICATORS) {
            FailureKind::TransientServer
        } else if matches_any(NETWORK_INDICATORS) {
            FailureKind::TransientNetwork
        } else {
            FailureKind::Unknown
        }
    }

    /// Classify a `reqwest` transport error.
    #[cfg(feature = "reqwest")]
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_status(status.as_u16());
        }
        if err.is_timeout() || err.is_connect() {
            FailureKind::TransientNetwork
        } else if err.is_body() || err.is_decode() || err.is_builder() {
            FailureKind::InvalidRequest
        } else if err.is_request() {
            // Request-phase failures without a status are almost always I/O
            FailureKind::TransientNetwork
        } else {
            FailureKind::Unknown
        }
    }
}
