//! Deterministic placeholder payloads for mock mode.

use serde_json::{Value, json};

/// Marker bytes written into placeholder video payloads.
pub const MOCK_VIDEO_MARKER: &[u8] = b"MOCK_VIDEO_DATA_FOR_TESTING";

/// Payload types the wrapper can fabricate without contacting an endpoint.
///
/// The same call site always yields the same value.
///
/// # Example
///
/// ```
/// use spark_resilience::MockPayload;
///
/// assert_eq!(String::mock("shot-3"), "mock://shot-3");
/// assert_eq!(String::mock("shot-3"), String::mock("shot-3"));
/// ```
pub trait MockPayload: Sized {
    /// Placeholder for `call_site`.
    fn mock(call_site: &str) -> Self;
}

impl MockPayload for () {
    fn mock(_call_site: &str) -> Self {}
}

/// A `mock://` reference naming the call site, usable as a fake clip or image URL.
impl MockPayload for String {
    fn mock(call_site: &str) -> Self {
        format!("mock://{}", call_site)
    }
}

/// Placeholder video bytes: the mock marker followed by the call site.
impl MockPayload for Vec<u8> {
    fn mock(call_site: &str) -> Self {
        let mut bytes = MOCK_VIDEO_MARKER.to_vec();
        bytes.push(b':');
        bytes.extend_from_slice(call_site.as_bytes());
        bytes
    }
}

impl MockPayload for Value {
    fn mock(call_site: &str) -> Self {
        json!({
            "mock": true,
            "call_site": call_site,
            "content": format!("mock response for {}", call_site),
        })
    }
}
