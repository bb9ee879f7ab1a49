//! Error types for aircraft lookups.
//!
//! A "no aircraft" answer is not an error: it is `Ok(None)` from
//! [`AircraftLookup::lookup`](crate::lookup::AircraftLookup::lookup).
//! Everything here is transient from the poller's point of view and is
//! retried on the next cycle.

/// Failures talking to the aircraft data provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The request never produced a response (DNS, TLS, timeout, reset).
    #[error("provider request failed: {0}")]
    Request(String),

    /// The provider answered with a non-success HTTP status.
    #[error("provider returned {status}: {body}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The response body, as far as it could be read.
        body: String,
    },

    /// The response body was not the JSON shape the provider documents.
    #[error("provider response could not be decoded: {0}")]
    Decode(String),
}
