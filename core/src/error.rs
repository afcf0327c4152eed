//! Error types for the backend requester.
//!
//! # Design
//! `InvalidUrl` and `SerializationError` are raised while building a request,
//! before any transport is involved. `TransportError` covers network-level
//! failures. Responses that arrive with a non-2xx status land in `NotFound`
//! (404, which callers routinely branch on) or `HttpError` with the raw
//! status and body.

use thiserror::Error;

/// Every failure a `BackendRequester` can report to its completion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// `base_url + "/" + path` did not parse as a URL.
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The transport could not complete the round-trip.
    #[error("transport failed: {0}")]
    TransportError(String),
}
