//! Error types for the aiindex API client.
//!
//! # Design
//! Exactly two failure kinds exist: the server answered with a non-2xx
//! status, or the body did not decode into the endpoint's schema. Transport
//! failures (unreachable host, timeouts) belong to the host executing the
//! request and never appear here.

use std::fmt;

/// Errors returned by `IndexClient` parse methods.
#[derive(Debug)]
pub enum ApiError {
    /// The server returned a status outside 200–299. Carries the numeric
    /// code and the server's reason phrase.
    RequestFailed { status: u16, status_text: String },

    /// The response body could not be decoded into the expected type.
    DecodeFailed(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::RequestFailed {
                status,
                status_text,
            } => {
                write!(f, "request failed: {status} {status_text}")
            }
            ApiError::DecodeFailed(msg) => {
                write!(f, "decode failed: {msg}")
            }
        }
    }
}

impl std::error::Error for ApiError {}
