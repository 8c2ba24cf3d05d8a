//! Error types for the request client.
//!
//! # Design
//! Only failures to complete an HTTP exchange are errors. A response with a
//! 4xx or 5xx status is data, returned to the caller as an `HttpResponse`.
//! `Timeout` gets a dedicated variant because callers report it differently
//! from a refused or reset connection.

use thiserror::Error;

/// Errors returned by the blocking and async clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// DNS, connect, TLS or I/O failure while talking to the server.
    #[error("transport failure for {url}: {message}")]
    Transport { url: String, message: String },

    /// The transport rejected part of the request (method, header name or value).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ClientError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout { .. })
    }
}
