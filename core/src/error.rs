//! Error types for the JSON HTTP client.
//!
//! # Design
//! Every failure is returned to the immediate caller; nothing here retries.
//! Releasing a response body can fail independently of decoding it, so that
//! case gets its own variant instead of aborting the process.

use std::io;

use crate::http::HttpMethod;

/// Errors returned by `HttpClient` verb methods and `Response::decode_to`.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request payload could not be serialized to JSON. Raised before
    /// anything is sent.
    #[error("serialization failed: {0}")]
    SerializationError(#[source] serde_json::Error),

    /// The method/URL pair or a header could not form a valid request.
    #[error("invalid {method} request to {url}: {reason}")]
    RequestConstructionError {
        method: HttpMethod,
        url: String,
        reason: String,
    },

    /// The transport failed to send the request or receive a response.
    #[error("transport failed: {0}")]
    TransportError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The response body is not valid JSON or does not fit the target type.
    #[error("decode failed: {0}")]
    DecodeError(#[source] serde_json::Error),

    /// The body decoded fine but releasing the underlying stream failed.
    #[error("failed to release response body: {0}")]
    BodyReleaseError(#[source] io::Error),

    /// `decode_to` was called on a response whose body was already read.
    #[error("response body already consumed")]
    BodyConsumed,
}

pub type Result<T> = std::result::Result<T, ClientError>;
