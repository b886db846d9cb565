//! HTTP request and response types shared by the client and its transports.
//!
//! # Design
//! Requests are plain data: the client builds and validates an `HttpRequest`
//! completely before any transport sees it, so request construction can be
//! tested without a network. Responses are not plain data, because the body
//! is a one-shot stream that must be released exactly once; `BodyStream`
//! makes that release explicit and fallible.

use std::fmt;
use std::io::{self, Read};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built request described as plain data.
///
/// Produced by `HttpClient::build_*`. `url` is absolute, every header has
/// already been validated, and `body` is `None` for GET and DELETE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// The one-shot body of a received response.
///
/// `close` releases whatever the stream holds. It is called exactly once by
/// `Response`, either after decoding or when the response is dropped.
pub trait BodyStream: Read {
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// What a transport hands back after a round-trip.
pub struct RawResponse {
    pub status: u16,
    pub body: Box<dyn BodyStream>,
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
