//! JSON HTTP client bound to a single base URL.
//!
//! # Design
//! Each verb is split into a `build_*` method that produces a validated
//! `HttpRequest` and a shared `send` step that hands it to the transport.
//! The builders never touch the network, so URL joining, header precedence
//! and payload serialization are all testable as plain data.
//!
//! Headers live in an insertion-ordered list. `add_header` takes `&mut self`,
//! so headers cannot change while a request built from them is in flight.

use serde::Serialize;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::http::{HttpMethod, HttpRequest};
use crate::response::Response;
use crate::transport::{Transport, UreqTransport};

const JSON_MEDIA_TYPE: &str = "application/json";

/// Synchronous client that sends JSON requests relative to a base URL.
///
/// Every request carries `Content-Type` and `Accept` set to
/// `application/json` unless overridden with `add_header`.
pub struct HttpClient {
    base_url: String,
    headers: Vec<(String, String)>,
    transport: Box<dyn Transport>,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_transport(base_url, UreqTransport::new())
    }

    pub fn with_transport(base_url: &str, transport: impl Transport + 'static) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            headers: vec![
                ("Content-Type".to_string(), JSON_MEDIA_TYPE.to_string()),
                ("Accept".to_string(), JSON_MEDIA_TYPE.to_string()),
            ],
            transport: Box::new(transport),
        }
    }

    /// The normalized base URL, always ending in exactly one `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Set a header on every subsequent request.
    ///
    /// An existing header whose name matches case-insensitively is replaced
    /// in place; otherwise the header is appended. Names and values are not
    /// checked here; an invalid one fails the next request instead.
    pub fn add_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some(entry) => *entry = (name.to_string(), value.to_string()),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, path: &str) -> Result<Response> {
        self.send(self.build_get(path)?)
    }

    pub fn delete(&self, path: &str) -> Result<Response> {
        self.send(self.build_delete(path)?)
    }

    pub fn post<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> Result<Response> {
        self.send(self.build_post(path, payload)?)
    }

    pub fn put<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> Result<Response> {
        self.send(self.build_put(path, payload)?)
    }

    pub fn build_get(&self, path: &str) -> Result<HttpRequest> {
        self.build(HttpMethod::Get, path, None)
    }

    pub fn build_delete(&self, path: &str) -> Result<HttpRequest> {
        self.build(HttpMethod::Delete, path, None)
    }

    pub fn build_post<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> Result<HttpRequest> {
        let body = serde_json::to_vec(payload).map_err(ClientError::SerializationError)?;
        self.build(HttpMethod::Post, path, Some(body))
    }

    pub fn build_put<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> Result<HttpRequest> {
        let body = serde_json::to_vec(payload).map_err(ClientError::SerializationError)?;
        self.build(HttpMethod::Put, path, Some(body))
    }

    fn build(&self, method: HttpMethod, path: &str, body: Option<Vec<u8>>) -> Result<HttpRequest> {
        let url = join_url(&self.base_url, path);
        validate(method, &url, &self.headers)?;
        Ok(HttpRequest {
            method,
            url,
            headers: self.headers.clone(),
            body,
        })
    }

    fn send(&self, request: HttpRequest) -> Result<Response> {
        debug!(
            method = %request.method,
            url = %request.url,
            headers = request.headers.len(),
            body_len = request.body.as_ref().map_or(0, Vec::len),
            "dispatching request"
        );
        let raw = self.transport.execute(request)?;
        Ok(Response::new(raw))
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Collapse any trailing slashes into exactly one.
fn normalize_base_url(base_url: &str) -> String {
    format!("{}/", base_url.trim_end_matches('/'))
}

/// Append `path` to a normalized base, dropping one leading slash from it.
fn join_url(base_url: &str, path: &str) -> String {
    let path = path.strip_prefix('/').unwrap_or(path);
    format!("{base_url}{path}")
}

fn validate(method: HttpMethod, url: &str, headers: &[(String, String)]) -> Result<()> {
    let invalid = |reason: String| ClientError::RequestConstructionError {
        method,
        url: url.to_string(),
        reason,
    };

    let uri = ureq::http::Uri::try_from(url).map_err(|e| invalid(e.to_string()))?;
    if uri.scheme().is_none() || uri.authority().is_none() {
        return Err(invalid("URL must include a scheme and host".to_string()));
    }

    for (name, value) in headers {
        ureq::http::HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| invalid(format!("header name {name:?}: {e}")))?;
        ureq::http::HeaderValue::from_str(value)
            .map_err(|e| invalid(format!("header {name:?} value: {e}")))?;
    }
    Ok(())
}
