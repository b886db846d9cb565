//! The seam between the client and the network.
//!
//! # Design
//! `HttpClient` never touches sockets itself. It hands a validated
//! `HttpRequest` to a `Transport` and gets back a status plus a body stream.
//! `UreqTransport` is the default; tests substitute their own implementation
//! to observe what would have been sent.

use tracing::debug;

use crate::error::{ClientError, Result};
use crate::http::{BodyStream, HttpMethod, HttpRequest, RawResponse};

/// Performs one HTTP round-trip.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<RawResponse>;
}

impl BodyStream for ureq::BodyReader<'static> {}

/// Blocking transport over a single reused `ureq::Agent`.
///
/// The agent keeps its own connection pool across calls. Status codes are
/// never turned into errors; 4xx/5xx bodies come back like any other.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Use an agent configured elsewhere (timeouts, proxies, TLS).
    ///
    /// The agent should have `http_status_as_error(false)`, otherwise non-2xx
    /// responses surface as `TransportError`.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<RawResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;
        let payload = body.as_deref().unwrap_or_default();

        let response = match method {
            HttpMethod::Get => with_headers(self.agent.get(&url), &headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(&url), &headers).call(),
            HttpMethod::Post => with_headers(self.agent.post(&url), &headers).send(payload),
            HttpMethod::Put => with_headers(self.agent.put(&url), &headers).send(payload),
        }
        .map_err(|e| ClientError::TransportError(Box::new(e)))?;

        let status = response.status().as_u16();
        debug!(%method, %url, status, "received response");

        Ok(RawResponse {
            status,
            body: Box::new(response.into_body().into_reader()),
        })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
