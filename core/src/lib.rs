//! Minimal synchronous JSON HTTP client.
//!
//! # Overview
//! `HttpClient` is bound to one base URL. Its verb methods join a relative
//! path onto that URL, attach the client's headers (JSON `Content-Type` and
//! `Accept` by default), serialize an optional payload and send the request
//! through a `Transport`. The returned `Response` can only be decoded from
//! JSON, once.
//!
//! # Design
//! - Request construction (`build_*`) is separate from dispatch, so URL and
//!   header rules are testable without a network.
//! - `Transport` is the only I/O seam; `UreqTransport` is the default.
//! - `Response` owns its body stream and releases it exactly once, on decode
//!   or on drop. Release failures are errors, never panics.
//! - No retries, timeouts, status-code handling or authentication.

pub mod client;
pub mod error;
pub mod http;
pub mod response;
pub mod transport;

pub use client::HttpClient;
pub use error::{ClientError, Result};
pub use http::{BodyStream, HttpMethod, HttpRequest, RawResponse};
pub use response::Response;
pub use transport::{Transport, UreqTransport};
