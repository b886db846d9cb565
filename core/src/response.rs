//! Handle over a received response whose only exit is a JSON decode.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{ClientError, Result};
use crate::http::{BodyStream, RawResponse};

/// A received response. Owns the body stream until `decode_to` consumes it.
///
/// The body is released exactly once: by the first `decode_to` call on every
/// path out of it, or on drop if the response is never decoded.
pub struct Response {
    status: u16,
    body: Option<Box<dyn BodyStream>>,
}

impl Response {
    pub(crate) fn new(raw: RawResponse) -> Self {
        Self {
            status: raw.status,
            body: Some(raw.body),
        }
    }

    /// Parse the whole body as one JSON document into `T`, then release it.
    ///
    /// A decode failure takes precedence over a release failure; the latter
    /// is only reported as `BodyReleaseError` when decoding succeeded.
    pub fn decode_to<T: DeserializeOwned>(&mut self) -> Result<T> {
        let mut body = self.body.take().ok_or(ClientError::BodyConsumed)?;

        let decoded: serde_json::Result<T> = serde_json::from_reader(&mut body);
        let closed = body.close();

        match (decoded, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(ClientError::BodyReleaseError(e)),
            (Err(e), Ok(())) => Err(ClientError::DecodeError(e)),
            (Err(e), Err(close_err)) => {
                warn!(status = self.status, error = %close_err, "failed to release response body after decode error");
                Err(ClientError::DecodeError(e))
            }
        }
    }

    pub fn is_consumed(&self) -> bool {
        self.body.is_none()
    }
}

impl Drop for Response {
    fn drop(&mut self) {
        if let Some(mut body) = self.body.take() {
            if let Err(e) = body.close() {
                warn!(status = self.status, error = %e, "failed to release undecoded response body");
            }
        }
    }
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("consumed", &self.is_consumed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::{self, Cursor, Read};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use serde::Deserialize;

    use super::*;

    /// In-memory body that counts `close` calls and can be told to fail them.
    pub(crate) struct TrackedBody {
        data: Cursor<Vec<u8>>,
        closes: Arc<AtomicUsize>,
        fail_close: bool,
    }

    impl TrackedBody {
        pub(crate) fn new(data: &str, closes: Arc<AtomicUsize>) -> Self {
            Self {
                data: Cursor::new(data.as_bytes().to_vec()),
                closes,
                fail_close: false,
            }
        }

        pub(crate) fn failing(data: &str, closes: Arc<AtomicUsize>) -> Self {
            Self {
                fail_close: true,
                ..Self::new(data, closes)
            }
        }
    }

    impl Read for TrackedBody {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.data.read(buf)
        }
    }

    impl BodyStream for TrackedBody {
        fn close(&mut self) -> io::Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            if self.fail_close {
                return Err(io::Error::new(io::ErrorKind::Other, "close failed"));
            }
            Ok(())
        }
    }

    fn response(body: TrackedBody) -> Response {
        Response::new(RawResponse {
            status: 200,
            body: Box::new(body),
        })
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Shape {
        a: i64,
    }

    #[test]
    fn decode_to_matching_shape() {
        let closes = Arc::new(AtomicUsize::new(0));
        let mut resp = response(TrackedBody::new(r#"{"a":1}"#, closes.clone()));
        let shape: Shape = resp.decode_to().unwrap();
        assert_eq!(shape, Shape { a: 1 });
        assert_eq!(closes.load(Ordering::SeqCst), 1);
        assert!(resp.is_consumed());
    }

    #[test]
    fn decode_into_dynamic_value() {
        let closes = Arc::new(AtomicUsize::new(0));
        let mut resp = response(TrackedBody::new(r#"[1,"two",null]"#, closes));
        let value: serde_json::Value = resp.decode_to().unwrap();
        assert_eq!(value, serde_json::json!([1, "two", null]));
    }

    #[test]
    fn not_json_is_decode_error_and_body_is_released() {
        let closes = Arc::new(AtomicUsize::new(0));
        let mut resp = response(TrackedBody::new("not json", closes.clone()));
        let err = resp.decode_to::<Shape>().unwrap_err();
        assert!(matches!(err, ClientError::DecodeError(_)));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn wrong_shape_is_decode_error() {
        let closes = Arc::new(AtomicUsize::new(0));
        let mut resp = response(TrackedBody::new(r#"{"a":"one"}"#, closes));
        let err = resp.decode_to::<Shape>().unwrap_err();
        assert!(matches!(err, ClientError::DecodeError(_)));
    }

    #[test]
    fn second_decode_reports_consumed() {
        let closes = Arc::new(AtomicUsize::new(0));
        let mut resp = response(TrackedBody::new(r#"{"a":1}"#, closes.clone()));
        resp.decode_to::<Shape>().unwrap();
        let err = resp.decode_to::<Shape>().unwrap_err();
        assert!(matches!(err, ClientError::BodyConsumed));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn release_failure_after_decode_is_returned() {
        let closes = Arc::new(AtomicUsize::new(0));
        let mut resp = response(TrackedBody::failing(r#"{"a":1}"#, closes.clone()));
        let err = resp.decode_to::<Shape>().unwrap_err();
        assert!(matches!(err, ClientError::BodyReleaseError(_)));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn decode_error_wins_over_release_failure() {
        let closes = Arc::new(AtomicUsize::new(0));
        let mut resp = response(TrackedBody::failing("not json", closes));
        let err = resp.decode_to::<Shape>().unwrap_err();
        assert!(matches!(err, ClientError::DecodeError(_)));
    }

    #[test]
    fn drop_releases_undecoded_body() {
        let closes = Arc::new(AtomicUsize::new(0));
        drop(response(TrackedBody::new(r#"{"a":1}"#, closes.clone())));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_after_decode_does_not_close_twice() {
        let closes = Arc::new(AtomicUsize::new(0));
        {
            let mut resp = response(TrackedBody::new(r#"{"a":1}"#, closes.clone()));
            let _ = resp.decode_to::<Shape>();
        }
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }
}
