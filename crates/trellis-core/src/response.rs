//! Response sink abstraction.
//!
//! The dispatch context never talks to a socket. It writes through the
//! [`ResponseWriter`] trait, and [`BufferedResponse`] collects everything in
//! memory so a transport can turn it into an `http::Response`.

use bytes::{Bytes, BytesMut};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Response, StatusCode};
use http_body_util::Full;
use tracing::warn;

/// Destination for the status, headers and body of one response.
pub trait ResponseWriter {
    /// Sets the response status.
    fn write_status(&mut self, status: StatusCode);

    /// Sets a response header, replacing any previous value.
    fn set_header(&mut self, name: HeaderName, value: HeaderValue);

    /// Appends bytes to the body.
    fn write_body(&mut self, chunk: &[u8]);

    /// Returns the status written so far, if any.
    fn status(&self) -> Option<StatusCode>;
}

/// In-memory [`ResponseWriter`].
///
/// Behaves like a streaming response would: the first status written wins,
/// writing body bytes commits the status (200 if none was set), and
/// headers set after the body has started are dropped.
///
/// ```rust
/// use http::StatusCode;
/// use trellis_core::{BufferedResponse, ResponseWriter};
///
/// let mut response = BufferedResponse::new();
/// response.write_status(StatusCode::CREATED);
/// response.write_status(StatusCode::INTERNAL_SERVER_ERROR);
/// response.write_body(b"done");
///
/// assert_eq!(response.status(), Some(StatusCode::CREATED));
/// assert_eq!(response.body(), b"done");
/// ```
#[derive(Debug, Clone, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
    body_started: bool,
}

impl BufferedResponse {
    /// Creates an empty response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collected headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the collected body.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Converts into an `http::Response`. A response nothing was written to
    /// becomes an empty 200.
    #[must_use]
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(self.body.freeze()));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseWriter for BufferedResponse {
    fn write_status(&mut self, status: StatusCode) {
        match self.status {
            None => self.status = Some(status),
            Some(current) if current != status => {
                warn!(
                    current = current.as_u16(),
                    ignored = status.as_u16(),
                    "response status already written"
                );
            }
            Some(_) => {}
        }
    }

    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        if self.body_started {
            warn!(header = %name, "header set after body was written, ignoring");
            return;
        }
        self.headers.insert(name, value);
    }

    fn write_body(&mut self, chunk: &[u8]) {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body_started = true;
        self.body.extend_from_slice(chunk);
    }

    fn status(&self) -> Option<StatusCode> {
        self.status
    }
}
