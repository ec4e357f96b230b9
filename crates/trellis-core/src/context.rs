//! Per-request dispatch context.
//!
//! A [`Context`] owns the resolved handler chain for one request together
//! with a cursor into it. [`Context::next`] runs the remaining handlers in
//! order; because it is re-entrant, a middleware that calls `next()` gets
//! control back once every later handler has finished, which gives the
//! usual onion shape:
//!
//! ```text
//!   A-pre ─► B-pre ─► endpoint ─► B-post ─► A-post
//! ```
//!
//! [`Context::fail`] moves the cursor past the end of the chain, so
//! handlers that have not started yet are skipped while the ones already
//! on the stack still run their post-`next()` code.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{Method, Request, StatusCode};
use serde::Serialize;
use tracing::warn;
use trellis_router::Params;

use crate::handler::HandlerFunc;
use crate::response::ResponseWriter;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const TEXT_HTML: &str = "text/html; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";

/// Mutable state for one request as it moves through its handler chain.
pub struct Context<'a> {
    request: &'a Request<Bytes>,
    path: &'a str,
    writer: &'a mut dyn ResponseWriter,
    params: Params,
    handlers: Vec<HandlerFunc>,
    /// Number of handlers entered so far.
    index: usize,
    aborted: bool,
    started: Instant,
}

impl<'a> Context<'a> {
    /// Creates a context positioned before the first handler.
    ///
    /// [`Context::path`] reports the request URI's path as sent; use
    /// [`Context::with_path`] to supply a decoded one.
    pub fn new(
        request: &'a Request<Bytes>,
        writer: &'a mut dyn ResponseWriter,
        params: Params,
        handlers: Vec<HandlerFunc>,
    ) -> Self {
        Self {
            request,
            path: request.uri().path(),
            writer,
            params,
            handlers,
            index: 0,
            aborted: false,
            started: Instant::now(),
        }
    }

    /// Replaces the path reported by [`Context::path`].
    #[must_use]
    pub fn with_path(mut self, path: &'a str) -> Self {
        self.path = path;
        self
    }

    /// Runs every handler that has not been entered yet.
    ///
    /// Returns once the cursor reaches the end of the chain, either because
    /// all handlers ran or because one of them called [`Context::fail`].
    pub fn next(&mut self) {
        while self.index < self.handlers.len() {
            let handler = Arc::clone(&self.handlers[self.index]);
            self.index += 1;
            handler(self);
        }
    }

    /// Aborts the chain and writes `{"message": <message>}` with `status`.
    pub fn fail(&mut self, status: StatusCode, message: impl Into<String>) {
        self.index = self.handlers.len();
        self.aborted = true;
        let message: String = message.into();
        self.json(status, &serde_json::json!({ "message": message }));
    }

    /// Returns true once [`Context::fail`] has been called.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Returns the underlying request.
    pub fn request(&self) -> &'a Request<Bytes> {
        self.request
    }

    /// Returns the request method.
    pub fn method(&self) -> &'a Method {
        self.request.method()
    }

    /// Returns the request path, without the query string. Under
    /// [`SealedEngine::dispatch`](crate::SealedEngine::dispatch) this is the
    /// percent-decoded path the route was resolved against.
    pub fn path(&self) -> &'a str {
        self.path
    }

    /// Returns the value captured for a `:name` or `*name` segment.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key)
    }

    /// Returns all captured route parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Returns the first query-string value for `key`.
    pub fn query(&self, key: &str) -> Option<String> {
        let query = self.request.uri().query()?;
        first_value(serde_urlencoded::from_str(query).ok()?, key)
    }

    /// Returns the first value for `key` in a urlencoded request body.
    pub fn post_form(&self, key: &str) -> Option<String> {
        first_value(serde_urlencoded::from_bytes(self.request.body()).ok()?, key)
    }

    /// Returns a request header as text.
    pub fn header(&self, key: &str) -> Option<&'a str> {
        self.request.headers().get(key)?.to_str().ok()
    }

    /// Sets the response status.
    pub fn status(&mut self, status: StatusCode) {
        self.writer.write_status(status);
    }

    /// Returns the response status written so far.
    pub fn status_code(&self) -> Option<StatusCode> {
        self.writer.status()
    }

    /// Sets a response header. Invalid names or values are logged and
    /// skipped.
    pub fn set_header(&mut self, key: &str, value: &str) {
        match (HeaderName::from_bytes(key.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => self.writer.set_header(name, value),
            _ => warn!(header = key, "invalid response header, ignoring"),
        }
    }

    /// Writes a plain-text response.
    pub fn string(&mut self, status: StatusCode, body: impl AsRef<str>) {
        self.write(status, TEXT_PLAIN, body.as_ref().as_bytes());
    }

    /// Writes `value` as a JSON response. A value that fails to serialize
    /// produces a 500 with the serializer's message instead.
    pub fn json<T: Serialize + ?Sized>(&mut self, status: StatusCode, value: &T) {
        match serde_json::to_vec(value) {
            Ok(body) => self.write(status, APPLICATION_JSON, &body),
            Err(err) => {
                warn!(error = %err, "failed to serialize JSON response");
                self.write(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    TEXT_PLAIN,
                    err.to_string().as_bytes(),
                );
            }
        }
    }

    /// Writes raw bytes with the given status.
    pub fn data(&mut self, status: StatusCode, body: impl AsRef<[u8]>) {
        self.writer.write_status(status);
        self.writer.write_body(body.as_ref());
    }

    /// Writes an HTML response. The markup is sent as given.
    pub fn html(&mut self, status: StatusCode, markup: impl AsRef<str>) {
        self.write(status, TEXT_HTML, markup.as_ref().as_bytes());
    }

    /// Returns the time spent since the context was created.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn write(&mut self, status: StatusCode, content_type: &'static str, body: &[u8]) {
        self.writer
            .set_header(CONTENT_TYPE, HeaderValue::from_static(content_type));
        self.writer.write_status(status);
        self.writer.write_body(body);
    }
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("method", self.method())
            .field("path", &self.path())
            .field("params", &self.params)
            .field("handlers", &self.handlers.len())
            .field("index", &self.index)
            .field("aborted", &self.aborted)
            .finish_non_exhaustive()
    }
}

fn first_value(pairs: Vec<(String, String)>, key: &str) -> Option<String> {
    pairs.into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
}
