//! Handler type shared by middleware and route endpoints.
//!
//! Middleware and endpoints are the same kind of callable: both receive the
//! per-request [`Context`]. A middleware wraps the rest of the chain by
//! calling [`Context::next`]; an endpoint simply writes a response.

use std::sync::Arc;

use crate::context::Context;

/// A shareable callable unit of a dispatch chain.
pub type HandlerFunc = Arc<dyn Fn(&mut Context<'_>) + Send + Sync>;

/// Wraps a closure or function as a [`HandlerFunc`].
///
/// ```rust
/// use http::StatusCode;
/// use trellis_core::{handler_fn, HandlerFunc};
///
/// let hello: HandlerFunc = handler_fn(|ctx| ctx.string(StatusCode::OK, "hello"));
/// # let _ = hello;
/// ```
pub fn handler_fn<F>(f: F) -> HandlerFunc
where
    F: Fn(&mut Context<'_>) + Send + Sync + 'static,
{
    Arc::new(f)
}
