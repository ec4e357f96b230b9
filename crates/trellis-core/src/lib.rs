//! # Trellis Core
//!
//! Route registration and middleware dispatch for Trellis.
//!
//! - [`Engine`] - mutable route table with a root [`Group`]
//! - [`Group`] - path prefix with its own middleware
//! - [`SealedEngine`] - immutable engine that resolves and dispatches requests
//! - [`Context`] - per-request state with [`Context::next`] and [`Context::fail`]
//! - [`ResponseWriter`] / [`BufferedResponse`] - response sink
//!
//! # Example
//!
//! ```rust
//! use bytes::Bytes;
//! use http::{Request, StatusCode};
//! use trellis_core::{BufferedResponse, Engine};
//!
//! let mut engine = Engine::new();
//! engine.use_middleware(|ctx| {
//!     ctx.set_header("x-powered-by", "trellis");
//!     ctx.next();
//! });
//! engine.get("/hello/:name", |ctx| {
//!     let body = format!("hello {}", ctx.param("name").unwrap_or_default());
//!     ctx.string(StatusCode::OK, body);
//! })?;
//! let engine = engine.seal();
//!
//! let request = Request::get("/hello/world").body(Bytes::new()).unwrap();
//! let mut response = BufferedResponse::new();
//! engine.dispatch(&request, &mut response);
//!
//! assert_eq!(response.body_text(), "hello world");
//! # Ok::<(), trellis_core::RouteError>(())
//! ```

#![doc(html_root_url = "https://docs.rs/trellis-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod engine;
mod error;
mod group;
mod handler;
mod response;

pub use context::Context;
pub use engine::{Engine, Resolution, SealedEngine};
pub use error::{RouteError, RouteResult};
pub use group::{Group, GroupId};
pub use handler::{handler_fn, HandlerFunc};
pub use response::{BufferedResponse, ResponseWriter};

// Handlers name `StatusCode`, `Method` and `Request` from this crate's http version.
pub use http;
