//! # Trellis
//!
//! **Trie-based HTTP routing with prefix-scoped middleware**
//!
//! - Route patterns with `:param` and `*wildcard` segments, one trie per method
//! - Route groups whose middleware applies to every path under their prefix
//! - A cursor-based [`Context`] where middleware calls `next()` to run the rest
//!   of the chain, or `fail()` to stop it
//! - Panic recovery and request logging middleware
//! - A hyper transport with graceful shutdown
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use trellis::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = trellis::default_engine();
//!     engine.get("/hello/:name", |ctx| {
//!         let name = ctx.param("name").unwrap_or_default().to_string();
//!         ctx.string(StatusCode::OK, format!("hello {name}"));
//!     })?;
//!
//!     Server::new(ServerConfig::default(), Arc::new(engine.seal()))
//!         .run()
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Dispatch
//!
//! ```text
//! request → [middleware of every group whose prefix starts the path] → handler
//!                       (creation order)                     ↑
//!                                       404 handler when no route matches
//! ```

#![doc(html_root_url = "https://docs.rs/trellis/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use trellis_config as config;
pub use trellis_core as core;
pub use trellis_middleware as middleware;
pub use trellis_router as router;
pub use trellis_server as server;
pub use trellis_telemetry as telemetry;

pub use trellis_core::{
    handler_fn, BufferedResponse, Context, Engine, Group, GroupId, HandlerFunc, Resolution,
    ResponseWriter, RouteError, RouteResult, SealedEngine,
};

/// Creates an engine with [`Logger`](middleware::Logger) and
/// [`Recovery`](middleware::Recovery) installed on the root group.
///
/// ```rust
/// let engine = trellis::default_engine().seal();
/// assert!(engine.router().is_empty());
/// ```
#[must_use]
pub fn default_engine() -> Engine {
    let mut engine = Engine::new();
    engine
        .use_middleware(trellis_middleware::logger())
        .use_middleware(trellis_middleware::recovery());
    engine
}

/// Common imports.
///
/// ```rust
/// use trellis::prelude::*;
///
/// let mut engine = Engine::new();
/// engine.get("/", |ctx| ctx.string(StatusCode::OK, "ok")).unwrap();
/// ```
pub mod prelude {
    pub use trellis_config::{ConfigLoader, TrellisConfig};
    pub use trellis_core::{Context, Engine, Group, RouteError, RouteResult, SealedEngine};
    pub use trellis_middleware::{logger, recovery, Logger, Recovery};
    pub use trellis_router::{Params, Pattern};
    pub use trellis_server::{Server, ServerConfig, ShutdownSignal};
    pub use trellis_telemetry::{init_logging, LogConfig};

    pub use trellis_core::http::{Method, StatusCode};
}
