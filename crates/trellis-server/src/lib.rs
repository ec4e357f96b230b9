//! # Trellis Server
//!
//! HTTP/1.1 transport for a sealed Trellis engine.
//!
//! - Hyper connection handling, one Tokio task per connection
//! - Bounded request body collection
//! - Handler chains run on the blocking pool with a per-request timeout
//! - Graceful shutdown with connection draining
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use trellis_core::Engine;
//! use trellis_server::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = Engine::new();
//!     engine.get("/", |ctx| ctx.string(http::StatusCode::OK, "Hello Trellis"))?;
//!
//!     let config = ServerConfig::builder().http_addr("127.0.0.1:9999").build();
//!     Server::new(config, Arc::new(engine.seal())).run().await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/trellis-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod server;
mod shutdown;

pub use config::{
    ServerConfig, ServerConfigBuilder, DEFAULT_HTTP_ADDR, DEFAULT_MAX_BODY_BYTES,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
pub use error::{ServerError, ServerResult};
pub use server::{HttpResponse, ResponseBody, Server};
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};
