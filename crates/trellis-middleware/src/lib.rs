//! Standard middleware for Trellis engines.
//!
//! - [`Logger`] - one `info` event per request with status and latency
//! - [`Recovery`] - turns a panic anywhere later in the chain into a 500
//!
//! Both are plain handlers: they call `Context::next` to run the rest of
//! the chain and act on the result.
//!
//! ```rust
//! use trellis_core::Engine;
//! use trellis_middleware::{logger, recovery};
//!
//! let mut engine = Engine::new();
//! engine.use_middleware(logger()).use_middleware(recovery());
//! ```

#![doc(html_root_url = "https://docs.rs/trellis-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod logger;
pub mod recovery;

pub use logger::{logger, Logger};
pub use recovery::{recovery, Recovery};
