//! Logging setup for Trellis services.
//!
//! [`init_logging`] installs a `tracing-subscriber` registry with either a
//! JSON or a pretty formatting layer behind an `EnvFilter`.

#![doc(html_root_url = "https://docs.rs/trellis-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type alias using [`TelemetryError`].
pub type TelemetryResult<T> = Result<T, TelemetryError>;
