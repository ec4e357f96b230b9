//! Typed configuration for Trellis servers.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict parsing (unknown fields are errors)
//! - Layered loading (defaults → file → env)
//!
//! # Example
//!
//! ```no_run
//! use trellis_config::ConfigLoader;
//!
//! # fn main() -> Result<(), trellis_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("trellis.toml")?
//!     .with_env_prefix("TRELLIS")
//!     .load()?;
//!
//! let server_config = config.server.to_server_config();
//! let log_config = config.logging.to_log_config();
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:9999"
//! shutdown_timeout_secs = 30
//! request_timeout_ms = 30000
//! max_body_bytes = 2097152
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! service_name = "hello"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Variables are named `PREFIX__SECTION__KEY`, for example:
//!
//! - `TRELLIS__SERVER__HTTP_ADDR=127.0.0.1:8080`
//! - `TRELLIS__LOGGING__LEVEL=debug`
//! - `TRELLIS__LOGGING__FORMAT=pretty`

#![doc(html_root_url = "https://docs.rs/trellis-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{TrellisConfig, TrellisConfigBuilder};
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use schema::{LogFormat, LoggingSection, ServerSection};
