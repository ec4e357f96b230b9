//! Transport settings.
//!
//! ```rust
//! use std::time::Duration;
//! use trellis_server::ServerConfig;
//!
//! let config = ServerConfig::builder()
//!     .http_addr("127.0.0.1:9999")
//!     .request_timeout(Duration::from_secs(5))
//!     .build();
//!
//! assert_eq!(config.http_addr(), "127.0.0.1:9999");
//! ```

use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

/// Where the server listens unless told otherwise.
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:9999";

/// Seconds open connections get to finish once shutdown starts.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Seconds allowed for reading a body, and again for running the chain.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Bodies above 2 MiB are refused with 413.
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Settings for [`Server`](crate::Server).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    http_addr: String,
    shutdown_timeout: Duration,
    request_timeout: Duration,
    max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_owned(),
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Starts from the defaults.
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// The address string as given.
    #[must_use]
    pub fn http_addr(&self) -> &str {
        &self.http_addr
    }

    /// The address as a socket address.
    ///
    /// # Errors
    ///
    /// Fails unless the address has the form `ip:port`; host names are not
    /// resolved.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.http_addr.parse()
    }

    /// Drain window after shutdown fires.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// Applies separately to reading the body and to the handler chain.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Largest body accepted, in bytes.
    #[must_use]
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }
}

/// Chained setters over a [`ServerConfig`].
#[derive(Debug, Clone, Default)]
pub struct ServerConfigBuilder {
    inner: ServerConfig,
}

impl ServerConfigBuilder {
    /// Same as [`ServerConfig::builder`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen address, e.g. `"127.0.0.1:9999"`. Port `0` picks a free port.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.inner.http_addr = addr.into();
        self
    }

    /// Drain window after shutdown fires.
    #[must_use]
    pub fn shutdown_timeout(mut self, grace: Duration) -> Self {
        self.inner.shutdown_timeout = grace;
        self
    }

    /// Per-request time limit.
    #[must_use]
    pub fn request_timeout(mut self, limit: Duration) -> Self {
        self.inner.request_timeout = limit;
        self
    }

    /// Body size limit in bytes.
    #[must_use]
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.inner.max_body_bytes = limit;
        self
    }

    /// Finishes the configuration.
    #[must_use]
    pub fn build(self) -> ServerConfig {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr(), "0.0.0.0:9999");
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(30));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_body_bytes(), 2 * 1024 * 1024);
        assert_eq!(ServerConfig::builder().build(), config);
    }

    #[test]
    fn test_every_setter_applies() {
        let config = ServerConfigBuilder::new()
            .http_addr("127.0.0.1:3000")
            .shutdown_timeout(Duration::from_secs(5))
            .request_timeout(Duration::from_millis(250))
            .max_body_bytes(1024)
            .build();

        assert_eq!(config.http_addr(), "127.0.0.1:3000");
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(5));
        assert_eq!(config.request_timeout(), Duration::from_millis(250));
        assert_eq!(config.max_body_bytes(), 1024);
    }

    #[test]
    fn test_loopback_addr_parses() {
        let addr = ServerConfig::builder()
            .http_addr("127.0.0.1:9999")
            .build()
            .socket_addr()
            .unwrap();
        assert_eq!(addr, SocketAddr::from(([127, 0, 0, 1], 9999)));
    }

    #[test]
    fn test_addr_without_host_rejected() {
        for bad in [":9999", "localhost:9999", "127.0.0.1"] {
            let config = ServerConfig::builder().http_addr(bad).build();
            assert!(config.socket_addr().is_err(), "{bad} should not parse");
        }
    }
}
