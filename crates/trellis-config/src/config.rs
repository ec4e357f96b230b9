//! [`TrellisConfig`], its presets and its builder.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, LoggingSection, ServerSection};

/// Complete Trellis server configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// ```
/// use trellis_config::TrellisConfig;
///
/// let config = TrellisConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:9999");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct TrellisConfig {
    /// Transport settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl TrellisConfig {
    /// Assembles a configuration section by section.
    #[must_use]
    pub fn builder() -> TrellisConfigBuilder {
        TrellisConfigBuilder::new()
    }

    /// Checks values serde cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - the server address is not a socket address
    /// - the shutdown timeout is zero
    /// - the log level is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Err(e) = self.server.to_server_config().socket_addr() {
            return Err(ConfigError::invalid(
                "server.http_addr",
                format!("'{}' is not ip:port ({e})", self.server.http_addr),
            ));
        }

        if self.server.shutdown_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "server.shutdown_timeout_secs",
                "must be greater than zero",
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid(
                "logging.level",
                "must not be empty",
            ));
        }

        Ok(())
    }

    /// Local development preset: pretty `debug` output with source locations.
    ///
    /// ```
    /// use trellis_config::TrellisConfig;
    ///
    /// let config = TrellisConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        Self {
            server: ServerSection {
                http_addr: "127.0.0.1:9999".into(),
                shutdown_timeout_secs: 5,
                ..ServerSection::default()
            },
            logging: LoggingSection {
                level: "debug".into(),
                format: LogFormat::Pretty,
                include_location: true,
                ..LoggingSection::default()
            },
        }
    }

    /// Production preset: JSON `info` output.
    #[must_use]
    pub fn production() -> Self {
        Self {
            server: ServerSection::default(),
            logging: LoggingSection {
                level: "info".into(),
                format: LogFormat::Json,
                include_location: false,
                ..LoggingSection::default()
            },
        }
    }
}

/// Builder for [`TrellisConfig`].
#[derive(Debug, Default)]
pub struct TrellisConfigBuilder {
    server: Option<ServerSection>,
    logging: Option<LoggingSection>,
}

impl TrellisConfigBuilder {
    /// No sections set yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces `[server]`.
    #[must_use]
    pub fn server(mut self, server: ServerSection) -> Self {
        self.server = Some(server);
        self
    }

    /// Replaces `[logging]`.
    #[must_use]
    pub fn logging(mut self, logging: LoggingSection) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Sections never set take their defaults.
    #[must_use]
    pub fn build(self) -> TrellisConfig {
        let Self { server, logging } = self;
        TrellisConfig {
            server: server.unwrap_or_default(),
            logging: logging.unwrap_or_default(),
        }
    }

    /// [`build`](Self::build) followed by [`TrellisConfig::validate`].
    ///
    /// # Errors
    ///
    /// Whatever `validate` reports.
    pub fn build_validated(self) -> Result<TrellisConfig, ConfigError> {
        let built = self.build();
        built.validate().map(|()| built)
    }
}
