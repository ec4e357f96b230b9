//! The sections of a config file.
//!
//! Both sections default field by field, so a file only names what it
//! changes. Misspelled keys are errors rather than silently ignored.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use trellis_server::{
    ServerConfig, DEFAULT_HTTP_ADDR, DEFAULT_MAX_BODY_BYTES, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
use trellis_telemetry::LogConfig;

/// `[server]`: where to listen and how long to wait.
///
/// ```
/// use trellis_config::ServerSection;
///
/// let section = ServerSection {
///     http_addr: "127.0.0.1:9999".to_string(),
///     ..Default::default()
/// };
/// assert_eq!(section.to_server_config().http_addr(), "127.0.0.1:9999");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    /// `ip:port` to bind.
    pub http_addr: String,
    /// Drain window after a stop signal, in seconds.
    pub shutdown_timeout_secs: u64,
    /// Limit for reading a body and for running the chain, in milliseconds.
    pub request_timeout_ms: u64,
    /// Bodies above this many bytes get 413.
    pub max_body_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_owned(),
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_SECS * 1000,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerSection {
    /// The equivalent [`ServerConfig`].
    #[must_use]
    pub fn to_server_config(&self) -> ServerConfig {
        ServerConfig::builder()
            .http_addr(self.http_addr.as_str())
            .shutdown_timeout(Duration::from_secs(self.shutdown_timeout_secs))
            .request_timeout(Duration::from_millis(self.request_timeout_ms))
            .max_body_bytes(self.max_body_bytes)
            .build()
    }
}

impl From<&ServerSection> for ServerConfig {
    fn from(section: &ServerSection) -> Self {
        section.to_server_config()
    }
}

/// `format = "json" | "pretty"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Multi-line, colored, for terminals.
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        if name.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else if name.eq_ignore_ascii_case("pretty") {
            Ok(Self::Pretty)
        } else {
            Err(format!("'{name}' is not a log format (json, pretty)"))
        }
    }
}

/// `[logging]`: subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    /// Set to false to leave logging to the embedding application.
    pub enabled: bool,
    /// `EnvFilter` directive such as `info` or `trellis_core=debug,warn`.
    pub level: String,
    /// Output shape.
    pub format: LogFormat,
    /// Source file and line on each event.
    pub include_location: bool,
    /// Thread id on each event.
    pub thread_ids: bool,
    /// Name logged when the subscriber starts.
    pub service_name: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_owned(),
            format: LogFormat::Json,
            include_location: false,
            thread_ids: false,
            service_name: "trellis".to_owned(),
        }
    }
}

impl LoggingSection {
    /// The equivalent [`LogConfig`]. Event targets are always included.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            json_format: matches!(self.format, LogFormat::Json),
            file_line_info: self.include_location,
            thread_ids: self.thread_ids,
            include_target: true,
            service_name: self.service_name.clone(),
        }
    }
}

impl From<&LoggingSection> for LogConfig {
    fn from(section: &LoggingSection) -> Self {
        section.to_log_config()
    }
}
