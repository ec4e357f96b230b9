//! Global `tracing` subscriber setup.
//!
//! ```rust,ignore
//! use trellis_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development().with_service_name("hello"))?;
//! tracing::info!(path = "/", "ready");
//! ```

use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// How the subscriber formats and filters events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// When false, [`init_logging`] installs nothing.
    pub enabled: bool,
    /// `EnvFilter` directive, e.g. `info` or `trellis_core=debug,info`.
    pub level: String,
    /// One JSON object per line; otherwise multi-line pretty output.
    pub json_format: bool,
    /// Adds source file and line to each event.
    pub file_line_info: bool,
    /// Adds the emitting thread's id.
    pub thread_ids: bool,
    /// Adds the module path of the event.
    pub include_target: bool,
    /// Logged once, as `service`, when the subscriber comes up.
    pub service_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// Pretty `debug` output with locations, for a terminal.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".into(),
            json_format: false,
            file_line_info: true,
            ..Self::production()
        }
    }

    /// JSON at `info`.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".into(),
            json_format: true,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
            service_name: "trellis".into(),
        }
    }

    /// Replaces the service name.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Replaces the filter directive.
    #[must_use]
    pub fn with_level(mut self, directive: impl Into<String>) -> Self {
        self.level = directive.into();
        self
    }

    fn format_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let base = fmt::layer()
            .with_file(self.file_line_info)
            .with_line_number(self.file_line_info)
            .with_thread_ids(self.thread_ids)
            .with_target(self.include_target);
        if self.json_format {
            base.json().boxed()
        } else {
            base.pretty().boxed()
        }
    }
}

/// Installs the process-wide subscriber described by `config`.
///
/// # Errors
///
/// [`TelemetryError::InvalidFilter`] if `config.level` does not parse, and
/// [`TelemetryError::LoggingInit`] if another subscriber was installed first.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;
    tracing_subscriber::registry()
        .with(config.format_layer().with_filter(filter))
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::info!(service = %config.service_name, filter = %config.level, "logging ready");
    Ok(())
}

/// Parses an `EnvFilter` directive.
///
/// # Errors
///
/// [`TelemetryError::InvalidFilter`] carrying the parser's message.
pub fn create_env_filter(directive: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(directive).map_err(|e| TelemetryError::InvalidFilter {
        directive: directive.to_owned(),
        reason: e.to_string(),
    })
}
