//! Errors raised while assembling a [`TrellisConfig`](crate::TrellisConfig).

use std::path::PathBuf;
use thiserror::Error;

/// Why a configuration could not be loaded or was rejected.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required file does not exist.
    #[error("no config file at {path}")]
    Missing {
        /// Where the loader looked.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("could not read config file {path}")]
    Unreadable {
        /// The file that failed.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML, or a key the schema does not know.
    #[error("bad TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON, or a key the schema does not know.
    #[error("bad JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// Only `toml` and `json` are understood.
    #[error("config format '{0}' is not supported")]
    UnknownFormat(String),

    /// A value parsed but makes no sense, such as a zero shutdown timeout.
    #[error("{field} is invalid: {reason}")]
    Invalid {
        /// Dotted path of the offending key, e.g. `server.http_addr`.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An override variable was malformed or held a value of the wrong type.
    #[error("environment override {var} rejected: {reason}")]
    BadEnvVar {
        /// Full variable name including the prefix.
        var: String,
        /// Why the value was refused.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn missing(path: impl Into<PathBuf>) -> Self {
        Self::Missing { path: path.into() }
    }

    pub(crate) fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    /// Rejects `field` with a human-readable `reason`.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn bad_env(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BadEnvVar {
            var: var.into(),
            reason: reason.into(),
        }
    }
}

/// Shorthand for results in this crate.
pub type ConfigResult<T> = Result<T, ConfigError>;
