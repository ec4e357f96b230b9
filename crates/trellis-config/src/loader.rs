//! Layered configuration loading.

use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, LogFormat, TrellisConfig};

/// Loads a [`TrellisConfig`] in layers, later layers overriding earlier ones:
///
/// 1. Built-in defaults (or a preset)
/// 2. A configuration file, TOML or JSON by extension
/// 3. Environment variables named `PREFIX__SECTION__KEY`
///
/// ```no_run
/// use trellis_config::ConfigLoader;
///
/// # fn main() -> Result<(), trellis_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_optional_file("trellis.toml")?
///     .with_env_prefix("TRELLIS")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: TrellisConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: TrellisConfig::default(),
            env_prefix: None,
        }
    }

    /// Start from the default configuration.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = TrellisConfig::default();
        self
    }

    /// Start from the development preset.
    ///
    /// ```
    /// use trellis_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = TrellisConfig::development();
        self
    }

    /// Start from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = TrellisConfig::production();
        self
    }

    /// Load a configuration file. The format follows the extension
    /// (`.toml` or `.json`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, has an
    /// unsupported extension, or does not parse (unknown fields included).
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::missing(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::unreadable(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the named format
    /// (`"toml"` or `"json"`).
    ///
    /// ```
    /// use trellis_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[server]\nhttp_addr = \"127.0.0.1:3000\"", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.server.http_addr, "127.0.0.1:3000");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the format is unknown or parsing fails.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            other => return Err(ConfigError::UnknownFormat(other.to_string())),
        };
        Ok(self)
    }

    /// Read overrides from variables named `PREFIX__SECTION__KEY` when
    /// [`load`](Self::load) runs.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Applies environment overrides, validates, and returns the result.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override does not parse or validation
    /// fails.
    pub fn load(mut self) -> Result<TrellisConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_vars(&prefix, env::vars())?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Returns the configuration without env overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> TrellisConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<TrellisConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::UnknownFormat(path.display().to_string())),
        }
    }

    fn apply_env_vars<I>(&mut self, prefix: &str, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let marker = format!("{prefix}__");
        for (key, value) in vars {
            if let Some(rest) = key.strip_prefix(&marker) {
                self.apply_override(&key, rest, &value)?;
            }
        }
        Ok(())
    }

    /// `path` is the variable name with `PREFIX__` removed, e.g.
    /// `SERVER__HTTP_ADDR`.
    fn apply_override(&mut self, var: &str, path: &str, value: &str) -> Result<(), ConfigError> {
        let Some((section, field)) = path.split_once("__") else {
            return Err(ConfigError::bad_env(var, "expected SECTION__KEY after the prefix"));
        };

        let server = &mut self.config.server;
        let logging = &mut self.config.logging;
        match (section, field) {
            ("SERVER", "HTTP_ADDR") => server.http_addr = value.to_string(),
            ("SERVER", "SHUTDOWN_TIMEOUT_SECS") => {
                server.shutdown_timeout_secs = number(var, value)?;
            }
            ("SERVER", "REQUEST_TIMEOUT_MS") => server.request_timeout_ms = number(var, value)?,
            ("SERVER", "MAX_BODY_BYTES") => server.max_body_bytes = number(var, value)?,
            ("LOGGING", "ENABLED") => logging.enabled = flag(var, value)?,
            ("LOGGING", "LEVEL") => logging.level = value.to_string(),
            ("LOGGING", "FORMAT") => {
                logging.format = value
                    .parse::<LogFormat>()
                    .map_err(|reason| ConfigError::bad_env(var, reason))?;
            }
            ("LOGGING", "INCLUDE_LOCATION") => logging.include_location = flag(var, value)?,
            ("LOGGING", "THREAD_IDS") => logging.thread_ids = flag(var, value)?,
            ("LOGGING", "SERVICE_NAME") => logging.service_name = value.to_string(),
            _ => tracing::debug!(var, "ignoring unrecognized config override"),
        }
        Ok(())
    }
}

fn number<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::bad_env(var, format!("'{value}' is not a number")))
}

fn flag(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::bad_env(
            var,
            format!("'{value}' is not a boolean"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config.server.http_addr, "0.0.0.0:9999");
    }

    #[test]
    fn test_loader_with_production() {
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"server": {"http_addr": "127.0.0.1:3000"}}"#;
        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config.server.http_addr, "127.0.0.1:3000");
    }

    #[test]
    fn test_loader_with_string_unknown_format() {
        let err = ConfigLoader::new().with_string("", "yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownFormat(f) if f == "yaml"));
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let err = ConfigLoader::new()
            .with_file("/nonexistent/trellis.toml")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing { .. }));
    }

    #[test]
    fn test_loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/trellis.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config, TrellisConfig::default());
    }

    #[test]
    fn test_load_validates() {
        let err = ConfigLoader::new()
            .with_string(r#"{"server": {"http_addr": "nowhere"}}"#, "json")
            .unwrap()
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_load_unvalidated() {
        let config = ConfigLoader::new()
            .with_string(r#"{"server": {"http_addr": "nowhere"}}"#, "json")
            .unwrap()
            .load_unvalidated();
        assert_eq!(config.server.http_addr, "nowhere");
    }

    #[test]
    fn test_apply_env_vars() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_vars(
                "TEST",
                vars(&[
                    ("TEST__SERVER__HTTP_ADDR", "127.0.0.1:7000"),
                    ("TEST__SERVER__MAX_BODY_BYTES", "4096"),
                    ("TEST__LOGGING__FORMAT", "pretty"),
                    ("TEST__LOGGING__THREAD_IDS", "yes"),
                    ("TESTING__SERVER__HTTP_ADDR", "ignored"),
                    ("OTHER__SERVER__HTTP_ADDR", "ignored"),
                ]),
            )
            .unwrap();

        assert_eq!(loader.config.server.http_addr, "127.0.0.1:7000");
        assert_eq!(loader.config.server.max_body_bytes, 4096);
        assert_eq!(loader.config.logging.format, LogFormat::Pretty);
        assert!(loader.config.logging.thread_ids);
    }

    #[test]
    fn test_override_bad_number() {
        let mut loader = ConfigLoader::new();
        let err = loader
            .apply_env_vars("TEST", vars(&[("TEST__SERVER__SHUTDOWN_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("'soon' is not a number"));
    }

    #[test]
    fn test_override_bad_format() {
        let mut loader = ConfigLoader::new();
        let err = loader
            .apply_env_vars("TEST", vars(&[("TEST__LOGGING__FORMAT", "xml")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::BadEnvVar { .. }));
    }

    #[test]
    fn test_override_unknown_key_ignored() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_vars("TEST", vars(&[("TEST__SERVER__WORKERS", "8")]))
            .unwrap();
        assert_eq!(loader.config, TrellisConfig::default());
    }

    #[test]
    fn test_override_without_field_rejected() {
        let mut loader = ConfigLoader::new();
        let err = loader
            .apply_env_vars("TEST", vars(&[("TEST__SERVER", "x")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::BadEnvVar { .. }));
    }

    #[test]
    fn test_flag_spellings() {
        assert!(flag("V", "True").unwrap());
        assert!(flag("V", "on").unwrap());
        assert!(!flag("V", "0").unwrap());
        assert!(!flag("V", "off").unwrap());
        assert!(flag("V", "maybe").is_err());
        assert!(flag("V", "").is_err());
    }
}
