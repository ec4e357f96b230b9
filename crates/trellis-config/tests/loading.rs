//! File and environment layering against real files.

use std::io::Write;

use tempfile::NamedTempFile;
use trellis_config::{ConfigError, ConfigLoader, LogFormat, TrellisConfig};

fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_toml_file() {
    let file = temp_file(
        ".toml",
        r#"
        [server]
        http_addr = "127.0.0.1:8181"
        request_timeout_ms = 500

        [logging]
        level = "trellis_core=debug,info"
        "#,
    );

    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
    assert_eq!(config.server.http_addr, "127.0.0.1:8181");
    assert_eq!(config.server.request_timeout_ms, 500);
    assert_eq!(config.logging.level, "trellis_core=debug,info");
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_json_file() {
    let file = temp_file(".json", r#"{"logging": {"format": "pretty"}}"#);

    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert_eq!(config.server, TrellisConfig::default().server);
}

#[test]
fn test_unknown_field_in_file() {
    let file = temp_file(".toml", "[server]\nport = 80\n");

    let err = ConfigLoader::new().with_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn test_unsupported_extension() {
    let file = temp_file(".yaml", "server: {}\n");

    let err = ConfigLoader::new().with_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownFormat(_)));
}

#[test]
fn test_file_replaces_preset() {
    let file = temp_file(".toml", "[logging]\nlevel = \"warn\"\n");

    let config = ConfigLoader::new()
        .with_development()
        .with_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_env_overrides_file() {
    let file = temp_file(".toml", "[server]\nhttp_addr = \"127.0.0.1:8181\"\n");
    std::env::set_var("TRELLISLOADTEST__SERVER__HTTP_ADDR", "127.0.0.1:8282");

    let config = ConfigLoader::new()
        .with_file(file.path())
        .unwrap()
        .with_env_prefix("trellisloadtest")
        .load();

    std::env::remove_var("TRELLISLOADTEST__SERVER__HTTP_ADDR");
    assert_eq!(config.unwrap().server.http_addr, "127.0.0.1:8282");
}
