use std::time::Duration;

use folio_ui::{ClientConfig, ConfigError};

#[test]
fn test_defaults() {
    let config = ClientConfig::from_toml_str("").expect("Parse error");
    assert_eq!(config, ClientConfig::default());
    assert_eq!(config.base_url, "http://localhost:8080");
    assert_eq!(config.radix_point, ',');
    assert_eq!(config.timeout(), Duration::from_secs(30));
}

#[test]
fn test_partial_file() {
    let config = ClientConfig::from_toml_str(
        r#"
        base_url = "https://erp.example.com/api"
        radix_point = "."
        "#,
    )
    .expect("Parse error");
    assert_eq!(config.base_url, "https://erp.example.com/api");
    assert_eq!(config.radix_point, '.');
    assert_eq!(config.log_level, "info");
}

#[test]
fn test_invalid_file() {
    let result = ClientConfig::from_toml_str("timeout_secs = \"soon\"");
    assert!(matches!(result, Err(ConfigError::Toml(_))));
}

#[test]
fn test_missing_file() {
    let result = ClientConfig::load("tests/fixtures/missing.toml");
    assert!(matches!(result, Err(ConfigError::Io(_))));
}
