use crate::config::{Config, ConfigError};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serial_test::serial;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn test_config_defaults() {
    let config = Config::from_lookup(lookup_from(&[])).unwrap();

    assert_eq!(config.port, 4100);
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.cors_origin, "http://localhost:5173");
    assert_eq!(config.db_max_connections, 10);
    assert_eq!(config.db_busy_timeout_secs, 30);
    assert!(config.database_path.ends_with("reqhub.db"));
}

#[test]
fn test_config_with_all_custom() {
    let config = Config::from_lookup(lookup_from(&[
        ("REQHUB_API_PORT", "3000"),
        ("REQHUB_API_HOST", "0.0.0.0"),
        ("REQHUB_CORS_ORIGIN", "https://app.example.com"),
        ("REQHUB_DATABASE_PATH", "/var/lib/reqhub/data.db"),
        ("REQHUB_DB_MAX_CONNECTIONS", "4"),
        ("REQHUB_DB_BUSY_TIMEOUT_SECS", "5"),
    ]))
    .unwrap();

    assert_eq!(config.port, 3000);
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.cors_origin, "https://app.example.com");
    assert_eq!(config.database_path, PathBuf::from("/var/lib/reqhub/data.db"));

    let storage = config.storage_config();
    assert_eq!(storage.max_connections, 4);
    assert_eq!(storage.busy_timeout_seconds, 5);
}

#[rstest]
#[case(&[("PORT", "8080")], 8080)]
#[case(&[("REQHUB_API_PORT", "9000"), ("PORT", "8080")], 9000)]
fn test_port_precedence(#[case] vars: &[(&str, &str)], #[case] expected: u16) {
    let config = Config::from_lookup(lookup_from(vars)).unwrap();
    assert_eq!(config.port, expected);
}

#[test]
fn test_config_invalid_port() {
    let result = Config::from_lookup(lookup_from(&[("REQHUB_API_PORT", "not-a-number")]));
    assert!(matches!(result.unwrap_err(), ConfigError::InvalidPort(_)));
}

#[test]
fn test_config_port_zero() {
    let result = Config::from_lookup(lookup_from(&[("PORT", "0")]));
    assert!(matches!(result.unwrap_err(), ConfigError::PortOutOfRange(0)));
}

#[rstest]
#[case("REQHUB_DB_MAX_CONNECTIONS", "zero")]
#[case("REQHUB_DB_MAX_CONNECTIONS", "0")]
#[case("REQHUB_DB_BUSY_TIMEOUT_SECS", "-1")]
fn test_config_invalid_numbers(#[case] name: &str, #[case] value: &str) {
    let result = Config::from_lookup(lookup_from(&[(name, value)]));
    assert!(matches!(
        result.unwrap_err(),
        ConfigError::InvalidNumber { .. }
    ));
}

#[test]
#[serial]
fn test_config_reads_process_environment() {
    env::set_var("REQHUB_API_PORT", "4321");
    env::set_var("REQHUB_CORS_ORIGIN", "https://example.com");

    let config = Config::from_env().unwrap();

    assert_eq!(config.port, 4321);
    assert_eq!(config.cors_origin, "https://example.com");

    env::remove_var("REQHUB_API_PORT");
    env::remove_var("REQHUB_CORS_ORIGIN");
}
