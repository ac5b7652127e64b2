// Integration tests for loading configuration from disk

use skytrack::config::{load_config, ConfigError};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[server]
address = "0.0.0.0"
ingest_port = 45000

[simulator]
enabled = true
transmitter_count = 2
"#
    )
    .unwrap();

    let config = load_config(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.server.address, "0.0.0.0");
    assert_eq!(config.server.ingest_port, 45000);
    assert_eq!(config.server.relay_port, 60000);
    assert!(config.simulator.enabled);
    assert_eq!(config.simulator.transmitter_count, 2);
    assert_eq!(config.status.interval_seconds, 5);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let result = load_config(path.to_str().unwrap());
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_malformed_file_is_parse_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[server]\ningest_port = \"many\"").unwrap();

    let result = load_config(file.path().to_str().unwrap());
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}
