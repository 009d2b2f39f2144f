//! Unit tests for config.rs module

use std::fs;

use chat_memory_rust::config::AppConfig;
use chat_memory_rust::parser::DEFAULT_MEDIA_PLACEHOLDERS;
use chat_memory_rust::timestamp::DateOrder;
use tempfile::TempDir;

#[test]
fn test_default_logging_config() {
    let config = AppConfig::default();

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.file_path, None);
    assert_eq!(config.logging.format, "text");
}

#[test]
fn test_default_parser_config() {
    let config = AppConfig::default();

    assert_eq!(config.parser.date_order, DateOrder::DayFirst);
    assert_eq!(config.parser.media_placeholders.len(), DEFAULT_MEDIA_PLACEHOLDERS.len());
    let names: Vec<_> = config
        .parser
        .header_dialects
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    assert_eq!(names, vec!["bracketed", "dashed"]);
}

#[test]
fn test_default_remaining_sections() {
    let config = AppConfig::default();

    assert!(config.sentiment.enabled);
    assert_eq!(config.sentiment.batch_size, 50);
    assert_eq!(config.input.max_file_size_mb, 100);
    assert_eq!(config.export.default_format, "txt");
    assert_eq!(config.export.output_directory, "./output");
}

#[test]
fn test_default_config_is_valid() {
    assert!(AppConfig::default().validate().is_ok());
}

#[test]
fn test_every_log_level_is_accepted() {
    for level in ["trace", "debug", "info", "warn", "error"] {
        let mut config = AppConfig::default();
        config.logging.level = level.to_string();
        assert!(config.validate().is_ok(), "{level} rejected");
    }
}

#[test]
fn test_invalid_log_level() {
    let mut config = AppConfig::default();
    config.logging.level = "verbose".to_string();

    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("Invalid log level"));
}

#[test]
fn test_invalid_log_format() {
    let mut config = AppConfig::default();
    config.logging.format = "xml".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_no_header_dialects() {
    let mut config = AppConfig::default();
    config.parser.header_dialects.clear();
    assert!(config.validate().is_err());
}

#[test]
fn test_blank_dialect_pattern() {
    let mut config = AppConfig::default();
    config.parser.header_dialects[0].pattern = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_blank_media_placeholder() {
    let mut config = AppConfig::default();
    config.parser.media_placeholders.push(String::new());
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_batch_size() {
    let mut config = AppConfig::default();
    config.sentiment.batch_size = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_max_file_size() {
    let mut config = AppConfig::default();
    config.input.max_file_size_mb = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_export_format() {
    let mut config = AppConfig::default();
    config.export.default_format = "pdf".to_string();

    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("Invalid export format"));
}

#[test]
fn test_load_from_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(
        &path,
        r#"
[logging]
level = "debug"

[parser]
date_order = "month_first"

[sentiment]
batch_size = 10

[export]
default_format = "json"
"#,
    )
    .unwrap();

    let config = AppConfig::load_from(Some(&path)).unwrap();

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.parser.date_order, DateOrder::MonthFirst);
    assert_eq!(config.sentiment.batch_size, 10);
    assert_eq!(config.export.default_format, "json");
    // Untouched values keep their defaults
    assert_eq!(config.parser.header_dialects.len(), 2);
    assert_eq!(config.input.max_file_size_mb, 100);
    assert!(config.sentiment.enabled);
}

#[test]
fn test_load_from_file_rejects_invalid_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[export]\ndefault_format = \"pdf\"\n").unwrap();

    assert!(AppConfig::load_from(Some(&path)).is_err());
}

#[test]
fn test_load_from_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    assert!(AppConfig::load_from(Some(&path)).is_err());
}

#[test]
fn test_config_serialization() {
    let config = AppConfig::default();

    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("\"date_order\":\"day_first\""));

    let restored: AppConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.parser, config.parser);
    assert_eq!(restored.sentiment.batch_size, config.sentiment.batch_size);
}
