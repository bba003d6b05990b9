/*!
 * Tests for application configuration functionality
 */

use eafkit::app_config::{Config, LogLevel};
use log::LevelFilter;

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert!(config.export_fields.is_empty());
    assert_eq!(config.baseline_field, None);
    assert_eq!(config.max_chain_depth, 5);
    assert_eq!(config.csv_file, "export.csv");
    assert!(!config.csv_append);
    assert_eq!(config.template, None);
    assert_eq!(config.output_suffix, "edited");
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.max_chain_depth = 0;
    assert!(config.validate().is_err());
    config.max_chain_depth = 3;
    assert!(config.validate().is_ok());

    config.export_fields = vec!["Broad".to_string(), " ".to_string()];
    assert!(config.validate().is_err());
    config.export_fields = vec!["Broad".to_string()];
    assert!(config.validate().is_ok());

    config.baseline_field = Some(String::new());
    assert!(config.validate().is_err());
    config.baseline_field = Some("Broad".to_string());
    assert!(config.validate().is_ok());

    config.csv_file = "  ".to_string();
    assert!(config.validate().is_err());
    config.csv_file = "out.csv".to_string();

    config.output_suffix = "../edited".to_string();
    assert!(config.validate().is_err());
    config.output_suffix = String::new();
    assert!(config.validate().is_ok());
}

#[test]
fn test_fieldFilter_withNoFields_shouldSelectEverything() {
    let mut config = Config::default();
    assert_eq!(config.field_filter(), None);

    config.export_fields = vec!["Broad".to_string(), "Gloss".to_string()];
    assert_eq!(config.field_filter(), Some(vec!["Broad", "Gloss"]));
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path).unwrap();

    assert!(path.exists());
    assert_eq!(config.csv_file, "export.csv");

    let reloaded = Config::load_or_create(&path).unwrap();
    assert_eq!(reloaded.output_suffix, config.output_suffix);
}

#[test]
fn test_loadOrCreate_withPartialFile_shouldFillDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        r#"{ "export_fields": ["Broad"], "baseline_field": "Broad", "log_level": "debug" }"#,
    )
    .unwrap();

    let config = Config::load_or_create(&path).unwrap();

    assert_eq!(config.export_fields, vec!["Broad"]);
    assert_eq!(config.baseline_field.as_deref(), Some("Broad"));
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.max_chain_depth, 5);
    assert_eq!(config.output_suffix, "edited");
}

#[test]
fn test_loadOrCreate_withInvalidJson_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "conf.json", "{ not json").unwrap();

    assert!(Config::load_or_create(&path).is_err());
}

#[test]
fn test_config_save_shouldSerializeLogLevelLowercase() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");
    let config = Config {
        log_level: LogLevel::Warn,
        ..Config::default()
    };

    config.save(&path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains(r#""log_level": "warn""#));
}

#[test]
fn test_logLevel_toLevelFilter_shouldMatchVariants() {
    assert_eq!(LogLevel::Error.to_level_filter(), LevelFilter::Error);
    assert_eq!(LogLevel::Warn.to_level_filter(), LevelFilter::Warn);
    assert_eq!(LogLevel::Info.to_level_filter(), LevelFilter::Info);
    assert_eq!(LogLevel::Debug.to_level_filter(), LevelFilter::Debug);
    assert_eq!(LogLevel::Trace.to_level_filter(), LevelFilter::Trace);
}
