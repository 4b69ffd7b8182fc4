mod common;

use common::temp_config;
use photovote::config::{Config, ConfigError};
use photovote::models::PhotoOrientation;

#[test]
fn test_config_default_values() {
    let config = Config::default();

    assert_eq!(config.api.base_url, "https://api.unsplash.com");
    assert!(config.api.access_key.is_none());
    assert_eq!(config.api.per_page, 30);
    assert_eq!(config.api.orientation, PhotoOrientation::Landscape);
    assert_eq!(config.api.timeout_seconds, 10);

    assert_eq!(config.vote.page_threshold, 10);
    assert_eq!(
        config.vote.categories,
        vec!["wedding cake", "birthday cake", "innovative cake", "cake", "cup of tea"]
    );
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_path_ends_with_expected() {
    let path = Config::config_path();
    assert!(path.ends_with("photovote/config.toml"));
}

#[test]
fn test_partial_file_keeps_defaults() {
    let (_dir, path) = temp_config(
        r#"
[api]
access_key = "file-key"
orientation = "squarish"

[vote]
categories = ["scones", "tea"]
"#,
    );

    let config = Config::load_from(&path).unwrap();
    // The environment override only wins when the variable is set.
    if std::env::var("PHOTOVOTE_ACCESS_KEY").is_err() {
        assert_eq!(config.api.access_key.as_deref(), Some("file-key"));
    }
    assert_eq!(config.api.orientation, PhotoOrientation::Squarish);
    assert_eq!(config.api.per_page, 30);
    assert_eq!(config.vote.categories, vec!["scones", "tea"]);
    assert_eq!(config.vote.page_threshold, 10);
}

#[test]
fn test_missing_explicit_file_is_read_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    match Config::load_from(&path) {
        Err(ConfigError::ReadError { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("Expected ReadError, got {:?}", other),
    }
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let (_dir, path) = temp_config("[api\nbase_url = ");
    assert!(matches!(
        Config::load_from(&path),
        Err(ConfigError::ParseError { .. })
    ));
}

#[test]
fn test_validation_rejects_out_of_range_per_page() {
    let (_dir, path) = temp_config("[api]\nper_page = 31\n");

    match Config::load_from(&path) {
        Err(ConfigError::ValidationError { message }) => assert!(message.contains("per_page")),
        other => panic!("Expected ValidationError, got {:?}", other),
    }
}

#[test]
fn test_validation_rejects_empty_categories() {
    let mut config = Config::default();
    config.vote.categories.clear();

    match config.validate() {
        Err(ConfigError::ValidationError { message }) => {
            assert!(message.contains("At least one vote category"));
        }
        other => panic!("Expected ValidationError, got {:?}", other),
    }
}

#[test]
fn test_validation_rejects_duplicate_and_blank_categories() {
    let mut config = Config::default();
    config.vote.categories = vec!["cake".into(), "cake".into()];
    assert!(config.validate().is_err());

    config.vote.categories = vec!["cake".into(), "  ".into()];
    assert!(config.validate().is_err());
}

#[test]
fn test_validation_rejects_zero_threshold_and_bad_url() {
    let mut config = Config::default();
    config.vote.page_threshold = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.api.base_url = "ftp://images".into();
    assert!(config.validate().is_err());
}
