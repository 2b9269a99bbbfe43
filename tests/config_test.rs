//! Integration tests for layered settings loading

use std::fs;

use rstest::rstest;
use tempfile::TempDir;

use facecli::config::Settings;
use facecli::domain::OptionBag;
use facecli::infrastructure::traits::SettingsCatalog;
use facecli::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

#[test]
fn given_missing_file_when_loading_then_defaults() {
    let dir = TempDir::new().unwrap();
    let settings = Settings::load_from(Some(dir.path().join("absent.toml").as_path())).unwrap();

    assert_eq!(settings.masterport, 8140);
    assert_eq!(settings.environment, "production");
    assert!(!settings.trace);
}

#[test]
fn given_config_file_when_loading_then_file_values_replace_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("facecli.toml");
    fs::write(&path, "masterport = 8150\nenvironment = \"staging\"\ntrace = true\n").unwrap();

    let settings = Settings::load_from(Some(path.as_path())).unwrap();

    assert_eq!(settings.masterport, 8150);
    assert_eq!(settings.environment, "staging");
    assert!(settings.trace);
    assert_eq!(settings.addressing().default_port, 8150);
}

#[test]
fn given_invalid_file_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("facecli.toml");
    fs::write(&path, "masterport = \"not a port\"\n").unwrap();

    let err = Settings::load_from(Some(path.as_path())).unwrap_err();
    assert!(err.to_string().starts_with("config error"));
}

#[test]
fn given_env_var_when_loading_then_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("facecli.toml");
    fs::write(&path, "server = \"from-file\"\n").unwrap();

    std::env::set_var("FACECLI_SERVER", "from-env");
    let settings = Settings::load_from(Some(path.as_path()));
    std::env::remove_var("FACECLI_SERVER");

    assert_eq!(settings.unwrap().server, "from-env");
}

#[rstest]
#[case("masterport", "8141", "masterport = 8141")]
#[case("server", "puppet.example.com", "server = \"puppet.example.com\"")]
fn given_cli_override_when_applied_then_shown_in_toml(
    #[case] name: &str,
    #[case] value: &str,
    #[case] expected: &str,
) {
    let mut settings = Settings::default();
    let mut overrides = OptionBag::new();
    overrides.insert(name.to_string(), serde_json::Value::from(value));

    settings.apply_overrides(&overrides).unwrap();

    assert!(settings.to_toml().unwrap().contains(expected));
}

#[test]
fn given_settings_when_listing_catalog_then_only_trace_is_boolean() {
    let booleans: Vec<String> = Settings::default()
        .settings()
        .into_iter()
        .filter(|s| s.boolean)
        .map(|s| s.name)
        .collect();
    assert_eq!(booleans, vec!["trace".to_string()]);
}

#[test]
fn given_template_when_parsed_then_valid_toml() {
    let template = Settings::template();
    let parsed: toml::Value = toml::from_str(&template).unwrap();
    assert!(parsed.as_table().unwrap().is_empty());
}
