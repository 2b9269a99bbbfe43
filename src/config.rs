//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/facecli/facecli.toml`
//! 3. Environment variables: `FACECLI_*` prefix
//! 4. Command-line setting flags (`--masterport 8141`, `--[no-]trace`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::address::{Addressing, DEFAULT_PORT, DEFAULT_PROTOCOL};
use crate::domain::{Encoder, OptionBag, Render};
use crate::infrastructure::traits::{SettingDescriptor, SettingsCatalog};

/// Unified configuration for facecli.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Server contacted for remote requests
    pub server: String,
    /// Default port of the registered request protocol
    pub masterport: u16,
    /// Environment used when a request names none
    pub environment: String,
    /// Print the full error chain when an action fails
    pub trace: bool,
    /// Configuration directory
    pub confdir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: DEFAULT_PROTOCOL.to_string(),
            masterport: DEFAULT_PORT,
            environment: "production".to_string(),
            trace: false,
            confdir: global_config_dir().unwrap_or_else(|| PathBuf::from(".facecli")),
        }
    }
}

/// Get the XDG config directory for facecli.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "facecli").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("facecli.toml"))
}

impl Settings {
    /// Load settings from the global config file and `FACECLI_*` variables.
    pub fn load() -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref())
    }

    /// Load settings with an explicit config file (missing files are skipped).
    pub fn load_from(file: Option<&Path>) -> Result<Self, ApplicationError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("server", defaults.server.clone())
            .map_err(config_err)?
            .set_default("masterport", i64::from(defaults.masterport))
            .map_err(config_err)?
            .set_default("environment", defaults.environment.clone())
            .map_err(config_err)?
            .set_default("trace", defaults.trace)
            .map_err(config_err)?
            .set_default("confdir", defaults.confdir.to_string_lossy().to_string())
            .map_err(config_err)?;

        if let Some(path) = file {
            if path.exists() {
                debug!("load_from: reading {}", path.display());
                builder = builder.add_source(File::from(path).required(false));
            }
        }
        builder = builder.add_source(
            Environment::with_prefix("FACECLI")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;
        config.try_deserialize().map_err(config_err)
    }

    /// Apply setting flags given on the command line.
    ///
    /// Overrides replace values; they are explicit user choices.
    pub fn apply_overrides(&mut self, overrides: &OptionBag) -> Result<(), ApplicationError> {
        for (name, value) in overrides {
            debug!("apply_overrides: {}={}", name, value);
            match name.as_str() {
                "server" => self.server = string_setting(name, value)?,
                "environment" => self.environment = string_setting(name, value)?,
                "confdir" => self.confdir = PathBuf::from(string_setting(name, value)?),
                "trace" => {
                    self.trace = value.as_bool().ok_or_else(|| ApplicationError::Config {
                        message: format!("{name} must be a boolean, got {value}"),
                    })?
                }
                "masterport" => {
                    let raw = string_setting(name, value)?;
                    self.masterport = raw.parse().map_err(|e| ApplicationError::Config {
                        message: format!("{name}: invalid port '{raw}': {e}"),
                    })?;
                }
                other => {
                    return Err(ApplicationError::Config {
                        message: format!("unknown setting '{other}'"),
                    })
                }
            }
        }
        Ok(())
    }

    /// Addressing defaults for resource requests.
    pub fn addressing(&self) -> Addressing {
        Addressing::new(DEFAULT_PROTOCOL, self.masterport)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# facecli configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/facecli/facecli.toml
#   Env:    FACECLI_* environment variables
#   CLI:    --<setting> VALUE, --[no-]trace

# Server contacted for remote requests
# server = "puppet"

# Default port for puppet:// request URIs
# masterport = 8140

# Environment used when a request names none
# environment = "production"

# Print the full error chain when an action fails
# trace = false
"#
        .to_string()
    }
}

fn string_setting(name: &str, value: &Value) -> Result<String, ApplicationError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(ApplicationError::Config {
            message: format!("{name} expects a value, got {other}"),
        }),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl SettingsCatalog for Settings {
    fn settings(&self) -> Vec<SettingDescriptor> {
        vec![
            SettingDescriptor::value("server", "Server contacted for remote requests"),
            SettingDescriptor::value("masterport", "Default port for puppet:// URIs"),
            SettingDescriptor::value("environment", "Environment used when a request names none"),
            SettingDescriptor::boolean("trace", "Print the full error chain on failure"),
            SettingDescriptor::value("confdir", "Configuration directory"),
        ]
    }

    fn value(&self, name: &str) -> Option<Value> {
        serde_json::to_value(self).ok()?.get(name).cloned()
    }
}

impl Render for Settings {
    fn to_document(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    fn encode(&self, encoder: Encoder) -> Option<String> {
        match encoder {
            Encoder::Toml => self.to_toml().ok(),
            Encoder::Raw => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_defaults_when_created_then_uses_well_known_port() {
        let settings = Settings::default();
        assert_eq!(settings.masterport, 8140);
        assert_eq!(settings.environment, "production");
        assert!(!settings.trace);
        assert_eq!(settings.addressing().default_port, 8140);
    }

    #[test]
    fn given_overrides_when_applying_then_replaces_values() {
        let mut settings = Settings::default();
        let overrides: OptionBag = serde_json::from_value(json!({
            "masterport": "8141",
            "trace": true,
            "environment": "staging",
        }))
        .unwrap();

        settings.apply_overrides(&overrides).unwrap();

        assert_eq!(settings.masterport, 8141);
        assert!(settings.trace);
        assert_eq!(settings.environment, "staging");
    }

    #[test]
    fn given_invalid_port_when_applying_then_config_error() {
        let mut settings = Settings::default();
        let overrides: OptionBag = serde_json::from_value(json!({"masterport": "http"})).unwrap();
        let err = settings.apply_overrides(&overrides).unwrap_err();
        assert!(err.to_string().contains("invalid port"));
    }

    #[test]
    fn given_unknown_setting_when_applying_then_config_error() {
        let mut settings = Settings::default();
        let overrides: OptionBag = serde_json::from_value(json!({"colour": "red"})).unwrap();
        assert!(settings.apply_overrides(&overrides).is_err());
    }

    #[test]
    fn given_settings_when_reading_catalog_value_then_returns_current_value() {
        let settings = Settings::default();
        assert_eq!(settings.value("masterport"), Some(json!(8140)));
        assert_eq!(settings.value("nope"), None);
        assert!(settings.settings().iter().any(|s| s.name == "trace" && s.boolean));
    }

    #[test]
    fn given_settings_when_encoding_toml_then_contains_fields() {
        let toml = Settings::default().encode(Encoder::Toml).expect("toml capability");
        assert!(toml.contains("masterport = 8140"));
        assert_eq!(Settings::default().encode(Encoder::Raw), None);
    }
}
