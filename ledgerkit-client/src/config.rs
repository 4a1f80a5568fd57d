//! Configuration loading for the ledgerkit client.
//!
//! All fields are required unless explicitly marked optional. No defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the account service, e.g. `http://localhost:8077/api`.
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    /// Where the session credential is persisted across restarts.
    pub credential_path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use LEDGERKIT_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ClientConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os("LEDGERKIT_CONFIG")
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.credential_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "credential_path",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ClientConfig {
        ClientConfig {
            api_base_url: "http://localhost:8077/api".to_string(),
            request_timeout_ms: 5000,
            credential_path: PathBuf::from("/tmp/ledgerkit/credential.json"),
        }
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let mut config = valid_config();
        config.api_base_url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = valid_config();
        config.request_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_from_toml() {
        let toml = r#"
            api_base_url = "http://localhost:8077/api"
            request_timeout_ms = 3000
            credential_path = "/tmp/credential.json"
        "#;
        let config: ClientConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.request_timeout_ms, 3000);
        config.validate().unwrap();
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let toml = r#"
            api_base_url = "http://localhost:8077/api"
            request_timeout_ms = 3000
            credential_path = "/tmp/credential.json"
            retries = 3
        "#;
        assert!(toml::from_str::<ClientConfig>(toml).is_err());
    }
}
