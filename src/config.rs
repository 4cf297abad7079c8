//! Configuration Management
//!
//! Handles persistent configuration storage for tupi and resolution of
//! connection settings from flags, environment and the config file.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEPLOYMENT_ID_ENV: &str = "DEPLOYMENT_ID";
pub const DATA_URL_ENV: &str = "DATA_URL";
pub const DATA_SECRET_ENV: &str = "DATA_SECRET";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Apps Script deployment to call
    #[serde(default)]
    pub deployment_id: Option<String>,
    /// Base URL for the direct client
    #[serde(default)]
    pub data_url: Option<String>,
    /// Value of the `Secret` header sent by the direct client
    #[serde(default)]
    pub data_secret: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tupi").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        Self::load_from(&path)
    }

    /// Load configuration from `path`, falling back to defaults when the file
    /// is missing or unreadable
    pub fn load_from(path: &std::path::Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get effective deployment id (CLI > env > config)
    pub fn effective_deployment_id(&self, cli: Option<&str>) -> Option<String> {
        resolve(cli, DEPLOYMENT_ID_ENV, &self.deployment_id)
    }

    /// Get effective direct base URL (CLI > env > config)
    pub fn effective_data_url(&self, cli: Option<&str>) -> Option<String> {
        resolve(cli, DATA_URL_ENV, &self.data_url)
    }

    /// Get effective direct secret (CLI > env > config)
    pub fn effective_data_secret(&self, cli: Option<&str>) -> Option<String> {
        resolve(cli, DATA_SECRET_ENV, &self.data_secret)
    }

    /// Set deployment id and save
    pub fn set_deployment_id(&mut self, deployment_id: &str) -> Result<()> {
        self.deployment_id = Some(deployment_id.to_string());
        self.save()
    }
}

/// First non-empty value among the flag, the environment variable and the stored value
fn resolve(cli: Option<&str>, env: &str, stored: &Option<String>) -> Option<String> {
    cli.map(str::to_string)
        .or_else(|| std::env::var(env).ok())
        .or_else(|| stored.clone())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_value_wins() {
        let config = Config {
            deployment_id: Some("from-file".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.effective_deployment_id(Some("from-cli")),
            Some("from-cli".to_string())
        );
    }

    #[test]
    fn test_stored_value_is_last_resort() {
        let stored = Some("stored".to_string());
        assert_eq!(
            resolve(None, "TUPI_TEST_UNSET_VARIABLE", &stored),
            Some("stored".to_string())
        );
        assert_eq!(resolve(None, "TUPI_TEST_UNSET_VARIABLE", &None), None);
    }

    #[test]
    fn test_env_value_beats_stored_value() {
        let var = "TUPI_TEST_ENV_OVER_FILE";
        std::env::set_var(var, "from-env");

        let stored = Some("from-file".to_string());
        assert_eq!(resolve(None, var, &stored), Some("from-env".to_string()));
        assert_eq!(
            resolve(Some("from-cli"), var, &stored),
            Some("from-cli".to_string())
        );

        std::env::remove_var(var);
    }

    #[test]
    fn test_empty_values_resolve_to_none() {
        assert_eq!(resolve(Some(""), "TUPI_TEST_UNSET_VARIABLE", &None), None);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("tupi-config-{}", std::process::id()))
            .join("config.json");

        let config = Config {
            deployment_id: Some("AKfyc".to_string()),
            data_url: Some("https://example.com/exec".to_string()),
            data_secret: None,
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path), config);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let path = std::env::temp_dir().join("tupi-definitely-missing/config.json");
        assert_eq!(Config::load_from(&path), Config::default());
    }
}
