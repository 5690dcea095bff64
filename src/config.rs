//! Configuration handling for the wizard

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the backend address
pub const API_ADDRESS_ENV: &str = "LISTING_WIZARD_API_ADDRESS";

/// Default backend address
pub const DEFAULT_API_ADDRESS: &str = "http://127.0.0.1:3000";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "marketplace", "listing-wizard")
}

/// User configuration for the wizard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WizardConfig {
    /// Marketplace backend address
    pub api_address: Option<String>,
    /// Asset store address, defaults to the backend address
    pub upload_address: Option<String>,
    /// Location of the draft file
    pub drafts_path: Option<PathBuf>,
    /// Record a local draft after a successful taxonomy edit
    pub record_drafts_on_success: Option<bool>,
    /// HTTP timeout in seconds
    pub request_timeout_secs: Option<u64>,
}

impl WizardConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if let Some(path) = path {
            if path.exists() {
                let content = fs::read_to_string(&path)?;
                let config: WizardConfig = serde_json::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Self::default())
    }

    /// Save configuration to file
    /// Backend address: environment, then config file, then default
    pub fn api_address(&self) -> String {
        self.resolve_api_address(std::env::var(API_ADDRESS_ENV).ok())
    }

    fn resolve_api_address(&self, from_env: Option<String>) -> String {
        from_env
            .filter(|address| !address.trim().is_empty())
            .or_else(|| self.api_address.clone())
            .unwrap_or_else(|| DEFAULT_API_ADDRESS.to_string())
    }

    pub fn upload_address(&self) -> String {
        self.upload_address
            .clone()
            .unwrap_or_else(|| self.api_address())
    }

    /// Draft file location, falling back to the platform data directory
    pub fn drafts_path(&self) -> PathBuf {
        match &self.drafts_path {
            Some(path) => path.clone(),
            None => project_dirs()
                .map(|dirs| dirs.data_dir().join(crate::draft::DRAFTS_FILE_NAME))
                .unwrap_or_else(|| PathBuf::from(crate::draft::DRAFTS_FILE_NAME)),
        }
    }

    pub fn record_drafts_on_success(&self) -> bool {
        self.record_drafts_on_success.unwrap_or(true)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WizardConfig::default();
        assert!(config.api_address.is_none());
        assert!(config.upload_address.is_none());
        assert!(config.drafts_path.is_none());
        assert!(config.record_drafts_on_success());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_serialization() {
        let config = WizardConfig {
            api_address: Some("http://localhost:4000".to_string()),
            upload_address: Some("http://localhost:4001".to_string()),
            drafts_path: Some(PathBuf::from("/tmp/drafts.json")),
            record_drafts_on_success: Some(false),
            request_timeout_secs: Some(5),
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: WizardConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.api_address, Some("http://localhost:4000".to_string()));
        assert_eq!(parsed.upload_address(), "http://localhost:4001");
        assert_eq!(parsed.drafts_path(), PathBuf::from("/tmp/drafts.json"));
        assert!(!parsed.record_drafts_on_success());
        assert_eq!(parsed.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_deserialize_from_empty_json() {
        let parsed: WizardConfig = serde_json::from_str("{}").unwrap();
        assert!(parsed.api_address.is_none());
    }

    #[test]
    fn test_deserialize_with_extra_fields() {
        let json = r#"{"api_address": "http://api", "unknown_field": "value"}"#;
        let parsed: WizardConfig = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.api_address, Some("http://api".to_string()));
    }

    #[test]
    fn test_api_address_precedence() {
        let config = WizardConfig {
            api_address: Some("http://from-file".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_api_address(Some("http://from-env".to_string())),
            "http://from-env"
        );
        assert_eq!(
            config.resolve_api_address(Some("  ".to_string())),
            "http://from-file"
        );
        assert_eq!(config.resolve_api_address(None), "http://from-file");
        assert_eq!(
            WizardConfig::default().resolve_api_address(None),
            DEFAULT_API_ADDRESS
        );
    }

    #[test]
    fn test_drafts_path_has_file_name() {
        let path = WizardConfig::default().drafts_path();
        assert!(path.ends_with(crate::draft::DRAFTS_FILE_NAME));
    }

    #[test]
    fn test_load_returns_ok() {
        assert!(WizardConfig::load().is_ok());
    }
}
