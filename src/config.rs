//! Configuration management for Dorm Guide
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{DormGuideError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Dorm Guide
///
/// Holds the recommendation service settings, where saved sessions live,
/// and chat presentation options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Recommendation service configuration
    #[serde(default)]
    pub service: ServiceConfig,
    /// Session persistence configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Interactive chat configuration
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Recommendation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Full URL of the recommendation endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8002/query".to_string()
}

fn default_timeout() -> u64 {
    120
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Session persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file holding saved sessions; platform data dir when unset
    #[serde(default)]
    pub db_path: Option<String>,

    /// Name of the slot the session collection is stored under
    #[serde(default = "default_slot")]
    pub slot: String,
}

fn default_slot() -> String {
    "sessions".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            slot: default_slot(),
        }
    }
}

/// Interactive chat configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Preset questions offered by `/quick`
    #[serde(default = "default_quick_filters")]
    pub quick_filters: Vec<String>,
}

fn default_quick_filters() -> Vec<String> {
    vec![
        "Quiet dorm close to classes".to_string(),
        "Very social dorm with lots of people".to_string(),
        "Suite-style dorm near the gym".to_string(),
        "Dorm close to Franklin Street".to_string(),
    ]
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            quick_filters: default_quick_filters(),
        }
    }
}

const MAX_TIMEOUT_SECONDS: u64 = 600;
const MAX_QUICK_FILTERS: usize = 9;

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DormGuideError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| DormGuideError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(endpoint) = std::env::var("DORMGUIDE_ENDPOINT") {
            self.service.endpoint = endpoint;
        }

        if let Ok(timeout) = std::env::var("DORMGUIDE_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.service.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid DORMGUIDE_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(db_path) = std::env::var("DORMGUIDE_STORAGE_DB") {
            self.storage.db_path = Some(db_path);
        }

        if let Ok(slot) = std::env::var("DORMGUIDE_SESSION_SLOT") {
            self.storage.slot = slot;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(db_path) = &cli.storage_path {
            self.storage.db_path = Some(db_path.clone());
        }

        if let Some(endpoint) = cli.command.endpoint_override() {
            tracing::debug!("Using endpoint override from CLI: {}", endpoint);
            self.service.endpoint = endpoint.to_string();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let endpoint = url::Url::parse(&self.service.endpoint).map_err(|e| {
            DormGuideError::Config(format!(
                "Invalid service endpoint '{}': {}",
                self.service.endpoint, e
            ))
        })?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(DormGuideError::Config(format!(
                "Service endpoint must use http or https, got: {}",
                endpoint.scheme()
            ))
            .into());
        }

        if self.service.timeout_seconds == 0 {
            return Err(DormGuideError::Config(
                "service.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.service.timeout_seconds > MAX_TIMEOUT_SECONDS {
            return Err(DormGuideError::Config(format!(
                "service.timeout_seconds must be less than or equal to {}",
                MAX_TIMEOUT_SECONDS
            ))
            .into());
        }

        if self.storage.slot.trim().is_empty() {
            return Err(
                DormGuideError::Config("storage.slot cannot be empty".to_string()).into(),
            );
        }

        if self.chat.quick_filters.len() > MAX_QUICK_FILTERS {
            return Err(DormGuideError::Config(format!(
                "chat.quick_filters cannot have more than {} entries",
                MAX_QUICK_FILTERS
            ))
            .into());
        }

        if self.chat.quick_filters.iter().any(|q| q.trim().is_empty()) {
            return Err(DormGuideError::Config(
                "chat.quick_filters entries cannot be empty".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
