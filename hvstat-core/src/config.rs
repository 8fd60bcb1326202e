//! Configuration management.

use crate::drivers::{CollectFlags, RegistrationPolicy};
use crate::error::{HvstatError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Logging and metrics settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter when `RUST_LOG` is unset
    pub log_level: String,

    /// Serve Prometheus metrics on this address when set
    pub metrics_listen: Option<SocketAddr>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), metrics_listen: None }
    }
}

/// Collector configuration, read by the composition root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Categories to collect per domain
    pub collect: CollectFlags,

    /// Use this driver instead of the first one detected
    pub driver_override: Option<String>,

    /// What to do when a driver fails to register
    pub registration_policy: RegistrationPolicy,

    pub observability: ObservabilityConfig,
}

impl CollectorConfig {
    /// Load configuration from the default path, or defaults if absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Load configuration from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| HvstatError::IoError { path: path.to_path_buf(), source: e })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| HvstatError::InvalidConfig {
            reason: format!("Failed to parse config: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| HvstatError::IoError { path: parent.to_path_buf(), source: e })?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| HvstatError::InvalidConfig {
            reason: format!("Failed to serialize config: {}", e),
        })?;
        std::fs::write(path, content)
            .map_err(|e| HvstatError::IoError { path: path.to_path_buf(), source: e })
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.driver_override {
            if name.trim().is_empty() {
                return Err(HvstatError::InvalidConfig {
                    reason: "driver_override must not be empty".to_string(),
                });
            }
        }
        if self.observability.log_level.trim().is_empty() {
            return Err(HvstatError::InvalidConfig {
                reason: "observability.log_level must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
