//! User settings (`config.toml`).
//!
//! Every key is optional; a missing file yields the defaults.
//!
//! ```toml
//! [defaults]
//! product = "my-product"
//! project = "my-project"
//! runtime = "3.7"
//! port = 8000
//! registry = "docker.io/acme"
//!
//! [cluster]
//! cpus = 2
//! memory_mb = 4096
//! driver = "virtualbox"
//!
//! [commands]
//! timeout_secs = 600
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use workbench::ClusterConfig;

use crate::paths;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub defaults: Defaults,
    pub cluster: ClusterSettings,
    pub commands: CommandSettings,
}

/// Defaults for product deployments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub product: String,
    pub project: String,
    /// Python runtime version of the base image
    pub runtime: String,
    pub port: u16,
    /// Registry used by `deploy --push` when none is given
    pub registry: Option<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            product: "my-product".to_string(),
            project: "my-project".to_string(),
            runtime: "3.7".to_string(),
            port: 8000,
            registry: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterSettings {
    pub cpus: u32,
    pub memory_mb: u32,
    pub driver: String,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        let defaults = ClusterConfig::default();
        Self {
            cpus: defaults.cpus,
            memory_mb: defaults.memory_mb,
            driver: defaults.driver,
        }
    }
}

impl ClusterSettings {
    pub fn to_config(&self) -> ClusterConfig {
        ClusterConfig {
            cpus: self.cpus,
            memory_mb: self.memory_mb,
            driver: self.driver.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandSettings {
    /// Kill external commands running longer than this
    pub timeout_secs: Option<u64>,
}

impl CommandSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.filter(|s| *s > 0).map(Duration::from_secs)
    }
}

impl Settings {
    /// Load settings from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_file()?)
    }

    /// Load settings from `path`, falling back to defaults if it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let mut settings: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;

        settings.defaults.registry = settings
            .defaults
            .registry
            .take()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}
