//! Configuration file support.
//!
//! Provides the configuration structure and its discovery, merging and
//! environment overrides.

use super::emissions::EmissionsConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level configuration, as read from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Directory holding `wine.csv` and optional replacements for the bundled tables
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Log level
    #[serde(default)]
    pub log_level: Option<String>,

    /// Output format preferences
    #[serde(default)]
    pub output: OutputConfig,

    /// Emissions provider settings
    #[serde(default)]
    pub emissions: EmissionsSection,
}

/// Output format configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format (human, json)
    #[serde(default = "default_output_format")]
    pub format: String,

    /// Always use JSON output
    #[serde(default)]
    pub always_json: bool,
}

fn default_output_format() -> String {
    "human".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
            always_json: false,
        }
    }
}

impl OutputConfig {
    #[must_use]
    pub fn wants_json(&self) -> bool {
        self.always_json || self.format == "json"
    }
}

/// `[emissions]` table. Unset keys fall back to [`EmissionsConfig::default`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmissionsSection {
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub cpu_power_watts: Option<f64>,
    #[serde(default)]
    pub ram_power_watts: Option<f64>,
    #[serde(default)]
    pub carbon_intensity_g_per_kwh: Option<f64>,
    #[serde(default)]
    pub measure_interval_secs: Option<f64>,
    #[serde(default)]
    pub side_log_enabled: Option<bool>,
    #[serde(default)]
    pub side_log_path: Option<String>,
}

impl EmissionsSection {
    /// Section that spells out every value of `resolved`.
    #[must_use]
    pub fn from_resolved(resolved: &EmissionsConfig) -> Self {
        Self {
            project_name: Some(resolved.project_name.clone()),
            cpu_power_watts: Some(resolved.cpu_power_watts),
            ram_power_watts: Some(resolved.ram_power_watts),
            carbon_intensity_g_per_kwh: Some(resolved.carbon_intensity_g_per_kwh),
            measure_interval_secs: Some(resolved.measure_interval_secs),
            side_log_enabled: Some(resolved.side_log.is_some()),
            side_log_path: resolved.side_log.as_ref().map(|p| p.display().to_string()),
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    ReadError(String),

    /// Failed to parse configuration file.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl CliConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a TOML file.
    pub fn save_to_file(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(format!("Failed to serialize: {}", e)))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::ReadError(format!("Failed to create directory: {}", e)))?;
        }

        std::fs::write(path, content)
            .map_err(|e| ConfigError::ReadError(format!("Failed to write file: {}", e)))?;

        Ok(())
    }

    /// Get default global configuration file path.
    pub fn default_global_path() -> PathBuf {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".greenmodel")
            .join("config.toml")
    }

    /// Get default local configuration file path.
    pub fn default_local_path() -> PathBuf {
        PathBuf::from(".greenmodelrc")
    }

    /// Discover and load configuration files.
    ///
    /// Loads configuration from:
    /// 1. Global config (~/.greenmodel/config.toml)
    /// 2. Local config (./.greenmodelrc)
    /// 3. `GREENMODEL_*` environment variables
    ///
    /// Later sources override earlier ones. Files that cannot be read or parsed are
    /// skipped and returned alongside the configuration so the caller can report them.
    pub fn discover_and_load() -> (Self, Vec<ConfigError>) {
        let (mut config, skipped) = Self::load_layers(&[Self::default_global_path(), Self::default_local_path()]);
        config.apply_env_overrides();
        (config, skipped)
    }

    /// Merge the files at `paths` in order. Missing files are not errors.
    pub fn load_layers(paths: &[PathBuf]) -> (Self, Vec<ConfigError>) {
        let mut config = Self::default();
        let mut skipped = Vec::new();

        for path in paths {
            match Self::load_from_file(path) {
                Ok(found) => config.merge(&found),
                Err(ConfigError::NotFound(_)) => {}
                Err(e) => skipped.push(e),
            }
        }

        (config, skipped)
    }

    /// Merge another configuration into this one.
    ///
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &Self) {
        if let Some(ref data_dir) = other.data_dir {
            self.data_dir = Some(data_dir.clone());
        }
        if let Some(ref log_level) = other.log_level {
            self.log_level = Some(log_level.clone());
        }
        if other.output.always_json {
            self.output.always_json = true;
        }
        if other.output.format != "human" {
            self.output.format = other.output.format.clone();
        }

        let theirs = &other.emissions;
        let ours = &mut self.emissions;
        if theirs.project_name.is_some() {
            ours.project_name.clone_from(&theirs.project_name);
        }
        ours.cpu_power_watts = theirs.cpu_power_watts.or(ours.cpu_power_watts);
        ours.ram_power_watts = theirs.ram_power_watts.or(ours.ram_power_watts);
        ours.carbon_intensity_g_per_kwh = theirs.carbon_intensity_g_per_kwh.or(ours.carbon_intensity_g_per_kwh);
        ours.measure_interval_secs = theirs.measure_interval_secs.or(ours.measure_interval_secs);
        ours.side_log_enabled = theirs.side_log_enabled.or(ours.side_log_enabled);
        if theirs.side_log_path.is_some() {
            ours.side_log_path.clone_from(&theirs.side_log_path);
        }
    }

    /// Apply `GREENMODEL_DATA_DIR`, `GREENMODEL_LOG_LEVEL` and `GREENMODEL_CARBON_INTENSITY`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(data_dir) = lookup("GREENMODEL_DATA_DIR") {
            self.data_dir = Some(data_dir);
        }
        if let Some(log_level) = lookup("GREENMODEL_LOG_LEVEL") {
            self.log_level = Some(log_level);
        }
        if let Some(raw) = lookup("GREENMODEL_CARBON_INTENSITY") {
            match raw.trim().parse::<f64>() {
                Ok(value) => self.emissions.carbon_intensity_g_per_kwh = Some(value),
                Err(e) => tracing::warn!(value = %raw, error = %e, "ignoring GREENMODEL_CARBON_INTENSITY"),
            }
        }
    }

    /// Resolve the `[emissions]` table against the defaults and validate it.
    pub fn emissions_config(&self) -> ConfigResult<EmissionsConfig> {
        let defaults = EmissionsConfig::default();
        let section = &self.emissions;

        let side_log = match section.side_log_enabled {
            Some(false) => None,
            _ => section.side_log_path.as_ref().map(PathBuf::from).or(defaults.side_log),
        };

        let resolved = EmissionsConfig {
            project_name: section.project_name.clone().unwrap_or(defaults.project_name),
            cpu_power_watts: section.cpu_power_watts.unwrap_or(defaults.cpu_power_watts),
            ram_power_watts: section.ram_power_watts.unwrap_or(defaults.ram_power_watts),
            carbon_intensity_g_per_kwh: section
                .carbon_intensity_g_per_kwh
                .unwrap_or(defaults.carbon_intensity_g_per_kwh),
            measure_interval_secs: section.measure_interval_secs.unwrap_or(defaults.measure_interval_secs),
            side_log,
        };
        resolved.validate()?;
        Ok(resolved)
    }
}
