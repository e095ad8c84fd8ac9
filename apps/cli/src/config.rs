//! CLI configuration loading and merging.

use anyhow::{Context, Result};
use greenmodel_core::{CliConfig, ConfigError, EmissionsConfig, PowerModelTracker, Session};
use greenmodel_training::{BundledDatasets, LocalTrainer, ProgressSink};
use std::path::PathBuf;
use std::sync::Arc;

/// Load and merge CLI configuration.
///
/// Configuration precedence:
/// 1. CLI arguments (handled by clap)
/// 2. Environment variables
/// 3. Local config file (./.greenmodelrc)
/// 4. Global config file (~/.greenmodel/config.toml)
/// 5. Defaults
///
/// Files that failed to load are returned so they can be logged once tracing is up.
pub fn load_config() -> (CliConfig, Vec<ConfigError>) {
    CliConfig::discover_and_load()
}

/// Effective settings after flags are applied on top of the config files.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: Option<PathBuf>,
    pub emissions: EmissionsConfig,
    pub prefer_json: bool,
}

impl Settings {
    pub fn resolve(config: &CliConfig, data_dir: Option<PathBuf>, no_side_log: bool) -> Result<Self> {
        let mut emissions = config.emissions_config().context("Invalid [emissions] configuration")?;
        if no_side_log {
            emissions.side_log = None;
        }

        Ok(Self {
            data_dir: data_dir.or_else(|| config.data_dir.as_ref().map(PathBuf::from)),
            emissions,
            prefer_json: config.output.wants_json(),
        })
    }

    pub fn source(&self) -> BundledDatasets {
        self.data_dir.as_ref().map_or_else(BundledDatasets::new, BundledDatasets::with_data_dir)
    }

    /// Fresh session with its own run log and tracker.
    pub fn open_session(&self, progress: Arc<dyn ProgressSink>) -> Session<PowerModelTracker> {
        let trainer = LocalTrainer::new(Arc::new(self.source()));
        Session::new(PowerModelTracker::new(self.emissions.clone()), Arc::new(trainer), progress)
    }
}
