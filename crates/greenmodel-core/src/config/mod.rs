//! Configuration for the engine and its front ends.

pub mod cli_config;
pub mod emissions;

pub use cli_config::{CliConfig, ConfigError, ConfigResult, EmissionsSection, OutputConfig};
pub use emissions::EmissionsConfig;
