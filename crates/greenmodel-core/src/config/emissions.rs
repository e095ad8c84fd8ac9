//! Settings for the power-model emissions provider.

use super::cli_config::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolved provider settings.
///
/// The defaults follow the usual constant-power fallback: half of an 85 W CPU TDP,
/// 3 W per 8 GB of RAM on a 16 GB machine, and the world-average grid intensity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionsConfig {
    pub project_name: String,
    pub cpu_power_watts: f64,
    pub ram_power_watts: f64,
    pub carbon_intensity_g_per_kwh: f64,
    pub measure_interval_secs: f64,
    /// CSV side log; `None` disables it.
    pub side_log: Option<PathBuf>,
}

impl Default for EmissionsConfig {
    fn default() -> Self {
        Self {
            project_name: "greenmodel".to_string(),
            cpu_power_watts: 42.5,
            ram_power_watts: 6.0,
            carbon_intensity_g_per_kwh: 475.0,
            measure_interval_secs: 1.0,
            side_log: Some(PathBuf::from("emissions.csv")),
        }
    }
}

impl EmissionsConfig {
    /// Sampling period for the background sampler.
    #[must_use]
    pub fn measure_interval(&self) -> Duration {
        Duration::from_secs_f64(self.measure_interval_secs.max(0.001))
    }

    #[must_use]
    pub fn side_log(&self) -> Option<&Path> {
        self.side_log.as_deref()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("cpu_power_watts", self.cpu_power_watts, false),
            ("ram_power_watts", self.ram_power_watts, false),
            ("carbon_intensity_g_per_kwh", self.carbon_intensity_g_per_kwh, false),
            ("measure_interval_secs", self.measure_interval_secs, true),
        ];
        for (name, value, strictly_positive) in checks {
            let ok = value.is_finite() && if strictly_positive { value > 0.0 } else { value >= 0.0 };
            if !ok {
                return Err(ConfigError::InvalidValue(format!("emissions.{name} = {value}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EmissionsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.measure_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = EmissionsConfig { measure_interval_secs: 0.0, ..Default::default() };
        assert!(config.validate().is_err());
        let config = EmissionsConfig { cpu_power_watts: -1.0, ..Default::default() };
        assert!(config.validate().is_err());
        let config = EmissionsConfig { carbon_intensity_g_per_kwh: f64::NAN, ..Default::default() };
        assert!(config.validate().is_err());
    }
}
