//! CSV side log with one row per measurement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// One finished measurement, as written to the side log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionsReading {
    pub timestamp: DateTime<Utc>,
    pub project_name: String,
    pub run_id: String,
    pub duration_s: f64,
    pub emissions_kg: f64,
    pub emissions_rate_kg_per_s: f64,
    pub cpu_power_w: f64,
    pub ram_power_w: f64,
    pub cpu_energy_kwh: f64,
    pub ram_energy_kwh: f64,
    pub energy_consumed_kwh: f64,
    pub samples: u64,
}

/// Append-only CSV file of [`EmissionsReading`]s.
#[derive(Debug, Clone)]
pub struct SideLog {
    path: PathBuf,
}

impl SideLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `reading`, writing the header first if the file is new or empty.
    pub fn append(&self, reading: &EmissionsReading) -> Result<(), csv::Error> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let needs_header = std::fs::metadata(&self.path).map_or(true, |meta| meta.len() == 0);
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;

        let mut writer = csv::WriterBuilder::new().has_headers(needs_header).from_writer(file);
        writer.serialize(reading)?;
        writer.flush()?;
        Ok(())
    }

    /// Read every row back.
    pub fn read_all(&self) -> Result<Vec<EmissionsReading>, csv::Error> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        reader.deserialize().collect()
    }
}
