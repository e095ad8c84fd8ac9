//! Explicit export of a run log.
//!
//! Runs only outlive their session when exported here, as CSV, JSON or Markdown.

use crate::runlog::TrainingRunRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// CSV for spreadsheets.
    Csv,
    /// JSON for programmatic access.
    Json,
    /// Markdown table for humans.
    Markdown,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    /// Parse export format from string (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            _ => Err(ExportError::InvalidFormat(s.to_string())),
        }
    }
}

impl ExportFormat {
    /// Get file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "md",
        }
    }

    /// Guess the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension().and_then(|ext| ext.to_str()).and_then(|ext| ext.parse().ok())
    }
}

/// Flat, presentation-ready view of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRow {
    pub dataset: String,
    pub model: String,
    pub params: String,
    pub accuracy_pct: f64,
    pub emissions_g: f64,
}

impl From<TrainingRunRecord> for RunRow {
    fn from(record: TrainingRunRecord) -> Self {
        Self::from(&record)
    }
}

impl From<&TrainingRunRecord> for RunRow {
    fn from(record: &TrainingRunRecord) -> Self {
        Self {
            dataset: record.dataset().label().to_string(),
            model: record.model_kind().label().to_string(),
            params: record.params_summary(),
            accuracy_pct: record.accuracy_pct(),
            emissions_g: record.emissions_g(),
        }
    }
}

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Invalid export format: {0}")]
    InvalidFormat(String),

    #[error("Export generation failed: {0}")]
    GenerationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

const COLUMNS: [&str; 5] = ["dataset", "model", "params", "accuracy_pct", "emissions_g"];

/// Render `records` in `format`.
pub fn export_runs<'a, I>(records: I, format: ExportFormat) -> Result<String, ExportError>
where
    I: IntoIterator<Item = &'a TrainingRunRecord>,
{
    let rows: Vec<RunRow> = records.into_iter().map(RunRow::from).collect();
    match format {
        ExportFormat::Csv => export_csv(&rows),
        ExportFormat::Json => Ok(serde_json::to_string_pretty(&rows)?),
        ExportFormat::Markdown => Ok(export_markdown(&rows)),
    }
}

/// Render and write to `path`, creating parent directories.
pub fn write_export<'a, I>(records: I, format: ExportFormat, path: &Path) -> Result<(), ExportError>
where
    I: IntoIterator<Item = &'a TrainingRunRecord>,
{
    let content = export_runs(records, format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

fn export_csv(rows: &[RunRow]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.write_record([
            row.dataset.clone(),
            row.model.clone(),
            row.params.clone(),
            format!("{:.4}", row.accuracy_pct),
            format!("{:.4}", row.emissions_g),
        ])?;
    }
    writer.flush()?;

    let data = writer
        .into_inner()
        .map_err(|e| ExportError::GenerationFailed(format!("Failed to get CSV data: {}", e)))?;
    String::from_utf8(data).map_err(|e| ExportError::GenerationFailed(format!("Invalid UTF-8 in CSV: {}", e)))
}

fn export_markdown(rows: &[RunRow]) -> String {
    let mut out = String::new();
    out.push_str("| # | Dataset | Model | Params | Accuracy (%) | Emissions (g CO₂eq) |\n");
    out.push_str("|---|---|---|---|---|---|\n");
    for (idx, row) in rows.iter().enumerate() {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {:.4} | {:.4} |\n",
            idx + 1,
            row.dataset,
            row.model,
            row.params,
            row.accuracy_pct,
            row.emissions_g
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runlog::RunLog;
    use greenmodel_training::{DatasetName, HyperParams};
    use tempfile::TempDir;

    fn sample_log() -> RunLog {
        let mut log = RunLog::new();
        log.append(
            TrainingRunRecord::new(DatasetName::Iris, HyperParams::RandomForest { tree_count: 100 }, 96.666_666, 0.012_34)
                .unwrap(),
        );
        log.append(
            TrainingRunRecord::new(
                DatasetName::BreastCancer,
                HyperParams::LogisticRegression { max_iterations: 200 },
                97.368_421,
                0.005,
            )
            .unwrap(),
        );
        log
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("md".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert!("xlsx".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::from_path(Path::new("runs.json")), Some(ExportFormat::Json));
    }

    #[test]
    fn test_csv_export() {
        let csv = export_runs(sample_log().all(), ExportFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("dataset,model,params,accuracy_pct,emissions_g"));
        assert_eq!(lines.next(), Some("Iris,Random Forest,Trees: 100,96.6667,0.0123"));
        assert_eq!(lines.next(), Some("Breast Cancer,Logistic Regression,Epochs: 200,97.3684,0.0050"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_json_export_keeps_columns() {
        let json = export_runs(sample_log().all(), ExportFormat::Json).unwrap();
        let rows: Vec<RunRow> = serde_json::from_str(&json).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].params, "Trees: 100");
        assert_eq!(rows[1].dataset, "Breast Cancer");
    }

    #[test]
    fn test_markdown_export() {
        let md = export_runs(sample_log().all(), ExportFormat::Markdown).unwrap();
        assert!(md.starts_with("| # | Dataset"));
        assert!(md.contains("| 2 | Breast Cancer | Logistic Regression | Epochs: 200 |"));
    }

    #[test]
    fn test_write_export_creates_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out").join("runs.csv");
        write_export(sample_log().all(), ExportFormat::Csv, &path).unwrap();
        assert!(std::fs::read_to_string(path).unwrap().contains("Trees: 100"));
    }
}
