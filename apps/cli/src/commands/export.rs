//! Writing the run log to disk.

use anyhow::{Context, Result};
use greenmodel_core::{write_export, ExportFormat, RunLog};
use std::path::Path;

/// Explicit `format`, else the one implied by the extension, else CSV.
pub fn resolve_format(path: &Path, format: Option<ExportFormat>) -> ExportFormat {
    format.or_else(|| ExportFormat::from_path(path)).unwrap_or(ExportFormat::Csv)
}

pub fn export_log(log: &RunLog, path: &Path, format: Option<ExportFormat>) -> Result<ExportFormat> {
    let format = resolve_format(path, format);
    write_export(log.all(), format, path)
        .with_context(|| format!("Failed to export runs to {}", path.display()))?;
    tracing::info!(path = %path.display(), %format, runs = log.len(), "runs exported");
    Ok(format)
}
