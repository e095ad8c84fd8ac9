//! Datasets command implementation.

use crate::colors::GreenModelColors;
use crate::config::Settings;
use anyhow::Result;
use colored::Colorize;
use comfy_table::{Cell, Table};
use greenmodel_training::{DatasetName, DatasetSource};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct DatasetInfo {
    name: DatasetName,
    label: &'static str,
    available: bool,
    samples: Option<usize>,
    features: Option<usize>,
    classes: Option<usize>,
    error: Option<String>,
}

fn describe(source: &dyn DatasetSource, name: DatasetName) -> DatasetInfo {
    match source.load(name) {
        Ok(dataset) => DatasetInfo {
            name,
            label: name.label(),
            available: true,
            samples: Some(dataset.n_samples()),
            features: Some(dataset.n_features()),
            classes: Some(dataset.n_classes()),
            error: None,
        },
        Err(e) => DatasetInfo {
            name,
            label: name.label(),
            available: false,
            samples: None,
            features: None,
            classes: None,
            error: Some(e.to_string()),
        },
    }
}

/// Execute the datasets command.
pub fn execute(settings: &Settings, json_output: bool) -> Result<()> {
    let source = settings.source();
    let infos: Vec<DatasetInfo> = DatasetName::ALL.into_iter().map(|name| describe(&source, name)).collect();

    if json_output || settings.prefer_json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    println!("{}", "Datasets".bold().green());
    match source.data_dir() {
        Some(dir) => println!("  Data directory: {}", dir.display()),
        None => println!("  Data directory: {}", "not set (bundled tables only)".dimmed()),
    }
    println!();

    let mut table = Table::new();
    table.set_header(vec!["Dataset", "Available", "Samples", "Features", "Classes"]);
    let count = |v: Option<usize>| v.map_or_else(|| "-".to_string(), |n| n.to_string());
    for info in &infos {
        let available = if info.available {
            Cell::new("yes").fg(GreenModelColors::cell(GreenModelColors::PRIMARY_RGB))
        } else {
            Cell::new("no").fg(GreenModelColors::cell(GreenModelColors::WARNING_RGB))
        };
        table.add_row(vec![
            Cell::new(info.label),
            available,
            Cell::new(count(info.samples)),
            Cell::new(count(info.features)),
            Cell::new(count(info.classes)),
        ]);
    }
    println!("{}", table);

    for info in infos.iter().filter(|i| !i.available) {
        if let Some(error) = &info.error {
            println!("  {} {}", "!".color(GreenModelColors::warning()), error.dimmed());
        }
    }
    Ok(())
}
