//! Equivalents command implementation.

use super::display;
use anyhow::{Context, Result};
use colored::Colorize;
use greenmodel_core::{latest_footprint, to_equivalents};
use serde_json::json;

/// Execute the equivalents command.
pub fn execute(grams: f64, json_output: bool) -> Result<()> {
    let report = to_equivalents(grams).context("Cannot convert emissions")?;
    let footprint = latest_footprint(grams).context("Cannot convert emissions")?;

    if json_output {
        let output = json!({
            "emissions_g": grams,
            "equivalents": report.entries,
            "footprint": footprint,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", format!("{:.4} g CO₂eq", grams).bold().green());
    println!();
    display::print_equivalents(&report);
    println!();
    display::print_footprint(&footprint);
    Ok(())
}
