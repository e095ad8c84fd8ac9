//! Config command implementation.

use crate::config::Settings;
use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::Colorize;
use greenmodel_core::{CliConfig, EmissionsConfig, EmissionsSection};
use serde_json::json;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration and where it came from
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a configuration file with every default spelled out
    Init {
        /// Write ~/.greenmodel/config.toml instead of ./.greenmodelrc
        #[arg(long)]
        global: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Execute config command.
pub fn execute(cmd: ConfigCommand, config: &CliConfig, settings: &Settings) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => show(config, settings, json || settings.prefer_json),
        ConfigCommand::Init { global, force } => {
            let path = if global { CliConfig::default_global_path() } else { CliConfig::default_local_path() };
            init(&path, force)?;
            println!("  {} {}", "Wrote".green(), path.display());
            Ok(())
        }
    }
}

fn show(config: &CliConfig, settings: &Settings, json_output: bool) -> Result<()> {
    let sources: Vec<(PathBuf, bool)> = [CliConfig::default_global_path(), CliConfig::default_local_path()]
        .into_iter()
        .map(|path| {
            let exists = path.is_file();
            (path, exists)
        })
        .collect();

    if json_output {
        let output = json!({
            "files": sources.iter().map(|(p, e)| json!({ "path": p, "loaded": e })).collect::<Vec<_>>(),
            "data_dir": settings.data_dir,
            "log_level": config.log_level,
            "output": config.output,
            "emissions": settings.emissions,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "GreenModel configuration".bold().green());
    println!();
    println!("{}", "Files:".bold());
    for (path, exists) in &sources {
        let status = if *exists { "loaded".green() } else { "not found".dimmed() };
        println!("  {} ({})", path.display(), status);
    }
    println!();

    let data_dir = settings.data_dir.as_ref().map_or_else(|| "not set".to_string(), |d| d.display().to_string());
    println!("  Data directory: {}", data_dir);
    println!("  Log level:      {}", config.log_level.as_deref().unwrap_or("warn"));
    println!("  Output:         {}", config.output.format);
    println!();

    let emissions = &settings.emissions;
    println!("{}", "Emissions:".bold());
    println!("  Project:          {}", emissions.project_name);
    println!("  CPU power:        {} W", emissions.cpu_power_watts);
    println!("  RAM power:        {} W", emissions.ram_power_watts);
    println!("  Carbon intensity: {} g/kWh", emissions.carbon_intensity_g_per_kwh);
    println!("  Sample interval:  {} s", emissions.measure_interval_secs);
    match emissions.side_log() {
        Some(path) => println!("  Side log:         {}", path.display()),
        None => println!("  Side log:         {}", "disabled".dimmed()),
    }
    Ok(())
}

/// Write a default configuration to `path`.
pub fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let config = CliConfig {
        log_level: Some("warn".to_string()),
        emissions: EmissionsSection::from_resolved(&EmissionsConfig::default()),
        ..Default::default()
    };
    config.save_to_file(path).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
