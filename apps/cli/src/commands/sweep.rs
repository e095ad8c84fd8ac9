//! Sweep command: one measured run per hyperparameter value.

use super::{display, export, spinner::SpinnerSink};
use crate::config::Settings;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use greenmodel_core::{ExportFormat, SessionCommand};
use greenmodel_training::{DatasetName, HyperParams, ModelKind, TrainingJobSpec};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Dataset (iris, wine, breast_cancer)
    #[arg(short, long)]
    pub dataset: DatasetName,

    /// Model (random_forest, logistic_regression)
    #[arg(short, long, default_value = "random_forest")]
    pub model: ModelKind,

    /// Comma-separated tree counts or iteration caps, e.g. 10,50,100
    #[arg(long, value_delimiter = ',', required = true)]
    pub values: Vec<u32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the run log to this file after the sweep
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export format (csv, json, markdown); inferred from --export otherwise
    #[arg(long)]
    pub format: Option<ExportFormat>,
}

/// Validate every value before anything is trained.
pub fn sweep_params(model: ModelKind, values: &[u32]) -> Result<Vec<HyperParams>> {
    values
        .iter()
        .map(|&value| {
            let params = model.params(value);
            params.validate().with_context(|| {
                let range = model.param_range();
                format!("{} must be within {}..={}", value, range.start(), range.end())
            })?;
            Ok(params)
        })
        .collect()
}

/// Execute the sweep command.
pub async fn execute(settings: &Settings, args: SweepArgs) -> Result<()> {
    let json = args.json || settings.prefer_json;
    let all_params = sweep_params(args.model, &args.values)?;

    let spinner = Arc::new(SpinnerSink::for_output(json));
    let mut session = settings.open_session(spinner.clone());

    if !json {
        println!(
            "{}",
            format!("GreenModel sweep: {} on {} ({} runs)", args.model, args.dataset, all_params.len()).bold().green()
        );
        println!();
    }

    for params in all_params {
        let job = TrainingJobSpec::new(args.dataset, params);
        let view = match session.handle(SessionCommand::Train(job)).await {
            Ok(view) => view,
            Err(e) => {
                spinner.clear();
                return Err(e).with_context(|| format!("Sweep run with {} failed", params));
            }
        };

        if !json {
            if let Some(run) = &view.appended {
                println!(
                    "  {} {:<12} accuracy {:>8.4}%  emissions {:.4} g CO₂eq",
                    "✓".green(),
                    run.params_summary(),
                    run.accuracy_pct(),
                    run.emissions_g()
                );
            }
        }
    }

    let view = session.handle(SessionCommand::View { selected: args.dataset }).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!();
        display::print_view(&view);
    }

    if let Some(path) = args.export {
        let format = export::export_log(session.log(), &path, args.format)?;
        if !json {
            println!();
            println!("  {} {} ({})", "Exported runs to".dimmed(), path.display(), format);
        }
    }

    Ok(())
}
