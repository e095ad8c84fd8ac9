//! Train command implementation.

use super::{display, export, spinner::SpinnerSink};
use crate::config::Settings;
use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use greenmodel_core::{ExportFormat, SessionCommand};
use greenmodel_training::{DatasetName, HyperParams, ModelKind, TrainingJobSpec};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Dataset (iris, wine, breast_cancer)
    #[arg(short, long)]
    pub dataset: DatasetName,

    /// Model (random_forest, logistic_regression)
    #[arg(short, long, default_value = "random_forest")]
    pub model: ModelKind,

    /// Number of trees for random forest (10-200, default 100)
    #[arg(long, value_parser = clap::value_parser!(u32).range(10..=200))]
    pub trees: Option<u32>,

    /// Maximum iterations for logistic regression (50-500, default 100)
    #[arg(long = "max-iter", value_parser = clap::value_parser!(u32).range(50..=500))]
    pub max_iter: Option<u32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the run log to this file after training
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export format (csv, json, markdown); inferred from --export otherwise
    #[arg(long)]
    pub format: Option<ExportFormat>,
}

/// Map the per-model flags onto the model's single hyperparameter.
pub fn params_for(model: ModelKind, trees: Option<u32>, max_iter: Option<u32>) -> Result<HyperParams> {
    let value = match model {
        ModelKind::RandomForest => {
            if max_iter.is_some() {
                bail!("--max-iter only applies to logistic regression");
            }
            trees
        }
        ModelKind::LogisticRegression => {
            if trees.is_some() {
                bail!("--trees only applies to random forest");
            }
            max_iter
        }
    };
    Ok(value.map_or_else(|| model.default_params(), |v| model.params(v)))
}

/// Execute the train command.
pub async fn execute(settings: &Settings, args: TrainArgs) -> Result<()> {
    let json = args.json || settings.prefer_json;
    let params = params_for(args.model, args.trees, args.max_iter)?;

    let spinner = Arc::new(SpinnerSink::for_output(json));
    let mut session = settings.open_session(spinner.clone());

    if !json {
        println!("{}", "GreenModel training run".bold().green());
        println!("  {} {} on {}", "Fitting".dimmed(), params, args.dataset);
        println!();
    }

    let job = TrainingJobSpec::new(args.dataset, params);
    let view = match session.handle(SessionCommand::Train(job)).await {
        Ok(view) => view,
        Err(e) => {
            spinner.clear();
            return Err(e).context("Training run failed");
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
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
