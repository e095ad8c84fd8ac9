//! Interactive session: train, compare and export runs until the user quits.

use super::{display, export, spinner::SpinnerSink, tips};
use crate::colors::GreenModelColors;
use crate::config::Settings;
use anyhow::{Context, Result};
use colored::Colorize;
use greenmodel_core::{greenest_per_dataset, EngineError, PowerModelTracker, Session, SessionCommand};
use greenmodel_training::{DatasetName, ModelKind, TrainingJobSpec};
use inquire::validator::Validation;
use inquire::{CustomType, InquireError, Select, Text};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Train,
    ShowRuns,
    Greenest,
    Equivalents,
    Export,
    Quit,
}

impl Action {
    const ALL: [Self; 6] = [Self::Train, Self::ShowRuns, Self::Greenest, Self::Equivalents, Self::Export, Self::Quit];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Train => "Train a model",
            Self::ShowRuns => "Show previous runs",
            Self::Greenest => "Greenest configuration per dataset",
            Self::Equivalents => "Real-world equivalents of the latest run",
            Self::Export => "Export runs",
            Self::Quit => "Quit",
        })
    }
}

/// Ctrl-C and Esc end the session instead of failing it.
fn is_cancel(err: &InquireError) -> bool {
    matches!(err, InquireError::OperationCanceled | InquireError::OperationInterrupted)
}

struct Interactive {
    session: Session<PowerModelTracker>,
    spinner: Arc<SpinnerSink>,
    selected: DatasetName,
}

impl Interactive {
    async fn train(&mut self) -> Result<()> {
        let dataset = Select::new("Dataset:", DatasetName::ALL.to_vec())
            .with_starting_cursor(DatasetName::ALL.iter().position(|d| *d == self.selected).unwrap_or(0))
            .prompt()?;
        self.selected = dataset;

        let model = Select::new("Model:", ModelKind::ALL.to_vec()).prompt()?;
        let range = model.param_range();
        let prompt = match model {
            ModelKind::RandomForest => "Number of trees:",
            ModelKind::LogisticRegression => "Max iterations:",
        };
        let help = format!("{}..={}, step {}", range.start(), range.end(), model.param_step());
        let value = CustomType::<u32>::new(prompt)
            .with_default(model.default_params().value())
            .with_help_message(&help)
            .with_validator(move |value: &u32| {
                if range.contains(value) {
                    Ok(Validation::Valid)
                } else {
                    Ok(Validation::Invalid(format!("must be within {}..={}", range.start(), range.end()).into()))
                }
            })
            .prompt()?;

        let job = TrainingJobSpec::new(dataset, model.params(value));
        match self.session.handle(SessionCommand::Train(job)).await {
            Ok(view) => display::print_view(&view),
            Err(e) => {
                self.spinner.clear();
                report_engine_error(&e);
            }
        }
        Ok(())
    }

    async fn show_runs(&mut self) -> Result<()> {
        let view = self.session.handle(SessionCommand::View { selected: self.selected }).await?;
        display::print_view(&view);
        Ok(())
    }

    fn greenest(&self) {
        let rows = greenest_per_dataset(self.session.log());
        if rows.is_empty() {
            println!("{}", "No training runs yet.".dimmed());
            return;
        }
        for record in rows {
            display::print_record(&format!("{} dataset", record.dataset()), record);
            println!();
        }
    }

    async fn equivalents(&mut self) -> Result<()> {
        let view = self.session.handle(SessionCommand::View { selected: self.selected }).await?;
        match (view.latest(), &view.latest_equivalents) {
            (Some(latest), Some(report)) => {
                display::print_record("Latest run", latest);
                if let Some(footprint) = &view.latest_footprint {
                    display::print_footprint(footprint);
                }
                println!();
                display::print_equivalents(report);
            }
            _ => println!("{}", "No training runs yet.".dimmed()),
        }
        Ok(())
    }

    fn export(&self) -> Result<()> {
        if self.session.log().is_empty() {
            println!("{}", "Nothing to export yet.".dimmed());
            return Ok(());
        }
        let path = Text::new("Export to:").with_default("greenmodel_runs.csv").prompt()?;
        let path = PathBuf::from(path);
        let format = export::export_log(self.session.log(), &path, None)?;
        println!("  {} {} ({})", "Exported runs to".dimmed(), path.display(), format);
        Ok(())
    }
}

fn report_engine_error(err: &EngineError) {
    let message = match err {
        EngineError::MeasurementUnavailable(_) => format!("{err}. Nothing was recorded; try again."),
        EngineError::TrainingFailed(_) => format!("{err}. Nothing was recorded."),
        _ => err.to_string(),
    };
    println!("{} {}", "✗".red(), message.red());
}

/// Execute the interactive session.
pub async fn execute(settings: &Settings) -> Result<()> {
    println!("{}", "GreenModel: ML training carbon emission tracker".bold().green());
    println!("  {}", "Try different models and parameters to see which is the most energy-efficient.".dimmed());
    println!();

    let (heading, message) = tips::random_message(&mut rand::thread_rng());
    println!("  {} {}", heading.color(GreenModelColors::accent()).bold(), message);
    println!();

    let spinner = Arc::new(SpinnerSink::new());
    let mut interactive = Interactive {
        session: settings.open_session(spinner.clone()),
        spinner,
        selected: DatasetName::Iris,
    };

    loop {
        let action = match Select::new("What next?", Action::ALL.to_vec()).prompt() {
            Ok(action) => action,
            Err(e) if is_cancel(&e) => break,
            Err(e) => return Err(e).context("Failed to read user input"),
        };

        let outcome = match action {
            Action::Train => interactive.train().await,
            Action::ShowRuns => interactive.show_runs().await,
            Action::Greenest => {
                interactive.greenest();
                Ok(())
            }
            Action::Equivalents => interactive.equivalents().await,
            Action::Export => interactive.export(),
            Action::Quit => break,
        };

        if let Err(e) = outcome {
            match e.downcast_ref::<InquireError>() {
                Some(inner) if is_cancel(inner) => {}
                _ => println!("{} {:#}", "✗".red(), e),
            }
        }
        println!();
    }

    let runs = interactive.session.log().len();
    if runs > 0 {
        println!("{}", format!("Session ended with {runs} run(s). Runs are not kept unless exported.").dimmed());
    }
    Ok(())
}
