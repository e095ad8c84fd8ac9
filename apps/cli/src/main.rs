//! GreenModel CLI - track the carbon cost of training classifiers
//!
//! Trains Random Forest and Logistic Regression models on the bundled
//! datasets, measures each run's emissions and compares configurations.

mod colors;
mod commands;
mod config;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, shells};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{datasets, equivalents, session, sweep, train, ConfigCommand, SweepArgs, TrainArgs};
use config::Settings;

/// GreenModel CLI - carbon emissions of ML model training
#[derive(Parser, Debug)]
#[command(
    name = "greenmodel-cli",
    author,
    version,
    about = "GreenModel - carbon emission tracking for ML model training",
    long_about = "Trains classifiers on bundled datasets while measuring their CO₂eq emissions.\nCompare runs, find the greenest configuration and see real-world equivalents."
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Directory with wine.csv and optional dataset overrides (overrides GREENMODEL_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Do not append measurements to the emissions side log
    #[arg(long, global = true)]
    no_side_log: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train one model and measure its emissions
    ///
    /// Prints the run, the greenest configuration for the dataset and the
    /// real-world equivalents of the emissions.
    Train(TrainArgs),

    /// Train once per hyperparameter value and compare the runs
    Sweep(SweepArgs),

    /// Interactive session: train, compare and export runs
    Session,

    /// Real-world equivalents of an emissions quantity in grams CO₂eq
    Equivalents {
        /// Emissions in grams of CO₂eq
        #[arg(allow_negative_numbers = true)]
        grams: f64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the datasets and whether they can be loaded
    Datasets {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect or create configuration files
    #[command(subcommand)]
    Config(ConfigCommand),
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Handle completion generation
    if let Ok(shell) = std::env::var("GREENMODEL_GENERATE_COMPLETIONS") {
        let mut cmd = Args::command();
        match shell.as_str() {
            "bash" => generate(shells::Bash, &mut cmd, "greenmodel-cli", &mut std::io::stdout()),
            "zsh" => generate(shells::Zsh, &mut cmd, "greenmodel-cli", &mut std::io::stdout()),
            "fish" => generate(shells::Fish, &mut cmd, "greenmodel-cli", &mut std::io::stdout()),
            _ => anyhow::bail!("Unknown shell: {}. Supported: bash, zsh, fish", shell),
        }
        return Ok(());
    }

    let args = Args::parse();

    // Load configuration
    let (cli_config, skipped_configs) = config::load_config();

    // Initialize tracing (stderr keeps JSON on stdout parseable)
    let level = args.log_level.as_deref().or(cli_config.log_level.as_deref()).map_or(Level::WARN, parse_level);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    for error in &skipped_configs {
        tracing::warn!("Ignoring configuration file: {error}");
    }

    let settings = Settings::resolve(&cli_config, args.data_dir, args.no_side_log)?;

    // If no command provided, show help
    let Some(command) = args.command else {
        Args::command().print_help()?;
        return Ok(());
    };

    match command {
        Command::Train(train_args) => train::execute(&settings, train_args).await?,
        Command::Sweep(sweep_args) => sweep::execute(&settings, sweep_args).await?,
        Command::Session => session::execute(&settings).await?,
        Command::Equivalents { grams, json } => equivalents::execute(grams, json || settings.prefer_json)?,
        Command::Datasets { json } => datasets::execute(&settings, json)?,
        Command::Config(config_cmd) => commands::config::execute(config_cmd, &cli_config, &settings)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_level_defaults_to_warn() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("verbose"), Level::WARN);
    }

    #[test]
    fn test_train_rejects_out_of_range_trees() {
        let parsed = Args::try_parse_from(["greenmodel-cli", "train", "--dataset", "iris", "--trees", "500"]);
        assert!(parsed.is_err());
        let parsed = Args::try_parse_from(["greenmodel-cli", "train", "--dataset", "iris", "--trees", "150"]);
        assert!(parsed.is_ok());
    }

    #[test]
    fn test_unknown_dataset_is_rejected_by_parser() {
        let parsed = Args::try_parse_from(["greenmodel-cli", "train", "--dataset", "mnist"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_sweep_values_are_comma_separated() {
        let parsed = Args::try_parse_from([
            "greenmodel-cli", "sweep", "--dataset", "wine", "--model", "lr", "--values", "50,100,150",
        ])
        .unwrap();
        match parsed.command {
            Some(Command::Sweep(sweep)) => assert_eq!(sweep.values, vec![50, 100, 150]),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
