//! Command implementations for the GreenModel CLI.

pub mod config;
pub mod datasets;
pub mod display;
pub mod equivalents;
pub mod export;
pub mod session;
pub mod spinner;
pub mod sweep;
pub mod tips;
pub mod train;

pub use config::ConfigCommand;
pub use sweep::SweepArgs;
pub use train::TrainArgs;
