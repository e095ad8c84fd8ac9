//! GreenModel Core
//!
//! Emissions tracking engine for model training runs:
//! - Measuring training with an emissions provider (`emissions`)
//! - The session-scoped run log (`runlog`) and its analysis (`analysis`)
//! - Real-world equivalents of an emissions quantity (`equivalence`)
//! - Per-action command handling (`session`)
//! - Export of run history (`export`) and configuration (`config`)

pub mod analysis;
pub mod config;
pub mod emissions;
pub mod equivalence;
pub mod error;
pub mod export;
pub mod runlog;
pub mod session;

pub use analysis::{greenest_for, greenest_per_dataset, trend};
pub use config::{CliConfig, ConfigError, ConfigResult, EmissionsConfig, EmissionsSection, OutputConfig};
pub use emissions::{
    measure, EmissionsProvider, EmissionsReading, Measured, PowerModelTracker, ProviderError, ProviderResult, SideLog,
};
pub use equivalence::{
    format_units, latest_footprint, to_equivalents, Activity, EquivalenceReport, Equivalent, LatestRunFootprint,
};
pub use error::{EngineError, EngineResult};
pub use export::{export_runs, write_export, ExportError, ExportFormat, RunRow};
pub use runlog::{min_emissions, RunLog, TrainingRunRecord};
pub use session::{Session, SessionCommand, SessionView};
