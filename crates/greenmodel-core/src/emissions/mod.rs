//! Emissions measurement.
//!
//! An [`EmissionsProvider`] samples resource usage between `start` and `stop`
//! and reports kilograms of CO₂eq. [`measure`] wraps a unit of work in one
//! such session.

pub mod adapter;
pub mod side_log;
pub mod tracker;

pub use adapter::{measure, Measured};
pub use side_log::{EmissionsReading, SideLog};
pub use tracker::PowerModelTracker;

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a measurement provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("measurement session already started")]
    AlreadyStarted,

    #[error("no active measurement session")]
    NotStarted,

    #[error("invalid provider configuration: {0}")]
    InvalidConfig(String),

    #[error("sampler failed: {0}")]
    Sampler(String),
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// External measurement session.
///
/// Implementations hold at most one active session; `start` on an active
/// provider and `stop` on an idle one are errors.
#[async_trait]
pub trait EmissionsProvider: Send {
    /// Begin sampling.
    async fn start(&mut self) -> ProviderResult<()>;

    /// End sampling and return total emissions in kilograms of CO₂eq.
    async fn stop(&mut self) -> ProviderResult<f64>;
}
