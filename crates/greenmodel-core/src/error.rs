//! Engine error taxonomy.

use crate::emissions::ProviderError;
use crate::export::ExportError;
use greenmodel_training::TrainingError;
use thiserror::Error;

/// Errors surfaced by the tracking engine.
///
/// Every variant is scoped to a single request; none leaves the run log modified.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The dataset name is not one of the bundled datasets.
    #[error("unknown dataset: {0}")]
    UnknownDataset(String),

    /// Loading, splitting or fitting failed; nothing was recorded.
    #[error("training failed: {0}")]
    TrainingFailed(String),

    /// The emissions provider could not start, stop or report.
    #[error("emissions measurement unavailable: {0}")]
    MeasurementUnavailable(String),

    /// The queried (sub)sequence of runs is empty.
    #[error("no training runs recorded yet")]
    EmptyLog,

    /// Emissions must be finite and non-negative.
    #[error("invalid emissions value: {0}")]
    InvalidEmissions(f64),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

impl From<TrainingError> for EngineError {
    fn from(err: TrainingError) -> Self {
        match err {
            TrainingError::UnknownDataset(name) => Self::UnknownDataset(name),
            other => Self::TrainingFailed(other.to_string()),
        }
    }
}

impl From<ProviderError> for EngineError {
    fn from(err: ProviderError) -> Self {
        Self::MeasurementUnavailable(err.to_string())
    }
}

impl EngineError {
    /// Caller-contract violations; the request should not have been made.
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::UnknownDataset(_) | Self::InvalidEmissions(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_dataset_keeps_its_identity() {
        let err: EngineError = TrainingError::UnknownDataset("mnist".to_string()).into();
        assert!(matches!(err, EngineError::UnknownDataset(ref name) if name == "mnist"));
        assert!(err.is_contract_violation());
    }

    #[test]
    fn test_other_training_errors_become_training_failed() {
        let err: EngineError = TrainingError::Dataset("ragged rows".to_string()).into();
        assert!(matches!(err, EngineError::TrainingFailed(_)));
        assert!(err.to_string().contains("ragged rows"));
        assert!(!err.is_contract_violation());
    }

    #[test]
    fn test_provider_errors_become_measurement_unavailable() {
        let err: EngineError = ProviderError::NotStarted.into();
        assert!(matches!(err, EngineError::MeasurementUnavailable(_)));
    }
}
