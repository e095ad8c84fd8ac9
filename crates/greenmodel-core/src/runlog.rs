//! Append-only, session-scoped log of training runs.

use crate::error::{EngineError, EngineResult};
use crate::export::RunRow;
use greenmodel_training::{DatasetName, HyperParams, ModelKind};
use serde::Serialize;

/// One completed training invocation. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "RunRow")]
pub struct TrainingRunRecord {
    dataset: DatasetName,
    params: HyperParams,
    accuracy_pct: f64,
    emissions_g: f64,
}

impl TrainingRunRecord {
    /// Build a record, rejecting negative or non-finite emissions.
    pub fn new(dataset: DatasetName, params: HyperParams, accuracy_pct: f64, emissions_g: f64) -> EngineResult<Self> {
        if !emissions_g.is_finite() || emissions_g < 0.0 {
            return Err(EngineError::InvalidEmissions(emissions_g));
        }
        if !(0.0..=100.0).contains(&accuracy_pct) {
            return Err(EngineError::TrainingFailed(format!("accuracy {accuracy_pct} is outside 0..=100")));
        }
        Ok(Self { dataset, params, accuracy_pct, emissions_g })
    }

    #[must_use]
    pub fn dataset(&self) -> DatasetName {
        self.dataset
    }

    #[must_use]
    pub fn model_kind(&self) -> ModelKind {
        self.params.model_kind()
    }

    #[must_use]
    pub fn params(&self) -> HyperParams {
        self.params
    }

    /// `Trees: N` or `Epochs: N`, depending on the model kind.
    #[must_use]
    pub fn params_summary(&self) -> String {
        self.params.summary()
    }

    #[must_use]
    pub fn accuracy_pct(&self) -> f64 {
        self.accuracy_pct
    }

    #[must_use]
    pub fn emissions_g(&self) -> f64 {
        self.emissions_g
    }
}

/// Ordered run history. Insertion order is chronological order.
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    records: Vec<TrainingRunRecord>,
}

impl RunLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record at the tail and return a reference to it.
    pub fn append(&mut self, record: TrainingRunRecord) -> &TrainingRunRecord {
        self.records.push(record);
        tracing::debug!(runs = self.records.len(), "run appended");
        &self.records[self.records.len() - 1]
    }

    /// Full history in insertion order.
    #[must_use]
    pub fn all(&self) -> &[TrainingRunRecord] {
        &self.records
    }

    /// Runs for `dataset`, keeping their original relative order. May be empty.
    #[must_use]
    pub fn filter_by_dataset(&self, dataset: DatasetName) -> Vec<&TrainingRunRecord> {
        self.records.iter().filter(|r| r.dataset == dataset).collect()
    }

    /// Most recently appended record; `None` means no runs yet.
    #[must_use]
    pub fn latest(&self) -> Option<&TrainingRunRecord> {
        self.records.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrainingRunRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a RunLog {
    type Item = &'a TrainingRunRecord;
    type IntoIter = std::slice::Iter<'a, TrainingRunRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Record with the smallest `emissions_g`; the earliest one wins ties.
///
/// Fails with [`EngineError::EmptyLog`] when `records` is empty.
pub fn min_emissions<'a, I>(records: I) -> EngineResult<&'a TrainingRunRecord>
where
    I: IntoIterator<Item = &'a TrainingRunRecord>,
{
    records
        .into_iter()
        .min_by(|a, b| a.emissions_g.total_cmp(&b.emissions_g))
        .ok_or(EngineError::EmptyLog)
}
