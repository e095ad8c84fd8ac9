//! Views derived from the run log on demand. Nothing here is cached.

use crate::error::{EngineError, EngineResult};
use crate::runlog::{min_emissions, RunLog, TrainingRunRecord};
use greenmodel_training::DatasetName;

/// Lowest-emission run for `dataset`, or [`EngineError::EmptyLog`] if it has no runs.
pub fn greenest_for(log: &RunLog, dataset: DatasetName) -> EngineResult<&TrainingRunRecord> {
    min_emissions(log.filter_by_dataset(dataset))
}

/// Raw `emissions_g` per run in insertion order.
#[must_use]
pub fn trend(log: &RunLog) -> Vec<f64> {
    log.iter().map(TrainingRunRecord::emissions_g).collect()
}

/// Greenest run for every dataset that has at least one run, in [`DatasetName::ALL`] order.
#[must_use]
pub fn greenest_per_dataset(log: &RunLog) -> Vec<&TrainingRunRecord> {
    DatasetName::ALL
        .into_iter()
        .filter_map(|dataset| match greenest_for(log, dataset) {
            Ok(record) => Some(record),
            Err(EngineError::EmptyLog) => None,
            Err(err) => {
                tracing::warn!(%dataset, error = %err, "could not compute greenest run");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenmodel_training::HyperParams;

    fn push(log: &mut RunLog, dataset: DatasetName, value: u32, emissions_g: f64) {
        let params = HyperParams::LogisticRegression { max_iterations: value };
        log.append(TrainingRunRecord::new(dataset, params, 95.0, emissions_g).unwrap());
    }

    #[test]
    fn test_greenest_for_dataset() {
        let mut log = RunLog::new();
        push(&mut log, DatasetName::Wine, 50, 0.4);
        push(&mut log, DatasetName::Iris, 100, 0.1);
        push(&mut log, DatasetName::Wine, 150, 0.2);
        push(&mut log, DatasetName::Wine, 200, 0.2);

        let greenest = greenest_for(&log, DatasetName::Wine).unwrap();
        assert_eq!(greenest.params().value(), 150);
    }

    #[test]
    fn test_greenest_for_dataset_without_runs() {
        let mut log = RunLog::new();
        push(&mut log, DatasetName::Iris, 100, 0.1);
        assert!(matches!(greenest_for(&log, DatasetName::BreastCancer), Err(EngineError::EmptyLog)));
    }

    #[test]
    fn test_trend_is_raw_and_ordered() {
        let mut log = RunLog::new();
        assert!(trend(&log).is_empty());
        push(&mut log, DatasetName::Iris, 50, 0.3);
        push(&mut log, DatasetName::Wine, 50, 9.0);
        push(&mut log, DatasetName::Iris, 50, 0.1);
        assert_eq!(trend(&log), vec![0.3, 9.0, 0.1]);
    }

    #[test]
    fn test_greenest_per_dataset_skips_empty() {
        let mut log = RunLog::new();
        push(&mut log, DatasetName::BreastCancer, 50, 0.5);
        push(&mut log, DatasetName::Iris, 50, 0.3);
        push(&mut log, DatasetName::Iris, 100, 0.2);

        let rows = greenest_per_dataset(&log);
        let datasets: Vec<DatasetName> = rows.iter().map(|r| r.dataset()).collect();
        assert_eq!(datasets, vec![DatasetName::Iris, DatasetName::BreastCancer]);
        assert_eq!(rows[0].params().value(), 100);
    }
}
