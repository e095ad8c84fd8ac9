use crate::error::{TrainingError, TrainingResult};
use crate::job::{HyperParams, TrainingJobSpec};
use crate::models::logistic::LogisticOptions;
use crate::models::{accuracy_pct, Classifier, LogisticRegression, RandomForest, TrainedModel};
use crate::progress::{ProgressEvent, ProgressSink};
use crate::source::DatasetSource;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of one fit-and-score invocation.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// Test-partition accuracy in percent, unrounded.
    pub accuracy_pct: f64,
    pub model: TrainedModel,
    pub train_samples: usize,
    pub test_samples: usize,
    pub elapsed: Duration,
}

#[async_trait]
pub trait Trainer: Send + Sync {
    fn id(&self) -> &'static str;

    /// Fit exactly one model for `job` and score it on the held-out partition.
    ///
    /// Hyperparameter ranges are a caller precondition (see `TrainingJobSpec::validate`).
    async fn train(&self, job: &TrainingJobSpec, progress: &dyn ProgressSink) -> TrainingResult<TrainingOutcome>;
}

/// In-process trainer backed by the bundled Random Forest and Logistic Regression.
#[derive(Clone)]
pub struct LocalTrainer {
    source: Arc<dyn DatasetSource>,
}

impl LocalTrainer {
    #[must_use]
    pub fn new(source: Arc<dyn DatasetSource>) -> Self {
        Self { source }
    }

    #[must_use]
    pub fn source(&self) -> &Arc<dyn DatasetSource> {
        &self.source
    }
}

/// Load, split, fit and score synchronously.
pub fn fit_and_score(source: &dyn DatasetSource, job: &TrainingJobSpec) -> TrainingResult<TrainingOutcome> {
    let started = Instant::now();
    let dataset = source.load(job.dataset)?;
    let n_classes = dataset.n_classes();
    let split = dataset.split(&job.split)?;
    tracing::debug!(
        dataset = %job.dataset,
        train = split.y_train.len(),
        test = split.y_test.len(),
        "dataset split"
    );

    let model = match job.params {
        HyperParams::RandomForest { tree_count } => TrainedModel::RandomForest(RandomForest::fit(
            &split.x_train,
            &split.y_train,
            n_classes,
            tree_count as usize,
            job.fit_seed,
        )?),
        HyperParams::LogisticRegression { max_iterations } => {
            let options = LogisticOptions { max_iterations: max_iterations as usize, ..Default::default() };
            TrainedModel::LogisticRegression(LogisticRegression::fit(
                &split.x_train,
                &split.y_train,
                n_classes,
                &options,
            )?)
        }
    };

    let predicted = model.predict(&split.x_test);
    let accuracy_pct = accuracy_pct(&split.y_test, &predicted)?;

    Ok(TrainingOutcome {
        accuracy_pct,
        model,
        train_samples: split.y_train.len(),
        test_samples: split.y_test.len(),
        elapsed: started.elapsed(),
    })
}

#[async_trait]
impl Trainer for LocalTrainer {
    fn id(&self) -> &'static str {
        "local"
    }

    async fn train(&self, job: &TrainingJobSpec, progress: &dyn ProgressSink) -> TrainingResult<TrainingOutcome> {
        let job_id = job.job_id.clone();
        progress.on_event(ProgressEvent::Started { job_id: job_id.clone() });
        progress.on_event(ProgressEvent::Message {
            job_id: job_id.clone(),
            message: format!("fitting {} on {}", job.params, job.dataset),
        });

        let source = Arc::clone(&self.source);
        let spec = job.clone();
        let outcome = tokio::task::spawn_blocking(move || fit_and_score(source.as_ref(), &spec))
            .await
            .map_err(|e| TrainingError::Trainer(format!("training task failed: {e}")))??;

        progress.on_event(ProgressEvent::Finished { job_id });
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, DatasetName};
    use crate::job::ModelKind;
    use crate::progress::TracingProgressSink;
    use crate::source::BundledDatasets;
    use ndarray::Array2;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<String>>,
    }

    impl ProgressSink for RecordingSink {
        fn on_event(&self, event: ProgressEvent) {
            let tag = match event {
                ProgressEvent::Started { .. } => "started",
                ProgressEvent::Message { .. } => "message",
                ProgressEvent::Finished { .. } => "finished",
            };
            self.events.lock().unwrap().push(tag.to_string());
        }
    }

    struct BrokenSource;

    impl DatasetSource for BrokenSource {
        fn load(&self, name: DatasetName) -> TrainingResult<Dataset> {
            Err(TrainingError::Dataset(format!("{name} is corrupt")))
        }
    }

    fn bundled_trainer() -> LocalTrainer {
        LocalTrainer::new(Arc::new(BundledDatasets::new()))
    }

    #[tokio::test]
    async fn test_identical_jobs_give_identical_accuracy() {
        let source = BundledDatasets::new();
        let datasets: Vec<_> = DatasetName::ALL.into_iter().filter(|&name| source.is_available(name)).collect();
        assert!(datasets.contains(&DatasetName::BreastCancer));

        let trainer = LocalTrainer::new(Arc::new(source));
        for dataset in datasets {
            for kind in ModelKind::ALL {
                let a = TrainingJobSpec::new(dataset, kind.default_params());
                let b = TrainingJobSpec::new(dataset, kind.default_params());
                let first = trainer.train(&a, &TracingProgressSink).await.unwrap();
                let second = trainer.train(&b, &TracingProgressSink).await.unwrap();
                assert!((0.0..=100.0).contains(&first.accuracy_pct), "{dataset} {kind:?}");
                assert_eq!(first.accuracy_pct, second.accuracy_pct, "{dataset} {kind:?}");
                assert_eq!(first.model.kind(), kind);
            }
        }
    }

    #[tokio::test]
    async fn test_breast_cancer_models_beat_majority_class() {
        let trainer = bundled_trainer();
        let jobs = [
            HyperParams::RandomForest { tree_count: 200 },
            HyperParams::LogisticRegression { max_iterations: 500 },
        ];
        for params in jobs {
            let job = TrainingJobSpec::new(DatasetName::BreastCancer, params);
            let outcome = trainer.train(&job, &TracingProgressSink).await.unwrap();
            assert_eq!(outcome.test_samples, 114);
            assert_eq!(outcome.train_samples, 455);
            assert!(outcome.accuracy_pct > 75.0, "{params}: {}", outcome.accuracy_pct);
        }
    }

    #[tokio::test]
    async fn test_iris_accuracy_is_a_percentage() {
        let trainer = bundled_trainer();
        let job = TrainingJobSpec::new(DatasetName::Iris, HyperParams::RandomForest { tree_count: 10 });
        let outcome = trainer.train(&job, &TracingProgressSink).await.unwrap();
        assert!((0.0..=100.0).contains(&outcome.accuracy_pct));
        assert!(outcome.accuracy_pct > 70.0);
        assert_eq!(outcome.test_samples, 30);
        assert_eq!(outcome.train_samples, 120);
    }

    #[tokio::test]
    async fn test_progress_events_are_emitted_in_order() {
        let trainer = bundled_trainer();
        let sink = RecordingSink::default();
        let job = TrainingJobSpec::new(DatasetName::Iris, HyperParams::LogisticRegression { max_iterations: 50 });
        trainer.train(&job, &sink).await.unwrap();
        assert_eq!(*sink.events.lock().unwrap(), vec!["started", "message", "finished"]);
    }

    #[tokio::test]
    async fn test_source_failure_surfaces_as_error() {
        let trainer = LocalTrainer::new(Arc::new(BrokenSource));
        let job = TrainingJobSpec::new(DatasetName::Wine, ModelKind::RandomForest.default_params());
        let err = trainer.train(&job, &TracingProgressSink).await.unwrap_err();
        assert!(err.to_string().contains("corrupt"));
    }

    #[test]
    fn test_fit_and_score_on_in_memory_source() {
        struct Stripes;
        impl DatasetSource for Stripes {
            fn load(&self, name: DatasetName) -> TrainingResult<Dataset> {
                let features = Array2::from_shape_fn((40, 1), |(i, _)| i as f64);
                let labels = (0..40).map(|i| usize::from(i >= 20)).collect();
                Dataset::new(name, features, labels)
            }
        }

        let job = TrainingJobSpec::new(DatasetName::Wine, HyperParams::LogisticRegression { max_iterations: 200 });
        let outcome = fit_and_score(&Stripes, &job).unwrap();
        assert_eq!(outcome.test_samples, 8);
        assert!(outcome.accuracy_pct >= 75.0);
    }
}
