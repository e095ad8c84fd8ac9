//! Session context and command handling.
//!
//! A [`Session`] owns one run log and one measurement provider. Every user
//! action is a [`SessionCommand`] handled once, yielding an immutable
//! [`SessionView`] for the presentation layer.

use crate::analysis::{greenest_for, trend};
use crate::emissions::{measure, EmissionsProvider};
use crate::equivalence::{latest_footprint, to_equivalents, EquivalenceReport, LatestRunFootprint};
use crate::error::{EngineError, EngineResult};
use crate::runlog::{RunLog, TrainingRunRecord};
use greenmodel_training::{DatasetName, ProgressSink, Trainer, TrainingJobSpec};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// One user action.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Train and measure one model, then append the run.
    Train(TrainingJobSpec),
    /// Refresh the view for `selected` without training.
    View { selected: DatasetName },
}

/// Everything the presentation layer renders after a command.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    /// Record appended by this command, if it trained.
    pub appended: Option<TrainingRunRecord>,
    pub runs: Vec<TrainingRunRecord>,
    pub trend: Vec<f64>,
    pub selected_dataset: DatasetName,
    /// `None` until the selected dataset has a run.
    pub greenest: Option<TrainingRunRecord>,
    /// Equivalents of the latest run; `None` on an empty log.
    pub latest_equivalents: Option<EquivalenceReport>,
    pub latest_footprint: Option<LatestRunFootprint>,
}

impl SessionView {
    #[must_use]
    pub fn latest(&self) -> Option<&TrainingRunRecord> {
        self.runs.last()
    }
}

pub struct Session<P> {
    id: Uuid,
    log: RunLog,
    provider: P,
    trainer: Arc<dyn Trainer>,
    progress: Arc<dyn ProgressSink>,
}

impl<P: EmissionsProvider> Session<P> {
    pub fn new(provider: P, trainer: Arc<dyn Trainer>, progress: Arc<dyn ProgressSink>) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(session = %id, trainer = trainer.id(), "session opened");
        Self { id, log: RunLog::new(), provider, trainer, progress }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn log(&self) -> &RunLog {
        &self.log
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Handle one command. A failed `Train` leaves the log untouched.
    pub async fn handle(&mut self, command: SessionCommand) -> EngineResult<SessionView> {
        match command {
            SessionCommand::Train(job) => {
                let record = self.train(&job).await?;
                let appended = self.log.append(record).clone();
                self.view(job.dataset, Some(appended))
            }
            SessionCommand::View { selected } => self.view(selected, None),
        }
    }

    /// `job.params` must already be within the advertised range; callers validate at the boundary.
    async fn train(&mut self, job: &TrainingJobSpec) -> EngineResult<TrainingRunRecord> {
        let trainer = Arc::clone(&self.trainer);
        let progress = Arc::clone(&self.progress);
        let work = async move { trainer.train(job, progress.as_ref()).await.map_err(EngineError::from) };
        let measured = measure(&mut self.provider, work).await?;

        let emissions_g = measured.emissions_kg * 1000.0;
        tracing::info!(
            session = %self.id,
            dataset = %job.dataset,
            params = %job.params,
            accuracy_pct = measured.output.accuracy_pct,
            emissions_g,
            "run measured"
        );
        TrainingRunRecord::new(job.dataset, job.params, measured.output.accuracy_pct, emissions_g)
    }

    fn view(&self, selected: DatasetName, appended: Option<TrainingRunRecord>) -> EngineResult<SessionView> {
        let greenest = match greenest_for(&self.log, selected) {
            Ok(record) => Some(record.clone()),
            Err(EngineError::EmptyLog) => None,
            Err(err) => return Err(err),
        };

        let (latest_equivalents, latest_footprint) = match self.log.latest() {
            Some(latest) => (
                Some(to_equivalents(latest.emissions_g())?),
                Some(latest_footprint(latest.emissions_g())?),
            ),
            None => (None, None),
        };

        Ok(SessionView {
            appended,
            runs: self.log.all().to_vec(),
            trend: trend(&self.log),
            selected_dataset: selected,
            greenest,
            latest_equivalents,
            latest_footprint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emissions::adapter::tests::FixedProvider;
    use crate::equivalence::Activity;
    use greenmodel_training::{
        BundledDatasets, HyperParams, LocalTrainer, TracingProgressSink, TrainingError, TrainingOutcome,
        TrainingResult,
    };

    struct FailingTrainer;

    #[async_trait::async_trait]
    impl Trainer for FailingTrainer {
        fn id(&self) -> &'static str {
            "failing"
        }

        async fn train(&self, _job: &TrainingJobSpec, _progress: &dyn ProgressSink) -> TrainingResult<TrainingOutcome> {
            Err(TrainingError::Trainer("out of memory".to_string()))
        }
    }

    fn session(provider: FixedProvider) -> Session<FixedProvider> {
        Session::new(
            provider,
            Arc::new(LocalTrainer::new(Arc::new(BundledDatasets::new()))),
            Arc::new(TracingProgressSink),
        )
    }

    fn iris_job(trees: u32) -> SessionCommand {
        SessionCommand::Train(TrainingJobSpec::new(DatasetName::Iris, HyperParams::RandomForest { tree_count: trees }))
    }

    #[tokio::test]
    async fn test_view_on_empty_session() {
        let mut session = session(FixedProvider::new(0.001));
        let view = session.handle(SessionCommand::View { selected: DatasetName::Wine }).await.unwrap();
        assert!(view.appended.is_none());
        assert!(view.runs.is_empty());
        assert!(view.trend.is_empty());
        assert!(view.greenest.is_none());
        assert!(view.latest_equivalents.is_none());
        assert!(view.latest_footprint.is_none());
    }

    #[tokio::test]
    async fn test_train_appends_exactly_one_record() {
        let mut session = session(FixedProvider::new(0.005));
        let view = session.handle(iris_job(10)).await.unwrap();

        assert_eq!(session.log().len(), 1);
        let appended = view.appended.as_ref().unwrap();
        assert_eq!(appended.dataset(), DatasetName::Iris);
        assert_eq!(appended.params_summary(), "Trees: 10");
        assert!((appended.emissions_g() - 5.0).abs() < 1e-9);
        assert!(appended.accuracy_pct() > 70.0);

        assert_eq!(view.selected_dataset, DatasetName::Iris);
        assert_eq!(view.greenest.as_ref(), Some(appended));
        let equivalents = view.latest_equivalents.unwrap();
        assert_eq!(equivalents.get(Activity::StreamingVideo), Some("1.25 minutes"));
        assert_eq!(session.provider().starts, 1);
        assert_eq!(session.provider().stops, 1);
    }

    #[tokio::test]
    async fn test_failed_measurement_leaves_log_untouched() {
        let mut session = session(FixedProvider { fail_stop: true, ..FixedProvider::new(0.01) });
        let err = session.handle(iris_job(10)).await.unwrap_err();
        assert!(matches!(err, EngineError::MeasurementUnavailable(_)));
        assert!(session.log().is_empty());
    }

    #[tokio::test]
    async fn test_failed_training_leaves_log_untouched() {
        let mut session = Session::new(FixedProvider::new(0.01), Arc::new(FailingTrainer), Arc::new(TracingProgressSink));
        let err = session.handle(iris_job(10)).await.unwrap_err();
        assert!(matches!(err, EngineError::TrainingFailed(_)));
        assert!(session.log().is_empty());
        assert!(!session.provider().active);
    }

    #[tokio::test]
    async fn test_breast_cancer_trains_without_data_dir() {
        let mut session = session(FixedProvider::new(0.01));
        let job = TrainingJobSpec::new(DatasetName::BreastCancer, HyperParams::LogisticRegression { max_iterations: 100 });
        let view = session.handle(SessionCommand::Train(job)).await.unwrap();
        assert_eq!(view.appended.unwrap().dataset(), DatasetName::BreastCancer);
        assert_eq!(session.log().len(), 1);
    }

    #[tokio::test]
    async fn test_params_are_not_checked_again() {
        let mut session = session(FixedProvider::new(0.01));
        let view = session.handle(iris_job(5)).await.unwrap();
        assert_eq!(view.appended.unwrap().params_summary(), "Trees: 5");
        assert_eq!(session.provider().starts, 1);
    }

    #[tokio::test]
    async fn test_greenest_tracks_selected_dataset() {
        let mut session = session(FixedProvider::new(0.004));
        session.handle(iris_job(10)).await.unwrap();
        session.provider.kg = 0.002;
        session.handle(iris_job(20)).await.unwrap();
        session.provider.kg = 0.003;
        let view = session.handle(iris_job(30)).await.unwrap();

        assert_eq!(view.runs.len(), 3);
        assert_eq!(view.trend.len(), 3);
        assert_eq!(view.greenest.as_ref().unwrap().params_summary(), "Trees: 20");
        assert!((view.latest().unwrap().emissions_g() - 3.0).abs() < 1e-9);

        let other = session.handle(SessionCommand::View { selected: DatasetName::BreastCancer }).await.unwrap();
        assert!(other.greenest.is_none());
        assert!(other.latest_equivalents.is_some());
    }
}
