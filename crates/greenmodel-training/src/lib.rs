//! GreenModel Training
//!
//! Deterministic classification training primitives for:
//! - Naming and loading the bundled datasets (`DatasetName`, `DatasetSource`)
//! - Describing a run (`TrainingJobSpec`, `HyperParams`)
//! - Fitting Random Forest / Logistic Regression models (`models`)
//! - Running jobs through a backend (`Trainer`)

pub mod dataset;
pub mod error;
pub mod job;
pub mod models;
pub mod progress;
pub mod source;
pub mod trainer;

pub use dataset::{Dataset, DatasetName, SplitOptions, TrainTestSplit};
pub use error::{TrainingError, TrainingResult};
pub use job::{HyperParams, ModelKind, TrainingJobId, TrainingJobSpec, MAX_ITERATIONS_RANGE, TREE_COUNT_RANGE};
pub use models::{accuracy_pct, Classifier, TrainedModel};
pub use progress::{ProgressEvent, ProgressSink, TracingProgressSink};
pub use source::{parse_csv_dataset, BundledDatasets, DatasetSource};
pub use trainer::{fit_and_score, LocalTrainer, Trainer, TrainingOutcome};
