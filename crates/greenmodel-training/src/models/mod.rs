//! Classification backends with a `fit`/`predict` surface.

pub mod forest;
pub mod logistic;

use crate::error::{TrainingError, TrainingResult};
use crate::job::ModelKind;
use ndarray::Array2;

pub use forest::{DecisionTree, RandomForest};
pub use logistic::LogisticRegression;

pub trait Classifier {
    /// Predict one class label per row of `x`.
    fn predict(&self, x: &Array2<f64>) -> Vec<usize>;
}

/// A fitted model, returned to callers as an opaque handle.
#[derive(Debug, Clone)]
pub enum TrainedModel {
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
}

impl TrainedModel {
    #[must_use]
    pub fn kind(&self) -> ModelKind {
        match self {
            Self::RandomForest(_) => ModelKind::RandomForest,
            Self::LogisticRegression(_) => ModelKind::LogisticRegression,
        }
    }
}

impl Classifier for TrainedModel {
    fn predict(&self, x: &Array2<f64>) -> Vec<usize> {
        match self {
            Self::RandomForest(model) => model.predict(x),
            Self::LogisticRegression(model) => model.predict(x),
        }
    }
}

/// Percentage of `predicted` labels equal to `truth`, unrounded.
pub fn accuracy_pct(truth: &[usize], predicted: &[usize]) -> TrainingResult<f64> {
    if truth.is_empty() {
        return Err(TrainingError::Trainer("cannot score an empty test partition".to_string()));
    }
    if truth.len() != predicted.len() {
        return Err(TrainingError::Trainer(format!(
            "prediction count {} does not match label count {}",
            predicted.len(),
            truth.len()
        )));
    }
    let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
    Ok(correct as f64 / truth.len() as f64 * 100.0)
}

/// Index of the largest value; the lowest index wins ties.
pub(crate) fn argmax<I>(values: I) -> usize
where
    I: IntoIterator,
    I::Item: PartialOrd,
{
    let mut best: Option<(usize, I::Item)> = None;
    for (idx, value) in values.into_iter().enumerate() {
        let is_better = best.as_ref().map_or(true, |(_, current)| value > *current);
        if is_better {
            best = Some((idx, value));
        }
    }
    best.map_or(0, |(idx, _)| idx)
}
