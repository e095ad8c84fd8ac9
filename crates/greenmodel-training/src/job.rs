use crate::dataset::{DatasetName, SplitOptions};
use crate::error::{TrainingError, TrainingResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier for a training job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrainingJobId(pub String);

impl TrainingJobId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for TrainingJobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TrainingJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    RandomForest,
    LogisticRegression,
}

impl ModelKind {
    pub const ALL: [Self; 2] = [Self::RandomForest, Self::LogisticRegression];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::RandomForest => "Random Forest",
            Self::LogisticRegression => "Logistic Regression",
        }
    }

    /// Advertised range for this kind's single hyperparameter.
    #[must_use]
    pub fn param_range(self) -> RangeInclusive<u32> {
        match self {
            Self::RandomForest => TREE_COUNT_RANGE,
            Self::LogisticRegression => MAX_ITERATIONS_RANGE,
        }
    }

    /// UI step between selectable values.
    #[must_use]
    pub fn param_step(self) -> u32 {
        match self {
            Self::RandomForest => 10,
            Self::LogisticRegression => 50,
        }
    }

    #[must_use]
    pub fn default_params(self) -> HyperParams {
        self.params(100)
    }

    /// Build the hyperparameters for this kind from its single value.
    #[must_use]
    pub fn params(self, value: u32) -> HyperParams {
        match self {
            Self::RandomForest => HyperParams::RandomForest { tree_count: value },
            Self::LogisticRegression => HyperParams::LogisticRegression { max_iterations: value },
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ModelKind {
    type Err = TrainingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "random_forest" | "rf" => Ok(Self::RandomForest),
            "logistic_regression" | "logreg" | "lr" => Ok(Self::LogisticRegression),
            _ => Err(TrainingError::UnknownModel(s.to_string())),
        }
    }
}

pub const TREE_COUNT_RANGE: RangeInclusive<u32> = 10..=200;
pub const MAX_ITERATIONS_RANGE: RangeInclusive<u32> = 50..=500;

/// The one hyperparameter that matters for each model kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum HyperParams {
    RandomForest { tree_count: u32 },
    LogisticRegression { max_iterations: u32 },
}

impl HyperParams {
    #[must_use]
    pub fn model_kind(&self) -> ModelKind {
        match self {
            Self::RandomForest { .. } => ModelKind::RandomForest,
            Self::LogisticRegression { .. } => ModelKind::LogisticRegression,
        }
    }

    #[must_use]
    pub fn value(&self) -> u32 {
        match *self {
            Self::RandomForest { tree_count } => tree_count,
            Self::LogisticRegression { max_iterations } => max_iterations,
        }
    }

    /// Text shown in run tables, e.g. `Trees: 100` or `Epochs: 200`.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::RandomForest { tree_count } => format!("Trees: {tree_count}"),
            Self::LogisticRegression { max_iterations } => format!("Epochs: {max_iterations}"),
        }
    }

    /// Check the advertised range. Callers validate at the boundary; trainers do not.
    pub fn validate(&self) -> TrainingResult<()> {
        let range = self.model_kind().param_range();
        if !range.contains(&self.value()) {
            let name = match self {
                Self::RandomForest { .. } => "tree_count",
                Self::LogisticRegression { .. } => "max_iterations",
            };
            return Err(TrainingError::InvalidSpec(format!(
                "{name} must be in {}..={}, got {}",
                range.start(),
                range.end(),
                self.value()
            )));
        }
        Ok(())
    }
}

impl fmt::Display for HyperParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingJobSpec {
    pub job_id: TrainingJobId,
    pub created_at: DateTime<Utc>,
    pub dataset: DatasetName,
    pub params: HyperParams,
    #[serde(default)]
    pub split: SplitOptions,
    /// Seed for stochastic fitting (bootstrap and feature sampling).
    #[serde(default = "default_fit_seed")]
    pub fit_seed: u64,
}

fn default_fit_seed() -> u64 {
    42
}

impl TrainingJobSpec {
    #[must_use]
    pub fn new(dataset: DatasetName, params: HyperParams) -> Self {
        Self {
            job_id: TrainingJobId::new(),
            created_at: Utc::now(),
            dataset,
            params,
            split: SplitOptions::default(),
            fit_seed: default_fit_seed(),
        }
    }

    #[must_use]
    pub fn model_kind(&self) -> ModelKind {
        self.params.model_kind()
    }

    pub fn validate(&self) -> TrainingResult<()> {
        self.params.validate()?;
        if !(self.split.test_ratio > 0.0 && self.split.test_ratio < 1.0) {
            return Err(TrainingError::InvalidSpec("split.test_ratio must be in (0, 1)".to_string()));
        }
        Ok(())
    }
}
