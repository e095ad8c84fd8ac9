use crate::error::{TrainingError, TrainingResult};
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// The three bundled classification datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetName {
    Iris,
    Wine,
    BreastCancer,
}

impl DatasetName {
    pub const ALL: [Self; 3] = [Self::Iris, Self::Wine, Self::BreastCancer];

    /// Human-facing name, as shown in run tables.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Iris => "Iris",
            Self::Wine => "Wine",
            Self::BreastCancer => "Breast Cancer",
        }
    }

    /// File stem used for `<data_dir>/<stem>.csv`.
    #[must_use]
    pub fn file_stem(self) -> &'static str {
        match self {
            Self::Iris => "iris",
            Self::Wine => "wine",
            Self::BreastCancer => "breast_cancer",
        }
    }
}

impl fmt::Display for DatasetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DatasetName {
    type Err = TrainingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "iris" => Ok(Self::Iris),
            "wine" => Ok(Self::Wine),
            "breast_cancer" => Ok(Self::BreastCancer),
            _ => Err(TrainingError::UnknownDataset(s.to_string())),
        }
    }
}

/// Feature matrix plus integer class labels (`0..n_classes`).
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: DatasetName,
    pub features: Array2<f64>,
    pub labels: Vec<usize>,
}

impl Dataset {
    pub fn new(name: DatasetName, features: Array2<f64>, labels: Vec<usize>) -> TrainingResult<Self> {
        let dataset = Self { name, features, labels };
        dataset.validate()?;
        Ok(dataset)
    }

    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Number of classes, taken as `max(label) + 1`.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.labels.iter().max().map_or(0, |m| m + 1)
    }

    pub fn validate(&self) -> TrainingResult<()> {
        if self.n_samples() == 0 || self.n_features() == 0 {
            return Err(TrainingError::Dataset(format!("{} has no samples or no features", self.name)));
        }
        if self.labels.len() != self.n_samples() {
            return Err(TrainingError::Dataset(format!(
                "{}: {} labels for {} samples",
                self.name,
                self.labels.len(),
                self.n_samples()
            )));
        }
        if self.features.iter().any(|v| !v.is_finite()) {
            return Err(TrainingError::Dataset(format!("{} contains non-finite feature values", self.name)));
        }
        let classes: BTreeSet<usize> = self.labels.iter().copied().collect();
        if classes.len() < 2 {
            return Err(TrainingError::Dataset(format!("{} needs at least two classes", self.name)));
        }
        Ok(())
    }

    /// Shuffle-split into train/test partitions.
    ///
    /// The test partition holds `ceil(test_ratio * n)` samples; the permutation is
    /// fully determined by `options.seed`.
    pub fn split(&self, options: &SplitOptions) -> TrainingResult<TrainTestSplit> {
        let n = self.n_samples();
        let n_test = (options.test_ratio * n as f64).ceil() as usize;
        if n_test == 0 || n_test >= n {
            return Err(TrainingError::Dataset(format!(
                "cannot split {n} samples with test ratio {}",
                options.test_ratio
            )));
        }

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(options.seed);
        indices.shuffle(&mut rng);
        let (test_idx, train_idx) = indices.split_at(n_test);

        Ok(TrainTestSplit {
            x_train: self.features.select(Axis(0), train_idx),
            y_train: train_idx.iter().map(|&i| self.labels[i]).collect(),
            x_test: self.features.select(Axis(0), test_idx),
            y_test: test_idx.iter().map(|&i| self.labels[i]).collect(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitOptions {
    pub test_ratio: f64,
    pub seed: u64,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self { test_ratio: 0.2, seed: 42 }
    }
}

#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub y_train: Vec<usize>,
    pub x_test: Array2<f64>,
    pub y_test: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn toy() -> Dataset {
        let features = Array2::from_shape_fn((10, 2), |(i, j)| (i * 2 + j) as f64);
        let labels = (0..10).map(|i| i % 2).collect();
        Dataset::new(DatasetName::Iris, features, labels).unwrap()
    }

    #[test]
    fn test_parse_dataset_names() {
        assert_eq!("iris".parse::<DatasetName>().unwrap(), DatasetName::Iris);
        assert_eq!("Wine".parse::<DatasetName>().unwrap(), DatasetName::Wine);
        assert_eq!("Breast Cancer".parse::<DatasetName>().unwrap(), DatasetName::BreastCancer);
        assert_eq!("breast-cancer".parse::<DatasetName>().unwrap(), DatasetName::BreastCancer);
    }

    #[test]
    fn test_unknown_dataset_is_rejected() {
        let err = "mnist".parse::<DatasetName>().unwrap_err();
        assert!(matches!(err, TrainingError::UnknownDataset(name) if name == "mnist"));
    }

    #[test]
    fn test_validate_rejects_label_mismatch() {
        let features = array![[1.0, 2.0], [3.0, 4.0]];
        assert!(Dataset::new(DatasetName::Wine, features, vec![0]).is_err());
    }

    #[test]
    fn test_validate_rejects_single_class() {
        let features = array![[1.0], [2.0], [3.0]];
        assert!(Dataset::new(DatasetName::Wine, features, vec![1, 1, 1]).is_err());
    }

    #[test]
    fn test_split_sizes_and_determinism() {
        let ds = toy();
        let a = ds.split(&SplitOptions::default()).unwrap();
        let b = ds.split(&SplitOptions::default()).unwrap();

        assert_eq!(a.x_test.nrows(), 2);
        assert_eq!(a.x_train.nrows(), 8);
        assert_eq!(a.y_test, b.y_test);
        assert_eq!(a.x_train, b.x_train);
    }

    #[test]
    fn test_split_partitions_are_disjoint() {
        let ds = toy();
        let split = ds.split(&SplitOptions::default()).unwrap();
        // Column 0 is unique per row, so it identifies the sample.
        let mut seen: Vec<f64> = split
            .x_train
            .column(0)
            .iter()
            .chain(split.x_test.column(0).iter())
            .copied()
            .collect();
        seen.sort_by(f64::total_cmp);
        seen.dedup();
        assert_eq!(seen.len(), 10);
    }
}
