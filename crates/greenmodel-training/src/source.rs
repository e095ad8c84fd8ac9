use crate::dataset::{Dataset, DatasetName};
use crate::error::{TrainingError, TrainingResult};
use ndarray::Array2;
use std::path::{Path, PathBuf};

const IRIS_CSV: &str = include_str!("../data/iris.csv");
/// Wisconsin Diagnostic Breast Cancer, 569 x 30; label 0 is malignant, 1 benign.
const BREAST_CANCER_CSV: &str = include_str!("../data/breast_cancer.csv");

/// Supplies the feature matrix and labels for a named dataset.
pub trait DatasetSource: Send + Sync {
    fn load(&self, name: DatasetName) -> TrainingResult<Dataset>;

    /// Whether `load` can currently succeed for `name`.
    fn is_available(&self, name: DatasetName) -> bool {
        self.load(name).is_ok()
    }
}

/// Read-only reference data: embedded Iris and Breast Cancer plus `<data_dir>/<stem>.csv` files.
///
/// A file in the data directory takes precedence over the embedded copy.
#[derive(Debug, Clone, Default)]
pub struct BundledDatasets {
    data_dir: Option<PathBuf>,
}

impl BundledDatasets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: Some(data_dir.into()) }
    }

    #[must_use]
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    fn file_for(&self, name: DatasetName) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.csv", name.file_stem())))
            .filter(|path| path.is_file())
    }
}

impl DatasetSource for BundledDatasets {
    fn load(&self, name: DatasetName) -> TrainingResult<Dataset> {
        if let Some(path) = self.file_for(name) {
            tracing::debug!(dataset = %name, path = %path.display(), "loading dataset from file");
            let content = std::fs::read_to_string(&path)?;
            return parse_csv_dataset(name, &content);
        }

        match name {
            DatasetName::Iris => parse_csv_dataset(name, IRIS_CSV),
            DatasetName::BreastCancer => parse_csv_dataset(name, BREAST_CANCER_CSV),
            // TODO: embed the UCI Wine table (178 x 13) once data/wine.csv is checked in.
            DatasetName::Wine => Err(TrainingError::Dataset(format!(
                "{name} data not found; place {}.csv in the data directory",
                name.file_stem()
            ))),
        }
    }

    fn is_available(&self, name: DatasetName) -> bool {
        name != DatasetName::Wine || self.file_for(name).is_some()
    }
}

/// Parse a headed CSV table whose last column is the integer class label.
pub fn parse_csv_dataset(name: DatasetName, content: &str) -> TrainingResult<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut values = Vec::new();
    let mut labels = Vec::new();
    let mut width = None;

    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let line = idx + 2;
        if record.len() < 2 {
            return Err(TrainingError::Dataset(format!("line {line}: expected features and a label")));
        }
        let n_features = record.len() - 1;
        width.get_or_insert(n_features);

        for field in record.iter().take(n_features) {
            let value = field.parse::<f64>().map_err(|e| {
                TrainingError::Dataset(format!("line {line}: invalid feature {field:?}: {e}"))
            })?;
            values.push(value);
        }

        let label = &record[n_features];
        labels.push(label.parse::<usize>().map_err(|e| {
            TrainingError::Dataset(format!("line {line}: invalid label {label:?}: {e}"))
        })?);
    }

    let width = width.ok_or_else(|| TrainingError::Dataset(format!("{name} table has no rows")))?;
    let features = Array2::from_shape_vec((labels.len(), width), values)
        .map_err(|e| TrainingError::Dataset(format!("{name}: {e}")))?;

    Dataset::new(name, features, labels)
}
