//! Multinomial logistic regression trained by full-batch gradient descent.

use super::{argmax, Classifier};
use crate::error::{TrainingError, TrainingResult};
use ndarray::{Array1, Array2, Axis};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticOptions {
    pub max_iterations: usize,
    pub learning_rate: f64,
    /// Inverse L2 regularization strength.
    pub c: f64,
    /// Stop once the gradient norm drops below this.
    pub tolerance: f64,
}

impl Default for LogisticOptions {
    fn default() -> Self {
        Self { max_iterations: 100, learning_rate: 0.5, c: 1.0, tolerance: 1e-4 }
    }
}

#[derive(Debug, Clone)]
pub struct LogisticRegression {
    weights: Array2<f64>,
    bias: Array1<f64>,
    mean: Array1<f64>,
    scale: Array1<f64>,
    iterations: usize,
}

impl LogisticRegression {
    /// Fit on standardized features. Standardization statistics come from `x` and are
    /// reapplied at prediction time.
    pub fn fit(x: &Array2<f64>, y: &[usize], n_classes: usize, options: &LogisticOptions) -> TrainingResult<Self> {
        let (n, d) = x.dim();
        if n == 0 || n != y.len() {
            return Err(TrainingError::Trainer(format!(
                "logistic regression needs matching samples and labels (got {n} rows, {} labels)",
                y.len()
            )));
        }
        if n_classes < 2 || y.iter().any(|&label| label >= n_classes) {
            return Err(TrainingError::Trainer("labels must lie in 0..n_classes with n_classes >= 2".to_string()));
        }
        if options.c <= 0.0 || options.learning_rate <= 0.0 {
            return Err(TrainingError::Trainer("c and learning_rate must be positive".to_string()));
        }

        let mean = x.mean_axis(Axis(0)).ok_or_else(|| TrainingError::Trainer("empty feature matrix".to_string()))?;
        let scale = x.std_axis(Axis(0), 0.0).mapv(|s| if s > f64::EPSILON { s } else { 1.0 });
        let xs = (x - &mean) / &scale;

        let mut targets = Array2::<f64>::zeros((n, n_classes));
        for (row, &label) in y.iter().enumerate() {
            targets[[row, label]] = 1.0;
        }

        let mut weights = Array2::<f64>::zeros((d, n_classes));
        let mut bias = Array1::<f64>::zeros(n_classes);
        let penalty = 1.0 / (options.c * n as f64);
        let mut iterations = 0;

        while iterations < options.max_iterations {
            let mut probs = xs.dot(&weights) + &bias;
            softmax_rows(&mut probs);
            let residual = probs - &targets;

            let grad_w = xs.t().dot(&residual) / n as f64 + &weights * penalty;
            let grad_b = residual.sum_axis(Axis(0)) / n as f64;

            let norm = (grad_w.iter().chain(grad_b.iter()).map(|g| g * g).sum::<f64>()).sqrt();
            if !norm.is_finite() {
                return Err(TrainingError::Trainer("gradient diverged".to_string()));
            }
            if norm < options.tolerance {
                break;
            }

            weights.scaled_add(-options.learning_rate, &grad_w);
            bias.scaled_add(-options.learning_rate, &grad_b);
            iterations += 1;
        }

        tracing::debug!(iterations, max_iterations = options.max_iterations, "logistic regression fitted");
        Ok(Self { weights, bias, mean, scale, iterations })
    }

    /// Gradient steps actually taken.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    fn logits(&self, x: &Array2<f64>) -> Array2<f64> {
        let xs = (x - &self.mean) / &self.scale;
        xs.dot(&self.weights) + &self.bias
    }
}

fn softmax_rows(values: &mut Array2<f64>) {
    for mut row in values.rows_mut() {
        let max = row.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row /= sum;
    }
}

impl Classifier for LogisticRegression {
    fn predict(&self, x: &Array2<f64>) -> Vec<usize> {
        self.logits(x).rows().into_iter().map(|row| argmax(row.iter().copied())).collect()
    }
}
