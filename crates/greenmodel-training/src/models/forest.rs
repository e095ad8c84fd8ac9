//! CART decision trees (Gini impurity) bagged into a random forest.

use super::{argmax, Classifier};
use crate::error::{TrainingError, TrainingResult};
use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, RngCore, SeedableRng};

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        class: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone, Copy)]
struct TreeOptions {
    n_classes: usize,
    max_features: usize,
    min_samples_split: usize,
}

#[derive(Debug, Clone)]
pub struct DecisionTree {
    root: Node,
}

impl DecisionTree {
    fn fit(x: &Array2<f64>, y: &[usize], samples: Vec<usize>, options: TreeOptions, rng: &mut StdRng) -> Self {
        Self { root: grow(x, y, samples, options, rng) }
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> usize {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { class } => return *class,
                Node::Split { feature, threshold, left, right } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    /// Number of nodes, leaves included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        fn count(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 1,
                Node::Split { left, right, .. } => 1 + count(left) + count(right),
            }
        }
        count(&self.root)
    }
}

fn class_counts(y: &[usize], samples: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0; n_classes];
    for &i in samples {
        counts[y[i]] += 1;
    }
    counts
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts.iter().map(|&c| (c as f64 / total).powi(2)).sum::<f64>()
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

fn best_split(
    x: &Array2<f64>,
    y: &[usize],
    samples: &[usize],
    features: &[usize],
    n_classes: usize,
) -> Option<SplitCandidate> {
    let n = samples.len();
    let parent = class_counts(y, samples, n_classes);
    let mut best: Option<SplitCandidate> = None;

    for &feature in features {
        let mut column: Vec<(f64, usize)> = samples.iter().map(|&i| (x[[i, feature]], y[i])).collect();
        column.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left = vec![0; n_classes];
        let mut right = parent.clone();
        for pos in 0..n - 1 {
            let (value, label) = column[pos];
            left[label] += 1;
            right[label] -= 1;

            let next = column[pos + 1].0;
            if value == next {
                continue;
            }

            let n_left = pos + 1;
            let n_right = n - n_left;
            let impurity = (n_left as f64 * gini(&left, n_left) + n_right as f64 * gini(&right, n_right)) / n as f64;

            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                best = Some(SplitCandidate { feature, threshold: (value + next) / 2.0, impurity });
            }
        }
    }

    best
}

fn grow(x: &Array2<f64>, y: &[usize], samples: Vec<usize>, options: TreeOptions, rng: &mut StdRng) -> Node {
    let counts = class_counts(y, &samples, options.n_classes);
    let class = argmax(counts.iter().copied());
    let parent_impurity = gini(&counts, samples.len());

    if samples.len() < options.min_samples_split || parent_impurity == 0.0 {
        return Node::Leaf { class };
    }

    let features = sample(rng, x.ncols(), options.max_features).into_vec();
    let Some(split) = best_split(x, y, &samples, &features, options.n_classes) else {
        return Node::Leaf { class };
    };
    if split.impurity >= parent_impurity {
        return Node::Leaf { class };
    }

    let (left, right): (Vec<usize>, Vec<usize>) =
        samples.into_iter().partition(|&i| x[[i, split.feature]] <= split.threshold);

    Node::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(grow(x, y, left, options, rng)),
        right: Box::new(grow(x, y, right, options, rng)),
    }
}

/// Bagged ensemble of decision trees; prediction is a majority vote.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_classes: usize,
}

impl RandomForest {
    /// Fit `n_trees` trees, each on a bootstrap sample with `sqrt(n_features)`
    /// candidate features per split. Identical inputs and seed give an identical forest.
    pub fn fit(x: &Array2<f64>, y: &[usize], n_classes: usize, n_trees: usize, seed: u64) -> TrainingResult<Self> {
        let n = x.nrows();
        if n == 0 || x.ncols() == 0 || n != y.len() {
            return Err(TrainingError::Trainer(format!(
                "random forest needs matching samples and labels (got {n} rows, {} labels)",
                y.len()
            )));
        }
        if n_trees == 0 {
            return Err(TrainingError::Trainer("random forest needs at least one tree".to_string()));
        }
        if y.iter().any(|&label| label >= n_classes) {
            return Err(TrainingError::Trainer("label outside class range".to_string()));
        }

        let options = TreeOptions {
            n_classes,
            max_features: ((x.ncols() as f64).sqrt().floor() as usize).clamp(1, x.ncols()),
            min_samples_split: 2,
        };

        let mut master = StdRng::seed_from_u64(seed);
        let trees = (0..n_trees)
            .map(|_| {
                let mut rng = StdRng::seed_from_u64(master.next_u64());
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(x, y, bootstrap, options, &mut rng)
            })
            .collect();

        Ok(Self { trees, n_classes })
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

impl Classifier for RandomForest {
    fn predict(&self, x: &Array2<f64>) -> Vec<usize> {
        x.rows()
            .into_iter()
            .map(|row| {
                let mut votes = vec![0usize; self.n_classes];
                for tree in &self.trees {
                    votes[tree.predict_row(row)] += 1;
                }
                argmax(votes)
            })
            .collect()
    }
}
