//! Isolation Forest - novelty detection ensemble
//!
//! Each tree isolates points with random axis-aligned splits; anomalies get
//! isolated near the root. Scores follow the usual convention:
//! `score_samples` in [-1, 0) (lower = more abnormal), `decision_function =
//! score_samples - offset` (negative = outlier).

use ndarray::{Array2, ArrayView1};
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::error::ModelError;
use super::threshold;

/// Euler–Mascheroni constant
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees (>= 100 recommended)
    pub n_estimators: usize,
    /// Subsample size cap per tree
    pub max_samples: usize,
    /// Seed for subsampling and split selection
    pub random_seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: crate::constants::DEFAULT_N_ESTIMATORS,
            max_samples: crate::constants::DEFAULT_MAX_SAMPLES,
            random_seed: crate::constants::DEFAULT_RANDOM_SEED,
        }
    }
}

// ============================================================================
// TREE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// `x[feature] <= threshold` goes left
    Split { feature: usize, threshold: f64, left: usize, right: usize },
    Leaf { size: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationTree {
    /// Root at index 0
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn build(data: &Array2<f64>, sample: Vec<usize>, height_limit: usize, rng: &mut ChaCha8Rng) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(data, sample, 0, height_limit, rng);
        tree
    }

    fn grow(
        &mut self,
        data: &Array2<f64>,
        rows: Vec<usize>,
        depth: usize,
        height_limit: usize,
        rng: &mut ChaCha8Rng,
    ) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { size: rows.len() });

        if depth >= height_limit || rows.len() <= 1 {
            return id;
        }

        // Only features that can still separate these rows
        let ranges: Vec<(usize, f64, f64)> = (0..data.ncols())
            .filter_map(|f| {
                let (lo, hi) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
                    let v = data[[r, f]];
                    (lo.min(v), hi.max(v))
                });
                (lo < hi).then_some((f, lo, hi))
            })
            .collect();

        if ranges.is_empty() {
            return id;
        }

        let (feature, lo, hi) = ranges[rng.gen_range(0..ranges.len())];
        let threshold = rng.gen_range(lo..hi);

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
            rows.into_iter().partition(|&r| data[[r, feature]] <= threshold);

        let left = self.grow(data, left_rows, depth + 1, height_limit, rng);
        let right = self.grow(data, right_rows, depth + 1, height_limit, rng);
        self.nodes[id] = Node::Split { feature, threshold, left, right };
        id
    }

    /// Depth at which `x` lands, plus the expected remaining depth of its leaf
    fn path_length(&self, x: ArrayView1<f64>) -> f64 {
        let mut id = 0;
        let mut depth = 0.0;
        loop {
            match self.nodes.get(id) {
                Some(Node::Split { feature, threshold, left, right }) => {
                    id = if x[*feature] <= *threshold { *left } else { *right };
                    depth += 1.0;
                }
                Some(Node::Leaf { size }) => return depth + average_path_length(*size),
                None => return depth,
            }
        }
    }
}

/// c(n): average path length of an unsuccessful BST search over n points
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

// ============================================================================
// FOREST
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationForest {
    pub config: ForestConfig,
    pub contamination: f64,
    /// Subsample size actually used per tree
    pub samples_per_tree: usize,
    pub n_features: usize,
    /// Threshold on `score_samples`, calibrated from contamination
    pub offset: f64,
    trees: Vec<IsolationTree>,
}

impl IsolationForest {
    /// Fit on `data` (rows = samples). `should_stop` is polled between trees.
    pub fn fit(
        data: &Array2<f64>,
        config: ForestConfig,
        contamination: f64,
        should_stop: &dyn Fn() -> bool,
    ) -> Result<Self, ModelError> {
        threshold::validate_contamination(contamination)?;

        let n_rows = data.nrows();
        if n_rows < 2 {
            return Err(ModelError::InsufficientSamples { got: n_rows, required: 2 });
        }
        if config.n_estimators == 0 {
            return Err(ModelError::InvalidConfig("n_estimators must be > 0".into()));
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFiniteInput);
        }

        let samples_per_tree = config.max_samples.clamp(2, n_rows);
        let height_limit = (samples_per_tree as f64).log2().ceil() as usize;
        let mut rng = ChaCha8Rng::seed_from_u64(config.random_seed);

        let mut trees = Vec::with_capacity(config.n_estimators);
        for _ in 0..config.n_estimators {
            if should_stop() {
                return Err(ModelError::Cancelled);
            }
            let sample = index::sample(&mut rng, n_rows, samples_per_tree).into_vec();
            trees.push(IsolationTree::build(data, sample, height_limit, &mut rng));
        }

        let mut forest = Self {
            config,
            contamination,
            samples_per_tree,
            n_features: data.ncols(),
            offset: 0.0,
            trees,
        };

        let training_scores: Vec<f64> = data.rows().into_iter().map(|row| forest.score_row(row)).collect();
        forest.offset = threshold::offset_for(&training_scores, contamination);

        Ok(forest)
    }

    /// Opposite of the anomaly score: -2^(-E[h(x)] / c(ψ))
    pub fn score_samples(&self, x: &[f64]) -> Result<f64, ModelError> {
        self.check_shape(x)?;
        if x.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFiniteInput);
        }
        Ok(self.score_row(ArrayView1::from(x)))
    }

    /// Negative = outlier, positive = inlier
    pub fn decision_function(&self, x: &[f64]) -> Result<f64, ModelError> {
        Ok(self.score_samples(x)? - self.offset)
    }

    /// true = outlier
    pub fn predict(&self, x: &[f64]) -> Result<bool, ModelError> {
        Ok(self.decision_function(x)? < 0.0)
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Structural sanity for deserialized forests
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() || self.trees.iter().any(|t| t.nodes.is_empty()) {
            return Err(ModelError::InvalidConfig("forest has no trees".into()));
        }
        for tree in &self.trees {
            for node in &tree.nodes {
                if let Node::Split { feature, left, right, .. } = node {
                    if *feature >= self.n_features || *left >= tree.nodes.len() || *right >= tree.nodes.len() {
                        return Err(ModelError::InvalidConfig("corrupt tree node".into()));
                    }
                }
            }
        }
        Ok(())
    }

    fn score_row(&self, x: ArrayView1<f64>) -> f64 {
        let mean_depth = self.trees.iter().map(|t| t.path_length(x)).sum::<f64>() / self.trees.len() as f64;
        let norm = average_path_length(self.samples_per_tree).max(f64::EPSILON);
        -(2f64.powf(-mean_depth / norm))
    }

    fn check_shape(&self, x: &[f64]) -> Result<(), ModelError> {
        if x.len() != self.n_features {
            return Err(ModelError::ShapeMismatch { expected: self.n_features, actual: x.len() });
        }
        Ok(())
    }
}
