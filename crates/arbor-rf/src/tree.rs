use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::error::ForestError;
use crate::node::{Node, NodeId};
use crate::split::{SplitCriterion, class_counts, find_best_split};

/// Configuration for a single CART decision tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default                 |
/// |---------------------|-------------------------|
/// | `criterion`         | `Gini`                  |
/// | `max_depth`         | `None` (unlimited)      |
/// | `min_samples_split` | 2                       |
/// | `min_samples_leaf`  | 1                       |
/// | `max_features`      | `None` (all features)   |
/// | `n_classes`         | `None` (from labels)    |
/// | `seed`              | 42                      |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) max_features: Option<usize>,
    pub(crate) n_classes: Option<usize>,
    pub(crate) seed: u64,
}

impl DecisionTreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            criterion: SplitCriterion::Gini,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            n_classes: None,
            seed: 42,
        }
    }

    /// Set the split quality criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the maximum tree depth.
    ///
    /// `None` grows until all leaves are pure or stopping conditions are
    /// met. `Some(d)` caps paths at `d` splits (the root is depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of samples required to attempt a split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the minimum number of samples required in each leaf after a split.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Set the maximum number of features to consider at each split.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Fix the number of classes instead of deriving it from the labels.
    ///
    /// A forest trains each tree on a bootstrap sample that may miss the
    /// highest class entirely; pinning `n_classes` keeps every tree's leaf
    /// distributions the same length.
    #[must_use]
    pub fn with_n_classes(mut self, n_classes: Option<usize>) -> Self {
        self.n_classes = n_classes;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Train a decision tree on the provided row-major dataset.
    ///
    /// `features[sample_idx][feature_idx]`, `labels[sample_idx]` zero-based.
    ///
    /// # Errors
    ///
    /// | Variant                                  | When                                            |
    /// |------------------------------------------|-------------------------------------------------|
    /// | [`ForestError::EmptyDataset`]            | `features` is empty                             |
    /// | [`ForestError::ZeroFeatures`]            | rows have zero feature columns                  |
    /// | [`ForestError::FeatureCountMismatch`]    | rows have inconsistent lengths                  |
    /// | [`ForestError::NonFiniteValue`]          | any value is NaN or infinite                    |
    /// | [`ForestError::InvalidMaxDepth`]         | `max_depth` is `Some(0)`                        |
    /// | [`ForestError::InvalidMinSamplesSplit`]  | `min_samples_split` < 2                         |
    /// | [`ForestError::InvalidMinSamplesLeaf`]   | `min_samples_leaf` < 1                          |
    /// | [`ForestError::InvalidMaxFeatures`]      | `max_features` resolves outside [1, n_features] |
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<DecisionTree, ForestError> {
        validate_dataset(features)?;
        self.validate()?;

        let n_samples = features.len();
        let n_features = features[0].len();

        let max_features = self.max_features.unwrap_or(n_features);
        if max_features == 0 || max_features > n_features {
            return Err(ForestError::InvalidMaxFeatures {
                max_features,
                n_features,
            });
        }

        let n_classes = self
            .n_classes
            .unwrap_or_else(|| labels.iter().max().map_or(0, |&max| max + 1));

        // Column-major layout for the split scan.
        let col_features: Vec<Vec<f64>> = (0..n_features)
            .map(|feature| features.iter().map(|row| row[feature]).collect())
            .collect();

        let mut builder = TreeBuilder {
            col_features: &col_features,
            labels,
            n_classes,
            config: self,
            max_features,
            rng: ChaCha8Rng::seed_from_u64(self.seed),
            arena: Vec::new(),
        };
        let all_samples: Vec<usize> = (0..n_samples).collect();
        builder.grow(&all_samples, 0);

        debug!(
            n_samples,
            n_features,
            n_classes,
            n_nodes = builder.arena.len(),
            "decision tree built"
        );

        Ok(DecisionTree {
            nodes: builder.arena,
            n_features,
            n_classes,
        })
    }

    pub(crate) fn validate(&self) -> Result<(), ForestError> {
        if self.max_depth == Some(0) {
            return Err(ForestError::InvalidMaxDepth { max_depth: 0 });
        }
        if self.min_samples_split < 2 {
            return Err(ForestError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }
        if self.min_samples_leaf < 1 {
            return Err(ForestError::InvalidMinSamplesLeaf {
                min_samples_leaf: self.min_samples_leaf,
            });
        }
        Ok(())
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a row-major dataset: non-empty, rectangular, finite.
pub(crate) fn validate_dataset(features: &[Vec<f64>]) -> Result<(), ForestError> {
    if features.is_empty() {
        return Err(ForestError::EmptyDataset);
    }
    let n_features = features[0].len();
    if n_features == 0 {
        return Err(ForestError::ZeroFeatures);
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(ForestError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        for (feature_index, &value) in row.iter().enumerate() {
            if !value.is_finite() {
                return Err(ForestError::NonFiniteValue {
                    sample_index,
                    feature_index,
                });
            }
        }
    }
    Ok(())
}

/// Recursive arena builder for one tree.
struct TreeBuilder<'a> {
    col_features: &'a [Vec<f64>],
    labels: &'a [usize],
    n_classes: usize,
    config: &'a DecisionTreeConfig,
    max_features: usize,
    rng: ChaCha8Rng,
    arena: Vec<Node>,
}

impl TreeBuilder<'_> {
    /// Grow the subtree for `sample_indices` at `depth`; returns its arena id.
    fn grow(&mut self, sample_indices: &[usize], depth: usize) -> NodeId {
        let n_samples = sample_indices.len();
        let counts = class_counts(self.labels, sample_indices, self.n_classes);
        let impurity = self.config.criterion.impurity(&counts, n_samples);

        let at_depth_cap = self.config.max_depth.is_some_and(|cap| depth >= cap);
        let splittable =
            !at_depth_cap && impurity > 0.0 && n_samples >= self.config.min_samples_split;

        let split = splittable
            .then(|| {
                find_best_split(
                    self.col_features,
                    self.labels,
                    sample_indices,
                    self.n_classes,
                    self.config.criterion,
                    self.max_features,
                    self.config.min_samples_leaf,
                    &mut self.rng,
                )
            })
            .flatten();

        let Some(split) = split else {
            return self.push_leaf(&counts, n_samples);
        };

        // Reserve the split's slot before recursing so child ids stay stable.
        let slot = self.arena.len();
        self.arena.push(Node::Leaf {
            distribution: Vec::new(),
        });

        let left = self.grow(&split.left_indices, depth + 1);
        let right = self.grow(&split.right_indices, depth + 1);

        self.arena[slot] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        NodeId::new(slot)
    }

    fn push_leaf(&mut self, counts: &[usize], n_samples: usize) -> NodeId {
        let total = n_samples as f64;
        let distribution = counts.iter().map(|&c| c as f64 / total).collect();
        let id = NodeId::new(self.arena.len());
        self.arena.push(Node::Leaf { distribution });
        id
    }
}

/// A fitted CART decision tree.
///
/// Stored as an arena `Vec<Node>` with [`NodeId`] links; the root is node 0.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
}

impl DecisionTree {
    /// Predict the class label for a single sample (argmax of the leaf
    /// distribution).
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when
    /// `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, ForestError> {
        let proba = self.predict_proba(sample)?;
        Ok(proba
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map_or(0, |(class, _)| class))
    }

    /// Return the class probability distribution for a single sample.
    ///
    /// The returned `Vec` has length `n_classes` and sums to 1.0.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when
    /// `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<Vec<f64>, ForestError> {
        if sample.len() != self.n_features {
            return Err(ForestError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut id = 0usize;
        loop {
            match &self.nodes[id] {
                Node::Leaf { distribution } => return Ok(distribution.clone()),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if sample[*feature] <= *threshold {
                        left.index()
                    } else {
                        right.index()
                    };
                }
            }
        }
    }

    /// Return the total number of nodes (splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth of the tree.
    ///
    /// A single-leaf tree has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }
        let mut max_depth = 0usize;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            match &self.nodes[id] {
                Node::Leaf { .. } => max_depth = max_depth.max(depth),
                Node::Split { left, right, .. } => {
                    stack.push((left.index(), depth + 1));
                    stack.push((right.index(), depth + 1));
                }
            }
        }
        max_depth
    }
}
