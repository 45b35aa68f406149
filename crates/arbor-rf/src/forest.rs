//! Random Forest training and prediction.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::error::ForestError;
use crate::split::SplitCriterion;
use crate::tree::{DecisionTree, DecisionTreeConfig, validate_dataset};

/// Strategy for the number of features considered at each split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxFeatures {
    /// Square root of total features.
    Sqrt,
    /// A fixed count.
    Fixed(usize),
    /// All features (no subsampling).
    All,
}

impl MaxFeatures {
    /// Resolve to a concrete count for `n_features` columns.
    fn resolve(self, n_features: usize) -> usize {
        match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().ceil() as usize,
            MaxFeatures::Fixed(n) => n,
            MaxFeatures::All => n_features,
        }
    }
}

/// Configuration for Random Forest training.
///
/// Construct via [`ForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default |
/// |---------------------|---------|
/// | `max_features`      | `Sqrt`  |
/// | `max_depth`         | `None`  |
/// | `min_samples_split` | 2       |
/// | `min_samples_leaf`  | 1       |
/// | `criterion`         | `Gini`  |
/// | `seed`              | 42      |
#[derive(Debug, Clone)]
pub struct ForestConfig {
    n_trees: usize,
    max_features: MaxFeatures,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    criterion: SplitCriterion,
    seed: u64,
}

impl ForestConfig {
    /// Create a new config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, ForestError> {
        if n_trees == 0 {
            return Err(ForestError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            max_features: MaxFeatures::Sqrt,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            criterion: SplitCriterion::Gini,
            seed: 42,
        })
    }

    /// Set the max features strategy.
    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the maximum tree depth. `None` means unlimited.
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

    /// Set the split quality criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Train a Random Forest on the provided dataset.
    ///
    /// `features[sample_idx][feature_idx]` — row-major layout.
    /// `labels[sample_idx]` — zero-based class labels.
    ///
    /// Each tree trains on a bootstrap sample (n draws with replacement)
    /// with its own RNG seeded from a ChaCha8 master RNG, so training is
    /// deterministic for a fixed seed regardless of thread scheduling.
    ///
    /// # Errors
    ///
    /// | Variant                                 | When                                             |
    /// |-----------------------------------------|--------------------------------------------------|
    /// | [`ForestError::EmptyDataset`]           | `features` is empty                              |
    /// | [`ForestError::ZeroFeatures`]           | rows have zero feature columns                   |
    /// | [`ForestError::FeatureCountMismatch`]   | rows have inconsistent lengths                   |
    /// | [`ForestError::NonFiniteValue`]         | any value is NaN or infinite                     |
    /// | [`ForestError::InvalidMaxDepth`]        | `max_depth` is `Some(0)`                         |
    /// | [`ForestError::InvalidMinSamplesSplit`] | `min_samples_split` < 2                          |
    /// | [`ForestError::InvalidMinSamplesLeaf`]  | `min_samples_leaf` < 1                           |
    /// | [`ForestError::InvalidMaxFeatures`]     | resolved max_features is outside [1, n_features] |
    #[instrument(skip_all, fields(n_trees = self.n_trees, n_samples = features.len()))]
    pub fn fit(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
    ) -> Result<RandomForest, ForestError> {
        validate_dataset(features)?;

        let n_samples = features.len();
        let n_features = features[0].len();
        let n_classes = labels.iter().max().map_or(0, |&max| max + 1);

        let max_features = self.max_features.resolve(n_features);
        if max_features == 0 || max_features > n_features {
            return Err(ForestError::InvalidMaxFeatures {
                max_features,
                n_features,
            });
        }

        // Surface config errors before spawning any tree work.
        let tree_template = DecisionTreeConfig::new()
            .with_criterion(self.criterion)
            .with_max_depth(self.max_depth)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf)
            .with_max_features(Some(max_features))
            .with_n_classes(Some(n_classes));
        tree_template.validate()?;

        info!(
            n_trees = self.n_trees,
            n_samples,
            n_features,
            n_classes,
            max_features,
            max_depth = ?self.max_depth,
            "training random forest"
        );

        // Per-tree seeds from the master RNG.
        let mut master_rng = ChaCha8Rng::seed_from_u64(self.seed);
        let tree_seeds: Vec<u64> = (0..self.n_trees).map(|_| master_rng.r#gen()).collect();

        let trees: Vec<DecisionTree> = tree_seeds
            .into_par_iter()
            .map(|seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                // Bootstrap: n draws with replacement.
                let mut boot_features = Vec::with_capacity(n_samples);
                let mut boot_labels = Vec::with_capacity(n_samples);
                for _ in 0..n_samples {
                    let idx = rng.gen_range(0..n_samples);
                    boot_features.push(features[idx].clone());
                    boot_labels.push(labels[idx]);
                }

                // Data and config were validated above, so per-tree fit cannot fail.
                tree_template
                    .clone()
                    .with_seed(rng.r#gen())
                    .fit(&boot_features, &boot_labels)
                    .expect("tree fit on validated inputs")
            })
            .collect();

        debug!(n_trees_trained = trees.len(), "tree training complete");

        Ok(RandomForest {
            trees,
            n_features,
            n_classes,
        })
    }
}

/// A fitted Random Forest ensemble.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
    n_classes: usize,
}

/// Class probability distribution from a prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDistribution {
    probs: Vec<f64>,
}

impl ClassDistribution {
    pub(crate) fn new(probs: Vec<f64>) -> Self {
        Self { probs }
    }

    /// Return the predicted class (argmax of probabilities).
    #[must_use]
    pub fn predicted_class(&self) -> usize {
        self.probs
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map_or(0, |(class, _)| class)
    }

    /// Return the probability of the given class.
    ///
    /// Classes outside the trained range have probability 0.0.
    #[must_use]
    pub fn prob(&self, class: usize) -> f64 {
        self.probs.get(class).copied().unwrap_or(0.0)
    }

    /// Return the full distribution as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.probs
    }
}

impl RandomForest {
    /// Predict the class label for a single sample.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when
    /// `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, ForestError> {
        Ok(self.predict_proba(sample)?.predicted_class())
    }

    /// Return the averaged class probability distribution for a single
    /// sample (mean of the leaf distributions across all trees).
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when
    /// `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<ClassDistribution, ForestError> {
        if sample.len() != self.n_features {
            return Err(ForestError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }

        let mut avg = vec![0.0f64; self.n_classes];
        for tree in &self.trees {
            let proba = tree.predict_proba(sample)?;
            for (class, p) in proba.iter().enumerate() {
                avg[class] += p;
            }
        }
        let n = self.trees.len() as f64;
        avg.iter_mut().for_each(|v| *v /= n);

        Ok(ClassDistribution::new(avg))
    }

    /// Return probability distributions for a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] if any sample has
    /// the wrong feature count.
    pub fn predict_proba_batch(
        &self,
        samples: &[Vec<f64>],
    ) -> Result<Vec<ClassDistribution>, ForestError> {
        samples
            .into_par_iter()
            .map(|sample| self.predict_proba(sample))
            .collect()
    }

    /// Return the number of features this forest was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two well-separated clusters along both axes.
    fn make_separable() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            features.push(vec![i as f64 * 0.1, i as f64 * 0.1]);
            labels.push(0);
            features.push(vec![10.0 + i as f64 * 0.1, 10.0 + i as f64 * 0.1]);
            labels.push(1);
        }
        (features, labels)
    }

    #[test]
    fn zero_trees_error() {
        assert!(matches!(
            ForestConfig::new(0).unwrap_err(),
            ForestError::InvalidTreeCount { n_trees: 0 }
        ));
    }

    #[test]
    fn empty_dataset_error() {
        let config = ForestConfig::new(10).unwrap();
        let err = config.fit(&[], &[]).unwrap_err();
        assert!(matches!(err, ForestError::EmptyDataset));
    }

    #[test]
    fn zero_max_depth_error() {
        let config = ForestConfig::new(10).unwrap().with_max_depth(Some(0));
        let err = config.fit(&[vec![1.0], vec![2.0]], &[0, 1]).unwrap_err();
        assert!(matches!(err, ForestError::InvalidMaxDepth { .. }));
    }

    #[test]
    fn separable_data_high_training_accuracy() {
        let (features, labels) = make_separable();
        let forest = ForestConfig::new(20)
            .unwrap()
            .with_seed(42)
            .fit(&features, &labels)
            .unwrap();

        let correct = features
            .iter()
            .zip(&labels)
            .filter(|&(ref sample, &label)| forest.predict(sample).unwrap() == label)
            .count();
        let accuracy = correct as f64 / labels.len() as f64;
        assert!(accuracy > 0.95, "accuracy = {accuracy}");
    }

    #[test]
    fn proba_sums_to_one() {
        let (features, labels) = make_separable();
        let forest = ForestConfig::new(20)
            .unwrap()
            .with_seed(42)
            .fit(&features, &labels)
            .unwrap();

        let dist = forest.predict_proba(&[5.0, 5.0]).unwrap();
        let sum: f64 = dist.as_slice().iter().sum();
        assert!((sum - 1.0).abs() < 1e-10);
    }

    #[test]
    fn deterministic_with_same_seed() {
        let (features, labels) = make_separable();
        let fit = || {
            ForestConfig::new(10)
                .unwrap()
                .with_seed(99)
                .with_max_depth(Some(3))
                .fit(&features, &labels)
                .unwrap()
        };
        let forest1 = fit();
        let forest2 = fit();

        let probas1 = forest1.predict_proba_batch(&features).unwrap();
        let probas2 = forest2.predict_proba_batch(&features).unwrap();
        assert_eq!(probas1, probas2);
    }

    #[test]
    fn batch_matches_individual() {
        let (features, labels) = make_separable();
        let forest = ForestConfig::new(10)
            .unwrap()
            .with_seed(42)
            .fit(&features, &labels)
            .unwrap();

        let batch = forest.predict_proba_batch(&features).unwrap();
        for (sample, dist) in features.iter().zip(&batch) {
            assert_eq!(forest.predict_proba(sample).unwrap(), *dist);
        }
    }

    #[test]
    fn prob_out_of_range_class_is_zero() {
        let dist = ClassDistribution::new(vec![0.3, 0.7]);
        assert_eq!(dist.prob(1), 0.7);
        assert_eq!(dist.prob(5), 0.0);
        assert_eq!(dist.predicted_class(), 1);
    }

    #[test]
    fn accessors_report_shape() {
        let (features, labels) = make_separable();
        let forest = ForestConfig::new(7)
            .unwrap()
            .with_seed(42)
            .fit(&features, &labels)
            .unwrap();
        assert_eq!(forest.n_trees(), 7);
        assert_eq!(forest.n_features(), 2);
        assert_eq!(forest.n_classes(), 2);
    }
}
