use rand::Rng;

/// Criterion for measuring the quality of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitCriterion {
    /// Gini impurity: 1 - Σ(p_i²)
    Gini,
    /// Information entropy: -Σ(p_i · ln(p_i))
    Entropy,
}

impl SplitCriterion {
    /// Compute the impurity of a node from its class counts.
    ///
    /// Returns 0.0 when `n_samples` is zero.
    #[must_use]
    pub fn impurity(&self, class_counts: &[usize], n_samples: usize) -> f64 {
        if n_samples == 0 {
            return 0.0;
        }
        let n = n_samples as f64;
        match self {
            SplitCriterion::Gini => {
                1.0 - class_counts
                    .iter()
                    .map(|&c| {
                        let p = c as f64 / n;
                        p * p
                    })
                    .sum::<f64>()
            }
            SplitCriterion::Entropy => -class_counts
                .iter()
                .filter(|&&c| c > 0)
                .map(|&c| {
                    let p = c as f64 / n;
                    p * p.ln()
                })
                .sum::<f64>(),
        }
    }
}

/// The best split found for a node.
#[derive(Debug, Clone)]
pub(crate) struct BestSplit {
    /// Feature column used for the split.
    pub(crate) feature: usize,
    /// Threshold (midpoint between adjacent distinct values).
    pub(crate) threshold: f64,
    /// Sample indices going to the left child (value <= threshold).
    pub(crate) left_indices: Vec<usize>,
    /// Sample indices going to the right child.
    pub(crate) right_indices: Vec<usize>,
}

/// Tally class membership for a subset of samples.
pub(crate) fn class_counts(labels: &[usize], sample_indices: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &si in sample_indices {
        counts[labels[si]] += 1;
    }
    counts
}

/// Find the best exact split among a random subset of features.
///
/// For each of up to `max_features` randomly chosen features, sorts the
/// `(value, sample)` pairs and scans left-to-right with incremental class
/// counts, keeping the candidate with the largest weighted impurity
/// decrease. Ties in feature values are never split between.
///
/// Returns `None` when no valid split exists — all candidate values
/// identical, or every candidate violates `min_samples_leaf`.
///
/// `col_features` is column-major: `col_features[feature][sample]`.
pub(crate) fn find_best_split(
    col_features: &[Vec<f64>],
    labels: &[usize],
    sample_indices: &[usize],
    n_classes: usize,
    criterion: SplitCriterion,
    max_features: usize,
    min_samples_leaf: usize,
    rng: &mut impl Rng,
) -> Option<BestSplit> {
    let n_features = col_features.len();
    let n_samples = sample_indices.len();
    if n_samples < 2 || n_features == 0 {
        return None;
    }

    let parent_counts = class_counts(labels, sample_indices, n_classes);
    let parent_impurity = criterion.impurity(&parent_counts, n_samples);

    // Partial Fisher-Yates: shuffle only the first `take` positions.
    let take = max_features.min(n_features);
    let mut feature_order: Vec<usize> = (0..n_features).collect();
    for i in 0..take {
        let j = rng.gen_range(i..n_features);
        feature_order.swap(i, j);
    }

    // Start below zero so an impure node still splits when the best
    // candidate has no immediate gain (XOR-style data needs this).
    let mut best_decrease = f64::NEG_INFINITY;
    let mut best: Option<(usize, f64)> = None;

    for &feature in &feature_order[..take] {
        let column = &col_features[feature];

        let mut sorted: Vec<(f64, usize)> = sample_indices
            .iter()
            .map(|&si| (column[si], labels[si]))
            .collect();
        sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_counts = vec![0usize; n_classes];
        let mut right_counts = parent_counts.clone();

        for i in 0..(n_samples - 1) {
            let (value, label) = sorted[i];
            left_counts[label] += 1;
            right_counts[label] -= 1;

            // Cannot split between equal values.
            let next_value = sorted[i + 1].0;
            if value == next_value {
                continue;
            }

            let n_left = i + 1;
            let n_right = n_samples - n_left;
            if n_left < min_samples_leaf || n_right < min_samples_leaf {
                continue;
            }

            let left_impurity = criterion.impurity(&left_counts, n_left);
            let right_impurity = criterion.impurity(&right_counts, n_right);
            let weighted = (n_left as f64 * left_impurity + n_right as f64 * right_impurity)
                / n_samples as f64;
            let decrease = parent_impurity - weighted;

            if decrease > best_decrease {
                best_decrease = decrease;
                best = Some((feature, (value + next_value) / 2.0));
            }
        }
    }

    let (feature, threshold) = best?;

    // Re-partition the sample indices along the winning split.
    let column = &col_features[feature];
    let (left_indices, right_indices) = sample_indices
        .iter()
        .copied()
        .partition(|&si| column[si] <= threshold);

    Some(BestSplit {
        feature,
        threshold,
        left_indices,
        right_indices,
    })
}

#[cfg(test)]
mod tests {
    use super::{SplitCriterion, class_counts, find_best_split};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn gini_of_pure_node_is_zero() {
        let imp = SplitCriterion::Gini.impurity(&[10, 0], 10);
        assert!(imp.abs() < 1e-12);
    }

    #[test]
    fn gini_of_even_binary_split_is_half() {
        let imp = SplitCriterion::Gini.impurity(&[5, 5], 10);
        assert!((imp - 0.5).abs() < 1e-12);
    }

    #[test]
    fn entropy_of_even_binary_split_is_ln_two() {
        let imp = SplitCriterion::Entropy.impurity(&[5, 5], 10);
        assert!((imp - std::f64::consts::LN_2).abs() < 1e-12);
    }

    #[test]
    fn impurity_of_empty_node_is_zero() {
        assert_eq!(SplitCriterion::Gini.impurity(&[0, 0], 0), 0.0);
    }

    #[test]
    fn class_counts_tally() {
        let labels = vec![0, 1, 1, 0, 1];
        let counts = class_counts(&labels, &[0, 1, 2, 4], 2);
        assert_eq!(counts, vec![1, 3]);
    }

    #[test]
    fn separable_column_splits_at_midpoint() {
        // Column-major: one feature, values 1..3 vs 10..12.
        let col_features = vec![vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0]];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let indices: Vec<usize> = (0..6).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let split = find_best_split(
            &col_features,
            &labels,
            &indices,
            2,
            SplitCriterion::Gini,
            1,
            1,
            &mut rng,
        )
        .expect("separable data must split");

        assert_eq!(split.feature, 0);
        assert!((split.threshold - 6.5).abs() < 1e-12);
        assert_eq!(split.left_indices, vec![0, 1, 2]);
        assert_eq!(split.right_indices, vec![3, 4, 5]);
    }

    #[test]
    fn constant_column_has_no_split() {
        let col_features = vec![vec![5.0; 8]];
        let labels = vec![0, 1, 0, 1, 0, 1, 0, 1];
        let indices: Vec<usize> = (0..8).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let split = find_best_split(
            &col_features,
            &labels,
            &indices,
            2,
            SplitCriterion::Gini,
            1,
            1,
            &mut rng,
        );
        assert!(split.is_none());
    }

    #[test]
    fn min_samples_leaf_blocks_tiny_children() {
        let col_features = vec![vec![1.0, 2.0, 3.0, 4.0]];
        let labels = vec![0, 1, 1, 1];
        let indices: Vec<usize> = (0..4).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        // min_samples_leaf = 2 forbids the natural 1/3 split.
        let split = find_best_split(
            &col_features,
            &labels,
            &indices,
            2,
            SplitCriterion::Gini,
            1,
            2,
            &mut rng,
        );
        if let Some(s) = split {
            assert!(s.left_indices.len() >= 2);
            assert!(s.right_indices.len() >= 2);
        }
    }
}
