//! Accuracy regression tests for arbor-rf.
//!
//! These tests verify that algorithmic changes do not degrade Random Forest
//! behavior on the deterministic two-cluster teaching dataset.

use arbor_data::demo_blobs;
use arbor_rf::ForestConfig;

// ---------------------------------------------------------------------------
// a) training_accuracy_on_demo_blobs
// ---------------------------------------------------------------------------

/// Unlimited-depth training accuracy on the demo blobs must exceed 0.8.
///
/// The clusters overlap (unit variance, centers sqrt(2) apart), but fully
/// grown trees memorize most of their bootstrap samples.
#[test]
fn training_accuracy_on_demo_blobs() {
    let dataset = demo_blobs();
    let features = dataset.feature_rows();
    let forest = ForestConfig::new(20)
        .unwrap()
        .with_seed(1)
        .fit(&features, dataset.labels())
        .unwrap();

    let correct = features
        .iter()
        .zip(dataset.labels())
        .filter(|&(ref sample, &label)| forest.predict(sample).unwrap() == label)
        .count();
    let accuracy = correct as f64 / dataset.len() as f64;

    assert!(accuracy > 0.8, "training accuracy {accuracy} <= 0.8");
}

// ---------------------------------------------------------------------------
// b) deterministic_probability_surface
// ---------------------------------------------------------------------------

/// Same config and seed must produce identical probabilities across two
/// independent fits, for every depth the slider exposes.
#[test]
fn deterministic_probability_surface() {
    let dataset = demo_blobs();
    let features = dataset.feature_rows();

    let probes: Vec<Vec<f64>> = (-6..=9)
        .flat_map(|x| (-6..=9).map(move |y| vec![x as f64 * 0.5, y as f64 * 0.5]))
        .collect();

    for depth in 1..=8usize {
        let fit = || {
            ForestConfig::new(20)
                .unwrap()
                .with_max_depth(Some(depth))
                .with_seed(1)
                .fit(&features, dataset.labels())
                .unwrap()
        };
        let probas1 = fit().predict_proba_batch(&probes).unwrap();
        let probas2 = fit().predict_proba_batch(&probes).unwrap();
        assert_eq!(probas1, probas2, "depth {depth} surfaces differ");
    }
}

// ---------------------------------------------------------------------------
// c) far_corners_classified_correctly
// ---------------------------------------------------------------------------

/// Far away from the overlap region, even depth-1 stumps must agree with
/// the nearer cluster.
#[test]
fn far_corners_classified_correctly() {
    let dataset = demo_blobs();
    let features = dataset.feature_rows();
    let forest = ForestConfig::new(20)
        .unwrap()
        .with_max_depth(Some(1))
        .with_seed(1)
        .fit(&features, dataset.labels())
        .unwrap();

    let low = forest.predict_proba(&[-4.0, -4.0]).unwrap();
    let high = forest.predict_proba(&[5.0, 5.0]).unwrap();
    assert!(low.prob(1) < 0.5, "class-1 prob at (-4,-4) = {}", low.prob(1));
    assert!(high.prob(1) > 0.5, "class-1 prob at (5,5) = {}", high.prob(1));
}

// ---------------------------------------------------------------------------
// d) deeper_forests_fit_training_data_no_worse
// ---------------------------------------------------------------------------

/// Training accuracy must be non-decreasing from depth 1 to depth 8 within
/// a small tolerance (bootstrap noise can cost a point or two).
#[test]
fn deeper_forests_fit_training_data_no_worse() {
    let dataset = demo_blobs();
    let features = dataset.feature_rows();

    let accuracy_at = |depth: usize| {
        let forest = ForestConfig::new(20)
            .unwrap()
            .with_max_depth(Some(depth))
            .with_seed(1)
            .fit(&features, dataset.labels())
            .unwrap();
        let correct = features
            .iter()
            .zip(dataset.labels())
            .filter(|&(ref sample, &label)| forest.predict(sample).unwrap() == label)
            .count();
        correct as f64 / dataset.len() as f64
    };

    let shallow = accuracy_at(1);
    let deep = accuracy_at(8);
    assert!(
        deep >= shallow - 0.1,
        "depth-8 accuracy {deep} much worse than depth-1 {shallow}"
    );
}
