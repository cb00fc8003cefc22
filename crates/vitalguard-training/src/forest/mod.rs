//! Bagged ensemble of class-weighted decision trees.
//!
//! Every tree gets its own seed, drawn in order from a [`Pcg64`] seeded with the
//! run seed, so the fitted forest does not depend on how the trees are scheduled
//! across threads.

use std::thread;

use rand::{RngCore as _, SeedableRng as _};
use rand_pcg::Pcg64;
use vitalguard_data::VitalFeature;

pub use self::tree::DecisionTree;
use crate::{
    classifier::{self, Classifier, ClassifierKind, Row},
    config::ForestParams,
};

mod tree;

#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fits `params.n_estimators` trees on bootstrap samples of the training rows.
    ///
    /// Class weights are balanced over the whole training set and multiplied by
    /// each row's bootstrap multiplicity.
    ///
    /// # Panics
    ///
    /// Panics if `rows` and `labels` differ in length or `rows` is empty.
    #[must_use]
    pub fn fit(rows: &[Row], labels: &[u8], params: &ForestParams, seed: u64) -> Self {
        assert_eq!(rows.len(), labels.len());
        assert!(!rows.is_empty(), "cannot fit a forest on no rows");

        let class_weights = classifier::balanced_sample_weights(labels);
        let mut seeder = Pcg64::seed_from_u64(seed);
        let mut slots: Vec<(u64, Option<DecisionTree>)> = (0..params.n_estimators)
            .map(|_| (seeder.next_u64(), None))
            .collect();

        thread::scope(|s| {
            for (tree_seed, slot) in &mut slots {
                let class_weights = &class_weights;
                s.spawn(move || {
                    let mut rng = Pcg64::seed_from_u64(*tree_seed);
                    let weights = bootstrap_weights(class_weights, &mut rng);
                    *slot = Some(DecisionTree::fit(rows, labels, &weights, params, &mut rng));
                });
            }
        });

        let trees: Vec<DecisionTree> = slots.into_iter().filter_map(|(_, tree)| tree).collect();
        log::debug!(
            "random forest: {} trees, mean depth {:.1}",
            trees.len(),
            mean_depth(&trees)
        );
        Self { trees }
    }

    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

impl Classifier for RandomForest {
    fn kind(&self) -> ClassifierKind {
        ClassifierKind::RandomForest
    }

    #[expect(clippy::cast_precision_loss)]
    fn predict_proba_row(&self, row: &Row) -> f64 {
        let sum: f64 = self.trees.iter().map(|tree| tree.predict(row)).sum();
        sum / self.trees.len() as f64
    }

    /// Mean of the per-tree normalized impurity decreases, over trees that split at
    /// least once.
    #[expect(clippy::cast_precision_loss)]
    fn raw_importances(&self) -> Option<Row> {
        let split_trees: Vec<&DecisionTree> = self
            .trees
            .iter()
            .filter(|tree| tree.node_count() > 1)
            .collect();
        if split_trees.is_empty() {
            return Some([0.0; VitalFeature::LEN]);
        }
        let mut sum = [0.0; VitalFeature::LEN];
        for tree in &split_trees {
            for (acc, imp) in sum.iter_mut().zip(tree.importances()) {
                *acc += imp;
            }
        }
        Some(sum.map(|v| v / split_trees.len() as f64))
    }
}

/// Draws `n` rows with replacement and returns per-row weights
/// `multiplicity * class_weight`.
fn bootstrap_weights<R>(class_weights: &[f64], rng: &mut R) -> Vec<f64>
where
    R: rand::Rng + ?Sized,
{
    let n = class_weights.len();
    let mut counts = vec![0u32; n];
    for _ in 0..n {
        counts[rng.random_range(0..n)] += 1;
    }
    counts
        .iter()
        .zip(class_weights)
        .map(|(&count, &w)| f64::from(count) * w)
        .collect()
}

#[expect(clippy::cast_precision_loss)]
fn mean_depth(trees: &[DecisionTree]) -> f64 {
    let total: usize = trees.iter().map(DecisionTree::depth).sum();
    total as f64 / trees.len().max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy_data() -> (Vec<Row>, Vec<u8>) {
        let mut rows = vec![];
        let mut labels = vec![];
        for i in 0..300_u32 {
            let x = f64::from(i % 100) / 10.0;
            let y = f64::from((i * 7) % 13);
            let z = f64::from((i * 11) % 17);
            rows.push([x, y, z, 1.0, 1.0, 1.0]);
            labels.push(u8::from(x > 7.0 || (i % 29 == 0)));
        }
        (rows, labels)
    }

    #[test]
    fn test_bootstrap_keeps_row_count() {
        let mut rng = Pcg64::seed_from_u64(1);
        let weights = bootstrap_weights(&[1.0; 50], &mut rng);
        assert!((weights.iter().sum::<f64>() - 50.0).abs() < 1e-12);
        assert!(weights.iter().all(|w| w.fract() == 0.0));
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (rows, labels) = noisy_data();
        let params = ForestParams {
            n_estimators: 8,
            ..ForestParams::default()
        };
        let a = RandomForest::fit(&rows, &labels, &params, 42);
        let b = RandomForest::fit(&rows, &labels, &params, 42);
        assert_eq!(a, b);
        assert_eq!(a.trees().len(), 8);

        let c = RandomForest::fit(&rows, &labels, &params, 7);
        assert_ne!(a, c);
    }

    #[test]
    fn test_forest_learns_threshold() {
        let (rows, labels) = noisy_data();
        let forest = RandomForest::fit(&rows, &labels, &ForestParams::default(), 42);
        assert!(forest.predict_proba_row(&[9.5, 3.0, 3.0, 1.0, 1.0, 1.0]) > 0.5);
        assert!(forest.predict_proba_row(&[1.0, 3.0, 3.0, 1.0, 1.0, 1.0]) < 0.5);
        assert!(
            forest
                .trees()
                .iter()
                .all(|tree| tree.depth() <= ForestParams::default().max_depth)
        );
    }

    #[test]
    fn test_importances_favour_informative_feature() {
        let (rows, labels) = noisy_data();
        let forest = RandomForest::fit(&rows, &labels, &ForestParams::default(), 42);
        let importances = forest.raw_importances().unwrap();
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(importances[0] > importances[1]);
        assert!(importances[0] > importances[2]);
        assert_eq!(importances[3..], [0.0; 3]);
    }
}
