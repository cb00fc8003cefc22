//! Weighted CART classification tree with Gini impurity.

use rand::{Rng, seq::SliceRandom as _};
use vitalguard_data::VitalFeature;

use crate::{classifier::Row, config::ForestParams};

/// Adjacent values closer than this are treated as equal when placing thresholds.
const FEATURE_THRESHOLD: f64 = 1e-7;

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        /// Weighted share of positive samples that reached this leaf.
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Split {
    feature: usize,
    threshold: f64,
    decrease: f64,
}

/// Class weight totals of a set of samples.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ClassTotals {
    negative: f64,
    positive: f64,
}

impl ClassTotals {
    fn add(&mut self, label: u8, weight: f64) {
        if label == 1 {
            self.positive += weight;
        } else {
            self.negative += weight;
        }
    }

    fn total(self) -> f64 {
        self.negative + self.positive
    }

    fn gini(self) -> f64 {
        let total = self.total();
        if total <= 0.0 {
            return 0.0;
        }
        let p = self.positive / total;
        2.0 * p * (1.0 - p)
    }

    /// Gini impurity scaled by the total weight.
    fn weighted_gini(self) -> f64 {
        self.total() * self.gini()
    }
}

/// A fitted classification tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    importances: Row,
}

struct Builder<'a, R: ?Sized> {
    rows: &'a [Row],
    labels: &'a [u8],
    weights: &'a [f64],
    params: &'a ForestParams,
    max_features: usize,
    rng: &'a mut R,
    nodes: Vec<Node>,
    importances: Row,
}

impl DecisionTree {
    /// Grows a tree on the samples with a positive weight.
    ///
    /// `weights[i]` is the effective weight of row `i` (for a forest, bootstrap
    /// multiplicity times class weight); rows with weight 0 are ignored.
    pub fn fit<R>(
        rows: &[Row],
        labels: &[u8],
        weights: &[f64],
        params: &ForestParams,
        rng: &mut R,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut samples: Vec<usize> = (0..rows.len()).filter(|&i| weights[i] > 0.0).collect();
        let mut builder = Builder {
            rows,
            labels,
            weights,
            params,
            max_features: params.features_per_split(VitalFeature::LEN),
            rng,
            nodes: vec![],
            importances: [0.0; VitalFeature::LEN],
        };
        builder.grow(&mut samples, 0);
        Self {
            nodes: builder.nodes,
            importances: builder.importances,
        }
    }

    /// Probability of the positive class for `row`.
    #[must_use]
    pub fn predict(&self, row: &Row) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => index = if row[feature] <= threshold { left } else { right },
            }
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        fn depth_of(nodes: &[Node], index: usize) -> usize {
            match nodes[index] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => {
                    1 + depth_of(nodes, left).max(depth_of(nodes, right))
                }
            }
        }
        depth_of(&self.nodes, 0)
    }

    /// Weighted impurity decrease per feature, normalized to sum to 1.
    ///
    /// A single-leaf tree has all-zero importances.
    #[must_use]
    pub fn importances(&self) -> Row {
        let total: f64 = self.importances.iter().sum();
        if total > 0.0 {
            self.importances.map(|v| v / total)
        } else {
            self.importances
        }
    }
}

impl<R> Builder<'_, R>
where
    R: Rng + ?Sized,
{
    fn totals(&self, samples: &[usize]) -> ClassTotals {
        let mut totals = ClassTotals::default();
        for &i in samples {
            totals.add(self.labels[i], self.weights[i]);
        }
        totals
    }

    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn grow(&mut self, samples: &mut [usize], depth: usize) -> usize {
        let totals = self.totals(samples);
        let value = if totals.total() > 0.0 {
            totals.positive / totals.total()
        } else {
            0.0
        };

        let is_leaf = depth >= self.params.max_depth
            || samples.len() < self.params.min_samples_split
            || samples.len() < 2 * self.params.min_samples_leaf
            || totals.gini() <= f64::EPSILON;
        let split = if is_leaf {
            None
        } else {
            self.best_split(samples, totals)
        };
        let Some(split) = split else {
            return self.push(Node::Leaf { value });
        };

        self.importances[split.feature] += split.decrease;
        let index = self.push(Node::Leaf { value });
        let rows = self.rows;
        let (mut left, mut right): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .partition(|&&i| rows[i][split.feature] <= split.threshold);
        let left = self.grow(&mut left, depth + 1);
        let right = self.grow(&mut right, depth + 1);
        self.nodes[index] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        index
    }

    /// Searches a random subset of features for the split with the largest weighted
    /// impurity decrease.
    ///
    /// Constant features do not count towards `max_features`, and the search keeps
    /// going past `max_features` until some valid split is found.
    fn best_split(&mut self, samples: &mut [usize], totals: ClassTotals) -> Option<Split> {
        let mut features: [usize; VitalFeature::LEN] = std::array::from_fn(|i| i);
        features.shuffle(&mut *self.rng);

        let parent = totals.weighted_gini();
        let mut best: Option<Split> = None;
        let mut visited = 0;
        for feature in features {
            if visited >= self.max_features && best.is_some() {
                break;
            }

            let rows = self.rows;
            samples.sort_unstable_by(|&a, &b| rows[a][feature].total_cmp(&rows[b][feature]));
            let first = rows[samples[0]][feature];
            let last = rows[samples[samples.len() - 1]][feature];
            if last <= first + FEATURE_THRESHOLD {
                continue;
            }
            visited += 1;

            let mut left = ClassTotals::default();
            for pos in 0..samples.len() - 1 {
                let i = samples[pos];
                left.add(self.labels[i], self.weights[i]);

                let current = rows[i][feature];
                let next = rows[samples[pos + 1]][feature];
                if next <= current + FEATURE_THRESHOLD {
                    continue;
                }
                let n_left = pos + 1;
                if n_left < self.params.min_samples_leaf
                    || samples.len() - n_left < self.params.min_samples_leaf
                {
                    continue;
                }

                let right = ClassTotals {
                    negative: totals.negative - left.negative,
                    positive: totals.positive - left.positive,
                };
                let decrease = parent - left.weighted_gini() - right.weighted_gini();
                if best.is_none_or(|b| decrease > b.decrease) {
                    let mut threshold = current + (next - current) / 2.0;
                    if threshold >= next || !threshold.is_finite() {
                        threshold = current;
                    }
                    best = Some(Split {
                        feature,
                        threshold,
                        decrease,
                    });
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use rand::{RngCore, SeedableRng as _};
    use rand_pcg::Pcg64;

    use super::*;

    fn params(max_depth: usize) -> ForestParams {
        ForestParams {
            max_depth,
            max_features: Some(VitalFeature::LEN),
            ..ForestParams::default()
        }
    }

    fn step_data() -> (Vec<Row>, Vec<u8>) {
        let rows: Vec<Row> = (0..20)
            .map(|i| {
                let x = f64::from(i);
                [x, 5.0, 5.0, 5.0, 5.0, 5.0]
            })
            .collect();
        let labels = (0..20).map(|i| u8::from(i >= 12)).collect();
        (rows, labels)
    }

    #[test]
    fn test_gini() {
        let pure = ClassTotals {
            negative: 3.0,
            positive: 0.0,
        };
        assert!(pure.gini().abs() < 1e-15);
        let mixed = ClassTotals {
            negative: 2.0,
            positive: 2.0,
        };
        assert!((mixed.gini() - 0.5).abs() < 1e-15);
        assert!((mixed.weighted_gini() - 2.0).abs() < 1e-15);
    }

    #[test]
    fn test_single_split_at_midpoint() {
        let (rows, labels) = step_data();
        let weights = vec![1.0; rows.len()];
        let mut rng = Pcg64::seed_from_u64(0);
        let tree = DecisionTree::fit(&rows, &labels, &weights, &params(10), &mut rng);

        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.depth(), 1);
        assert!(matches!(
            tree.nodes[0],
            Node::Split { feature: 0, threshold, .. } if (threshold - 11.5).abs() < 1e-12
        ));
        assert!(tree.predict(&[3.0, 5.0, 5.0, 5.0, 5.0, 5.0]).abs() < 1e-12);
        assert!((tree.predict(&[15.0, 5.0, 5.0, 5.0, 5.0, 5.0]) - 1.0).abs() < 1e-12);
        assert_eq!(tree.importances(), [1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_depth_limit_yields_weighted_leaf() {
        let (rows, labels) = step_data();
        let weights: Vec<f64> = labels.iter().map(|&l| if l == 1 { 3.0 } else { 1.0 }).collect();
        let mut rng = Pcg64::seed_from_u64(0);
        let tree = DecisionTree::fit(&rows, &labels, &weights, &params(0), &mut rng);

        assert_eq!(tree.node_count(), 1);
        // 8 positives * 3 against 12 negatives * 1
        assert!((tree.predict(&rows[0]) - 24.0 / 36.0).abs() < 1e-12);
        assert_eq!(tree.importances(), [0.0; VitalFeature::LEN]);
    }

    #[test]
    fn test_zero_weight_rows_are_ignored() {
        let (rows, labels) = step_data();
        let weights: Vec<f64> = labels.iter().map(|&l| f64::from(1 - l)).collect();
        let mut rng = Pcg64::seed_from_u64(0);
        let tree = DecisionTree::fit(&rows, &labels, &weights, &params(10), &mut rng);
        assert_eq!(tree.node_count(), 1);
        assert!(tree.predict(&rows[19]).abs() < 1e-12);
    }

    #[test]
    fn test_constant_features_are_skipped() {
        let (rows, labels) = step_data();
        let weights = vec![1.0; rows.len()];
        let single_feature = ForestParams {
            max_features: Some(1),
            ..ForestParams::default()
        };
        // Only feature 0 varies, so whatever order the features are drawn in, the
        // search reaches it.
        for seed in 0..10 {
            let mut rng = Pcg64::seed_from_u64(seed);
            let tree = DecisionTree::fit(&rows, &labels, &weights, &single_feature, &mut rng);
            assert_eq!(tree.node_count(), 3, "seed {seed}");
        }
    }

    #[test]
    fn test_fit_accepts_trait_object_rng() {
        let (rows, labels) = step_data();
        let weights = vec![1.0; rows.len()];
        let mut pcg = Pcg64::seed_from_u64(0);
        let rng: &mut dyn RngCore = &mut pcg;
        let tree = DecisionTree::fit(&rows, &labels, &weights, &params(10), rng);
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.importances(), [1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }
}
