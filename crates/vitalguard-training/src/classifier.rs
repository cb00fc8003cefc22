//! Common interface of the candidate classifiers.

use std::fmt;

use vitalguard_data::{FeatureMap, VitalFeature};
use vitalguard_stats::weights;

/// One standardized feature row.
pub type Row = [f64; VitalFeature::LEN];

/// The candidate model families, in evaluation order.
///
/// Evaluation order matters: when two candidates reach exactly the same ROC-AUC the
/// one evaluated first is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ClassifierKind {
    #[display("Logistic Regression")]
    LogisticRegression,
    #[display("Random Forest")]
    RandomForest,
}

impl ClassifierKind {
    /// All candidates in evaluation order.
    pub const ALL: [Self; 2] = [Self::LogisticRegression, Self::RandomForest];

    /// Human-readable model name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LogisticRegression => "Logistic Regression",
            Self::RandomForest => "Random Forest",
        }
    }

    /// Lower-case, hyphenated name used in version strings (`"random-forest"`).
    #[must_use]
    pub fn slug(self) -> String {
        self.name().to_lowercase().replace(' ', "-")
    }
}

/// A trained probabilistic binary classifier.
pub trait Classifier: fmt::Debug + Send + Sync {
    /// Which model family this is.
    fn kind(&self) -> ClassifierKind;

    /// Probability of deterioration for one standardized row.
    fn predict_proba_row(&self, row: &Row) -> f64;

    /// Probability of deterioration for each standardized row.
    fn predict_proba(&self, rows: &[Row]) -> Vec<f64> {
        rows.iter().map(|row| self.predict_proba_row(row)).collect()
    }

    /// Unnormalized per-feature importance, if the model exposes one.
    fn raw_importances(&self) -> Option<Row>;

    /// Per-feature importance normalized to sum to 1.
    ///
    /// Models without importances get uniform weights.
    fn feature_weights(&self) -> FeatureMap<f64> {
        #[expect(clippy::cast_precision_loss)]
        let uniform = 1.0 / VitalFeature::LEN as f64;
        let mut importances = self
            .raw_importances()
            .unwrap_or([uniform; VitalFeature::LEN]);
        weights::normalize_l1(&mut importances);
        FeatureMap::from_array(importances)
    }
}

pub type BoxedClassifier = Box<dyn Classifier>;

/// Per-sample weights that give both classes the same total weight.
///
/// Class `c` gets `n / (2 * n_c)`. A class absent from `labels` contributes no samples,
/// so its weight is never used.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn balanced_sample_weights(labels: &[u8]) -> Vec<f64> {
    let n = labels.len() as f64;
    let positives = labels.iter().map(|&l| f64::from(l)).sum::<f64>();
    let negatives = n - positives;
    let class_weight = [n / (2.0 * negatives), n / (2.0 * positives)];
    labels
        .iter()
        .map(|&l| class_weight[usize::from(l)])
        .collect()
}
