//! Feature-importance weights.
//!
//! Correlation weights are `|r|` between each raw feature and the label, normalized
//! to sum to 1. A feature with zero variance has no defined correlation; its `NaN`
//! is not masked and spreads to every weight of the vector.

use vitalguard_data::{Dataset, FeatureMap};
use vitalguard_stats::{correlation::pearson, weights};

/// Correlation-based importance of each feature.
#[must_use]
pub fn correlation_weights(dataset: &Dataset) -> FeatureMap<f64> {
    let labels = dataset.labels_f64();
    let mut weights = FeatureMap::from_fn(|feature| {
        let r = pearson(&dataset.column(feature), &labels);
        if r.is_nan() {
            log::warn!("{feature}: correlation with the label is undefined (constant column?)");
        }
        r.abs()
    });
    weights::normalize_l1(weights.values_mut());
    weights
}

/// Blends correlation-based and model-based weights by averaging, renormalized to sum to 1.
#[must_use]
pub fn combine_weights(
    correlation: &FeatureMap<f64>,
    model: &FeatureMap<f64>,
) -> FeatureMap<f64> {
    let averaged = weights::average(correlation.values(), model.values());
    let mut combined = FeatureMap::from_fn(|feature| averaged[feature.index()]);
    weights::normalize_l1(combined.values_mut());
    combined
}
