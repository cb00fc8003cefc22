//! Class-conditional threshold table.
//!
//! For every feature the dataset is partitioned by label. Normal bounds come from the
//! non-deteriorating rows (P5/P95); warning and critical bounds come from the
//! deteriorating rows. `SpO2` is bounded from below only: its warning bound is the
//! median of deteriorating patients and its critical bound the 10th percentile.
//! Every other feature is bounded on both sides (P10/P90 warning, P2/P98 critical).

use serde::Serialize;
use vitalguard_data::{Dataset, FeatureMap, ThresholdSemantics, VitalFeature};
use vitalguard_stats::{descriptive::DescriptiveStats, percentiles::SortedSample};

const NORMAL_LOW: f64 = 5.0;
const NORMAL_HIGH: f64 = 95.0;
const WARNING_LOW: f64 = 10.0;
const WARNING_HIGH: f64 = 90.0;
const CRITICAL_LOW: f64 = 2.0;
const CRITICAL_HIGH: f64 = 98.0;
const LOWER_ONLY_WARNING: f64 = 50.0;
const LOWER_ONLY_CRITICAL: f64 = 10.0;

/// Bounds for a feature where only low readings indicate deterioration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LowerBounds {
    pub normal_min: f64,
    pub warning_min: f64,
    pub critical_min: f64,
    pub mean_normal: f64,
    pub mean_deterioration: f64,
}

/// Bounds for a feature where both low and high readings indicate deterioration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TwoSidedBounds {
    pub normal_min: f64,
    pub normal_max: f64,
    pub warning_min: f64,
    pub warning_max: f64,
    pub critical_min: f64,
    pub critical_max: f64,
    pub mean_normal: f64,
    pub mean_deterioration: f64,
}

/// Threshold entry of one feature; serializes as a flat object of named bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureThresholds {
    LowerIsWorse(LowerBounds),
    TwoSided(TwoSidedBounds),
}

impl FeatureThresholds {
    /// Computes the entry for `feature` from its normal and deteriorating values.
    ///
    /// Empty partitions yield `NaN` bounds.
    #[must_use]
    pub fn compute(feature: VitalFeature, normal: &[f64], deteriorating: &[f64]) -> Self {
        let mean_normal = DescriptiveStats::mean_of(normal);
        let mean_deterioration = DescriptiveStats::mean_of(deteriorating);

        let normal = SortedSample::new(normal.iter().copied());
        let deteriorating = SortedSample::new(deteriorating.iter().copied());

        match feature.threshold_semantics() {
            ThresholdSemantics::LowerIsWorse => Self::LowerIsWorse(LowerBounds {
                normal_min: normal.percentile(NORMAL_LOW),
                warning_min: deteriorating.percentile(LOWER_ONLY_WARNING),
                critical_min: deteriorating.percentile(LOWER_ONLY_CRITICAL),
                mean_normal,
                mean_deterioration,
            }),
            ThresholdSemantics::TwoSided => Self::TwoSided(TwoSidedBounds {
                normal_min: normal.percentile(NORMAL_LOW),
                normal_max: normal.percentile(NORMAL_HIGH),
                warning_min: deteriorating.percentile(WARNING_LOW),
                warning_max: deteriorating.percentile(WARNING_HIGH),
                critical_min: deteriorating.percentile(CRITICAL_LOW),
                critical_max: deteriorating.percentile(CRITICAL_HIGH),
                mean_normal,
                mean_deterioration,
            }),
        }
    }
}

/// Threshold entries for all six features, keyed by application feature name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ThresholdTable(FeatureMap<FeatureThresholds>);

impl ThresholdTable {
    /// Computes the table from the full dataset.
    #[must_use]
    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self(FeatureMap::from_fn(|feature| {
            let (normal, deteriorating) = dataset.column_by_label(feature);
            if normal.is_empty() || deteriorating.is_empty() {
                log::warn!(
                    "{feature}: {} normal / {} deteriorating rows; thresholds will contain NaN",
                    normal.len(),
                    deteriorating.len()
                );
            }
            FeatureThresholds::compute(feature, &normal, &deteriorating)
        }))
    }

    /// Entry for one feature.
    #[must_use]
    pub fn get(&self, feature: VitalFeature) -> &FeatureThresholds {
        &self.0[feature]
    }
}
