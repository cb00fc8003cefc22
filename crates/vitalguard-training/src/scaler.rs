//! Feature standardization.

use vitalguard_data::VitalFeature;
use vitalguard_stats::descriptive::DescriptiveStats;

use crate::classifier::Row;

/// Zero-mean, unit-variance scaler fitted on the training split.
///
/// Scales are population standard deviations; a (near-)constant feature keeps a
/// scale of 1.0 so it is centred but not blown up.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Row,
    scale: Row,
}

impl StandardScaler {
    /// Learns per-feature mean and scale from `rows`.
    ///
    /// # Panics
    ///
    /// Panics if `rows` is empty.
    #[must_use]
    pub fn fit(rows: &[Row]) -> Self {
        assert!(!rows.is_empty(), "cannot fit a scaler on no rows");
        let mut mean = [0.0; VitalFeature::LEN];
        let mut scale = [1.0; VitalFeature::LEN];
        for feature in VitalFeature::ALL {
            let i = feature.index();
            let Some(stats) = DescriptiveStats::new(rows.iter().map(|row| row[i])) else {
                continue;
            };
            mean[i] = stats.mean;
            if stats.std_dev >= 10.0 * f64::EPSILON {
                scale[i] = stats.std_dev;
            } else {
                log::warn!("{feature}: zero variance in training split, scale left at 1.0");
            }
        }
        Self { mean, scale }
    }

    /// Per-feature means in canonical order.
    #[must_use]
    pub fn mean(&self) -> &Row {
        &self.mean
    }

    /// Per-feature scales in canonical order.
    #[must_use]
    pub fn scale(&self) -> &Row {
        &self.scale
    }

    #[must_use]
    pub fn transform_row(&self, row: &Row) -> Row {
        std::array::from_fn(|i| (row[i] - self.mean[i]) / self.scale[i])
    }

    #[must_use]
    pub fn transform(&self, rows: &[Row]) -> Vec<Row> {
        rows.iter().map(|row| self.transform_row(row)).collect()
    }
}
