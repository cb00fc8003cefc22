//! Linearly interpolated percentiles.
//!
//! The `k`-th percentile of `n` sorted values sits at the fractional rank
//! `(n - 1) * k / 100` and is interpolated between its two neighbouring values.
//! This matches the default `quantile` of common dataframe libraries, so P50 of an
//! even-sized sample is the midpoint of the two middle values.

/// A sample sorted once and queried for any number of percentiles.
///
/// # Examples
///
/// ```
/// use vitalguard_stats::percentiles::SortedSample;
///
/// let sample = SortedSample::new([10.0, 1.0, 4.0, 7.0]);
/// assert_eq!(sample.percentile(50.0), 5.5);
/// assert_eq!(sample.percentile(100.0), 10.0);
/// assert!(SortedSample::new([]).percentile(5.0).is_nan());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortedSample(Vec<f64>);

impl SortedSample {
    #[must_use]
    pub fn new<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values: Vec<f64> = values.into_iter().collect();
        values.sort_by(f64::total_cmp);
        Self(values)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value at percentile `p` (0 to 100); `NaN` for an empty sample.
    #[must_use]
    pub fn percentile(&self, p: f64) -> f64 {
        compute_percentile(&self.0, p)
    }
}

/// Percentile `p` (0 to 100) of ascending `sorted_values`, or `NaN` if empty.
///
/// ```
/// use vitalguard_stats::percentiles::compute_percentile;
///
/// assert_eq!(compute_percentile(&[1.0, 2.0, 3.0, 4.0], 50.0), 2.5);
/// assert_eq!(compute_percentile(&[10.0, 20.0], 10.0), 11.0);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_percentile(sorted_values: &[f64], p: f64) -> f64 {
    debug_assert!(sorted_values.is_sorted_by(|a, b| a <= b));
    let Some(last) = sorted_values.len().checked_sub(1) else {
        return f64::NAN;
    };
    let rank = (last as f64 * p / 100.0).clamp(0.0, last as f64);
    let below = rank.floor();
    let lo = sorted_values[below as usize];
    let hi = sorted_values[rank.ceil() as usize];
    lo + (hi - lo) * (rank - below)
}
