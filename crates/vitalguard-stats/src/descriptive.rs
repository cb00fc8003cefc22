//! Single-pass summary statistics.

/// Count, range, mean and population spread of a sample.
///
/// Built in one pass with Welford's update, so the input does not have to be
/// collected or sorted first.
///
/// ```
/// # use vitalguard_stats::descriptive::DescriptiveStats;
/// let stats = DescriptiveStats::new([5.0, 2.0, 4.0, 1.0, 3.0]).unwrap();
/// assert_eq!((stats.min, stats.max), (1.0, 5.0));
/// assert_eq!(stats.mean, 3.0);
/// assert_eq!(stats.variance, 2.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescriptiveStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population variance (divides by `n`).
    pub variance: f64,
    pub std_dev: f64,
}

impl DescriptiveStats {
    /// Summarizes `values`, or `None` when there are none.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter();
        let first = values.next()?;

        let (mut count, mut mean, mut m2) = (1_usize, first, 0.0);
        let (mut min, mut max) = (first, first);
        for v in values {
            count += 1;
            let delta = v - mean;
            mean += delta / count as f64;
            m2 += delta * (v - mean);
            min = min.min(v);
            max = max.max(v);
        }

        let variance = m2 / count as f64;
        Some(Self {
            count,
            min,
            max,
            mean,
            variance,
            std_dev: variance.sqrt(),
        })
    }

    /// Arithmetic mean of `values`; `NaN` when empty.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean_of(values: &[f64]) -> f64 {
        if values.is_empty() {
            return f64::NAN;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }
}
