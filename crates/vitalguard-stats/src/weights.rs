//! Weight vector operations.
//!
//! Feature weights in the exported configuration express relative importance, so
//! every weight vector is L1-normalized (non-negative entries summing to 1.0)
//! before it leaves the pipeline.

/// Normalizes a weight vector to sum to 1.0 (L1 normalization).
///
/// If the sum is zero or negative, weights are left unchanged (to avoid division
/// by zero). A `NaN` entry poisons the sum, and the division then turns every
/// entry into `NaN`; undefined inputs are never silently turned into valid weights.
///
/// # Examples
///
/// ```
/// use vitalguard_stats::weights::normalize_l1;
///
/// let mut weights = [1.0, 3.0];
/// normalize_l1(&mut weights);
/// assert_eq!(weights, [0.25, 0.75]);
/// ```
pub fn normalize_l1(weights: &mut [f64]) {
    let sum: f64 = weights.iter().copied().sum();
    if sum > 0.0 || sum.is_nan() {
        for w in weights {
            *w /= sum;
        }
    }
}

/// Element-wise arithmetic mean of two equally long weight vectors.
///
/// # Panics
///
/// Panics if the vectors have different lengths.
#[must_use]
pub fn average(a: &[f64], b: &[f64]) -> Vec<f64> {
    assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| f64::midpoint(*x, *y)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sum_is_left_unchanged() {
        let mut weights = [0.0, 0.0, 0.0];
        normalize_l1(&mut weights);
        assert_eq!(weights, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_nan_propagates_to_every_entry() {
        let mut weights = [0.5, f64::NAN, 0.5];
        normalize_l1(&mut weights);
        assert!(weights.iter().all(|w| w.is_nan()));
    }

    #[test]
    fn test_average_then_normalize_sums_to_one() {
        let a = [0.1, 0.2, 0.7];
        let b = [0.5, 0.25, 0.25];
        let mut combined = average(&a, &b);
        normalize_l1(&mut combined);
        assert!((combined.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((combined[2] - 0.475).abs() < 1e-12);
    }
}
