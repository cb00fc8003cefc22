//! Pearson product-moment correlation.

use crate::descriptive::DescriptiveStats;

/// Computes the Pearson correlation coefficient between two samples.
///
/// The result lies in `[-1.0, 1.0]`. If either sample has zero variance the
/// coefficient is undefined and `f64::NAN` is returned; callers decide whether
/// that is an error.
///
/// # Panics
///
/// Panics if `x` and `y` have different lengths.
///
/// # Examples
///
/// ```
/// use vitalguard_stats::correlation::pearson;
///
/// let x = [1.0, 2.0, 3.0];
/// let y = [3.0, 2.0, 1.0];
/// assert!((pearson(&x, &y) + 1.0).abs() < 1e-12);
///
/// let constant = [5.0, 5.0, 5.0];
/// assert!(pearson(&x, &constant).is_nan());
/// ```
#[must_use]
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    assert_eq!(x.len(), y.len(), "samples must have the same length");
    if x.len() < 2 {
        return f64::NAN;
    }

    let mean_x = DescriptiveStats::mean_of(x);
    let mean_y = DescriptiveStats::mean_of(y);

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&a, &b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        log::trace!("pearson: zero variance (var_x={var_x}, var_y={var_y})");
        return f64::NAN;
    }
    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}
