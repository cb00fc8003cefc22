//! Risk-tier cut points derived from the precision-recall curve.

use std::fmt;

use serde::Serialize;

use crate::metrics::PrecisionRecallCurve;

/// Recall the high-risk cut must still reach.
pub const TARGET_RECALL: f64 = 0.8;
/// High-recall cut used when no threshold reaches [`TARGET_RECALL`].
pub const FALLBACK_HIGH_RECALL: f64 = 0.3;
/// Moderate cut used when F1 peaks at the curve's final point.
pub const FALLBACK_MODERATE: f64 = 0.5;
/// Upper bound of the low-risk cut.
pub const LOW_RISK_CEILING: f64 = 0.2;
/// The high-risk cut is at least this multiple of the moderate cut.
pub const HIGH_OVER_MODERATE: f64 = 1.2;

/// Probability cut points of the low, moderate and high risk tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskThresholds {
    pub low_risk: f64,
    pub moderate_risk: f64,
    pub high_risk: f64,
}

impl RiskThresholds {
    /// Derives cut points from held-out labels and predicted probabilities.
    ///
    /// # Examples
    ///
    /// ```
    /// use vitalguard_training::risk::RiskThresholds;
    ///
    /// let labels = [0, 0, 0, 1, 0, 1, 1, 1];
    /// let scores = [0.05, 0.1, 0.2, 0.3, 0.4, 0.6, 0.7, 0.9];
    /// let risk = RiskThresholds::from_predictions(&labels, &scores);
    /// assert!(risk.low_risk <= risk.moderate_risk);
    /// assert!(risk.moderate_risk <= risk.high_risk);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `labels` and `scores` differ in length.
    #[must_use]
    pub fn from_predictions(labels: &[u8], scores: &[f64]) -> Self {
        Self::from_curve(&PrecisionRecallCurve::compute(labels, scores))
    }

    #[must_use]
    pub fn from_curve(curve: &PrecisionRecallCurve) -> Self {
        let high_recall = curve
            .recall
            .iter()
            .position(|&r| r >= TARGET_RECALL)
            .and_then(|i| curve.thresholds.get(i).copied())
            .unwrap_or_else(|| {
                log::warn!(
                    "no threshold reaches recall {TARGET_RECALL}; using {FALLBACK_HIGH_RECALL}"
                );
                FALLBACK_HIGH_RECALL
            });

        let f1 = curve.f1_scores();
        let best = f1
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, &score)| match best {
                Some((_, best_score)) if score <= best_score => best,
                _ => Some((i, score)),
            })
            .map(|(i, _)| i);
        let moderate = best
            .and_then(|i| curve.thresholds.get(i).copied())
            .unwrap_or_else(|| {
                log::warn!("F1 peaks past the last threshold; using {FALLBACK_MODERATE}");
                FALLBACK_MODERATE
            });

        Self {
            low_risk: LOW_RISK_CEILING.min(0.5 * moderate),
            moderate_risk: moderate,
            high_risk: high_recall.max(HIGH_OVER_MODERATE * moderate),
        }
    }
}

impl fmt::Display for RiskThresholds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Low risk:      < {:.3}", self.low_risk)?;
        writeln!(
            f,
            "Moderate risk: {:.3} - {:.3}",
            self.low_risk, self.moderate_risk
        )?;
        write!(f, "High risk:     > {:.3}", self.high_risk)
    }
}
