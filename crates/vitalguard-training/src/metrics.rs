//! Evaluation metrics on held-out predictions.
//!
//! Labels are `0` (normal) and `1` (deterioration); scores are predicted
//! probabilities of class 1.

use std::fmt;

/// Area under the ROC curve, with tied scores handled by the trapezoidal rule.
///
/// Returns `None` when `labels` lacks either class, since the curve is undefined.
///
/// # Examples
///
/// ```
/// use vitalguard_training::metrics::roc_auc;
///
/// assert_eq!(roc_auc(&[0, 0, 1, 1], &[0.1, 0.4, 0.35, 0.8]), Some(0.75));
/// assert_eq!(roc_auc(&[1, 1], &[0.1, 0.4]), None);
/// ```
///
/// # Panics
///
/// Panics if `labels` and `scores` differ in length.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn roc_auc(labels: &[u8], scores: &[f64]) -> Option<f64> {
    let points = CumulativeCounts::new(labels, scores);
    let (positives, negatives) = points.totals();
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut area = 0.0;
    let (mut hits_before, mut alarms_before) = (0, 0);
    for &(_, hits, false_alarms) in &points.steps {
        area += (false_alarms - alarms_before) as f64 * (hits + hits_before) as f64 / 2.0;
        hits_before = hits;
        alarms_before = false_alarms;
    }
    Some(area / (positives as f64 * negatives as f64))
}

/// True/false positive counts at each distinct score, highest score first.
struct CumulativeCounts {
    /// `(threshold, hits, false_alarms)`: true and false positives when predicting positive when `score >= threshold`.
    steps: Vec<(f64, usize, usize)>,
}

impl CumulativeCounts {
    fn new(labels: &[u8], scores: &[f64]) -> Self {
        assert_eq!(
            labels.len(),
            scores.len(),
            "labels and scores must have the same length"
        );
        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

        let mut steps: Vec<(f64, usize, usize)> = vec![];
        let (mut hits, mut false_alarms) = (0, 0);
        for (pos, &i) in order.iter().enumerate() {
            if labels[i] == 1 {
                hits += 1;
            } else {
                false_alarms += 1;
            }
            let is_last_of_group = order
                .get(pos + 1)
                .is_none_or(|&next| scores[next].total_cmp(&scores[i]).is_ne());
            if is_last_of_group {
                steps.push((scores[i], hits, false_alarms));
            }
        }
        Self { steps }
    }

    fn totals(&self) -> (usize, usize) {
        self.steps
            .last()
            .map_or((0, 0), |&(_, hits, false_alarms)| (hits, false_alarms))
    }
}

/// Precision and recall at every distinct score.
///
/// `thresholds` are ascending; `precision[i]`/`recall[i]` describe predicting
/// positive for `score >= thresholds[i]`. Both curves carry one extra final point
/// (precision 1, recall 0) that has no threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecisionRecallCurve {
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    pub thresholds: Vec<f64>,
}

impl PrecisionRecallCurve {
    /// # Panics
    ///
    /// Panics if `labels` and `scores` differ in length.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn compute(labels: &[u8], scores: &[f64]) -> Self {
        let points = CumulativeCounts::new(labels, scores);
        let (positives, _) = points.totals();
        if positives == 0 {
            log::warn!("no positive sample in evaluation labels; recall is set to 1 for all thresholds");
        }

        let len = points.steps.len() + 1;
        let mut precision = Vec::with_capacity(len);
        let mut recall = Vec::with_capacity(len);
        let mut thresholds = Vec::with_capacity(len - 1);
        for &(threshold, hits, false_alarms) in points.steps.iter().rev() {
            precision.push(hits as f64 / (hits + false_alarms) as f64);
            recall.push(if positives == 0 {
                1.0
            } else {
                hits as f64 / positives as f64
            });
            thresholds.push(threshold);
        }
        precision.push(1.0);
        recall.push(0.0);

        Self {
            precision,
            recall,
            thresholds,
        }
    }

    /// F1 score at each curve point, `2pr / (p + r + 1e-10)`.
    #[must_use]
    pub fn f1_scores(&self) -> Vec<f64> {
        self.precision
            .iter()
            .zip(&self.recall)
            .map(|(p, r)| 2.0 * p * r / (p + r + 1e-10))
            .collect()
    }
}

/// Counts of a 2×2 binary confusion matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_positive: usize,
}

impl ConfusionMatrix {
    /// # Panics
    ///
    /// Panics if `labels` and `predictions` differ in length.
    #[must_use]
    pub fn new(labels: &[u8], predictions: &[u8]) -> Self {
        assert_eq!(labels.len(), predictions.len());
        let mut matrix = Self::default();
        for (&label, &pred) in labels.iter().zip(predictions) {
            match (label, pred) {
                (1, 1) => matrix.true_positive += 1,
                (0, 1) => matrix.false_positive += 1,
                (1, _) => matrix.false_negative += 1,
                _ => matrix.true_negative += 1,
            }
        }
        matrix
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[[{:>5} {:>5}]", self.true_negative, self.false_positive)?;
        write!(f, " [{:>5} {:>5}]]", self.false_negative, self.true_positive)
    }
}

/// Precision, recall and F1 of one class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

impl ClassMetrics {
    #[expect(clippy::cast_precision_loss)]
    fn new(true_pos: usize, false_pos: usize, false_neg: usize) -> Self {
        let ratio = |num: usize, den: usize| {
            if den == 0 {
                0.0
            } else {
                num as f64 / den as f64
            }
        };
        let precision = ratio(true_pos, true_pos + false_pos);
        let recall = ratio(true_pos, true_pos + false_neg);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            precision,
            recall,
            f1,
            support: true_pos + false_neg,
        }
    }
}

/// Row labels of the two classes in the printed report.
pub const CLASS_NAMES: [&str; 2] = ["No Deterioration", "Deterioration"];

/// Per-class metrics plus accuracy and averages.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    /// Indexed by label.
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_confusion(matrix: &ConfusionMatrix) -> Self {
        let negative = ClassMetrics::new(
            matrix.true_negative,
            matrix.false_negative,
            matrix.false_positive,
        );
        let positive = ClassMetrics::new(
            matrix.true_positive,
            matrix.false_positive,
            matrix.false_negative,
        );
        let classes = [negative, positive];
        let total = matrix.total();

        let average = |weight: &dyn Fn(&ClassMetrics) -> f64| {
            let denom: f64 = classes.iter().map(weight).sum();
            let mean = |metric: fn(&ClassMetrics) -> f64| {
                if denom > 0.0 {
                    classes.iter().map(|c| weight(c) * metric(c)).sum::<f64>() / denom
                } else {
                    0.0
                }
            };
            ClassMetrics {
                precision: mean(|c| c.precision),
                recall: mean(|c| c.recall),
                f1: mean(|c| c.f1),
                support: total,
            }
        };

        Self {
            classes,
            accuracy: if total == 0 {
                0.0
            } else {
                (matrix.true_negative + matrix.true_positive) as f64 / total as f64
            },
            macro_avg: average(&|_| 1.0),
            weighted_avg: average(&|c| c.support as f64),
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = |f: &mut fmt::Formatter<'_>, name: &str, m: &ClassMetrics| {
            writeln!(
                f,
                "{name:>16} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.precision, m.recall, m.f1, m.support
            )
        };
        writeln!(
            f,
            "{:>16} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (name, metrics) in CLASS_NAMES.iter().zip(&self.classes) {
            row(f, *name, metrics)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>16} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.weighted_avg.support
        )?;
        row(f, "macro avg", &self.macro_avg)?;
        row(f, "weighted avg", &self.weighted_avg)
    }
}
