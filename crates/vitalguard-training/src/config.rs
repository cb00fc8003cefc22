//! Training hyper-parameters.

/// Hyper-parameters of the whole training run.
///
/// [`TrainingConfig::default`] is the configuration the exported rule set is
/// produced with; the command line only overrides the seed.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Seed for the stratified split and the forest's bootstrap/feature sampling.
    pub seed: u64,
    /// Share of rows held out for evaluation.
    pub test_ratio: f64,
    /// Probability above which a row is predicted as deteriorating in the evaluation report.
    pub decision_threshold: f64,
    pub logistic: LogisticParams,
    pub forest: ForestParams,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_ratio: 0.2,
            decision_threshold: 0.5,
            logistic: LogisticParams::default(),
            forest: ForestParams::default(),
        }
    }
}

/// L2-regularized logistic regression parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticParams {
    /// Inverse regularization strength; the penalty is `||w||² / (2C)` relative to the data term.
    pub c: f64,
    /// Maximum number of Newton iterations.
    pub max_iter: usize,
    /// Convergence tolerance on the largest gradient component (or coefficient update).
    pub tol: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            tol: 1e-8,
        }
    }
}

/// Random forest parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    /// Number of candidate features per split; `None` means `floor(sqrt(n_features))`.
    pub max_features: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 50,
            max_depth: 10,
            max_features: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl ForestParams {
    /// Resolved number of candidate features per split.
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn features_per_split(&self, n_features: usize) -> usize {
        self.max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().floor() as usize)
            .clamp(1, n_features)
    }
}
