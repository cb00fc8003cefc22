//! Model training for the VitalGuard deterioration rules.
//!
//! This crate turns a loaded [`Dataset`](vitalguard_data::Dataset) into a trained
//! classifier, its held-out evaluation, and the risk-tier cut points exported with
//! the rule configuration.
//!
//! # How Training Works
//!
//! 1. **Split** - Stratified 80/20 train/test split with a fixed seed
//! 2. **Standardize** - Zero-mean, unit-variance scaling fitted on the training rows
//! 3. **Fit** - Logistic regression and a random forest, both class-balanced
//! 4. **Select** - The candidate with the higher held-out ROC-AUC wins (first wins ties)
//! 5. **Evaluate** - Classification report and confusion matrix at probability 0.5
//! 6. **Risk tiers** - Cut points from the precision-recall curve of the winner
//!
//! # Architecture
//!
//! ```text
//! Dataset
//!     ↓ stratified_split (vitalguard-data)
//! train rows ──→ StandardScaler ──→ standardized rows
//!     ↓ fit
//! LogisticRegression, RandomForest  (Classifier)
//!     ↓ roc_auc on test rows
//! select_best
//!     ↓
//! TrainingOutcome ──→ RiskThresholds
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use vitalguard_data::Dataset;
//! use vitalguard_training::{TrainingConfig, risk::RiskThresholds};
//!
//! let dataset = Dataset::load("ML/hospital_deterioration_ml_ready.csv")?;
//! let outcome = vitalguard_training::train(&dataset, &TrainingConfig::default())?;
//! let risk = RiskThresholds::from_predictions(&outcome.test_labels, outcome.test_proba());
//! println!("{} ROC-AUC {:.4}", outcome.best.kind(), outcome.best.roc_auc);
//! ```

use vitalguard_data::split::SplitError;

pub use self::{
    config::{ForestParams, LogisticParams, TrainingConfig},
    selection::{TrainingOutcome, train},
};

pub mod classifier;
pub mod config;
pub mod forest;
pub mod logistic;
pub mod metrics;
pub mod risk;
pub mod scaler;
pub mod selection;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum TrainError {
    #[display("failed to split the dataset")]
    Split(SplitError),
    #[display("ROC-AUC of {model} is undefined: the test split lacks one class")]
    UndefinedAuc { model: &'static str },
    #[display("{model} failed to fit: {reason}")]
    Solver { model: &'static str, reason: String },
    #[display("no classifier was trained")]
    NoCandidate,
}

impl From<SplitError> for TrainError {
    fn from(err: SplitError) -> Self {
        Self::Split(err)
    }
}
