//! Dataset model for the VitalGuard deterioration trainer.
//!
//! This crate owns everything that touches the raw input:
//!
//! - [`feature`]: the six vital-sign features, their dataset column names and their
//!   application-facing names, plus [`FeatureMap`] for per-feature values
//! - [`dataset`]: loading and validating the CSV dataset into an immutable [`Dataset`]
//! - [`split`]: seeded, label-stratified train/test partitioning
//!
//! # Example
//!
//! ```no_run
//! use vitalguard_data::{Dataset, split::stratified_split};
//!
//! let dataset = Dataset::load("ML/hospital_deterioration_ml_ready.csv")?;
//! let split = stratified_split(dataset.labels(), 0.2, 42)?;
//! let train = dataset.subset(&split.train);
//! let test = dataset.subset(&split.test);
//! assert_eq!(train.len() + test.len(), dataset.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use self::{
    dataset::{Dataset, DatasetError, LABEL_COLUMN},
    feature::{FeatureMap, FeatureMapping, ThresholdSemantics, VitalFeature},
};

pub mod dataset;
pub mod feature;
pub mod split;
