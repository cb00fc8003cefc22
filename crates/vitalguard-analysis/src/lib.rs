//! Descriptive analysis of the deterioration dataset.
//!
//! Everything here is computed from the full dataset, independently of model training:
//!
//! - [`thresholds`]: per-feature normal/warning/critical cut points derived from
//!   class-conditional percentiles
//! - [`importance`]: correlation-based feature weights, and the blend of those
//!   weights with model-derived ones
//!
//! # Example
//!
//! ```no_run
//! use vitalguard_analysis::{importance, thresholds::ThresholdTable};
//! use vitalguard_data::Dataset;
//!
//! let dataset = Dataset::load("ML/hospital_deterioration_ml_ready.csv")?;
//! let thresholds = ThresholdTable::from_dataset(&dataset);
//! let weights = importance::correlation_weights(&dataset);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod importance;
pub mod thresholds;
