//! Statistical utilities for the VitalGuard training pipeline.
//!
//! This crate provides the small set of statistical tools the pipeline needs:
//!
//! - **Descriptive statistics**: range, mean, population variance and standard deviation
//! - **Percentiles**: linearly interpolated percentiles over sorted data
//! - **Correlation**: Pearson correlation between two equally long samples
//! - **Weights**: L1 normalization and averaging of weight vectors
//!
//! # Modules
//!
//! - [`descriptive`]: One-pass summary of a sample
//! - [`percentiles`]: Interpolated percentiles of a sorted sample
//! - [`correlation`]: Pearson product-moment correlation
//! - [`weights`]: Weight vector normalization
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use vitalguard_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Computing percentiles
//!
//! ```
//! use vitalguard_stats::percentiles::SortedSample;
//!
//! let sample = SortedSample::new([5.0, 1.0, 4.0, 2.0, 3.0]);
//! assert_eq!(sample.percentile(50.0), 3.0);
//! assert_eq!(sample.percentile(25.0), 2.0);
//! ```
//!
//! ## Correlating two samples
//!
//! ```
//! use vitalguard_stats::correlation::pearson;
//!
//! let x = [1.0, 2.0, 3.0, 4.0];
//! let y = [2.0, 4.0, 6.0, 8.0];
//! assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);
//! ```

pub mod correlation;
pub mod descriptive;
pub mod percentiles;
pub mod weights;
