//! Statistical helpers for summarizing benchmark runs.
//!
//! - [`descriptive`]: count, sum, min, max, mean, median, variance and
//!   standard deviation of a set of `f64` samples
//!
//! # Examples
//!
//! ```
//! use decksmith_stats::descriptive::DescriptiveStats;
//!
//! let stats = DescriptiveStats::new([0.62, 0.71, 0.58, 0.66]).unwrap();
//! assert_eq!(stats.count, 4);
//! assert!((stats.median - 0.64).abs() < 1e-12);
//! ```

pub mod descriptive;
