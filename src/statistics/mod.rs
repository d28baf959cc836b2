//! Statistical methods for benchmark analysis.
//!
//! This module provides:
//! - Descriptive statistics (mean, population variance, median)
//! - Nearest-rank percentile selection
//! - A range-discovering histogram built from a complete sample set
//! - A fixed-range streaming histogram fed one value at a time
//!
//! Both histogram engines implement [`DistributionSummary`], so reporting
//! code can treat them uniformly.

mod histo;
mod histogram;
mod rank;
mod summary;

pub use histo::Histo;
pub use histogram::{Bin, Histogram, HistogramOptions, Percentiles};
pub use rank::{nearest_rank, nearest_rank_index, nearest_ranks};
pub use summary::{floats_equal_with_tolerance, median, stats, Moments};

/// Common read-only view of a sample distribution.
pub trait DistributionSummary {
    /// Number of samples.
    fn count(&self) -> u64;

    /// Smallest sample, if any.
    fn minimum(&self) -> Option<f64>;

    /// Largest sample, if any.
    fn maximum(&self) -> Option<f64>;

    /// Mean of all samples, if any.
    fn mean(&self) -> Option<f64>;

    /// Median as estimated by the engine, if any.
    fn median(&self) -> Option<f64>;

    /// Text rendering with statistics line(s) and one bar per bin.
    fn render(&self) -> String;
}
