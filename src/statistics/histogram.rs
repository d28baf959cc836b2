//! Range-discovering histogram.
//!
//! Built once from the complete sample set: the samples are sorted, the
//! extremes, mean and nearest-rank percentiles are read off, and the value
//! range is split into bins. The upper end of the range is clamped to a
//! percentile (99.9% by default) so that a few outliers do not squeeze all
//! other samples into the first bin; clamped samples land in the last bin,
//! which is then flagged as an "and above" bucket.
//!
//! Bin spacing is either linear or snapped to "nice" numbers
//! (1, 2, 5 or 10 times a power of ten), the classic graph-axis labeling
//! heuristic. Both the rank rounding and the nice-number thresholds are
//! kept exactly as they are so that bucket boundaries stay comparable
//! across reports.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BAR_WIDTH, REPORTED_PERCENTILES};
use crate::output::terminal;

use super::rank::{nearest_rank, nearest_ranks};
use super::DistributionSummary;

/// Options for building a [`Histogram`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramOptions {
    /// Number of bins (default: 10).
    pub bin_count: usize,

    /// Snap bin spacing to 1/2/5 x 10^k (default: true).
    pub nice_range: bool,

    /// Lower end of the binned range (default: observed minimum).
    pub clamp_minimum: Option<f64>,

    /// Upper end of the binned range; takes precedence over
    /// `clamp_percentile` (default: none).
    pub clamp_maximum: Option<f64>,

    /// Percentile used as upper end of the binned range (default: 0.999).
    pub clamp_percentile: Option<f64>,
}

impl Default for HistogramOptions {
    fn default() -> Self {
        Self {
            bin_count: 10,
            nice_range: true,
            clamp_minimum: None,
            clamp_maximum: None,
            clamp_percentile: Some(0.999),
        }
    }
}

impl HistogramOptions {
    /// Set the number of bins.
    pub fn bin_count(mut self, bin_count: usize) -> Self {
        self.bin_count = bin_count;
        self
    }

    /// Enable or disable nice bin spacing.
    pub fn nice_range(mut self, nice: bool) -> Self {
        self.nice_range = nice;
        self
    }

    /// Clamp the binned range from below.
    pub fn clamp_minimum(mut self, value: f64) -> Self {
        self.clamp_minimum = Some(value);
        self
    }

    /// Clamp the binned range from above.
    pub fn clamp_maximum(mut self, value: f64) -> Self {
        self.clamp_maximum = Some(value);
        self
    }

    /// Clamp the binned range at a percentile, or not at all.
    pub fn clamp_percentile(mut self, p: Option<f64>) -> Self {
        self.clamp_percentile = p;
        self
    }
}

/// Nearest-rank percentiles reported by a [`Histogram`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    /// 25th percentile.
    pub p25: f64,
    /// Median.
    pub p50: f64,
    /// 75th percentile.
    pub p75: f64,
    /// 90th percentile.
    pub p90: f64,
    /// 99th percentile.
    pub p99: f64,
    /// 99.9th percentile.
    pub p999: f64,
    /// 99.99th percentile.
    pub p9999: f64,
}

impl Percentiles {
    fn from_sorted(sorted: &[f64]) -> Self {
        let [p25, p50, p75, p90, p99, p999, p9999] = nearest_ranks(sorted, &REPORTED_PERCENTILES);
        Self {
            p25,
            p50,
            p75,
            p90,
            p99,
            p999,
            p9999,
        }
    }

    fn scale(&mut self, n: f64) {
        for v in [
            &mut self.p25,
            &mut self.p50,
            &mut self.p75,
            &mut self.p90,
            &mut self.p99,
            &mut self.p999,
            &mut self.p9999,
        ] {
            *v /= n;
        }
    }
}

/// One histogram bin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    /// Lower boundary of the bin.
    pub start: f64,
    /// Samples in the bin.
    pub count: usize,
    /// `count` relative to the fullest bin, in `[0, 1]`.
    pub width: f64,
    /// Set on the last bin iff samples beyond the range were clamped into it.
    pub and_above: bool,
}

/// Binned distribution with summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Smallest sample.
    pub minimum: f64,
    /// Mean of all samples.
    pub average: f64,
    /// Largest sample.
    pub maximum: f64,
    /// Nearest-rank percentiles.
    pub percentiles: Percentiles,
    /// Bins in ascending order of `start`.
    pub bins: Vec<Bin>,
    /// Number of samples.
    pub count: usize,
    /// Bar width in characters for the fullest bin when rendering.
    pub width: usize,
}

impl Histogram {
    /// Build a histogram from nanosecond samples.
    ///
    /// # Panics
    ///
    /// Panics if `options.bin_count` is zero, if any sample is negative or
    /// NaN, or if the upper clamp lies below the smallest sample.
    pub fn new(samples: &[f64], options: &HistogramOptions) -> Self {
        assert!(options.bin_count > 0, "bin count must be larger than 0");

        let mut hist = Histogram {
            minimum: 0.0,
            average: 0.0,
            maximum: 0.0,
            percentiles: Percentiles::default(),
            bins: vec![Bin::default(); options.bin_count],
            count: 0,
            width: DEFAULT_BAR_WIDTH,
        };
        if samples.is_empty() {
            return hist;
        }

        assert!(
            samples.iter().all(|x| !x.is_nan()),
            "histogram samples must not be NaN"
        );
        let mut sorted = samples.to_vec();
        sorted.sort_unstable_by(|a, b| a.total_cmp(b));
        assert!(
            sorted[0] >= 0.0,
            "histogram samples must not be negative, got {}",
            sorted[0]
        );

        let n = sorted.len();
        hist.count = n;
        hist.minimum = sorted[0];
        hist.maximum = sorted[n - 1];
        hist.average = sorted.iter().sum::<f64>() / n as f64;
        hist.percentiles = Percentiles::from_sorted(&sorted);

        let clamp_minimum = options.clamp_minimum.unwrap_or(hist.minimum);
        let clamp_maximum = match (options.clamp_maximum, options.clamp_percentile) {
            (Some(max), _) => max,
            (None, Some(p)) => nearest_rank(&sorted, p),
            (None, None) => hist.maximum,
        };
        assert!(
            clamp_maximum >= hist.minimum,
            "clamp maximum {} lies below the smallest sample {}",
            clamp_maximum,
            hist.minimum
        );

        let (minimum, spacing) = if options.nice_range {
            nice_steps(clamp_minimum, clamp_maximum, options.bin_count)
        } else {
            linear_steps(clamp_minimum, clamp_maximum, options.bin_count)
        };
        assert!(
            !(minimum < 0.0),
            "histogram range starts below zero: {} (clamped to [{}, {}])",
            minimum,
            clamp_minimum,
            clamp_maximum
        );
        assert!(!(spacing < 0.0), "negative bin spacing {}", spacing);

        for (i, bin) in hist.bins.iter_mut().enumerate() {
            bin.start = spacing * i as f64 + clamp_minimum;
            assert!(!(bin.start < 0.0), "bin {} starts below zero: {}", i, bin.start);
        }
        hist.bins[0].start = clamp_minimum;

        let last = options.bin_count - 1;
        for &x in &sorted {
            let k = ((x - clamp_minimum) / spacing) as isize;
            let k = if k < 0 {
                0
            } else if k as usize > last {
                hist.bins[last].and_above = true;
                last
            } else {
                k as usize
            };
            hist.bins[k].count += 1;
        }

        let max_bin = hist.bins.iter().map(|b| b.count).max().unwrap_or(0);
        for bin in &mut hist.bins {
            bin.width = bin.count as f64 / max_bin as f64;
        }

        hist
    }

    /// Build a histogram from durations, in nanoseconds.
    pub fn from_durations(durations: &[Duration], options: &HistogramOptions) -> Self {
        let nanos: Vec<f64> = durations.iter().map(|d| d.as_nanos() as f64).collect();
        Self::new(&nanos, options)
    }

    /// Divide every absolute statistic and bin boundary by `n`.
    ///
    /// Counts and relative widths are unchanged. Use this to turn samples
    /// that each aggregate `n` operations into per-operation values.
    ///
    /// Statistics match a histogram built from the divided samples. Bin
    /// boundaries only match with linear spacing and a divisor that divides
    /// exactly, such as a power of two: nice spacing would snap the divided
    /// range to a different grid.
    ///
    /// # Panics
    ///
    /// Panics if `n` is not positive.
    pub fn scale(&mut self, n: f64) {
        assert!(n > 0.0, "scale divisor must be positive, got {}", n);
        self.minimum /= n;
        self.average /= n;
        self.maximum /= n;
        self.percentiles.scale(n);
        for bin in &mut self.bins {
            bin.start /= n;
        }
    }

    /// Two-line statistics summary.
    pub fn stats_string(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = terminal::write_histogram_stats(&mut out, self);
        out
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        terminal::write_histogram(f, self)
    }
}

impl DistributionSummary for Histogram {
    fn count(&self) -> u64 {
        self.count as u64
    }

    fn minimum(&self) -> Option<f64> {
        (self.count > 0).then_some(self.minimum)
    }

    fn maximum(&self) -> Option<f64> {
        (self.count > 0).then_some(self.maximum)
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.average)
    }

    fn median(&self) -> Option<f64> {
        (self.count > 0).then_some(self.percentiles.p50)
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

/// Linear spacing over `[min, max]`.
pub(crate) fn linear_steps(min: f64, max: f64, bin_count: usize) -> (f64, f64) {
    (min, (max - min) / bin_count as f64)
}

/// Nice spacing over `[min, max]`; returns the snapped minimum and spacing.
pub(crate) fn nice_steps(min: f64, max: f64, bin_count: usize) -> (f64, f64) {
    let span = nice_number(max - min, false);
    let spacing = nice_number(span / (bin_count as f64 - 1.0), true);
    let minimum = (min / spacing).floor() * spacing;
    (minimum, spacing)
}

/// Snap `span` to 1, 2, 5 or 10 times a power of ten.
///
/// With `round` the nearest candidate is chosen, otherwise the smallest
/// candidate not below `span`.
pub(crate) fn nice_number(span: f64, round: bool) -> f64 {
    let exp = span.log10().floor();
    let frac = span / 10f64.powf(exp);

    let nice = if round {
        if frac < 1.5 {
            1.0
        } else if frac < 3.0 {
            2.0
        } else if frac < 7.0 {
            5.0
        } else {
            10.0
        }
    } else if frac <= 1.0 {
        1.0
    } else if frac <= 2.0 {
        2.0
    } else if frac <= 5.0 {
        5.0
    } else {
        10.0
    };

    nice * 10f64.powf(exp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn test_nice_number_ceiling() {
        assert!(close(nice_number(99.0, false), 100.0));
        assert!(close(nice_number(100.0, false), 100.0));
        assert!(close(nice_number(1.7, false), 2.0));
        assert!(close(nice_number(3.2, false), 5.0));
        assert!(close(nice_number(0.06, false), 0.1));
    }

    #[test]
    fn test_nice_number_rounded() {
        assert!(close(nice_number(11.11, true), 10.0));
        assert!(close(nice_number(0.27, true), 0.2));
        assert!(close(nice_number(4.9, true), 5.0));
        assert!(close(nice_number(7.5, true), 10.0));
    }

    #[test]
    fn test_nice_steps() {
        let (min, spacing) = nice_steps(0.0, 99.0, 10);
        assert!(close(spacing, 10.0));
        assert_eq!(min, 0.0);

        let (min, spacing) = nice_steps(13.0, 57.0, 5);
        // span 44 -> 50, 50 / 4 = 12.5 -> 10
        assert!(close(spacing, 10.0));
        assert!(close(min, 10.0));
    }

    #[test]
    fn test_linear_steps() {
        assert_eq!(linear_steps(1.0, 4.0, 2), (1.0, 1.5));
    }

    #[test]
    fn test_nice_bins_on_uniform_data() {
        let samples: Vec<f64> = (0..100).map(|x| x as f64).collect();
        let hist = Histogram::new(&samples, &HistogramOptions::default());

        for (i, bin) in hist.bins.iter().enumerate() {
            assert!(close(bin.start, 10.0 * i as f64), "bin {} start {}", i, bin.start);
            assert_eq!(bin.count, 10);
            assert_eq!(bin.width, 1.0);
        }
        assert!(!hist.bins[9].and_above);
    }

    #[test]
    fn test_empty_input() {
        let hist = Histogram::new(&[], &HistogramOptions::default());
        assert_eq!(hist.bins.len(), 10);
        assert_eq!(hist.count, 0);
        assert_eq!(hist.minimum(), None);
        assert_eq!(hist.mean(), None);
    }

    #[test]
    fn test_from_durations() {
        let durations = [Duration::from_nanos(10), Duration::from_nanos(30)];
        let hist = Histogram::from_durations(&durations, &HistogramOptions::default());
        assert_eq!(hist.minimum, 10.0);
        assert_eq!(hist.maximum, 30.0);
        assert_eq!(hist.average, 20.0);
    }

    #[test]
    fn test_identical_samples_fill_first_bin() {
        let samples = vec![5.0; 50];
        let hist = Histogram::new(&samples, &HistogramOptions::default());
        assert_eq!(hist.bins[0].count, 50);
        assert_eq!(hist.bins.iter().map(|b| b.count).sum::<usize>(), 50);
    }

    #[test]
    #[should_panic(expected = "bin count must be larger than 0")]
    fn test_zero_bins_panics() {
        Histogram::new(&[1.0], &HistogramOptions::default().bin_count(0));
    }

    #[test]
    #[should_panic(expected = "must not be negative")]
    fn test_negative_sample_panics() {
        Histogram::new(&[3.0, -1.0, 2.0], &HistogramOptions::default());
    }

    #[test]
    #[should_panic(expected = "lies below the smallest sample")]
    fn test_inverted_clamp_panics() {
        Histogram::new(
            &[10.0, 20.0],
            &HistogramOptions::default().clamp_maximum(5.0),
        );
    }
}
