//! Histogram engine tests.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use set_add_bench::statistics::nearest_rank;
use set_add_bench::{DistributionSummary, Histo, Histogram, HistogramOptions};

fn random_samples(seed: u64, n: usize, max: f64) -> Vec<f64> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    (0..n).map(|_| rng.random_range(0.0..max)).collect()
}

/// Outliers beyond p99.9 land in the last bin, which is flagged.
#[test]
fn percentile_clamp_collects_outliers() {
    let mut samples: Vec<f64> = (0..10_000).map(|x| x as f64).collect();
    for s in &mut samples[9_995..] {
        *s = 1e9;
    }

    let hist = Histogram::new(&samples, &HistogramOptions::default());

    assert_eq!(hist.maximum, 1e9);
    for (i, bin) in hist.bins.iter().enumerate() {
        assert_eq!(bin.start, 1_000.0 * i as f64);
        assert_eq!(bin.count, 1_000, "bin {}", i);
        assert_eq!(bin.and_above, i == 9);
    }
}

#[test]
fn explicit_clamp_maximum_overrides_percentile() {
    let options = HistogramOptions::default()
        .bin_count(3)
        .nice_range(false)
        .clamp_maximum(10.0);
    let hist = Histogram::new(&[1.0, 2.0, 3.0, 100.0], &options);

    assert_eq!(hist.bins.iter().map(|b| b.count).collect::<Vec<_>>(), vec![3, 0, 1]);
    assert!(hist.bins[2].and_above);
    assert_eq!(hist.bins[0].width, 1.0);
    assert!((hist.bins[2].width - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn clamp_minimum_shifts_first_bin() {
    let options = HistogramOptions::default()
        .bin_count(4)
        .nice_range(false)
        .clamp_minimum(10.0)
        .clamp_percentile(None);
    let hist = Histogram::new(&[2.0, 12.0, 14.0, 18.0], &options);

    assert_eq!(hist.bins[0].start, 10.0);
    assert_eq!(hist.bins[1].start, 12.0);
    // 2.0 lies below the clamp and still counts in the first bin.
    assert_eq!(hist.bins[0].count, 1);
    assert_eq!(hist.bins.iter().map(|b| b.count).sum::<usize>(), 4);
}

#[test]
fn percentiles_are_nearest_rank() {
    let samples = random_samples(7, 1_001, 500.0);
    let mut sorted = samples.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let hist = Histogram::new(&samples, &HistogramOptions::default());

    assert_eq!(hist.minimum, sorted[0]);
    assert_eq!(hist.maximum, sorted[1_000]);
    assert_eq!(hist.percentiles.p25, nearest_rank(&sorted, 0.25));
    assert_eq!(hist.percentiles.p50, sorted[501]);
    assert_eq!(hist.percentiles.p9999, sorted[1_000]);
    assert!(hist.percentiles.p90 <= hist.percentiles.p99);
    assert_eq!(hist.bins.iter().map(|b| b.count).sum::<usize>(), 1_001);
}

/// Dividing by a power of two is exact, so scaling must commute with stats.
#[test]
fn scale_divides_absolute_values_only() {
    let samples = random_samples(11, 2_000, 1_000.0);
    let options = HistogramOptions::default().nice_range(false);
    let original = Histogram::new(&samples, &options);

    let mut scaled = original.clone();
    scaled.scale(4.0);

    assert_eq!(scaled.minimum, original.minimum / 4.0);
    assert_eq!(scaled.average, original.average / 4.0);
    assert_eq!(scaled.maximum, original.maximum / 4.0);
    assert_eq!(scaled.percentiles.p50, original.percentiles.p50 / 4.0);
    assert_eq!(scaled.percentiles.p999, original.percentiles.p999 / 4.0);
    for (s, o) in scaled.bins.iter().zip(&original.bins) {
        assert_eq!(s.start, o.start / 4.0);
        assert_eq!(s.count, o.count);
        assert_eq!(s.width, o.width);
        assert_eq!(s.and_above, o.and_above);
    }
}

/// Scaling a histogram agrees with building one from the divided samples.
#[test]
fn scale_matches_histogram_of_divided_samples() {
    let samples = random_samples(13, 2_000, 1_000.0);
    let options = HistogramOptions::default().nice_range(false);

    let mut scaled = Histogram::new(&samples, &options);
    scaled.scale(4.0);
    let quarters: Vec<f64> = samples.iter().map(|x| x / 4.0).collect();
    let direct = Histogram::new(&quarters, &options);

    assert_eq!(scaled.count, direct.count);
    assert_eq!(scaled.minimum, direct.minimum);
    assert_eq!(scaled.average, direct.average);
    assert_eq!(scaled.maximum, direct.maximum);
    assert_eq!(scaled.percentiles, direct.percentiles);
    assert_eq!(scaled.bins, direct.bins);

    // A divisor that is not a power of two rounds differently, so only the
    // summary values agree, and only up to rounding.
    let mut scaled = Histogram::new(&samples, &options);
    scaled.scale(3.0);
    let thirds: Vec<f64> = samples.iter().map(|x| x / 3.0).collect();
    let direct = Histogram::new(&thirds, &options);

    let close = |a: f64, b: f64| (a - b).abs() <= 1e-12 * b.abs().max(1.0);
    assert!(close(scaled.minimum, direct.minimum));
    assert!(close(scaled.average, direct.average));
    assert!(close(scaled.maximum, direct.maximum));
    assert!(close(scaled.percentiles.p50, direct.percentiles.p50));
    assert!(close(scaled.percentiles.p99, direct.percentiles.p99));
}

#[test]
#[should_panic(expected = "scale divisor must be positive")]
fn scale_rejects_zero() {
    let mut hist = Histogram::new(&[1.0], &HistogramOptions::default());
    hist.scale(0.0);
}

#[test]
fn durations_are_nanoseconds() {
    let durations: Vec<Duration> = (1..=4).map(Duration::from_micros).collect();
    let hist = Histogram::from_durations(&durations, &HistogramOptions::default());
    assert_eq!(hist.minimum, 1_000.0);
    assert_eq!(hist.maximum, 4_000.0);
    assert_eq!(hist.average, 2_500.0);
}

#[test]
fn input_is_not_reordered() {
    let samples = vec![3.0, 1.0, 2.0];
    let _ = Histogram::new(&samples, &HistogramOptions::default());
    assert_eq!(samples, vec![3.0, 1.0, 2.0]);
}

#[test]
fn rendering_has_one_line_per_bin() {
    let samples = random_samples(3, 500, 80.0);
    let hist = Histogram::new(&samples, &HistogramOptions::default());
    let rendered = hist.to_string();

    assert!(rendered.starts_with(&hist.stats_string()));
    assert_eq!(rendered.lines().count(), 2 + hist.bins.len());
}

#[test]
fn histo_counts_every_value() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
    let mut histo = Histo::new(7.0, 9.5, 50);
    for _ in 0..5_000 {
        histo.add(rng.random_range(5.0..12.0));
    }

    assert_eq!(histo.len(), 5_000);
    assert_eq!(histo.slots().iter().sum::<u64>(), 5_000);
    assert_eq!(histo.slot_count(), 51);
    assert!(histo.min().unwrap() >= 5.0);
    assert!(histo.max().unwrap() < 12.0);
    // Out-of-range values pile up at both ends.
    assert!(histo.count_at(0) > histo.count_at(25));
    assert!(histo.count_at(50) > histo.count_at(25));
}

#[test]
fn histo_percentiles_are_monotone() {
    let mut histo = Histo::new(0.0, 100.0, 20);
    for v in random_samples(5, 1_000, 100.0) {
        histo.add(v);
    }
    let ps = [0.0, 0.1, 0.25, 0.5, 0.75, 0.9, 0.99, 1.0];
    let values: Vec<f64> = ps.iter().map(|&p| histo.percentile(p)).collect();
    for w in values.windows(2) {
        assert!(w[0] <= w[1], "{:?}", values);
    }
    assert_eq!(values[0], 0.0);
    assert_eq!(values[7], 100.0);
}

fn summarize(d: &dyn DistributionSummary) -> (u64, Option<f64>, Option<f64>) {
    (d.count(), d.minimum(), d.maximum())
}

#[test]
fn both_engines_share_summary_view() {
    let values = [4.0, 8.0, 6.0];

    let hist = Histogram::new(&values, &HistogramOptions::default());
    let mut histo = Histo::new(0.0, 10.0, 10);
    for v in values {
        histo.add(v);
    }

    assert_eq!(summarize(&hist), (3, Some(4.0), Some(8.0)));
    assert_eq!(summarize(&histo), (3, Some(4.0), Some(8.0)));
    assert_eq!(hist.mean(), Some(6.0));
    assert_eq!(histo.mean(), Some(6.0));
    assert!(!hist.render().is_empty());
    assert!(!histo.render().is_empty());

    let empty = Histo::new(0.0, 1.0, 1);
    assert_eq!(summarize(&empty), (0, None, None));
}
