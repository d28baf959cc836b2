//! Descriptive statistics over plain sample slices.

use serde::{Deserialize, Serialize};

/// Mean, population variance and standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Moments {
    /// Arithmetic mean.
    pub mean: f64,
    /// Population variance (divides by `n`).
    pub variance: f64,
    /// Square root of the variance.
    pub stddev: f64,
}

impl Moments {
    /// Sentinel for an empty input: `(0, -1, -1)`.
    pub const UNDEFINED: Moments = Moments {
        mean: 0.0,
        variance: -1.0,
        stddev: -1.0,
    };

    /// Whether these moments describe actual data.
    pub fn is_defined(&self) -> bool {
        self.variance >= 0.0
    }
}

/// Mean, population variance and standard deviation of `data`.
///
/// Returns [`Moments::UNDEFINED`] for an empty slice.
pub fn stats(data: &[f64]) -> Moments {
    if data.is_empty() {
        return Moments::UNDEFINED;
    }

    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let variance = data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    Moments {
        mean,
        variance,
        stddev: variance.sqrt(),
    }
}

/// Median of `data`, averaging the two middle values for even lengths.
///
/// Returns `0.0` for an empty slice. The input is not modified.
pub fn median(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut sorted = data.to_vec();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Whether `a` and `b` agree within `tolerance_percent` of either value.
pub fn floats_equal_with_tolerance(a: f64, b: f64, tolerance_percent: f64) -> bool {
    let tol_a = (a * tolerance_percent / 100.0).abs();
    if a - tol_a <= b && a + tol_a >= b {
        return true;
    }
    let tol_b = (b * tolerance_percent / 100.0).abs();
    b - tol_b <= a && b + tol_b >= a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_table() {
        let cases: &[(&[f64], f64, f64)] = &[
            (&[1.0], 1.0, 0.0),
            (&[1.0, 2.0, 3.0], 2.0, 2.0 / 3.0),
            (&[1.0, 2.0, 3.0, 4.0], 2.5, 1.25),
            (&[1.0, 1.0, 1.0, 1.0], 1.0, 0.0),
            (&[1.5, 2.5, 3.5], 2.5, 2.0 / 3.0),
        ];
        for &(data, mean, variance) in cases {
            let m = stats(data);
            assert_eq!(m.mean, mean, "mean of {:?}", data);
            assert_eq!(m.variance, variance, "variance of {:?}", data);
            assert_eq!(m.stddev, variance.sqrt(), "stddev of {:?}", data);
        }
    }

    #[test]
    fn test_stats_wide_spread() {
        let m = stats(&[3.0, 53.0, 512.0, 11.0, 75.0, 201.0, 335.0]);
        assert_eq!(m.mean, 170.0);
        assert!((m.variance - 31576.285714285714).abs() < 1e-9);
        assert!((m.stddev - 31576.285714285714f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_stats_empty_is_sentinel() {
        let m = stats(&[]);
        assert_eq!(m, Moments::UNDEFINED);
        assert_eq!((m.mean, m.variance, m.stddev), (0.0, -1.0, -1.0));
        assert!(!m.is_defined());
        assert!(stats(&[4.0]).is_defined());
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), 0.0);
        assert_eq!(median(&[5.0]), 5.0);
        assert_eq!(median(&[9.0, 1.0, 5.0]), 5.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_median_leaves_input_untouched() {
        let data = vec![3.0, 1.0, 2.0];
        let _ = median(&data);
        assert_eq!(data, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_floats_equal_with_tolerance() {
        let cases = [
            (1.0, 1.0, 10.0, true),
            (1.0, 1.05, 10.0, true),
            (1.0, 1.15, 10.0, false),
            (1.0, 0.95, 10.0, true),
            (1.0, 0.85, 10.0, false),
            (1.0, 1.1, 10.0, true),
            (1.0, 0.9, 10.0, true),
            (2.0, 2.15, 10.0, true),
            (2.0, 1.85, 10.0, true),
            // Only inside the tolerance of the second value
            (2.0, 2.21, 10.0, true),
        ];
        for (a, b, tol, expected) in cases {
            assert_eq!(
                floats_equal_with_tolerance(a, b, tol),
                expected,
                "{} == {} within {}%",
                a,
                b,
                tol
            );
        }
    }
}
