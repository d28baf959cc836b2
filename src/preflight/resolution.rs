//! Quantization check of measured rounds.
//!
//! A round is only trustworthy when it spans many clock precision bounds.
//! After subtracting the sampling call and the generator overhead, a round
//! that comes out at or below zero means the overhead estimates exceed the
//! actual work; the results of that configuration are meaningless.

use serde::{Deserialize, Serialize};

use crate::constants::PRECISION_SAFETY_FACTOR;

/// Warning from the quantization check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuantizationWarning {
    /// Some rounds measured zero or negative time after overhead subtraction.
    ///
    /// This is a critical warning.
    NonPositiveRounds {
        /// Rounds at or below zero.
        count: usize,
        /// Total number of rounds.
        total_samples: usize,
    },

    /// The shortest round spans fewer than 20 precision bounds.
    BelowPrecisionFloor {
        /// Shortest round in nanoseconds.
        min_round_ns: f64,
        /// Required minimum in nanoseconds.
        floor_ns: f64,
        /// Clock precision bound in nanoseconds.
        precision_ns: f64,
    },

    /// Many rounds have identical durations.
    HighQuantization {
        /// Number of distinct durations observed.
        unique_values: usize,
        /// Total number of rounds.
        total_samples: usize,
    },
}

impl QuantizationWarning {
    /// Check if this warning indicates a critical issue.
    pub fn is_critical(&self) -> bool {
        matches!(self, QuantizationWarning::NonPositiveRounds { .. })
    }

    /// Get a human-readable description of the warning.
    pub fn description(&self) -> String {
        match self {
            QuantizationWarning::NonPositiveRounds {
                count,
                total_samples,
            } => format!(
                "CRITICAL: {} of {} rounds measured no time after overhead subtraction. \
                 Increase the adds per round or recalibrate the clock.",
                count, total_samples
            ),
            QuantizationWarning::BelowPrecisionFloor {
                min_round_ns,
                floor_ns,
                precision_ns,
            } => format!(
                "Warning: shortest round ({:.1}ns) is below {:.1}ns, {}x the clock precision of {:.1}ns. \
                 Quantization error may dominate.",
                min_round_ns, floor_ns, PRECISION_SAFETY_FACTOR, precision_ns
            ),
            QuantizationWarning::HighQuantization {
                unique_values,
                total_samples,
            } => format!(
                "Warning: High quantization detected - only {} unique values in {} rounds. \
                 Clock resolution may be affecting measurement quality.",
                unique_values, total_samples
            ),
        }
    }
}

/// Minimum unique values expected per 1000 samples.
const MIN_UNIQUE_PER_1000: usize = 20;

/// Samples needed before the unique-value heuristic applies.
const MIN_SAMPLES_FOR_UNIQUENESS: usize = 100;

/// Values closer than this are considered identical, in nanoseconds.
const UNIQUE_TOLERANCE_NS: f64 = 0.1;

/// Check measured rounds against the clock precision.
///
/// Reports the most severe finding only: non-positive rounds, then rounds
/// below the precision floor, then low value diversity.
pub fn quantization_check(round_samples_ns: &[f64], precision_ns: f64) -> Option<QuantizationWarning> {
    if round_samples_ns.is_empty() {
        return None;
    }

    let non_positive = round_samples_ns.iter().filter(|&&x| x <= 0.0).count();
    if non_positive > 0 {
        return Some(QuantizationWarning::NonPositiveRounds {
            count: non_positive,
            total_samples: round_samples_ns.len(),
        });
    }

    let min_round_ns = round_samples_ns.iter().copied().fold(f64::INFINITY, f64::min);
    let floor_ns = PRECISION_SAFETY_FACTOR * precision_ns;
    if min_round_ns < floor_ns {
        return Some(QuantizationWarning::BelowPrecisionFloor {
            min_round_ns,
            floor_ns,
            precision_ns,
        });
    }

    if round_samples_ns.len() < MIN_SAMPLES_FOR_UNIQUENESS {
        return None;
    }

    let mut sorted = round_samples_ns.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut unique_count = 1;
    let mut last_value = sorted[0];
    for &val in &sorted[1..] {
        if (val - last_value).abs() > UNIQUE_TOLERANCE_NS {
            unique_count += 1;
            last_value = val;
        }
    }

    let expected_unique =
        (sorted.len() as f64 / 1000.0 * MIN_UNIQUE_PER_1000 as f64).max(10.0) as usize;
    if unique_count < expected_unique / 2 {
        return Some(QuantizationWarning::HighQuantization {
            unique_values: unique_count,
            total_samples: sorted.len(),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_good_rounds() {
        let samples: Vec<f64> = (0..1000).map(|x| 400_000.0 + x as f64 * 1.7).collect();
        assert!(quantization_check(&samples, 100.0).is_none());
    }

    #[test]
    fn test_non_positive_rounds_are_critical() {
        let mut samples = vec![5_000.0; 10];
        samples[3] = 0.0;
        samples[7] = -12.0;

        let warning = quantization_check(&samples, 1.0).unwrap();
        assert!(warning.is_critical());
        assert_eq!(
            warning,
            QuantizationWarning::NonPositiveRounds {
                count: 2,
                total_samples: 10
            }
        );
    }

    #[test]
    fn test_below_precision_floor() {
        let samples = vec![1_500.0, 3_000.0, 2_000.0];
        let warning = quantization_check(&samples, 100.0).unwrap();
        assert!(!warning.is_critical());
        match warning {
            QuantizationWarning::BelowPrecisionFloor {
                min_round_ns,
                floor_ns,
                ..
            } => {
                assert_eq!(min_round_ns, 1_500.0);
                assert_eq!(floor_ns, 2_000.0);
            }
            other => panic!("unexpected warning {:?}", other),
        }
    }

    #[test]
    fn test_high_quantization() {
        // Only three distinct durations among 1000 rounds.
        let samples: Vec<f64> = (0..1000).map(|x| 10_000.0 + ((x % 3) * 100) as f64).collect();
        let warning = quantization_check(&samples, 1.0).unwrap();
        assert!(!warning.is_critical());
        assert!(matches!(
            warning,
            QuantizationWarning::HighQuantization {
                unique_values: 3,
                total_samples: 1000
            }
        ));
        assert!(warning.description().contains("3 unique values"));
    }

    #[test]
    fn test_empty_input() {
        assert!(quantization_check(&[], 100.0).is_none());
    }
}
