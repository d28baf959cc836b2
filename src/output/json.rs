//! JSON serialization for experiment reports.

use crate::result::ExperimentReport;

/// Serialize an ExperimentReport to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails, e.g. for non-finite values in
/// strict serializers.
pub fn to_json(report: &ExperimentReport) -> Result<String, serde_json::Error> {
    serde_json::to_string(report)
}

/// Serialize an ExperimentReport to a pretty-printed JSON string.
///
/// # Errors
///
/// See [`to_json`].
pub fn to_json_pretty(report: &ExperimentReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BenchmarkConfig;
    use crate::measurement::Calibration;
    use crate::preflight::PreflightResult;
    use crate::result::Metadata;
    use crate::statistics::{stats, Histogram, HistogramOptions};

    fn make_test_report() -> ExperimentReport {
        let rounds_ns = vec![8_000.0, 8_200.0, 7_900.0];
        let ns_per_add: Vec<f64> = rounds_ns.iter().map(|r| r / 1_000.0).collect();
        ExperimentReport {
            config: BenchmarkConfig::derive(120, 100, 1_000, 3_000, 7).unwrap(),
            calibration: Calibration::from_parts(20.0, 25.0),
            prng_overhead_ns: 1.5,
            moments: stats(&ns_per_add),
            median_ns_per_add: 8.0,
            histogram: Some(Histogram::new(&ns_per_add, &HistogramOptions::default())),
            rounds_ns,
            ns_per_add,
            preflight: PreflightResult::new(),
            metadata: Metadata {
                clock: "monotonic".to_string(),
                runtime_secs: 0.25,
            },
        }
    }

    #[test]
    fn test_json_serialization() {
        let report = make_test_report();
        let json = to_json(&report).unwrap();

        assert!(json.contains("\"median_ns_per_add\":8.0"));
        assert!(json.contains("\"precision_ns\":25.0"));
        assert!(json.contains("\"clock\":\"monotonic\""));
    }

    #[test]
    fn test_json_round_trip_keeps_config() {
        let report = make_test_report();
        let json = to_json_pretty(&report).unwrap();
        assert!(json.contains('\n'));

        let parsed: ExperimentReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.config, report.config);
        assert_eq!(parsed.rounds_ns, report.rounds_ns);
        assert!(parsed.is_valid());
    }
}
