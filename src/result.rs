//! Experiment result types.

use serde::{Deserialize, Serialize};

use crate::config::BenchmarkConfig;
use crate::measurement::Calibration;
use crate::preflight::PreflightResult;
use crate::statistics::{Histogram, Moments};

/// Complete result of one add experiment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentReport {
    /// Configuration that was measured.
    pub config: BenchmarkConfig,

    /// Clock calibration the measurement was corrected with.
    pub calibration: Calibration,

    /// Cost of one PRNG draw subtracted per add, in nanoseconds.
    pub prng_overhead_ns: f64,

    /// Corrected duration of each round, in nanoseconds.
    pub rounds_ns: Vec<f64>,

    /// Per-add cost of each round, in nanoseconds.
    pub ns_per_add: Vec<f64>,

    /// Median of `ns_per_add`.
    pub median_ns_per_add: f64,

    /// Mean and spread of `ns_per_add`.
    pub moments: Moments,

    /// Per-add distribution; absent when some round came out negative.
    pub histogram: Option<Histogram>,

    /// Quantization checks on `rounds_ns`.
    pub preflight: PreflightResult,

    /// Metadata for debugging.
    pub metadata: Metadata,
}

impl ExperimentReport {
    /// Whether the measurement passed all critical checks.
    pub fn is_valid(&self) -> bool {
        self.preflight.is_valid
    }
}

/// Metadata for debugging and analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// Clock used for timing.
    pub clock: String,

    /// Total runtime in seconds.
    pub runtime_secs: f64,
}
