//! # set-add-bench
//!
//! Measure the cost of inserting values into hash sets, precisely enough to
//! compare capacity headroom choices at sub-nanosecond resolution.
//!
//! This crate provides:
//! - A deterministic xorshift* generator for reproducible workloads
//! - Clock sampling with self-calibration (resolution and sampling cost)
//! - Timed add loops that subtract calibrated overheads per round
//! - Range-discovering and fixed-range histograms with byte-stable rendering
//! - Planning of rounds and sets per configuration from a time budget
//!
//! ## Common Pitfall: Rounds Shorter Than the Clock
//!
//! A round that spans only a few clock ticks is mostly quantization noise.
//! Size rounds so that each spans at least twenty precision bounds:
//!
//! ```ignore
//! let collector = Collector::calibrated(&CalibrationConfig::default())?;
//! let ops = collector.calibration().suggested_operations_per_sample(8.0);
//! ```
//!
//! [`preflight::quantization_check`] flags measurements that violate this.
//!
//! ## Quick Start
//!
//! ```ignore
//! use set_add_bench::{
//!     BenchmarkConfig, CalibrationConfig, Collector, ExperimentOptions, NativeSet, DEFAULT_SEED,
//! };
//!
//! let collector = Collector::calibrated(&CalibrationConfig::default())?;
//! let prng_overhead_ns = collector.measure_prng_overhead(10_000_000);
//!
//! let config = BenchmarkConfig::derive(150, 100, 50_000, 125_000_000, DEFAULT_SEED)?;
//! let options = ExperimentOptions { prng_overhead_ns, ..Default::default() };
//! let report = collector.run_add_experiment::<NativeSet>(&config, &options);
//!
//! println!("{:.3}ns per add", report.median_ns_per_add);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
mod constants;
mod error;
mod result;
pub mod rng;

// Functional modules
pub mod measurement;
pub mod output;
pub mod preflight;
pub mod statistics;
pub mod workload;

// Re-exports for public API
pub use config::{
    headroom_headings, BenchmarkConfig, BenchmarkSetup, Limit, SetupParams, SingleAddConfig, Step,
};
pub use constants::{
    CALIBRATION_ITERATIONS, DEFAULT_BAR_WIDTH, DEFAULT_SEED, DEFAULT_SINGLE_ADD_SEED,
    HOUSEKEEPING_FACTOR, MAX_SET_SIZE, PRECISION_SAFETY_FACTOR, PRNG_CALIBRATION_CALLS,
    REPORTED_PERCENTILES,
};
pub use error::{CalibrationError, ConfigError};
pub use measurement::{
    to_ns_per_add, Calibration, CalibrationConfig, ClearCost, Clock, Collector, CycleClock,
    ExperimentOptions, InsertSet, MonotonicClock, NativeSet, NoReclaim, QuietScope, Reclaimer,
    Timestamp,
};
pub use result::{ExperimentReport, Metadata};
pub use rng::Prng;
pub use statistics::{
    DistributionSummary, Histo, Histogram, HistogramOptions, Moments,
};
pub use workload::SearchDataDriver;

/// Calibrate the monotonic clock and measure one configuration on
/// [`NativeSet`] with default options.
///
/// Uses a reduced calibration (one million clock samples, ten million
/// generator draws) so that a single call finishes within a few seconds.
///
/// # Errors
///
/// Returns an error if the clock cannot be calibrated.
pub fn measure_native(config: &BenchmarkConfig) -> Result<ExperimentReport, CalibrationError> {
    let calibration_config = CalibrationConfig::default()
        .iterations(1_000_000)
        .prng_calls(10_000_000);
    let collector = Collector::calibrated(&calibration_config)?;
    let options = ExperimentOptions {
        prng_overhead_ns: collector.measure_prng_overhead(calibration_config.prng_calls),
        ..ExperimentOptions::default()
    };
    Ok(collector.run_add_experiment::<NativeSet>(config, &options))
}
