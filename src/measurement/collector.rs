//! Measurement loops for set insertion benchmarks.
//!
//! A round fills several sets of the same size and capacity with values
//! from the deterministic generator and is timed as a whole. Clearing the
//! sets between rounds happens outside the timed region. Fixed costs known
//! from calibration are subtracted from every round:
//! - one sampling call (the clock reading inside the timed region), and
//! - one generator draw per add.
//!
//! All loops run with background reclamation suspended.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{BenchmarkConfig, SingleAddConfig};
use crate::constants::{CLEAR_ROUNDS_PER_ITERATION, PRNG_CALIBRATION_CALLS, PRNG_OVERHEAD_SEED};
use crate::error::CalibrationError;
use crate::preflight::run_all_checks;
use crate::result::{ExperimentReport, Metadata};
use crate::rng::Prng;
use crate::statistics::{median, stats, Histo, Histogram, HistogramOptions};

use super::calibration::{Calibration, CalibrationConfig};
use super::clock::{black_box, Clock, MonotonicClock};
use super::quiet::{NoReclaim, QuietScope, Reclaimer};
use super::set::InsertSet;

/// Average cost of clearing a set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClearCost {
    /// Nanoseconds per clear.
    pub avg_ns: f64,
    /// Clock precision relative to the whole timed span.
    pub quantization_error: f64,
}

/// Options for [`Collector::run_add_experiment`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperimentOptions {
    /// Cost of one generator draw, subtracted per add.
    pub prng_overhead_ns: f64,
    /// Layout of the per-add histogram.
    pub histogram: HistogramOptions,
}

impl Default for ExperimentOptions {
    fn default() -> Self {
        Self {
            prng_overhead_ns: 0.0,
            histogram: HistogramOptions::default(),
        }
    }
}

/// Runs timed benchmark loops against a calibrated clock.
#[derive(Debug)]
pub struct Collector<C = MonotonicClock, R = NoReclaim> {
    clock: C,
    reclaimer: R,
    calibration: Calibration,
}

impl Collector<MonotonicClock, NoReclaim> {
    /// Collector on the monotonic clock, calibrated with `config`.
    ///
    /// # Errors
    ///
    /// Propagates calibration failures.
    pub fn calibrated(config: &CalibrationConfig) -> Result<Self, CalibrationError> {
        Self::calibrate(MonotonicClock::new(), NoReclaim, config)
    }
}

impl<C: Clock, R: Reclaimer> Collector<C, R> {
    /// Create a collector with a known calibration.
    pub fn new(clock: C, reclaimer: R, calibration: Calibration) -> Self {
        Self {
            clock,
            reclaimer,
            calibration,
        }
    }

    /// Calibrate `clock` and create a collector on it.
    ///
    /// # Errors
    ///
    /// Propagates calibration failures.
    pub fn calibrate(
        clock: C,
        reclaimer: R,
        config: &CalibrationConfig,
    ) -> Result<Self, CalibrationError> {
        let calibration = Calibration::measure(&clock, &reclaimer, config)?;
        Ok(Self::new(clock, reclaimer, calibration))
    }

    /// Get a reference to the clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Calibration subtracted from every measurement.
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Cost of one generator draw in nanoseconds, measured over `calls` draws.
    ///
    /// Returns `0.0` for zero calls.
    pub fn measure_prng_overhead(&self, calls: u64) -> f64 {
        if calls == 0 {
            return 0.0;
        }

        let mut prng = Prng::new(PRNG_OVERHEAD_SEED);
        let span = {
            let _quiet = QuietScope::enter(&self.reclaimer);
            let start = self.clock.sample();
            for _ in 0..calls {
                black_box(prng.next_value());
            }
            let end = self.clock.sample();
            self.clock.diff(start, end)
        };

        let overhead = (span as f64 - self.calibration.median_call_ns) / calls as f64;
        debug!(calls, overhead_ns = overhead, "prng overhead measured");
        overhead
    }

    /// Time `config.rounds` rounds of filling `config.num_of_sets` sets.
    ///
    /// Returns one corrected duration per round, in nanoseconds. Values can
    /// come out at or below zero when the overhead estimates are too high.
    pub fn add_benchmark<S: InsertSet>(
        &self,
        config: &BenchmarkConfig,
        prng_overhead_ns: f64,
    ) -> Vec<f64> {
        let mut prng = Prng::new(config.seed);
        let mut sets: Vec<S> = (0..config.num_of_sets)
            .map(|_| S::with_capacity(config.init_size))
            .collect();
        let overhead = self.calibration.median_call_ns
            + prng_overhead_ns * config.actual_adds_per_round as f64;
        let mut rounds = Vec::with_capacity(config.rounds as usize);

        let _quiet = QuietScope::enter(&self.reclaimer);
        for _ in 0..config.rounds {
            for set in sets.iter_mut() {
                set.clear();
            }

            let start = self.clock.sample();
            for set in sets.iter_mut() {
                for _ in 0..config.final_set_size {
                    set.add(prng.next_value());
                }
            }
            let end = self.clock.sample();

            rounds.push(self.clock.diff(start, end) as f64 - overhead);
        }

        rounds
    }

    /// Average cost of `set.clear()` over `10 * iterations` clears.
    ///
    /// `precision_ns` is subtracted once from the timed span.
    pub fn measure_avg_clear<S: InsertSet>(
        &self,
        set: &mut S,
        iterations: u64,
        precision_ns: f64,
    ) -> ClearCost {
        let clear_rounds = iterations.saturating_mul(CLEAR_ROUNDS_PER_ITERATION);
        if clear_rounds == 0 {
            return ClearCost {
                avg_ns: 0.0,
                quantization_error: 0.0,
            };
        }

        let span = {
            let _quiet = QuietScope::enter(&self.reclaimer);
            let start = self.clock.sample();
            for _ in 0..clear_rounds {
                set.clear();
            }
            let end = self.clock.sample();
            self.clock.diff(start, end)
        };

        let avg_ns = (span as f64 - precision_ns) / clear_rounds as f64;
        let quantization_error = self.calibration.precision_ns / (avg_ns * clear_rounds as f64);
        debug!(avg_ns, clear_rounds, quantization_error, "clear cost measured");

        ClearCost {
            avg_ns,
            quantization_error,
        }
    }

    /// Per-add cost distribution of filling one small set from empty.
    ///
    /// Each experiment times `iterations` clear-and-fill cycles and adds the
    /// derived cost of one add to a fixed-range histogram over
    /// `[hist_lower, hist_upper]`. Unset `rand_rt` and `precision` are
    /// measured or taken from the calibration.
    ///
    /// # Panics
    ///
    /// Panics if `config.hist_steps` is zero or the histogram range is empty.
    pub fn single_add_benchmark<S: InsertSet>(&self, config: &SingleAddConfig) -> Histo {
        let mut histo = Histo::new(config.hist_lower, config.hist_upper, config.hist_steps as usize)
            .with_width(config.hist_width as usize)
            .with_unit("ns");
        if config.iterations == 0 || config.number == 0 {
            warn!(
                iterations = config.iterations,
                number = config.number,
                "single add benchmark has nothing to measure"
            );
            return histo;
        }

        let rand_rt = config
            .rand_rt
            .unwrap_or_else(|| self.measure_prng_overhead(PRNG_CALIBRATION_CALLS));
        let precision = config.precision.unwrap_or(self.calibration.precision_ns);

        let mut prng = Prng::new(config.seed);
        let mut set = S::with_capacity(config.capacity);
        let clear = self.measure_avg_clear(&mut set, config.iterations, precision);

        let _quiet = QuietScope::enter(&self.reclaimer);
        for _ in 0..config.experiments {
            let start = self.clock.sample();
            for _ in 0..config.iterations {
                set.clear();
                for _ in 0..config.number {
                    set.add(prng.next_value());
                }
            }
            let end = self.clock.sample();

            let per_iteration =
                (self.clock.diff(start, end) as f64 - precision) / config.iterations as f64;
            let per_add = (per_iteration - clear.avg_ns) / config.number as f64 - rand_rt;
            histo.add(per_add);
        }

        histo
    }

    /// Measure one configuration and summarize it.
    ///
    /// # Panics
    ///
    /// Panics if `options.histogram` is invalid (see [`Histogram::new`]).
    pub fn run_add_experiment<S: InsertSet>(
        &self,
        config: &BenchmarkConfig,
        options: &ExperimentOptions,
    ) -> ExperimentReport {
        let started = Instant::now();

        let rounds_ns = self.add_benchmark::<S>(config, options.prng_overhead_ns);
        let ns_per_add = to_ns_per_add(&rounds_ns, config.actual_adds_per_round);
        let median_ns_per_add = median(&ns_per_add);
        let moments = stats(&ns_per_add);
        let preflight = run_all_checks(&rounds_ns, self.calibration.precision_ns);

        let histogram = if rounds_ns.iter().all(|&r| r >= 0.0) {
            let mut histogram = Histogram::new(&rounds_ns, &options.histogram);
            histogram.scale(config.actual_adds_per_round as f64);
            Some(histogram)
        } else {
            None
        };

        info!(
            set_size = config.final_set_size,
            init_size = config.init_size,
            rounds = config.rounds,
            median_ns_per_add,
            valid = preflight.is_valid,
            "add experiment finished"
        );

        ExperimentReport {
            config: *config,
            calibration: self.calibration,
            prng_overhead_ns: options.prng_overhead_ns,
            rounds_ns,
            ns_per_add,
            median_ns_per_add,
            moments,
            histogram,
            preflight,
            metadata: Metadata {
                clock: self.clock.name().to_string(),
                runtime_secs: started.elapsed().as_secs_f64(),
            },
        }
    }
}

/// Divide every round duration by the adds it contains.
pub fn to_ns_per_add(measurements: &[f64], adds_per_round: u32) -> Vec<f64> {
    let div = 1.0 / adds_per_round as f64;
    measurements.iter().map(|m| m * div).collect()
}
