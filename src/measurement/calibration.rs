//! Clock self-calibration.
//!
//! Two properties of the clock bound how precisely anything can be timed
//! with it:
//! - the smallest strictly positive delta two back-to-back samples ever
//!   show (the effective resolution), and
//! - the typical cost of one sampling call.
//!
//! The precision bound is the larger of the two. Aggregated measurements
//! should exceed it by [`PRECISION_SAFETY_FACTOR`] or more, otherwise the
//! quantization error dominates the signal.
//!
//! A [`Calibration`] is an explicit, immutable value. Measure it once per
//! run and pass it to whatever needs it; tests construct one directly or
//! measure a simulated clock.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{CALIBRATION_ITERATIONS, PRECISION_SAFETY_FACTOR, PRNG_CALIBRATION_CALLS};
use crate::error::CalibrationError;
use crate::statistics::median;

use super::clock::{Clock, Timestamp};
use super::quiet::{QuietScope, Reclaimer};

/// Iteration counts for calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Sample pairs (minimum delta) and consecutive intervals (call time).
    pub iterations: usize,

    /// PRNG draws timed when measuring generator overhead.
    pub prng_calls: u64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            iterations: CALIBRATION_ITERATIONS,
            prng_calls: PRNG_CALIBRATION_CALLS,
        }
    }
}

impl CalibrationConfig {
    /// Set the number of clock iterations.
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the number of timed PRNG draws.
    pub fn prng_calls(mut self, calls: u64) -> Self {
        self.prng_calls = calls;
        self
    }
}

/// Calibrated clock characteristics, all in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Smallest strictly positive delta between two back-to-back samples.
    pub min_time_sample_ns: f64,
    /// Median (or, below clock resolution, average) cost of one sample call.
    pub median_call_ns: f64,
    /// `max(min_time_sample_ns, median_call_ns)`.
    pub precision_ns: f64,
}

impl Calibration {
    /// Measure `clock`, suspending `reclaimer` while sampling.
    ///
    /// # Errors
    ///
    /// Fails with [`CalibrationError::ZeroIterations`] when
    /// `config.iterations == 0` and with
    /// [`CalibrationError::NoObservableDelta`] when the clock never
    /// advances between two samples.
    pub fn measure<C, R>(
        clock: &C,
        reclaimer: &R,
        config: &CalibrationConfig,
    ) -> Result<Self, CalibrationError>
    where
        C: Clock + ?Sized,
        R: Reclaimer + ?Sized,
    {
        let min_time_sample = min_time_sample(clock, config.iterations)?;
        let median_call = median_call_time(clock, reclaimer, config.iterations)?;
        let calibration = Self::from_parts(min_time_sample as f64, median_call);

        debug!(
            clock = clock.name(),
            iterations = config.iterations,
            min_time_sample_ns = calibration.min_time_sample_ns,
            median_call_ns = calibration.median_call_ns,
            precision_ns = calibration.precision_ns,
            "clock calibrated"
        );

        Ok(calibration)
    }

    /// Build a calibration from known measurements.
    pub fn from_parts(min_time_sample_ns: f64, median_call_ns: f64) -> Self {
        Self {
            min_time_sample_ns,
            median_call_ns,
            precision_ns: precision(min_time_sample_ns, median_call_ns),
        }
    }

    /// Calibration for a user-supplied precision bound.
    ///
    /// The bound doubles as resolution and call cost.
    pub fn overridden(precision_ns: f64) -> Self {
        Self::from_parts(precision_ns, precision_ns)
    }

    /// Operations to aggregate per sample so that one sample spans at least
    /// `factor` precision bounds.
    ///
    /// `op_ns` is the expected cost of one operation; values at or below
    /// zero are treated as too fast to measure individually.
    pub fn min_operations_per_sample(&self, op_ns: f64, factor: f64) -> u64 {
        let target = self.precision_ns * factor;
        if op_ns <= 0.0 {
            return target.ceil().max(1.0) as u64;
        }
        ((target / op_ns).ceil() as u64).max(1)
    }

    /// Operations per sample with the default safety factor.
    pub fn suggested_operations_per_sample(&self, op_ns: f64) -> u64 {
        self.min_operations_per_sample(op_ns, PRECISION_SAFETY_FACTOR)
    }

    /// Relative quantization error of a measurement spanning `total_ns`.
    pub fn quantization_error(&self, total_ns: f64) -> f64 {
        self.precision_ns / total_ns
    }
}

/// Combine resolution and call cost into the precision bound.
pub fn precision(min_time_sample_ns: f64, median_call_ns: f64) -> f64 {
    if min_time_sample_ns < median_call_ns {
        median_call_ns
    } else {
        min_time_sample_ns
    }
}

/// Smallest strictly positive delta between two immediately consecutive samples.
///
/// Zero and negative deltas (clock anomalies) are skipped.
///
/// # Errors
///
/// See [`Calibration::measure`].
pub fn min_time_sample<C: Clock + ?Sized>(
    clock: &C,
    iterations: usize,
) -> Result<i64, CalibrationError> {
    if iterations == 0 {
        return Err(CalibrationError::ZeroIterations);
    }

    let mut min_diff = i64::MAX;
    for _ in 0..iterations {
        let t1 = clock.sample();
        let t2 = clock.sample();
        let diff = clock.diff(t1, t2);
        if diff > 0 && diff < min_diff {
            min_diff = diff;
        }
    }

    if min_diff == i64::MAX {
        return Err(CalibrationError::NoObservableDelta { iterations });
    }
    Ok(min_diff)
}

/// Typical cost of one sample call.
///
/// Takes `iterations + 1` samples with nothing in between while reclamation
/// is suspended. If every interval is positive the clock resolves single
/// calls and the median interval is returned. If any interval is zero the
/// call is faster than one tick, so the median would only echo the clock
/// resolution; the average over the whole span is returned instead.
/// Negative intervals are anomalies and never enter the median.
///
/// # Errors
///
/// Fails with [`CalibrationError::ZeroIterations`] when `iterations == 0`.
pub fn median_call_time<C, R>(
    clock: &C,
    reclaimer: &R,
    iterations: usize,
) -> Result<f64, CalibrationError>
where
    C: Clock + ?Sized,
    R: Reclaimer + ?Sized,
{
    if iterations == 0 {
        return Err(CalibrationError::ZeroIterations);
    }

    let mut stamps: Vec<Timestamp> = Vec::with_capacity(iterations + 1);
    {
        let _quiet = QuietScope::enter(reclaimer);
        for _ in 0..=iterations {
            stamps.push(clock.sample());
        }
    }

    let mut deltas = Vec::with_capacity(iterations);
    let mut zeros = 0usize;
    for pair in stamps.windows(2) {
        let delta = clock.diff(pair[0], pair[1]);
        match delta {
            0 => zeros += 1,
            d if d > 0 => deltas.push(d as f64),
            _ => {}
        }
    }

    if zeros > 0 || deltas.is_empty() {
        let span = clock.diff(stamps[0], stamps[iterations]).max(0) as f64;
        let average = span / iterations as f64;
        debug!(zeros, average_ns = average, "sample call below clock resolution, using average");
        return Ok(average);
    }

    Ok(median(&deltas))
}
