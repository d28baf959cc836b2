//! Benchmark configuration.
//!
//! Two layers:
//! - [`BenchmarkConfig`] is the concrete plan for one (set size, initial
//!   capacity) pair: how many sets to fill per timed round and how many
//!   rounds to run so that the total work approximates a budget.
//! - [`BenchmarkSetup`] validates the parameters of a whole sweep over set
//!   sizes and capacity headroom steps, and predicts its cost.

use std::fmt;
use std::num::NonZeroU32;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{
    DEFAULT_BAR_WIDTH, DEFAULT_SINGLE_ADD_SEED, HOUSEKEEPING_FACTOR, MAX_SET_SIZE, NANOS_PER_SEC,
};
use crate::error::ConfigError;

/// Plan for measuring one (set size, initial capacity) configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Capacity each set is created with.
    pub init_size: u32,
    /// Values added to each set per round.
    pub final_set_size: u32,
    /// Requested adds per timed round, after adjustment.
    pub target_adds_per_round: u32,
    /// Requested adds over all rounds, after adjustment.
    pub total_adds_per_config: u32,
    /// Sets filled per round.
    pub num_of_sets: u32,
    /// `num_of_sets * final_set_size`.
    pub actual_adds_per_round: u32,
    /// Timed rounds.
    pub rounds: u32,
    /// PRNG seed for the added values.
    pub seed: u64,
}

impl BenchmarkConfig {
    /// Derive a plan from a round target and a total budget.
    ///
    /// A round is raised to hold at least one full set and the total is
    /// raised to hold at least one round. Sets per round and rounds are
    /// rounded to the nearest integer (at least 1), so the actual work per
    /// config stays within one round of the total budget.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptySet`] if `set_size` is zero.
    pub fn derive(
        init_size: u32,
        set_size: u32,
        target_adds_per_round: u32,
        total_adds_per_config: u32,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        if set_size == 0 {
            return Err(ConfigError::EmptySet);
        }

        let target_adds_per_round = target_adds_per_round.max(set_size);
        let total_adds_per_config = total_adds_per_config.max(target_adds_per_round);

        let num_of_sets =
            ((target_adds_per_round as f64 / set_size as f64).round() as u32).max(1);
        let actual_adds_per_round = num_of_sets.saturating_mul(set_size);
        let rounds =
            ((total_adds_per_config as f64 / actual_adds_per_round as f64).round() as u32).max(1);

        Ok(Self {
            init_size,
            final_set_size: set_size,
            target_adds_per_round,
            total_adds_per_config,
            num_of_sets,
            actual_adds_per_round,
            rounds,
            seed,
        })
    }

    /// Adds actually performed over all rounds.
    pub fn actual_adds_per_config(&self) -> u64 {
        self.rounds as u64 * self.actual_adds_per_round as u64
    }
}

/// Headroom step between two initial capacities of the same set size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Step {
    /// Percent of the set size.
    Percent(f64),
    /// Absolute number of slots.
    Increment(NonZeroU32),
}

impl Step {
    /// Percent step.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidStep`] unless `p` is finite and positive.
    pub fn percent(p: f64) -> Result<Self, ConfigError> {
        let step = Step::Percent(p);
        step.validate()?;
        Ok(step)
    }

    /// Absolute step.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidStep`] if `n` is zero.
    pub fn increment(n: u32) -> Result<Self, ConfigError> {
        NonZeroU32::new(n)
            .map(Step::Increment)
            .ok_or_else(|| ConfigError::InvalidStep(n.to_string()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Step::Percent(p) if !(p.is_finite() && p > 0.0) => {
                Err(ConfigError::InvalidStep(self.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Headroom steps needed to cover 0..=100% (percent) or 0..=`limit`
    /// (increment), both ends included.
    pub fn number_of_steps(&self, limit: u32) -> u32 {
        match *self {
            Step::Percent(p) => {
                let mut count = (100.0 / p) as u32;
                if (count as f64) * p < 100.0 {
                    count = count.saturating_add(1);
                }
                count.saturating_add(1)
            }
            Step::Increment(inc) => {
                let inc = inc.get();
                let mut count = limit / inc;
                if limit % inc != 0 {
                    count += 1;
                }
                count.saturating_add(1)
            }
        }
    }
}

impl Default for Step {
    fn default() -> Self {
        Step::Percent(1.0)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Percent(p) => write!(f, "{:.6}%", p),
            Step::Increment(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for Step {
    type Err = ConfigError;

    /// `"2.5%"` parses as a percent step, `"2"` as an absolute step.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidStep(s.to_string());
        match s.trim().strip_suffix('%') {
            Some(p) => Step::percent(p.trim().parse().map_err(|_| invalid())?).map_err(|_| invalid()),
            None => Step::increment(s.trim().parse().map_err(|_| invalid())?).map_err(|_| invalid()),
        }
    }
}

/// Largest headroom measured for a set size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Limit {
    /// Percent above the set size.
    Relative(f64),
    /// Capacity to reach, in slots.
    Absolute(u32),
}

impl Limit {
    fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Limit::Relative(rel) if !(rel.is_finite() && rel >= 0.0) => {
                Err(ConfigError::InvalidLimit(rel))
            }
            _ => Ok(()),
        }
    }
}

impl Default for Limit {
    fn default() -> Self {
        Limit::Relative(100.0)
    }
}

/// Parameters of a set-size sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetupParams {
    /// First set size (inclusive, default: 100).
    pub from: u32,
    /// Last set size (inclusive, default: 200).
    pub to: u32,
    /// Adds between two clock samples (default: 50,000).
    ///
    /// Balances cache footprint against clock precision: 50,000 adds at
    /// ~8ns are ~400µs per round, so a 100ns clock contributes 0.025%.
    pub target_adds_per_round: u32,
    /// Expected cost of one add in nanoseconds (default: 8.0).
    pub exp_runtime_per_add_ns: f64,
    /// Time budget per configuration in seconds (default: 1.0).
    pub seconds_per_config: f64,
    /// Headroom step (default: 1%).
    pub step: Step,
    /// Largest headroom (default: +100%).
    pub limit: Limit,
}

impl Default for SetupParams {
    fn default() -> Self {
        Self {
            from: 100,
            to: 200,
            target_adds_per_round: 50_000,
            exp_runtime_per_add_ns: 8.0,
            seconds_per_config: 1.0,
            step: Step::default(),
            limit: Limit::default(),
        }
    }
}

/// Validated sweep parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSetup {
    params: SetupParams,
    total_adds_per_config: u32,
}

impl BenchmarkSetup {
    /// Validate `params` and derive the add budget per configuration.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint, checked in the order of the
    /// [`ConfigError`] variants.
    pub fn new(params: SetupParams) -> Result<Self, ConfigError> {
        if params.to < params.from {
            return Err(ConfigError::ToBelowFrom {
                from: params.from,
                to: params.to,
            });
        }
        if params.to > MAX_SET_SIZE {
            return Err(ConfigError::SetSizeTooLarge {
                to: params.to,
                max: MAX_SET_SIZE,
            });
        }
        if !(params.seconds_per_config > 0.0) {
            return Err(ConfigError::NonPositiveBudget(params.seconds_per_config));
        }
        if !(params.exp_runtime_per_add_ns > 0.0) {
            return Err(ConfigError::NonPositiveRuntime(params.exp_runtime_per_add_ns));
        }

        let total_adds_per_config =
            (params.seconds_per_config * (NANOS_PER_SEC / params.exp_runtime_per_add_ns)) as u32;

        if params.target_adds_per_round > total_adds_per_config {
            return Err(ConfigError::RoundExceedsBudget {
                per_round: params.target_adds_per_round,
                total: total_adds_per_config,
            });
        }
        if params.target_adds_per_round < params.to {
            return Err(ConfigError::RoundTooSmall {
                per_round: params.target_adds_per_round,
                to: params.to,
            });
        }
        params.step.validate()?;
        params.limit.validate()?;
        if params.from == 0 {
            return Err(ConfigError::EmptySet);
        }

        debug!(
            from = params.from,
            to = params.to,
            total_adds_per_config,
            step = %params.step,
            "benchmark setup validated"
        );

        Ok(Self {
            params,
            total_adds_per_config,
        })
    }

    /// Validated parameters.
    pub fn params(&self) -> &SetupParams {
        &self.params
    }

    /// `seconds_per_config * 1e9 / exp_runtime_per_add_ns`, saturated to `u32`.
    pub fn total_adds_per_config(&self) -> u32 {
        self.total_adds_per_config
    }

    /// Set sizes of the sweep, ascending.
    pub fn set_sizes(&self) -> RangeInclusive<u32> {
        self.params.from..=self.params.to
    }

    /// Initial capacities measured for `set_size`, ascending.
    ///
    /// The first entry is always `set_size` itself (zero headroom).
    pub fn init_sizes(&self, set_size: u32) -> Vec<u32> {
        let limit = self.params.limit;
        match self.params.step {
            Step::Percent(p) => percent_steps(p, percent_bound(p, limit, set_size))
                .map(|f| set_size.saturating_add((f * set_size as f64 / 100.0).round() as u32))
                .collect(),
            Step::Increment(inc) => increment_steps(inc.get(), increment_limit(limit, set_size))
                .map(|i| set_size.saturating_add(i))
                .collect(),
        }
    }

    /// Length of [`BenchmarkSetup::init_sizes`] for `set_size`.
    fn headroom_count(&self, set_size: u32) -> u64 {
        let limit = self.params.limit;
        match self.params.step {
            Step::Percent(p) => percent_step_count(p, percent_bound(p, limit, set_size)),
            Step::Increment(inc) => {
                increment_step_count(inc.get(), increment_limit(limit, set_size))
            }
        }
    }

    /// Column headings for the longest headroom sequence of the sweep.
    pub fn headings(&self) -> Vec<String> {
        headroom_headings(self.params.from, self.params.to, self.params.step, self.params.limit)
            .unwrap_or_default()
    }

    /// Configurations in the sweep: one per set size and initial capacity
    /// planned by [`BenchmarkSetup::init_sizes`].
    pub fn number_of_configs(&self) -> u64 {
        match (self.params.step, self.params.limit) {
            // Same headroom sequence for every set size.
            (Step::Percent(_), Limit::Relative(_)) => {
                let set_sizes = (self.params.to - self.params.from) as u64 + 1;
                self.headroom_count(self.params.from) * set_sizes
            }
            _ => self.set_sizes().map(|s| self.headroom_count(s)).sum(),
        }
    }

    /// Expected quantization error of one round in percent, for a clock
    /// with the given precision bound.
    pub fn quantization_error_percent(&self, precision_ns: f64) -> f64 {
        precision_ns * 100.0
            / (self.params.exp_runtime_per_add_ns * self.params.target_adds_per_round as f64)
    }

    /// Predicted wall time of the whole sweep, including 12% housekeeping.
    pub fn predict_total_duration(&self) -> Duration {
        let per_config =
            (self.params.exp_runtime_per_add_ns * self.total_adds_per_config as f64) as u64;
        let total = per_config.saturating_mul(self.number_of_configs());
        Duration::from_nanos((total as f64 * HOUSEKEEPING_FACTOR) as u64)
    }

    /// Plan for one (set size, initial capacity) pair of this sweep.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptySet`] if `set_size` is zero.
    pub fn config_for(
        &self,
        init_size: u32,
        set_size: u32,
        seed: u64,
    ) -> Result<BenchmarkConfig, ConfigError> {
        BenchmarkConfig::derive(
            init_size,
            set_size,
            self.params.target_adds_per_round,
            self.total_adds_per_config,
            seed,
        )
    }
}

/// Column headings `"+{f:.1}% "` or `"+{i} "` for every headroom step.
///
/// The sequence is the longest one over the sweep `from..=to`: absolute
/// limits are widest at `from`, relative increments at `to`, relative
/// percents do not depend on the set size.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidStep`] for a non-positive percent step,
/// [`ConfigError::InvalidLimit`] for a negative or non-finite relative
/// limit and [`ConfigError::EmptySet`] if `from` is zero.
pub fn headroom_headings(
    from: u32,
    to: u32,
    step: Step,
    limit: Limit,
) -> Result<Vec<String>, ConfigError> {
    step.validate()?;
    limit.validate()?;
    if from == 0 {
        return Err(ConfigError::EmptySet);
    }

    let headings = match (step, limit) {
        (Step::Percent(p), _) => percent_steps(p, percent_bound(p, limit, from))
            .map(|f| format!("+{:.1}% ", f))
            .collect(),
        (Step::Increment(inc), Limit::Relative(_)) => {
            increment_steps(inc.get(), increment_limit(limit, to))
                .map(|i| format!("+{} ", i))
                .collect()
        }
        (Step::Increment(inc), Limit::Absolute(_)) => {
            increment_steps(inc.get(), increment_limit(limit, from))
                .map(|i| format!("+{} ", i))
                .collect()
        }
    };
    Ok(headings)
}

/// Exclusive upper end of the percent headroom sequence for `set_size`.
///
/// Never below `p`, so zero headroom is always part of the sequence.
fn percent_bound(p: f64, limit: Limit, set_size: u32) -> f64 {
    let bound = match limit {
        Limit::Relative(rel) => rel + p,
        // An absolute capacity has no percentage of an empty set.
        Limit::Absolute(_) if set_size == 0 => p,
        Limit::Absolute(abs) => (abs as f64 / set_size as f64 - 1.0) * 100.0 + p,
    };
    bound.max(p)
}

/// Largest increment headroom for `set_size`.
fn increment_limit(limit: Limit, set_size: u32) -> u32 {
    match limit {
        Limit::Relative(rel) => (rel * set_size as f64 / 100.0).round() as u32,
        Limit::Absolute(abs) => abs.saturating_sub(set_size),
    }
}

/// Number of `k >= 0` with `k * p < bound`.
fn percent_step_count(p: f64, bound: f64) -> u64 {
    let mut n = (bound / p).ceil().max(0.0) as u64;
    while n > 0 && (n - 1) as f64 * p >= bound {
        n -= 1;
    }
    while (n as f64) * p < bound {
        n += 1;
    }
    n
}

/// `0, p, 2p, ...` while below `bound`.
fn percent_steps(p: f64, bound: f64) -> impl Iterator<Item = f64> {
    (0..percent_step_count(p, bound)).map(move |k| k as f64 * p)
}

/// Number of increments up to and including the first at or above `limit`.
fn increment_step_count(inc: u32, limit: u32) -> u64 {
    (limit as u64).div_ceil(inc as u64) + 1
}

/// `0, inc, 2inc, ...` up to and including the first value at or above `limit`.
fn increment_steps(inc: u32, limit: u32) -> impl Iterator<Item = u32> {
    (0..increment_step_count(inc, limit))
        .map(move |k| u32::try_from(k * inc as u64).unwrap_or(u32::MAX))
}

/// Parameters of the single-add histogram experiment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SingleAddConfig {
    /// Values added to an empty set per iteration (default: 20).
    pub number: u64,
    /// Initial capacity of the set (default: 30).
    pub capacity: u32,
    /// Timed experiments, one histogram entry each (default: 2,000).
    pub experiments: u64,
    /// Clear-and-fill iterations per experiment (default: 25,000,000,
    /// roughly 200ms per experiment).
    pub iterations: u64,
    /// Histogram lower bound in nanoseconds (default: 7.0).
    pub hist_lower: f64,
    /// Histogram upper bound in nanoseconds (default: 9.5).
    pub hist_upper: f64,
    /// Histogram steps between the bounds (default: 50).
    pub hist_steps: u32,
    /// Histogram bar width (default: 40).
    pub hist_width: u32,
    /// Cost of one PRNG draw; measured when `None`.
    pub rand_rt: Option<f64>,
    /// Clock precision bound; calibrated when `None`.
    pub precision: Option<f64>,
    /// PRNG seed (default: 3571113171923).
    pub seed: u64,
}

impl Default for SingleAddConfig {
    fn default() -> Self {
        Self {
            number: 20,
            capacity: 30,
            experiments: 2_000,
            iterations: 25_000_000,
            hist_lower: 7.0,
            hist_upper: 9.5,
            hist_steps: 50,
            hist_width: DEFAULT_BAR_WIDTH as u32,
            rand_rt: None,
            precision: None,
            seed: DEFAULT_SINGLE_ADD_SEED,
        }
    }
}
