//! Constants shared across the calibration, statistics and planning code.

/// Output multiplier of the xorshift* generator.
pub const PRNG_MULTIPLIER: u64 = 0x2545_F491_4F6C_DD1D;

/// Default seed for add benchmarks.
pub const DEFAULT_SEED: u64 = 0xABCD_EF01_2345_6789;

/// Default seed for the single-add histogram experiment.
pub const DEFAULT_SINGLE_ADD_SEED: u64 = 3_571_113_171_923;

/// Clock sampling iterations per calibration measurement.
pub const CALIBRATION_ITERATIONS: usize = 10_000_000;

/// PRNG draws timed when measuring generator overhead.
///
/// A draw costs 1-2ns while some clocks only tick every 100ns.
pub const PRNG_CALIBRATION_CALLS: u64 = 2_000_000_000;

/// Minimum ratio of an aggregated measurement to the precision bound.
pub const PRECISION_SAFETY_FACTOR: f64 = 20.0;

/// Percentiles reported by the range-discovering histogram.
pub const REPORTED_PERCENTILES: [f64; 7] = [0.25, 0.50, 0.75, 0.90, 0.99, 0.999, 0.9999];

/// Bar width in characters for a bin holding the maximum count.
pub const DEFAULT_BAR_WIDTH: usize = 40;

/// Largest set size a benchmark setup accepts.
pub const MAX_SET_SIZE: u32 = 1 << 28;

/// Housekeeping overhead applied to runtime predictions.
pub const HOUSEKEEPING_FACTOR: f64 = 1.12;

/// Nanoseconds per second.
pub const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Seed for the generator whose draws are timed as overhead.
pub const PRNG_OVERHEAD_SEED: u64 = 0x0123_4567_890A_BCDE;

/// Clear operations timed per requested iteration when measuring clear cost.
pub const CLEAR_ROUNDS_PER_ITERATION: u64 = 10;
